use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouncilError {
    #[error("validation error: {0}")] Validation(String),
    #[error("network error: {0}")] Network(String),
    #[error("malformed response: {0}")] MalformedResponse(String),
    #[error("configuration error: {0}")] Configuration(String),
}

impl CouncilError {
    /// Message shown to the user. Everything except local validation is retryable
    /// and reads the same way, so the remote details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            CouncilError::Validation(msg) => msg.clone(),
            CouncilError::MalformedResponse(_) => {
                "The council returned a response that could not be read. Please try again.".into()
            }
            CouncilError::Network(_) | CouncilError::Configuration(_) => {
                "Failed to get a valid response from the Sustainability Council. Please try again."
                    .into()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, CouncilError::Validation(_))
    }
}

impl From<reqwest::Error> for CouncilError {
    fn from(e: reqwest::Error) -> Self {
        CouncilError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CouncilError>;
