use crate::council::Council;
use crate::domain::{ChatMessage, Sender};

pub const GREETING: &str =
    "Hi! I'm your CSR Coach. How can I help you understand your results or prepare a new scenario?";
pub const FALLBACK: &str = "Sorry, I'm having trouble connecting right now.";

/// Append-only conversation with the CSR coach. Failures never escape:
/// they become a fixed assistant reply.
pub struct ChatController {
    council: Council,
    messages: Vec<ChatMessage>,
}

impl ChatController {
    pub fn new(council: Council) -> Self {
        Self { council, messages: vec![ChatMessage::assistant(GREETING)] }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send `text` and return the assistant's reply. Blank input is ignored.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let history_len = self.messages.len();
        self.messages.push(ChatMessage::user(text));

        let reply = match self.council.chat(&self.messages[..history_len], text).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("chatbot error: {e}");
                FALLBACK.to_string()
            }
        };
        self.messages.push(ChatMessage::assistant(reply));
        self.messages.last()
    }

    pub fn assistant_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.sender == Sender::Assistant).count()
    }
}
