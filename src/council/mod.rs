//! The operations the application performs against the model: the debate
//! itself, the three follow-on tools, the scenario coach, image description
//! and the chatbot.

use crate::domain::{
    ChatMessage, CouncilResult, ImageAttachment, ImprovementSuggestion, ScenarioType,
    SimpleExplanation,
};
use crate::errors::{CouncilError, Result};
use crate::prompt;
use crate::provider::{invoke_structured, invoke_text, DynProvider};
use crate::schema;
use crate::wire::{ModelRequest, Part, Role, Turn};

#[derive(Clone)]
pub struct Council {
    provider: DynProvider,
    max_prompt_bytes: usize,
}

impl Council {
    pub fn new(provider: DynProvider, max_prompt_bytes: usize) -> Self {
        Self { provider, max_prompt_bytes }
    }

    #[tracing::instrument(
        skip_all,
        fields(scenario_type = %scenario_type, image = image_context.is_some())
    )]
    pub async fn run_debate(
        &self,
        scenario: &str,
        scenario_type: ScenarioType,
        image_context: Option<&str>,
    ) -> Result<CouncilResult> {
        tracing::info!("running council debate");
        let prompt = prompt::build_debate_prompt(scenario, scenario_type, image_context);
        let req = ModelRequest::prompt(prompt)
            .with_system(prompt::council_system_instruction())
            .with_schema(schema::council_result_schema());
        let result: CouncilResult = invoke_structured(self.provider.as_ref(), &req).await?;
        if result.options_and_recommendation.recommended().is_none() {
            tracing::warn!(
                recommended = %result.options_and_recommendation.recommended_option,
                "recommended option is not among the listed options"
            );
        }
        tracing::info!(personas = result.personas.len(), "council debate finished");
        Ok(result)
    }

    pub async fn coach_advice(&self, scenario: &str) -> Result<String> {
        tracing::info!("requesting scenario coach advice");
        let req = ModelRequest::prompt(prompt::build_coach_prompt(scenario));
        invoke_text(self.provider.as_ref(), &req).await
    }

    pub async fn describe_image(&self, image: &ImageAttachment) -> Result<String> {
        tracing::info!(
            mime = %image.mime_type,
            bytes = image.bytes.len(),
            "describing scenario image"
        );
        let req = ModelRequest::conversation(vec![Turn {
            role: Role::User,
            parts: vec![Part::image(image), Part::text(prompt::build_image_prompt())],
        }]);
        invoke_text(self.provider.as_ref(), &req).await
    }

    pub async fn improve_plan(&self, result: &CouncilResult) -> Result<ImprovementSuggestion> {
        tracing::info!("requesting plan improvements");
        let req = ModelRequest::prompt(self.capped(prompt::build_improve_prompt(result))?)
            .with_schema(schema::improvement_schema());
        invoke_structured(self.provider.as_ref(), &req).await
    }

    pub async fn explain_simply(&self, result: &CouncilResult) -> Result<SimpleExplanation> {
        tracing::info!("requesting plain-language explanation");
        let req = ModelRequest::prompt(self.capped(prompt::build_explain_prompt(result))?)
            .with_schema(schema::explanation_schema());
        invoke_structured(self.provider.as_ref(), &req).await
    }

    pub async fn generate_report(&self, result: &CouncilResult) -> Result<String> {
        tracing::info!("requesting report");
        let req = ModelRequest::prompt(self.capped(prompt::build_report_prompt(result))?);
        invoke_text(self.provider.as_ref(), &req).await
    }

    /// Ask the coach chatbot. `history` is everything said before `question`.
    pub async fn chat(&self, history: &[ChatMessage], question: &str) -> Result<String> {
        tracing::info!(turns = history.len(), "chatbot query");
        let mut contents: Vec<Turn> = history.iter().map(Turn::from_message).collect();
        contents.push(Turn::user(question));
        let req =
            ModelRequest::conversation(contents).with_system(prompt::coach_system_instruction());
        invoke_text(self.provider.as_ref(), &req).await
    }

    fn capped(&self, prompt: String) -> Result<String> {
        if prompt.len() > self.max_prompt_bytes {
            return Err(CouncilError::Validation(format!(
                "The assessment is too large to send ({} bytes, limit {}).",
                prompt.len(),
                self.max_prompt_bytes
            )));
        }
        Ok(prompt)
    }
}
