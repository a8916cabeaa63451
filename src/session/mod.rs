//! One council session: `Idle -> Loading -> {Success, Error}`, with
//! `Error -> Idle` on retry and `Success -> Idle` on a new session.
//!
//! State sits behind a mutex that is only held between awaits, so the
//! controller can be shared by reference while a call is in flight. Every
//! session has an epoch; a reply that comes back for an older epoch is
//! dropped.

use parking_lot::Mutex;
use std::collections::HashSet;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::council::Council;
use crate::domain::{CouncilResult, ImprovementSuggestion, ScenarioInput, SimpleExplanation};
use crate::errors::CouncilError;

pub const EMPTY_SCENARIO: &str = "Please describe your scenario before running the council.";
pub const LOGIN_REQUIRED: &str = "Please log in to access the Council.";
pub const NO_RESULT_YET: &str = "Run the council before using this tool.";
pub const COACH_UNAVAILABLE: &str = "Sorry, the coach is unavailable right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Improve,
    Explain,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Rejected(String),
    /// Not idle (a debate is in flight or a result is on screen).
    Ignored,
    Succeeded,
    Failed,
    /// The session was reset while the call was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Ready,
    Busy,
    Discarded,
}

enum Artifact {
    Improvement(ImprovementSuggestion),
    Explanation(SimpleExplanation),
    Report(String),
}

struct State {
    status: SessionStatus,
    epoch: u64,
    result: Option<CouncilResult>,
    error: Option<CouncilError>,
    validation_message: Option<String>,
    finish_overlay: bool,
    coach_loading: bool,
    tools_loading: HashSet<Tool>,
    improvement: Option<ImprovementSuggestion>,
    explanation: Option<SimpleExplanation>,
    report: Option<String>,
}

impl State {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            epoch: 0,
            result: None,
            error: None,
            validation_message: None,
            finish_overlay: false,
            coach_loading: false,
            tools_loading: HashSet::new(),
            improvement: None,
            explanation: None,
            report: None,
        }
    }

    fn clear_outputs(&mut self) {
        self.result = None;
        self.error = None;
        self.finish_overlay = false;
        self.tools_loading.clear();
        self.improvement = None;
        self.explanation = None;
        self.report = None;
    }
}

pub struct SessionController {
    id: Uuid,
    council: Council,
    auth: AuthSession,
    state: Mutex<State>,
}

impl SessionController {
    pub fn new(council: Council, auth: AuthSession) -> Self {
        Self { id: Uuid::new_v4(), council, auth, state: Mutex::new(State::new()) }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run the council on `input`. Only acts from `Idle`; one debate at a time.
    pub async fn submit(&self, input: ScenarioInput) -> SubmitOutcome {
        let epoch = {
            let mut st = self.state.lock();
            if st.status != SessionStatus::Idle {
                tracing::debug!(session = %self.id, status = ?st.status, "submit ignored");
                return SubmitOutcome::Ignored;
            }
            let rejection = if !self.auth.logged_in() {
                Some(LOGIN_REQUIRED)
            } else if input.is_blank() {
                Some(EMPTY_SCENARIO)
            } else {
                None
            };
            if let Some(msg) = rejection {
                st.validation_message = Some(msg.to_string());
                return SubmitOutcome::Rejected(msg.to_string());
            }
            st.validation_message = None;
            st.clear_outputs();
            st.status = SessionStatus::Loading;
            st.epoch
        };

        tracing::info!(session = %self.id, epoch, "session loading");
        let outcome = self.debate(&input).await;

        let mut st = self.state.lock();
        if st.epoch != epoch {
            tracing::info!(session = %self.id, epoch, "dropping reply for an abandoned session");
            return SubmitOutcome::Discarded;
        }
        match outcome {
            Ok(result) => {
                st.result = Some(result);
                st.status = SessionStatus::Success;
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                match &e {
                    CouncilError::MalformedResponse(detail) => {
                        tracing::error!(session = %self.id, "malformed council response: {detail}")
                    }
                    other => tracing::error!(session = %self.id, "council debate failed: {other}"),
                }
                st.error = Some(e);
                st.status = SessionStatus::Error;
                SubmitOutcome::Failed
            }
        }
    }

    async fn debate(&self, input: &ScenarioInput) -> Result<CouncilResult, CouncilError> {
        let image_context = match &input.image {
            Some(image) => Some(self.council.describe_image(image).await?),
            None => None,
        };
        self.council
            .run_debate(&input.text, input.scenario_type, image_context.as_deref())
            .await
    }

    /// `Error -> Idle`. Returns false from any other state.
    pub fn retry(&self) -> bool {
        let mut st = self.state.lock();
        if st.status != SessionStatus::Error {
            return false;
        }
        st.error = None;
        st.status = SessionStatus::Idle;
        true
    }

    /// Back to a clean `Idle`. Anything still in flight is dropped when it lands.
    pub fn start_new_session(&self) {
        let mut st = self.state.lock();
        st.clear_outputs();
        st.validation_message = None;
        st.status = SessionStatus::Idle;
        st.epoch += 1;
        tracing::info!(session = %self.id, epoch = st.epoch, "new session");
    }

    /// Show the finish overlay. UI flag only; the state does not change.
    pub fn finish(&self) -> bool {
        let mut st = self.state.lock();
        st.finish_overlay = st.status == SessionStatus::Success;
        st.finish_overlay
    }

    pub fn close_overlay(&self) {
        self.state.lock().finish_overlay = false;
    }

    /// Run a follow-on tool against the current result. Each tool has its own
    /// loading gate; a second call while one is running is `Busy`.
    pub async fn run_tool(&self, tool: Tool) -> Result<ToolOutcome, CouncilError> {
        let (epoch, result) = {
            let mut st = self.state.lock();
            let result = match (st.status, &st.result) {
                (SessionStatus::Success, Some(r)) => r.clone(),
                _ => return Err(CouncilError::Validation(NO_RESULT_YET.into())),
            };
            if !st.tools_loading.insert(tool) {
                return Ok(ToolOutcome::Busy);
            }
            (st.epoch, result)
        };

        let outcome = match tool {
            Tool::Improve => self.council.improve_plan(&result).await.map(Artifact::Improvement),
            Tool::Explain => self.council.explain_simply(&result).await.map(Artifact::Explanation),
            Tool::Report => self.council.generate_report(&result).await.map(Artifact::Report),
        };

        let mut st = self.state.lock();
        if st.epoch != epoch {
            return Ok(ToolOutcome::Discarded);
        }
        st.tools_loading.remove(&tool);
        match outcome {
            Ok(Artifact::Improvement(a)) => st.improvement = Some(a),
            Ok(Artifact::Explanation(a)) => st.explanation = Some(a),
            Ok(Artifact::Report(a)) => st.report = Some(a),
            Err(e) => {
                tracing::error!(session = %self.id, ?tool, "tool failed: {e}");
                return Err(e);
            }
        }
        Ok(ToolOutcome::Ready)
    }

    /// Coach advice for a draft. `None` for a blank draft or while a request
    /// is already running; failures become a fixed apology.
    pub async fn coach_advice(&self, draft: &str) -> Option<String> {
        if draft.trim().is_empty() {
            return None;
        }
        {
            let mut st = self.state.lock();
            if st.coach_loading {
                return None;
            }
            st.coach_loading = true;
        }
        let advice = match self.council.coach_advice(draft).await {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(session = %self.id, "coach advice failed: {e}");
                COACH_UNAVAILABLE.to_string()
            }
        };
        self.state.lock().coach_loading = false;
        Some(advice)
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    pub fn result(&self) -> Option<CouncilResult> {
        self.state.lock().result.clone()
    }

    pub fn error(&self) -> Option<CouncilError> {
        self.state.lock().error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.as_ref().map(CouncilError::user_message)
    }

    pub fn validation_message(&self) -> Option<String> {
        self.state.lock().validation_message.clone()
    }

    pub fn finish_overlay_visible(&self) -> bool {
        self.state.lock().finish_overlay
    }

    pub fn is_tool_loading(&self, tool: Tool) -> bool {
        self.state.lock().tools_loading.contains(&tool)
    }

    pub fn improvement(&self) -> Option<ImprovementSuggestion> {
        self.state.lock().improvement.clone()
    }

    pub fn explanation(&self) -> Option<SimpleExplanation> {
        self.state.lock().explanation.clone()
    }

    pub fn report(&self) -> Option<String> {
        self.state.lock().report.clone()
    }
}
