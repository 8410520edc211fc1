//! Draft session controller: one live session per mounted panel.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use shared::domain::{DocumentKey, DraftForm, DraftRequest, DraftResult, PromotionOutcome};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    api::DraftApi,
    error::{ContractViolation, DraftError, MountError},
    splice::{refinement_unit, splice_content},
    view::{project, SessionView},
};

const REFINEMENT_TRAILER: &str = "--- Refinement Applied ---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Prefilling,
    Ready,
    Generating,
    Generated,
    Refining,
    Refined,
    Promoting,
    Promoted,
    Failed,
}

impl SessionState {
    pub fn in_flight(self) -> Option<Action> {
        match self {
            Self::Prefilling => Some(Action::Prefill),
            Self::Generating => Some(Action::Generate),
            Self::Refining => Some(Action::Refine),
            Self::Promoting => Some(Action::Promote),
            _ => None,
        }
    }

    pub fn is_busy(self) -> bool {
        self.in_flight().is_some()
    }

    /// States that always hold a draft. Refining and promoting operate on
    /// the existing one.
    pub fn holds_result(self) -> bool {
        matches!(
            self,
            Self::Generated | Self::Refining | Self::Refined | Self::Promoting | Self::Promoted
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Prefilling => "prefilling",
            Self::Ready => "ready",
            Self::Generating => "generating",
            Self::Generated => "generated",
            Self::Refining => "refining",
            Self::Refined => "refined",
            Self::Promoting => "promoting",
            Self::Promoted => "promoted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Prefill,
    Generate,
    Refine,
    Promote,
    Download,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prefill => "prefill",
            Self::Generate => "generate",
            Self::Refine => "refine",
            Self::Promote => "promote",
            Self::Download => "download",
        };
        f.write_str(name)
    }
}

/// Which optional actions a panel exposes. Generate, promote and download are
/// always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub prefill: bool,
    pub refine: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            prefill: true,
            refine: true,
        }
    }

    pub fn minimal() -> Self {
        Self {
            prefill: false,
            refine: false,
        }
    }

    fn allows(&self, action: Action) -> bool {
        match action {
            Action::Prefill => self.prefill,
            Action::Refine => self.refine,
            Action::Generate | Action::Promote | Action::Download => true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What happened to an action the session accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReport {
    Completed,
    /// The remote call failed; the message is also recorded as `last_error`.
    Failed(String),
    /// The response arrived after the session was closed and was discarded.
    Superseded,
}

/// Observable session data. The view binding only ever sees clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub document_key: DocumentKey,
    pub capabilities: Capabilities,
    pub form: DraftForm,
    pub result: Option<DraftResult>,
    pub state: SessionState,
    pub last_error: Option<String>,
    pub output: String,
    /// Set once the current draft has been promoted; cleared by generate.
    pub promotion: Option<PromotionOutcome>,
    pub closed: bool,
}

impl Session {
    pub(crate) fn new(document_key: DocumentKey, capabilities: Capabilities) -> Self {
        Self {
            id: SessionId::new(),
            document_key,
            capabilities,
            form: DraftForm::default(),
            result: None,
            state: SessionState::Idle,
            last_error: None,
            output: String::new(),
            promotion: None,
            closed: false,
        }
    }

    /// Whether `action` may start right now.
    pub fn check(&self, action: Action) -> Result<(), ContractViolation> {
        if self.closed {
            return Err(ContractViolation::Closed);
        }
        if let Some(in_flight) = self.state.in_flight() {
            return Err(ContractViolation::Busy { in_flight });
        }
        if !self.capabilities.allows(action) {
            return Err(ContractViolation::CapabilityDisabled { action });
        }

        let permitted = match action {
            Action::Prefill | Action::Generate => true,
            Action::Refine | Action::Download => self.result.is_some(),
            Action::Promote => self.result.is_some() && self.promotion.is_none(),
        };
        if permitted {
            Ok(())
        } else {
            Err(ContractViolation::NotAllowed {
                action,
                state: self.state,
            })
        }
    }

    fn push_trailer(&mut self, trailer: &str) {
        if !self.output.is_empty() {
            self.output.push_str("\n\n");
        }
        self.output.push_str(trailer);
    }
}

struct Inner {
    session: Session,
    /// Settled state to return to if the in-flight action fails.
    resume: SessionState,
    /// Identifies the accepted in-flight request.
    ticket: u64,
}

impl Inner {
    fn begin(&mut self, busy: SessionState) -> u64 {
        self.resume = self.session.state;
        self.session.state = busy;
        self.ticket += 1;
        self.ticket
    }

    fn owns(&self, ticket: u64) -> bool {
        !self.session.closed && self.ticket == ticket && self.session.state.is_busy()
    }

    fn succeed(&mut self, state: SessionState) {
        self.session.state = state;
        self.session.last_error = None;
    }

    fn fail(&mut self, state: SessionState, message: String, trailer: String) {
        self.session.state = state;
        self.session.last_error = Some(message);
        self.session.push_trailer(&trailer);
    }
}

pub struct DraftSession {
    api: Arc<dyn DraftApi>,
    deadline: Option<Duration>,
    inner: Mutex<Inner>,
}

impl DraftSession {
    /// Mounts a panel session for the document whose key `document_key`
    /// yields. Fails fast when the key is absent or blank.
    pub fn mount(
        api: Arc<dyn DraftApi>,
        capabilities: Capabilities,
        document_key: impl FnOnce() -> Option<String>,
    ) -> Result<Self, MountError> {
        let raw = document_key();
        let document_key = DocumentKey::from_optional(raw.as_deref())?;
        let session = Session::new(document_key, capabilities);
        info!(
            session_id = %session.id,
            dm_key = %session.document_key,
            prefill = capabilities.prefill,
            refine = capabilities.refine,
            "draft session mounted"
        );
        Ok(Self {
            api,
            deadline: None,
            inner: Mutex::new(Inner {
                session,
                resume: SessionState::Idle,
                ticket: 0,
            }),
        })
    }

    /// Bounds every remote call; an expired call is recorded like any other
    /// remote failure.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn view(&self) -> SessionView {
        project(&self.inner.lock().await.session)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.session.state
    }

    pub async fn update_form(&self, form: DraftForm) -> Result<(), ContractViolation> {
        let mut inner = self.inner.lock().await;
        if inner.session.closed {
            return Err(ContractViolation::Closed);
        }
        inner.session.form = form;
        Ok(())
    }

    /// Panel teardown. Later actions are rejected and in-flight responses
    /// are discarded.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.session.closed {
            return;
        }
        inner.session.closed = true;
        inner.ticket += 1;
        info!(session_id = %inner.session.id, state = %inner.session.state, "draft session closed");
    }

    pub async fn prefill(&self) -> Result<ActionReport, ContractViolation> {
        let (ticket, key) = {
            let mut inner = self.inner.lock().await;
            inner.session.check(Action::Prefill)?;
            let key = inner.session.document_key.clone();
            (inner.begin(SessionState::Prefilling), key)
        };
        info!(dm_key = %key, action = %Action::Prefill, "draft action accepted");

        let outcome = self.call(self.api.prefill(&key)).await;

        let mut inner = self.inner.lock().await;
        if !inner.owns(ticket) {
            return Ok(superseded(&inner, Action::Prefill));
        }
        let resume = inner.resume;
        match outcome {
            Ok(suggestion) => {
                inner.session.form.apply_suggestion(suggestion);
                let next = if inner.session.result.is_some() {
                    resume
                } else {
                    SessionState::Ready
                };
                inner.succeed(next);
                Ok(ActionReport::Completed)
            }
            Err(err) => Ok(record_failure(
                &mut inner,
                Action::Prefill,
                resume,
                err,
                "Prefill error",
            )),
        }
    }

    pub async fn generate(&self) -> Result<ActionReport, ContractViolation> {
        let (ticket, request) = {
            let mut inner = self.inner.lock().await;
            inner.session.check(Action::Generate)?;
            let request = DraftRequest::new(inner.session.document_key.clone(), &inner.session.form);
            (inner.begin(SessionState::Generating), request)
        };
        info!(dm_key = %request.document_key, action = %Action::Generate, "draft action accepted");

        let outcome = self.call(self.api.generate(&request)).await;

        let mut inner = self.inner.lock().await;
        if !inner.owns(ticket) {
            return Ok(superseded(&inner, Action::Generate));
        }
        match outcome {
            Ok(result) => {
                info!(
                    session_id = %inner.session.id,
                    filename = %result.filename,
                    draft_path = %result.draft_path,
                    "draft generated"
                );
                inner.session.output = result.xml.clone();
                inner.session.result = Some(result);
                inner.session.promotion = None;
                inner.succeed(SessionState::Generated);
                Ok(ActionReport::Completed)
            }
            Err(err) => {
                let next = if inner.session.result.is_some() {
                    inner.resume
                } else {
                    SessionState::Failed
                };
                Ok(record_failure(&mut inner, Action::Generate, next, err, "Error"))
            }
        }
    }

    /// Sends the content region (or the whole document when it has none) for
    /// refinement and splices the reply back into the same region.
    pub async fn refine(&self, feedback: &str) -> Result<ActionReport, ContractViolation> {
        let (ticket, key, unit) = {
            let mut inner = self.inner.lock().await;
            inner.session.check(Action::Refine)?;
            let unit = match &inner.session.result {
                Some(result) => refinement_unit(&result.xml).to_string(),
                None => {
                    return Err(ContractViolation::NotAllowed {
                        action: Action::Refine,
                        state: inner.session.state,
                    })
                }
            };
            let key = inner.session.document_key.clone();
            (inner.begin(SessionState::Refining), key, unit)
        };
        info!(
            dm_key = %key,
            action = %Action::Refine,
            unit_len = unit.len(),
            "draft action accepted"
        );

        let outcome = self.call(self.api.refine(&key, &unit, feedback)).await;

        let mut inner = self.inner.lock().await;
        if !inner.owns(ticket) {
            return Ok(superseded(&inner, Action::Refine));
        }
        let resume = inner.resume;
        match outcome {
            Ok(refinement) => {
                let Some(result) = inner.session.result.as_mut() else {
                    inner.session.state = resume;
                    return Ok(superseded(&inner, Action::Refine));
                };
                result.xml = splice_content(&result.xml, &refinement.xml);
                let output = format!(
                    "{}\n\n{REFINEMENT_TRAILER}\n{}",
                    result.xml, refinement.improvements
                );
                inner.session.output = output;
                inner.succeed(SessionState::Refined);
                Ok(ActionReport::Completed)
            }
            Err(err) => Ok(record_failure(
                &mut inner,
                Action::Refine,
                resume,
                err,
                "Refine failed",
            )),
        }
    }

    pub async fn promote(&self) -> Result<ActionReport, ContractViolation> {
        let (ticket, key, draft_path) = {
            let mut inner = self.inner.lock().await;
            inner.session.check(Action::Promote)?;
            let draft_path = match &inner.session.result {
                Some(result) => result.draft_path.clone(),
                None => {
                    return Err(ContractViolation::NotAllowed {
                        action: Action::Promote,
                        state: inner.session.state,
                    })
                }
            };
            let key = inner.session.document_key.clone();
            (inner.begin(SessionState::Promoting), key, draft_path)
        };
        info!(
            dm_key = %key,
            action = %Action::Promote,
            draft_path = %draft_path,
            "draft action accepted"
        );

        let outcome = self.call(self.api.promote(&key, &draft_path)).await;

        let mut inner = self.inner.lock().await;
        if !inner.owns(ticket) {
            return Ok(superseded(&inner, Action::Promote));
        }
        let resume = inner.resume;
        match outcome {
            Ok(promotion) => {
                let shown = promotion
                    .path
                    .clone()
                    .unwrap_or_else(|| "(path not reported)".to_string());
                info!(session_id = %inner.session.id, path = %shown, "draft promoted");
                inner.session.push_trailer(&format!("Promoted → {shown}"));
                inner.session.promotion = Some(promotion);
                inner.succeed(SessionState::Promoted);
                Ok(ActionReport::Completed)
            }
            Err(err) => Ok(record_failure(
                &mut inner,
                Action::Promote,
                resume,
                err,
                "Promote failed",
            )),
        }
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, DraftError>>,
    ) -> Result<T, DraftError> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, request)
                .await
                .map_err(|_| DraftError::DeadlineExceeded)?,
            None => request.await,
        }
    }
}

fn superseded(inner: &Inner, action: Action) -> ActionReport {
    warn!(
        session_id = %inner.session.id,
        action = %action,
        "discarding response for a request the session no longer owns"
    );
    ActionReport::Superseded
}

fn record_failure(
    inner: &mut Inner,
    action: Action,
    next: SessionState,
    err: DraftError,
    label: &str,
) -> ActionReport {
    let message = err.to_string();
    warn!(
        session_id = %inner.session.id,
        action = %action,
        error = %message,
        next_state = %next,
        "draft action failed"
    );
    inner.fail(next, message.clone(), format!("{label}: {message}"));
    ActionReport::Failed(message)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
