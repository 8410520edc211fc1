//! Pure projection of a session onto what a panel renders.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::DraftForm;

use crate::session::{Action, Session, SessionState};

pub const OUTPUT_PLACEHOLDER: &str = "Output will appear here…";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnabledActions {
    pub prefill: bool,
    pub generate: bool,
    pub refine: bool,
    pub promote: bool,
    pub download: bool,
}

impl EnabledActions {
    pub fn is_enabled(&self, action: Action) -> bool {
        match action {
            Action::Prefill => self.prefill,
            Action::Generate => self.generate,
            Action::Refine => self.refine,
            Action::Promote => self.promote,
            Action::Download => self.download,
        }
    }
}

/// Downloadable copy of the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub filename: String,
    pub xml: String,
}

impl DownloadLink {
    pub fn href(&self) -> String {
        format!(
            "data:text/xml;charset=utf-8;base64,{}",
            STANDARD.encode(self.xml.as_bytes())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub state: SessionState,
    pub enabled: EnabledActions,
    pub output_text: String,
    pub download: Option<DownloadLink>,
    pub last_error: Option<String>,
    pub form: DraftForm,
}

pub fn project(session: &Session) -> SessionView {
    let enabled = EnabledActions {
        prefill: session.check(Action::Prefill).is_ok(),
        generate: session.check(Action::Generate).is_ok(),
        refine: session.check(Action::Refine).is_ok(),
        promote: session.check(Action::Promote).is_ok(),
        download: session.check(Action::Download).is_ok(),
    };

    let download = match (&session.result, enabled.download) {
        (Some(result), true) => Some(DownloadLink {
            filename: result.filename.clone(),
            xml: result.xml.clone(),
        }),
        _ => None,
    };

    let output_text = if session.output.is_empty() {
        OUTPUT_PLACEHOLDER.to_string()
    } else {
        session.output.clone()
    };

    SessionView {
        state: session.state,
        enabled,
        output_text,
        download,
        last_error: session.last_error.clone(),
        form: session.form.clone(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
