//! Draft session controller for technical-documentation panels: a typed
//! client for the draft service, the per-panel state machine, and the
//! content splicer used by refinement.

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod splice;
pub mod view;

pub use api::{DraftApi, HttpDraftApi};
pub use config::{load_settings, ApiSettings};
pub use error::{ContractViolation, DraftError, MountError};
pub use session::{Action, ActionReport, Capabilities, DraftSession, Session, SessionState};
pub use view::{project, DownloadLink, EnabledActions, SessionView};
