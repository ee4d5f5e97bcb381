//! Domain models for the relay

mod session;
mod upload;

pub use session::{ImageAnalysisRecord, Session, SessionError, StateTransition, WorkflowState};
pub use upload::UploadedFile;
