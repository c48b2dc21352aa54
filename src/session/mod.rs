//! The evaluation session: file slots, upload, log streaming and download.

mod controller;
mod download;
mod state;

pub use controller::{EvaluationSession, SessionEvent};
pub use state::{FileSlot, SelectedFile, SessionSnapshot, SessionStatus, PDF_MEDIA_TYPE};
