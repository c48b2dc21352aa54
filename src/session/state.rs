//! Session state shared by the controller and whatever renders it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The only media type accepted in either file slot
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Where the session is in the upload / evaluate / download cycle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing uploaded yet
    #[default]
    Idle,
    /// Upload request in flight
    Uploading,
    /// Job accepted, log stream open
    Evaluating,
    /// Log stream finished
    Completed,
    /// Upload failed or the log stream was lost
    Failed,
}

impl SessionStatus {
    /// Status line shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Select the answer script and question paper.",
            SessionStatus::Uploading => "Uploading files...",
            SessionStatus::Evaluating => "Evaluation in progress...",
            SessionStatus::Completed => "Evaluation completed.",
            SessionStatus::Failed => "Evaluation failed.",
        }
    }

    /// Upload or evaluation in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Uploading | SessionStatus::Evaluating)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Uploading => write!(f, "uploading"),
            SessionStatus::Evaluating => write!(f, "evaluating"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The two files an evaluation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSlot {
    AnswerScript,
    QuestionPaper,
}

impl FileSlot {
    /// Multipart field name used by the upload endpoint
    pub fn field_name(&self) -> &'static str {
        match self {
            FileSlot::AnswerScript => "answer_script",
            FileSlot::QuestionPaper => "question_paper",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSlot::AnswerScript => write!(f, "answer script"),
            FileSlot::QuestionPaper => write!(f, "question paper"),
        }
    }
}

/// A locally chosen file and the media type declared for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    path: PathBuf,
    media_type: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_type: media_type.into(),
        }
    }

    /// Declare the media type from the file extension, the way a file
    /// picker does. The content is not inspected.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Self { path, media_type }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string())
    }
}

/// Both file slots. Only validated PDFs are ever stored here.
#[derive(Debug, Clone, Default)]
pub struct FileSlots {
    answer_script: Option<SelectedFile>,
    question_paper: Option<SelectedFile>,
}

impl FileSlots {
    pub fn get(&self, slot: FileSlot) -> Option<&SelectedFile> {
        match slot {
            FileSlot::AnswerScript => self.answer_script.as_ref(),
            FileSlot::QuestionPaper => self.question_paper.as_ref(),
        }
    }

    pub(crate) fn set(&mut self, slot: FileSlot, file: SelectedFile) {
        match slot {
            FileSlot::AnswerScript => self.answer_script = Some(file),
            FileSlot::QuestionPaper => self.question_paper = Some(file),
        }
    }

    pub fn clear(&mut self) {
        self.answer_script = None;
        self.question_paper = None;
    }

    /// Both slots, if both are filled
    pub fn both(&self) -> Option<(&SelectedFile, &SelectedFile)> {
        Some((self.answer_script.as_ref()?, self.question_paper.as_ref()?))
    }
}

/// Read-only view of a session, for rendering or `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub status_message: String,
    pub evaluation_id: Option<String>,
    pub answer_script: Option<String>,
    pub question_paper: Option<String>,
    pub logs: Vec<String>,
    pub error: Option<String>,
    pub upload_enabled: bool,
    pub download_enabled: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn duration_seconds(&self) -> Option<i64> {
        let start = self.started_at?;
        let end = self.finished_at.unwrap_or_else(Utc::now);
        Some((end - start).num_seconds())
    }
}
