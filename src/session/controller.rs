use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::download;
use super::state::{FileSlot, FileSlots, SelectedFile, SessionSnapshot, SessionStatus};
use crate::cli::ClientConfig;
use crate::client::{LogSubscription, PdfPart, ServiceClient, StreamSignal};
use crate::error::{SessionError, SessionResult};

/// What a single pull from the log stream did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A line was appended to the log
    Line(String),
    /// A blank payload was dropped
    Skipped,
    /// The evaluation finished
    Completed,
    /// The stream was lost for good
    Failed(String),
}

/// Drives one evaluation from file selection to download.
///
/// All mutation goes through `&mut self`, so there is a single writer and at
/// most one log subscription alive at any time.
pub struct EvaluationSession {
    id: Uuid,
    client: ServiceClient,
    completion_line: Option<String>,
    files: FileSlots,
    status: SessionStatus,
    evaluation_id: Option<String>,
    logs: Vec<String>,
    error: Option<String>,
    subscription: Option<LogSubscription>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl EvaluationSession {
    pub fn new(config: &ClientConfig) -> SessionResult<Self> {
        let client = ServiceClient::new(config)?;
        let id = Uuid::new_v4();
        debug!(session_id = %id, base_url = %client.base_url(), "created evaluation session");

        Ok(Self {
            id,
            client,
            completion_line: config.completion_line.clone(),
            files: FileSlots::default(),
            status: SessionStatus::Idle,
            evaluation_id: None,
            logs: Vec::new(),
            error: None,
            subscription: None,
            started_at: None,
            finished_at: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn evaluation_id(&self) -> Option<&str> {
        self.evaluation_id.as_deref()
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn file(&self, slot: FileSlot) -> Option<&SelectedFile> {
        self.files.get(slot)
    }

    /// Job id of the live log subscription, if any
    pub fn subscribed_job(&self) -> Option<&str> {
        self.subscription
            .as_ref()
            .filter(|s| !s.is_closed())
            .map(|s| s.job_id())
    }

    /// Whether the upload control should be enabled
    pub fn can_upload(&self) -> bool {
        !self.status.is_busy() && self.files.both().is_some()
    }

    /// Whether the download control should be enabled
    pub fn can_download(&self) -> bool {
        self.evaluation_id.is_some() && self.status != SessionStatus::Evaluating
    }

    /// Put a file into a slot. Anything that is not declared as a PDF is
    /// rejected and the previous selection stays in place.
    pub fn select_file(&mut self, slot: FileSlot, file: SelectedFile) -> SessionResult<()> {
        if !file.is_pdf() {
            warn!(
                slot = %slot,
                path = ?file.path(),
                media_type = file.media_type(),
                "rejected non-PDF file"
            );
            let err = SessionError::InvalidFileType;
            self.error = Some(err.to_string());
            return Err(err);
        }

        debug!(slot = %slot, path = ?file.path(), "selected file");
        self.files.set(slot, file);
        self.error = None;
        Ok(())
    }

    /// Clear both slots and return to `Idle`, dropping any job.
    pub fn reset(&mut self) {
        self.close_subscription();
        self.files.clear();
        self.status = SessionStatus::Idle;
        self.evaluation_id = None;
        self.logs.clear();
        self.error = None;
        self.started_at = None;
        self.finished_at = None;
    }

    /// Upload both PDFs and open the log stream for the new job.
    ///
    /// Any previous job is dropped first: its subscription is closed before
    /// the request goes out, so no line from it can reach the new log.
    pub async fn start_upload(&mut self) -> SessionResult<String> {
        let (answer_script, question_paper) = match self.files.both() {
            Some((answer, question)) => (answer.clone(), question.clone()),
            None => {
                let err = SessionError::MissingFiles;
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        if let Some(previous) = self.evaluation_id.take() {
            info!(evaluation_id = %previous, "abandoning previous evaluation");
        }
        self.close_subscription();
        self.logs.clear();
        self.error = None;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.status = SessionStatus::Uploading;

        let span = info_span!("upload", session_id = %self.id);
        let uploaded = self
            .upload(&answer_script, &question_paper)
            .instrument(span)
            .await;

        match uploaded {
            Ok(evaluation_id) => {
                self.open_log_stream(&evaluation_id)?;
                Ok(evaluation_id)
            }
            Err(err) => {
                error!(session_id = %self.id, error = %err, "upload failed");
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn upload(
        &self,
        answer_script: &SelectedFile,
        question_paper: &SelectedFile,
    ) -> SessionResult<String> {
        let answer_part = read_part(answer_script).await?;
        let question_part = read_part(question_paper).await?;

        let response = self.client.upload_pdfs(answer_part, question_part).await?;
        info!(evaluation_id = %response.evaluation_id, "upload accepted");

        Ok(response.evaluation_id)
    }

    /// Subscribe to the log stream of `evaluation_id` and enter `Evaluating`.
    pub fn open_log_stream(&mut self, evaluation_id: &str) -> SessionResult<()> {
        self.close_subscription();

        let subscription = match self.client.log_stream(evaluation_id) {
            Ok(subscription) => subscription,
            Err(err) => {
                let err = SessionError::from(err);
                self.fail(&err);
                return Err(err);
            }
        };

        self.evaluation_id = Some(evaluation_id.to_string());
        self.subscription = Some(subscription);
        self.status = SessionStatus::Evaluating;
        self.error = None;
        info!(session_id = %self.id, evaluation_id, "evaluation in progress");

        Ok(())
    }

    /// Attach to a job that finished elsewhere, so its result can be downloaded.
    pub fn attach_job(&mut self, evaluation_id: &str) {
        self.close_subscription();
        self.logs.clear();
        self.error = None;
        self.evaluation_id = Some(evaluation_id.to_string());
        self.status = SessionStatus::Completed;
        debug!(session_id = %self.id, evaluation_id, "attached to finished evaluation");
    }

    /// Attach to a running job and follow its log stream.
    pub fn follow_job(&mut self, evaluation_id: &str) -> SessionResult<()> {
        self.logs.clear();
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.open_log_stream(evaluation_id)
    }

    /// Pull one signal from the log stream and apply it.
    ///
    /// Returns `None` when there is no open subscription.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let subscription = self.subscription.as_mut()?;
        let signal = subscription.next_signal().await?;
        Some(self.apply_signal(signal))
    }

    /// Drive the log stream until the session leaves `Evaluating`.
    pub async fn follow_logs<F>(&mut self, mut on_line: F) -> SessionStatus
    where
        F: FnMut(&str),
    {
        let span = info_span!(
            "logs",
            session_id = %self.id,
            evaluation_id = self.evaluation_id.as_deref().unwrap_or_default()
        );

        async {
            while let Some(event) = self.next_event().await {
                if let SessionEvent::Line(line) = &event {
                    on_line(line);
                }
            }
        }
        .instrument(span)
        .await;

        self.status
    }

    fn apply_signal(&mut self, signal: StreamSignal) -> SessionEvent {
        match signal {
            StreamSignal::Line(data) => {
                if data.trim().is_empty() {
                    return SessionEvent::Skipped;
                }

                let is_completion_line = self
                    .completion_line
                    .as_deref()
                    .is_some_and(|marker| data.trim() == marker);

                self.logs.push(data.clone());

                if is_completion_line {
                    info!(session_id = %self.id, "service reported completion");
                    self.close_subscription();
                    self.complete();
                    return SessionEvent::Completed;
                }

                SessionEvent::Line(data)
            }
            StreamSignal::Ended { permanent } => {
                self.close_subscription();

                if permanent {
                    let err = SessionError::StreamLost;
                    error!(session_id = %self.id, lines = self.logs.len(), "log stream lost");
                    self.fail(&err);
                    SessionEvent::Failed(err.to_string())
                } else {
                    self.complete();
                    SessionEvent::Completed
                }
            }
        }
    }

    /// Download the graded PDF of the current job into `output_dir`.
    ///
    /// The session status is left alone; a failure only sets the error.
    pub async fn download_result(&mut self, output_dir: &Path) -> SessionResult<PathBuf> {
        let evaluation_id = self
            .evaluation_id
            .clone()
            .ok_or(SessionError::NoActiveJob)?;

        if self.status == SessionStatus::Evaluating {
            return Err(SessionError::EvaluationInProgress);
        }

        let result = async {
            let content = self.client.fetch_evaluated_pdf(&evaluation_id).await?;
            let path = download::save_result(output_dir, &evaluation_id, &content)?;
            Ok::<_, SessionError>(path)
        }
        .instrument(info_span!("download", session_id = %self.id, evaluation_id = %evaluation_id))
        .await;

        match result {
            Ok(path) => {
                info!(path = ?path, "saved evaluated script");
                self.error = None;
                Ok(path)
            }
            Err(err) => {
                error!(evaluation_id = %evaluation_id, error = %err, "download failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            status_message: self.status.message().to_string(),
            evaluation_id: self.evaluation_id.clone(),
            answer_script: self.files.get(FileSlot::AnswerScript).map(|f| f.file_name()),
            question_paper: self.files.get(FileSlot::QuestionPaper).map(|f| f.file_name()),
            logs: self.logs.clone(),
            error: self.error.clone(),
            upload_enabled: self.can_upload(),
            download_enabled: self.can_download(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    fn close_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.finished_at = Some(Utc::now());
        info!(session_id = %self.id, lines = self.logs.len(), "evaluation completed");
    }

    fn fail(&mut self, err: &SessionError) {
        self.status = SessionStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(err.to_string());
    }
}

async fn read_part(file: &SelectedFile) -> SessionResult<PdfPart> {
    let content = tokio::fs::read(file.path()).await?;
    Ok(PdfPart {
        file_name: file.file_name(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SERVICE_UNAVAILABLE_MESSAGE;
    use crate::session::PDF_MEDIA_TYPE;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_session(mock_server: &MockServer) -> EvaluationSession {
        let config = ClientConfig::default().with_base_url(mock_server.uri());
        EvaluationSession::new(&config).expect("failed to create session")
    }

    fn write_pdf(dir: &Path, name: &str) -> SelectedFile {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
        SelectedFile::from_path(path)
    }

    fn select_both(session: &mut EvaluationSession, dir: &Path) {
        session
            .select_file(FileSlot::AnswerScript, write_pdf(dir, "answers.pdf"))
            .unwrap();
        session
            .select_file(FileSlot::QuestionPaper, write_pdf(dir, "questions.pdf"))
            .unwrap();
    }

    async fn mount_upload(mock_server: &MockServer, evaluation_id: &str) {
        Mock::given(method("POST"))
            .and(path("/upload-pdfs/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "Files uploaded successfully",
                "evaluation_id": evaluation_id
            })))
            .mount(mock_server)
            .await;
    }

    async fn mount_logs(mock_server: &MockServer, evaluation_id: &str, lines: &[&str]) {
        let body: String = lines.iter().map(|l| format!("data: {}\n\n", l)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/evaluation-logs/{}", evaluation_id)))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);

        let docx = SelectedFile::new(dir.path().join("answers.docx"), "application/msword");
        let result = session.select_file(FileSlot::AnswerScript, docx);

        assert!(matches!(result, Err(SessionError::InvalidFileType)));
        assert!(session.file(FileSlot::AnswerScript).is_none());
        assert_eq!(
            session.error(),
            Some("Invalid file type. Please select a PDF file.")
        );
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_rejected_file_keeps_previous_selection() {
        let mock_server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);

        let pdf = write_pdf(dir.path(), "answers.pdf");
        session.select_file(FileSlot::AnswerScript, pdf.clone()).unwrap();

        let png = SelectedFile::new(dir.path().join("scan.png"), "image/png");
        assert!(session.select_file(FileSlot::AnswerScript, png).is_err());
        assert_eq!(session.file(FileSlot::AnswerScript), Some(&pdf));

        // A valid selection clears the validation error again.
        session
            .select_file(FileSlot::AnswerScript, SelectedFile::new("b.pdf", PDF_MEDIA_TYPE))
            .unwrap();
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_upload_requires_both_files() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        session
            .select_file(FileSlot::AnswerScript, write_pdf(dir.path(), "answers.pdf"))
            .unwrap();

        assert!(!session.can_upload());
        let result = session.start_upload().await;

        assert!(matches!(result, Err(SessionError::MissingFiles)));
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn test_upload_opens_log_stream() {
        let mock_server = MockServer::start().await;
        mount_upload(&mock_server, "abc123").await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());

        let evaluation_id = session.start_upload().await.unwrap();

        assert_eq!(evaluation_id, "abc123");
        assert_eq!(session.status(), SessionStatus::Evaluating);
        assert_eq!(session.status().message(), "Evaluation in progress...");
        assert!(session.logs().is_empty());
        assert_eq!(session.subscribed_job(), Some("abc123"));
        assert!(!session.can_upload());
        assert!(!session.can_download());
    }

    #[tokio::test]
    async fn test_upload_502_is_service_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-pdfs/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());

        assert!(session.start_upload().await.is_err());

        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.error(), Some(SERVICE_UNAVAILABLE_MESSAGE));
        assert!(session.subscribed_job().is_none());
        assert!(session.evaluation_id().is_none());
        // Failed is stable and the user can retry.
        assert!(session.can_upload());
    }

    #[tokio::test]
    async fn test_upload_generic_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-pdfs/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());

        assert!(session.start_upload().await.is_err());
        assert_eq!(session.error(), Some("Upload failed (status 500)"));
    }

    #[tokio::test]
    async fn test_upload_network_failure() {
        // Nothing listens on the discard port.
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9");
        let mut session = EvaluationSession::new(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        select_both(&mut session, dir.path());

        let result = session.start_upload().await;

        assert!(matches!(
            result,
            Err(SessionError::Service(crate::error::ServiceError::Network { .. }))
        ));
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_full_evaluation_flow() {
        let mock_server = MockServer::start().await;
        mount_upload(&mock_server, "abc123").await;
        mount_logs(
            &mock_server,
            "abc123",
            &["Extracting answer script", " ", "Grading question 1", "Grading question 2"],
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());
        session.start_upload().await.unwrap();

        let mut printed = Vec::new();
        let status = session.follow_logs(|line| printed.push(line.to_string())).await;

        assert_eq!(status, SessionStatus::Completed);
        assert_eq!(
            session.logs(),
            ["Extracting answer script", "Grading question 1", "Grading question 2"]
        );
        assert_eq!(printed, session.logs());
        assert!(session.subscribed_job().is_none());
        assert!(session.can_download());
        assert!(session.error().is_none());
        assert!(session.snapshot().finished_at.is_some());
    }

    #[tokio::test]
    async fn test_rejected_stream_fails_and_keeps_logs() {
        let mock_server = MockServer::start().await;
        mount_upload(&mock_server, "abc123").await;
        Mock::given(method("GET"))
            .and(path("/evaluation-logs/abc123"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());
        session.start_upload().await.unwrap();
        session.logs.push("Extracting answer script".to_string());

        let event = session.next_event().await;

        assert_eq!(
            event,
            Some(SessionEvent::Failed(
                "Lost connection to the evaluation log stream.".to_string()
            ))
        );
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.logs(), ["Extracting answer script"]);
        assert_eq!(session.evaluation_id(), Some("abc123"));
        // The stream is reported once; afterwards there is nothing to pull.
        assert_eq!(session.next_event().await, None);
    }

    #[tokio::test]
    async fn test_blank_payloads_are_dropped() {
        let mock_server = MockServer::start().await;
        let mut session = create_session(&mock_server);
        session.open_log_stream("abc123").unwrap();

        for payload in ["", "  ", "line1", "\n", "line2"] {
            session.apply_signal(StreamSignal::Line(payload.to_string()));
        }

        assert_eq!(session.logs(), ["line1", "line2"]);
        assert_eq!(session.status(), SessionStatus::Evaluating);
    }

    #[tokio::test]
    async fn test_completion_line_finishes_evaluation() {
        let mock_server = MockServer::start().await;
        let config = ClientConfig {
            completion_line: Some("Evaluation completed".to_string()),
            ..ClientConfig::default().with_base_url(mock_server.uri())
        };
        let mut session = EvaluationSession::new(&config).unwrap();
        session.open_log_stream("abc123").unwrap();

        session.apply_signal(StreamSignal::Line("Grading question 1".to_string()));
        let event = session.apply_signal(StreamSignal::Line("Evaluation completed".to_string()));

        assert_eq!(event, SessionEvent::Completed);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.subscribed_job().is_none());
        assert_eq!(session.logs().len(), 2);
    }

    #[tokio::test]
    async fn test_second_upload_replaces_first_subscription() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-pdfs/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"evaluation_id": "abc123"})),
            )
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        mount_upload(&mock_server, "def456").await;
        mount_logs(&mock_server, "abc123", &["old job line"]).await;
        mount_logs(&mock_server, "def456", &["new job line"]).await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        select_both(&mut session, dir.path());

        session.start_upload().await.unwrap();
        assert_eq!(session.subscribed_job(), Some("abc123"));

        let second = session.start_upload().await.unwrap();
        assert_eq!(second, "def456");
        assert_eq!(session.subscribed_job(), Some("def456"));
        assert!(session.logs().is_empty());

        session.follow_logs(|_| {}).await;
        assert_eq!(session.logs(), ["new job line"]);
        assert_eq!(session.evaluation_id(), Some("def456"));
    }

    #[tokio::test]
    async fn test_download_without_job_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);

        assert!(!session.can_download());
        let result = session.download_result(dir.path()).await;
        assert!(matches!(result, Err(SessionError::NoActiveJob)));
    }

    #[tokio::test]
    async fn test_download_while_evaluating_is_refused() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-evaluated-pdf/abc123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        session.open_log_stream("abc123").unwrap();

        let result = session.download_result(dir.path()).await;
        assert!(matches!(result, Err(SessionError::EvaluationInProgress)));
    }

    #[tokio::test]
    async fn test_download_saves_named_pdf() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-evaluated-pdf/xyz"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"%PDF-graded".to_vec(), "application/pdf"),
            )
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        session.attach_job("xyz");

        let path = session.download_result(dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("evaluated_script_xyz.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-graded");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_download_502_keeps_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-evaluated-pdf/xyz"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        session.attach_job("xyz");

        assert!(session.download_result(dir.path()).await.is_err());

        assert_eq!(session.error(), Some(SERVICE_UNAVAILABLE_MESSAGE));
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_generic_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-evaluated-pdf/xyz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut session = create_session(&mock_server);
        session.attach_job("xyz");

        let err = session.download_result(dir.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to download (status 404)");
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mock_server = MockServer::start().await;
        let mut session = create_session(&mock_server);
        session.open_log_stream("abc123").unwrap();

        session.reset();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.evaluation_id.is_none());
        assert!(snapshot.answer_script.is_none());
        assert!(session.subscribed_job().is_none());
    }
}
