//! Client for the remote evaluation service.
//!
//! Three endpoints share one `reqwest::Client`, so the bearer token, user
//! agent and cookie jar travel with every request, the log stream included.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use reqwest_eventsource::RequestBuilderExt;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::{ClientConfig, CredentialsMode};
use crate::error::{Operation, ServiceError, ServiceResult};
use crate::session::{FileSlot, PDF_MEDIA_TYPE};

mod http;
mod stream;

pub use stream::{LogSubscription, StreamSignal};

const USER_AGENT_VALUE: &str = concat!("paper-eval/", env!("CARGO_PKG_VERSION"));

const UPLOAD_ROUTE: &str = "upload-pdfs";
const LOGS_ROUTE: &str = "evaluation-logs";
const RESULT_ROUTE: &str = "get-evaluated-pdf";

/// Body of a successful upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub evaluation_id: String,
}

/// One PDF ready to go into the upload form
#[derive(Debug, Clone)]
pub struct PdfPart {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl PdfPart {
    fn into_part(self) -> ServiceResult<Part> {
        Ok(Part::bytes(self.content)
            .file_name(self.file_name)
            .mime_str(PDF_MEDIA_TYPE)?)
    }
}

/// HTTP client for the evaluation service
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ServiceClient {
    pub fn new(config: &ClientConfig) -> ServiceResult<Self> {
        let base_url = Url::parse(config.base()).map_err(|e| ServiceError::Config {
            message: format!("invalid base url {:?}: {}", config.base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Config {
                message: format!("base url {:?} cannot have paths appended", config.base_url),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ServiceError::Config {
                    message: "auth token contains invalid header characters".to_string(),
                }
            })?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .cookie_store(config.credentials == CredentialsMode::Include)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ServiceError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST {base}/upload-pdfs/` with both PDFs
    pub async fn upload_pdfs(
        &self,
        answer_script: PdfPart,
        question_paper: PdfPart,
    ) -> ServiceResult<UploadResponse> {
        // The trailing slash is part of the route.
        let url = self.url(&[UPLOAD_ROUTE, ""]);
        info!(url = %url, "uploading answer script and question paper");

        let form = Form::new()
            .part(FileSlot::AnswerScript.field_name(), answer_script.into_part()?)
            .part(FileSlot::QuestionPaper.field_name(), question_paper.into_part()?);

        let response = self.client.post(url).multipart(form).send().await?;
        let response = http::check_status(response, Operation::Upload).await?;

        let body = response.text().await?;
        let upload: UploadResponse =
            serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse {
                message: format!("failed to parse upload response: {}", e),
            })?;

        debug!(
            evaluation_id = %upload.evaluation_id,
            status = ?upload.status,
            message = ?upload.message,
            "upload accepted"
        );
        Ok(upload)
    }

    /// Subscribe to `GET {base}/evaluation-logs/{id}`.
    /// The connection is made lazily, on the first poll.
    pub fn log_stream(&self, evaluation_id: &str) -> ServiceResult<LogSubscription> {
        let url = self.url(&[LOGS_ROUTE, evaluation_id]);
        debug!(url = %url, "opening log stream");

        let source = self
            .client
            .get(url)
            .eventsource()
            .map_err(|_| ServiceError::Stream {
                message: "log stream request cannot be replayed for reconnects".to_string(),
            })?;

        Ok(LogSubscription::new(evaluation_id, source))
    }

    /// `GET {base}/get-evaluated-pdf/{id}`
    pub async fn fetch_evaluated_pdf(&self, evaluation_id: &str) -> ServiceResult<Bytes> {
        let url = self.url(&[RESULT_ROUTE, evaluation_id]);
        info!(url = %url, "downloading evaluated script");

        let response = self.client.get(url).send().await?;
        let response = http::check_status(response, Operation::Download).await?;

        Ok(response.bytes().await?)
    }

    /// Append path segments to the base address, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
