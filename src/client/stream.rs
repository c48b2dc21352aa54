//! Server-sent log stream for a single evaluation.

use futures::StreamExt;
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource, ReadyState};
use std::fmt;
use tracing::{debug, info, warn};

/// What the log stream produced next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// One event payload, exactly as the server sent it
    Line(String),
    /// The stream is over. `permanent` is set when the channel was closed
    /// for good rather than dropped in a way the transport would retry.
    Ended { permanent: bool },
}

/// An open (or closed) subscription to `/evaluation-logs/{id}`.
///
/// Nothing is sent until the first call to `next_signal`. The subscription
/// reports `Ended` once and is closed afterwards.
pub struct LogSubscription {
    job_id: String,
    source: Option<EventSource>,
}

impl LogSubscription {
    pub(crate) fn new(job_id: &str, source: EventSource) -> Self {
        Self {
            job_id: job_id.to_string(),
            source: Some(source),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Close the underlying connection. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
            debug!(evaluation_id = %self.job_id, "log stream closed");
        }
    }

    /// Wait for the next log line or the end of the stream.
    ///
    /// Returns `None` once the subscription has been closed.
    pub async fn next_signal(&mut self) -> Option<StreamSignal> {
        loop {
            let source = self.source.as_mut()?;

            let signal = match source.next().await {
                Some(Ok(Event::Open)) => {
                    info!(evaluation_id = %self.job_id, "log stream connected");
                    continue;
                }
                Some(Ok(Event::Message(message))) => return Some(StreamSignal::Line(message.data)),
                Some(Err(err)) => {
                    // Sample readiness before closing, close() always reports Closed.
                    let permanent = is_permanent(&err, source.ready_state());
                    if permanent {
                        warn!(evaluation_id = %self.job_id, error = %err, "log stream closed by server");
                    } else {
                        debug!(evaluation_id = %self.job_id, error = %err, "log stream ended");
                    }
                    StreamSignal::Ended { permanent }
                }
                None => StreamSignal::Ended { permanent: false },
            };

            self.close();
            return Some(signal);
        }
    }
}

/// A rejected channel (bad status or content type) never comes back.
/// Everything else is permanent only if the transport gave up on it.
fn is_permanent(err: &EventSourceError, state: ReadyState) -> bool {
    match err {
        EventSourceError::InvalidStatusCode(..) | EventSourceError::InvalidContentType(..) => true,
        _ => matches!(state, ReadyState::Closed),
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSubscription")
            .field("job_id", &self.job_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
