use serde::Deserialize;
use thiserror::Error;

/// A settled HTTP exchange with a 2xx status. Error statuses surface as
/// [`TransportError::Status`] instead.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        /// `message` from a JSON error body, when the server sent one.
        message: Option<String>,
    },
    #[error("request failed: {detail}")]
    Network { detail: String },
}

/// Seam between widgets and the network. Implementations are injected at
/// page construction; tests swap in scripted ones.
pub trait Transport: Send + Sync {
    fn post_form(&self, url: &str, body: &str) -> Result<Reply, TransportError>;
    fn get(&self, url: &str) -> Result<Reply, TransportError>;
}

// ---------------------------------------------------------------------------
// ureq-backed transport
// ---------------------------------------------------------------------------

pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::agent(),
        }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, body: &str) -> Result<Reply, TransportError> {
        let response = self
            .agent
            .post(url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/x-www-form-urlencoded")
            .send_string(body)
            .map_err(map_error)?;
        read_reply(response)
    }

    fn get(&self, url: &str) -> Result<Reply, TransportError> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(map_error)?;
        read_reply(response)
    }
}

fn read_reply(response: ureq::Response) -> Result<Reply, TransportError> {
    let status = response.status();
    let body = response.into_string().map_err(|err| TransportError::Network {
        detail: err.to_string(),
    })?;
    Ok(Reply { status, body })
}

fn map_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Status(status, response) => {
            let status_text = response.status_text().to_string();
            let message = response
                .into_string()
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                .map(|body| body.message);
            TransportError::Status {
                status,
                status_text,
                message,
            }
        }
        ureq::Error::Transport(transport) => TransportError::Network {
            detail: transport.to_string(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
