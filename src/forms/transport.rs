use thiserror::Error;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

impl SubmitResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("network error: {0}")]
    Network(String),
    #[error("form endpoint rejected the submission with status {status}")]
    Rejected { status: u16 },
    #[error("form endpoint answered {status} without confirming the submission")]
    Unconfirmed { status: u16 },
}

/// The remote form backend.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// POSTs an urlencoded body. HTTP error statuses are an `Ok` response;
    /// only failures to get any response are `Err`.
    async fn post(&self, endpoint: &str, body: String) -> Result<SubmitResponse, SubmitError>;
}

pub fn encode_fields(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
