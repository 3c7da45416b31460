use serde::Serialize;

/// Uniform response wrapper. `data` is present only on success and `error`
/// only on failure.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub is_success: bool,
    pub official_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(official_email: &str, data: T) -> Self {
        Self {
            is_success: true,
            official_email: official_email.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(official_email: &str, error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            official_email: official_email.to_string(),
            data: None,
            error: Some(error.into()),
        }
    }
}

impl Envelope<()> {
    /// Success envelope without a payload, used by `/health`.
    pub fn status(official_email: &str) -> Self {
        Self {
            is_success: true,
            official_email: official_email.to_string(),
            data: None,
            error: None,
        }
    }
}

/// Result payload of a `/bfhl` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationOutput {
    Sequence(Vec<u64>),
    Primes(Vec<i64>),
    Number(u64),
    Answer(String),
}
