/// Failures talking to the SQL gateway
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The request never produced an HTTP response
    #[error("transport error: {0}")]
    Transport(String),
    /// The gateway answered with a non-success status
    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The statement reached the engine and was rejected
    #[error("sql error{}: {message}", .code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default())]
    Sql { message: String, code: Option<String> },
    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid sql identifier: {0:?}")]
    InvalidIdentifier(String),
    /// The gateway returned fewer results than statements sent
    #[error("missing result for statement {0}")]
    MissingResult(usize),
}

impl DatabaseError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            DatabaseError::Transport(_) => true,
            DatabaseError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DatabaseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DatabaseError::Decode(err.to_string())
        } else {
            DatabaseError::Transport(err.to_string())
        }
    }
}
