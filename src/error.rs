use serde_json::Value;
use thiserror::Error;

/// Classified outcome of a failed REST call.
///
/// Every caller gets the same taxonomy; mapping a variant to a user-facing
/// sentence is left to the caller (see `ResourceKind::describe_error`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Authentication rejected{}", suffix(.detail))]
    AuthenticationRejected { detail: Option<String> },

    #[error("Access denied{}", suffix(.detail))]
    AuthorizationDenied { detail: Option<String> },

    #[error("Resource not found{}", suffix(.detail))]
    NotFound { detail: Option<String> },

    #[error("Validation rejected (status {status}){}", suffix(&render_detail(.detail)))]
    ValidationRejected { status: u16, detail: Value },

    #[error("Server error (status {status}){}", suffix(.detail))]
    ServerFault { status: u16, detail: Option<String> },

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status behind the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationRejected { .. } => Some(401),
            ApiError::AuthorizationDenied { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::ValidationRejected { status, .. } | ApiError::ServerFault { status, .. } => {
                Some(*status)
            }
            ApiError::NetworkUnavailable(_) | ApiError::Request(_) | ApiError::Decode(_) => None,
        }
    }

    /// Server-supplied detail, flattened to one line.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::AuthenticationRejected { detail }
            | ApiError::AuthorizationDenied { detail }
            | ApiError::NotFound { detail }
            | ApiError::ServerFault { detail, .. } => detail.clone(),
            ApiError::ValidationRejected { detail, .. } => render_detail(detail),
            ApiError::NetworkUnavailable(_) | ApiError::Request(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, ApiError::AuthenticationRejected { .. })
    }

    /// Generic message without any resource vocabulary.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkUnavailable(_) => "The server could not be reached".to_string(),
            ApiError::AuthenticationRejected { .. } => {
                "Your session is no longer valid, please log in again".to_string()
            }
            ApiError::AuthorizationDenied { .. } => {
                "You are not allowed to perform this action".to_string()
            }
            ApiError::NotFound { .. } => "The requested resource does not exist".to_string(),
            ApiError::ValidationRejected { .. } => match self.detail() {
                Some(detail) => format!("Invalid data: {}", detail),
                None => "Invalid data".to_string(),
            },
            ApiError::ServerFault { .. } => match self.detail() {
                Some(detail) => format!("Server error: {}", detail),
                None => "Server error".to_string(),
            },
            ApiError::Request(msg) => format!("Invalid request: {}", msg),
            ApiError::Decode(_) => "The server sent an unreadable response".to_string(),
        }
    }
}

fn suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(": {}", d),
        _ => String::new(),
    }
}

/// Flatten a `detail` payload into a single line.
///
/// Strings pass through. Lists of field errors (`[{loc: [...], msg}]`) become
/// `field: msg; field: msg`.
pub fn render_detail(detail: &Value) -> Option<String> {
    match detail {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| {
                    let msg = item
                        .get("msg")
                        .and_then(|m| m.as_str())
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| item.to_string());
                    let field = item
                        .get("loc")
                        .and_then(|l| l.as_array())
                        .and_then(|l| l.last())
                        .map(|f| match f {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        });
                    match field {
                        Some(field) => format!("{}: {}", field, msg),
                        None => msg,
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error on '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Session encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The endpoint answered but refused the credentials or the payload.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        cause: ApiError,
    },

    /// No answer from the endpoint.
    #[error("{message}")]
    Unreachable {
        message: String,
        #[source]
        cause: ApiError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Error)]
pub enum AeroError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Login required to open {from}")]
    LoginRequired { from: String },

    #[error("Session is still being restored, try again")]
    SessionPending,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<anyhow::Error> for AeroError {
    fn from(err: anyhow::Error) -> Self {
        AeroError::Config(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, AeroError>;
