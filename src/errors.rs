use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    /// The record source could not be read; callers keep showing the last
    /// known data.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidEmail(_) | SessionError::MissingPassword => {
                Self::bad_request(err.to_string())
            }
            SessionError::AlreadyRegistered(_) => Self::conflict(err.to_string()),
            SessionError::InvalidCredentials
            | SessionError::Missing
            | SessionError::Expired
            | SessionError::Unknown => Self::unauthorized(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RateError {
    #[error("revenue rate table must contain at least one entry")]
    Empty,
    #[error("invalid effective date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid rate '{0}'")]
    InvalidRate(String),
    #[error("effective date '{0}' appears more than once")]
    DuplicateDate(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RangeError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("range start {start} is after end {end}")]
    Inverted { start: String, end: String },
    #[error("unknown date mode '{0}'")]
    UnknownMode(String),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("missing query parameter '{0}'")]
    Missing(&'static str),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("invalid email '{0}'")]
    InvalidEmail(String),
    #[error("password is required")]
    MissingPassword,
    #[error("account '{0}' already exists")]
    AlreadyRegistered(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing session token")]
    Missing,
    #[error("session expired after inactivity")]
    Expired,
    #[error("no open session for this token")]
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),
    #[error("invalid PASSWORD_ITERATIONS '{0}'")]
    InvalidIterations(String),
    #[error("invalid REVENUE_RATES: {0}")]
    Rates(#[from] RateError),
}
