//! Status-code classification.

/// Status reported for a call that never obtained a response.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

pub const NO_CONTENT: u16 = 204;
pub const NOT_FOUND: u16 = 404;

/// True when `code` is in the 2xx family.
pub fn is_success(code: u16) -> bool {
    (200..=299).contains(&code)
}

/// Status-code family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    /// Outside 100..=599, including `TRANSPORT_FAILURE_STATUS`.
    Unknown,
}

impl StatusClass {
    pub fn of(code: u16) -> Self {
        match code / 100 {
            1 => StatusClass::Informational,
            2 => StatusClass::Success,
            3 => StatusClass::Redirection,
            4 => StatusClass::ClientError,
            5 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }
}
