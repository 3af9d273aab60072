//! Request status codes.
//!
//! These are numerically compatible with the audio HAL `Result` enum and are
//! carried across the legacy C ABI as plain `i32` values.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Outcome of a device-open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    NotInitialized,
    InvalidArguments,
    InvalidState,
    NotSupported,
    /// A code reported by a legacy module that this crate does not know.
    /// Kept verbatim so it reaches the caller unchanged.
    Unknown(i32),
}

impl Status {
    /// Map a raw status code to a [`Status`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Status::Ok,
            1 => Status::NotInitialized,
            2 => Status::InvalidArguments,
            3 => Status::InvalidState,
            4 => Status::NotSupported,
            other => Status::Unknown(other),
        }
    }

    /// Raw status code.
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::NotInitialized => 1,
            Status::InvalidArguments => 2,
            Status::InvalidState => 3,
            Status::NotSupported => 4,
            Status::Unknown(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status::from_code(code)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::NotInitialized => write!(f, "NOT_INITIALIZED"),
            Status::InvalidArguments => write!(f, "INVALID_ARGUMENTS"),
            Status::InvalidState => write!(f, "INVALID_STATE"),
            Status::NotSupported => write!(f, "NOT_SUPPORTED"),
            Status::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(Status::from_code(0), Status::Ok);
        assert_eq!(Status::from_code(1), Status::NotInitialized);
        assert_eq!(Status::from_code(2), Status::InvalidArguments);
        assert_eq!(Status::NotSupported.code(), 4);
        assert!(Status::Ok.is_ok());
        assert!(!Status::InvalidState.is_ok());
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = Status::from(-38);
        assert_eq!(status, Status::Unknown(-38));
        assert_eq!(status.code(), -38);
        assert_eq!(status.to_string(), "UNKNOWN(-38)");
    }
}
