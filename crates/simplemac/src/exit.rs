use std::fmt;
use std::io;

use simplemac_link::MacError;
use simplemac_phy::PhyError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn phy_error(context: &str, err: PhyError) -> CliError {
    match err {
        PhyError::Bind { source, .. } | PhyError::Connect { source, .. } | PhyError::Io(source) => {
            io_error(context, source)
        }
        PhyError::FrameTooLarge { .. }
        | PhyError::Truncated { .. }
        | PhyError::InvalidFrameLimit { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        PhyError::PathTooLong { .. } => CliError::usage(format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn mac_error(context: &str, err: MacError) -> CliError {
    match err {
        MacError::Phy(err) => phy_error(context, err),
        MacError::Config(_) | MacError::Json(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        MacError::UnknownPort(_) => CliError::usage(format!("{context}: {err}")),
        MacError::AddressBusy { .. } => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
