//! The server-side error-code table.
//!
//! ERROR replies carry a numeric code from this fixed table. The names and
//! values are stable protocol constants; codes the table does not know are
//! surfaced numerically rather than rejected, since newer servers may grow
//! the list.

/// Error codes a server can attach to an ERROR reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ServerErrorCode {
    /// No error
    Ok = 0,
    /// Access denied
    AccessDenied = 1,
    /// Unknown command
    UnknownCommand = 2,
    /// Invalid argument
    InvalidArgument = 3,
    /// Entity exists
    EntityExists = 4,
    /// No such entity
    NoSuchEntity = 5,
    /// Connection refused
    ConnectionRefused = 6,
    /// Protocol error
    Protocol = 7,
    /// Timeout
    Timeout = 8,
    /// No authentication key
    NoAuthKey = 9,
    /// Internal error
    Internal = 10,
    /// Connection terminated
    ConnectionTerminated = 11,
    /// Entity killed
    Killed = 12,
    /// Invalid server
    InvalidServer = 13,
    /// Module initialization failed
    ModuleInitFailed = 14,
    /// Bad state
    BadState = 15,
    /// No data
    NoData = 16,
    /// Incompatible protocol version
    IncompatibleVersion = 17,
    /// Data too large
    TooLarge = 18,
    /// Operation not supported
    NotSupported = 19,
    /// The error code was unknown to the server
    Unknown = 20,
    /// No such extension
    NoExtension = 21,
    /// Obsolete functionality
    Obsolete = 22,
    /// Missing implementation
    NotImplemented = 23,
    /// The caller forked without calling execve()
    Forked = 24,
    /// An IO error happened
    Io = 25,
    /// Device or resource busy
    Busy = 26,
}

impl ServerErrorCode {
    /// Convert from a raw wire code.
    ///
    /// Returns `None` for codes outside the table.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::AccessDenied),
            2 => Some(Self::UnknownCommand),
            3 => Some(Self::InvalidArgument),
            4 => Some(Self::EntityExists),
            5 => Some(Self::NoSuchEntity),
            6 => Some(Self::ConnectionRefused),
            7 => Some(Self::Protocol),
            8 => Some(Self::Timeout),
            9 => Some(Self::NoAuthKey),
            10 => Some(Self::Internal),
            11 => Some(Self::ConnectionTerminated),
            12 => Some(Self::Killed),
            13 => Some(Self::InvalidServer),
            14 => Some(Self::ModuleInitFailed),
            15 => Some(Self::BadState),
            16 => Some(Self::NoData),
            17 => Some(Self::IncompatibleVersion),
            18 => Some(Self::TooLarge),
            19 => Some(Self::NotSupported),
            20 => Some(Self::Unknown),
            21 => Some(Self::NoExtension),
            22 => Some(Self::Obsolete),
            23 => Some(Self::NotImplemented),
            24 => Some(Self::Forked),
            25 => Some(Self::Io),
            26 => Some(Self::Busy),
            _ => None,
        }
    }

    /// Convert to the raw wire code.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Human-readable name of the error.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::AccessDenied => "Access denied",
            Self::UnknownCommand => "Unknown command",
            Self::InvalidArgument => "Invalid argument",
            Self::EntityExists => "Entity exists",
            Self::NoSuchEntity => "No such entity",
            Self::ConnectionRefused => "Connection refused",
            Self::Protocol => "Protocol error",
            Self::Timeout => "Timeout",
            Self::NoAuthKey => "No authentication key",
            Self::Internal => "Internal error",
            Self::ConnectionTerminated => "Connection terminated",
            Self::Killed => "Entity killed",
            Self::InvalidServer => "Invalid server",
            Self::ModuleInitFailed => "Module initialization failed",
            Self::BadState => "Bad state",
            Self::NoData => "No data",
            Self::IncompatibleVersion => "Incompatible protocol version",
            Self::TooLarge => "Too large",
            Self::NotSupported => "Not supported",
            Self::Unknown => "Unknown error code",
            Self::NoExtension => "No such extension",
            Self::Obsolete => "Obsolete functionality",
            Self::NotImplemented => "Missing implementation",
            Self::Forked => "Client forked",
            Self::Io => "Input/Output error",
            Self::Busy => "Device or resource busy",
        }
    }

    /// Describe a raw code, falling back to the numeric value for codes
    /// outside the table.
    #[must_use]
    pub fn describe(value: u32) -> String {
        match Self::from_u32(value) {
            Some(code) => code.description().to_owned(),
            None => format!("error code {value}"),
        }
    }
}

impl std::fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for value in 0..=26 {
            let code = ServerErrorCode::from_u32(value).expect("code in table");
            assert_eq!(code.to_u32(), value);
        }
        assert_eq!(ServerErrorCode::from_u32(27), None);
    }

    #[test]
    fn describe_known_and_unknown() {
        assert_eq!(ServerErrorCode::describe(1), "Access denied");
        assert_eq!(ServerErrorCode::describe(9), "No authentication key");
        assert_eq!(ServerErrorCode::describe(17), "Incompatible protocol version");
        assert_eq!(ServerErrorCode::describe(99), "error code 99");
    }
}
