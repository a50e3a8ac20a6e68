use std::fmt;
use std::io;

use super::ConnectOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolField {
    Version,
    Method,
    AuthVersion,
    AddressType,
}

impl fmt::Display for ProtocolField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolField::Version => write!(f, "SOCKS version"),
            ProtocolField::Method => write!(f, "authentication method"),
            ProtocolField::AuthVersion => write!(f, "authentication method version"),
            ProtocolField::AddressType => write!(f, "address type"),
        }
    }
}

#[derive(Debug)]
pub enum TunnelError {
    ProtocolViolation {
        field: ProtocolField,
        expected: u8,
        received: u8,
    },
    AuthenticationFailure {
        status: u8,
    },
    ConnectFailure(ConnectOutcome),
    Transport(io::Error),
    RoutingIdTooLong(usize),
    TokenTooLong(usize),
    HostnameTooLong(usize),
    UsernameTooLong(usize),
    MissingCredential(&'static str),
}

impl TunnelError {
    pub fn violation(field: ProtocolField, expected: u8, received: u8) -> Self {
        TunnelError::ProtocolViolation {
            field,
            expected,
            received,
        }
    }
}

impl fmt::Display for TunnelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelError::ProtocolViolation {
                field,
                expected,
                received,
            } => write!(
                f,
                "Unsupported {} - expected {:#04x}, but received {:#04x}",
                field, expected, received
            ),
            TunnelError::AuthenticationFailure { status } => {
                write!(f, "Authentication failed with status {:#04x}", status)
            }
            TunnelError::ConnectFailure(outcome) => {
                write!(f, "SOCKS5 connect failed: {}", outcome)
            }
            TunnelError::Transport(e) => write!(f, "Transport error: {}", e),
            TunnelError::RoutingIdTooLong(length) => write!(
                f,
                "Encoded routing id is {} bytes, at most 255 bytes are allowed.",
                length
            ),
            TunnelError::TokenTooLong(length) => {
                write!(f, "Token is {} bytes, it does not fit a 32-bit length.", length)
            }
            TunnelError::HostnameTooLong(length) => write!(
                f,
                "Destination hostname is {} bytes, at most 255 bytes are allowed.",
                length
            ),
            TunnelError::UsernameTooLong(length) => write!(
                f,
                "Username is {} bytes, at most 255 bytes are allowed.",
                length
            ),
            TunnelError::MissingCredential(name) => {
                write!(f, "Proxy properties do not provide a {}.", name)
            }
        }
    }
}

impl std::error::Error for TunnelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TunnelError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TunnelError {
    fn from(err: io::Error) -> TunnelError {
        TunnelError::Transport(err)
    }
}

impl From<TunnelError> for io::Error {
    fn from(err: TunnelError) -> io::Error {
        match err {
            TunnelError::Transport(e) => e,
            TunnelError::AuthenticationFailure { .. } => {
                io::Error::new(io::ErrorKind::PermissionDenied, err.to_string())
            }
            TunnelError::ConnectFailure(ConnectOutcome::ConnectionRefused) => {
                io::Error::new(io::ErrorKind::ConnectionRefused, err.to_string())
            }
            TunnelError::RoutingIdTooLong(_)
            | TunnelError::TokenTooLong(_)
            | TunnelError::HostnameTooLong(_)
            | TunnelError::UsernameTooLong(_)
            | TunnelError::MissingCredential(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
            }
            _ => io::Error::new(io::ErrorKind::Other, err.to_string()),
        }
    }
}
