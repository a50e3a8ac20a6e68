use std::fmt;

use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{
    ProtocolField, TunnelError, ADDRESS_TYPE_DOMAIN, ADDRESS_TYPE_IPV4, ADDRESS_TYPE_IPV6,
    SOCKS5_VERSION,
};

/// Classified status byte of a CONNECT reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Success,
    Failure,
    Forbidden,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandUnsupported,
    AddressUnsupported,
    Unknown(u8),
}

impl ConnectOutcome {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ConnectOutcome::Success,
            0x01 => ConnectOutcome::Failure,
            0x02 => ConnectOutcome::Forbidden,
            0x03 => ConnectOutcome::NetworkUnreachable,
            0x04 => ConnectOutcome::HostUnreachable,
            0x05 => ConnectOutcome::ConnectionRefused,
            0x06 => ConnectOutcome::TtlExpired,
            0x07 => ConnectOutcome::CommandUnsupported,
            0x08 => ConnectOutcome::AddressUnsupported,
            n => ConnectOutcome::Unknown(n),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ConnectOutcome::Success => 0x00,
            ConnectOutcome::Failure => 0x01,
            ConnectOutcome::Forbidden => 0x02,
            ConnectOutcome::NetworkUnreachable => 0x03,
            ConnectOutcome::HostUnreachable => 0x04,
            ConnectOutcome::ConnectionRefused => 0x05,
            ConnectOutcome::TtlExpired => 0x06,
            ConnectOutcome::CommandUnsupported => 0x07,
            ConnectOutcome::AddressUnsupported => 0x08,
            ConnectOutcome::Unknown(n) => *n,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConnectOutcome::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            ConnectOutcome::Success => "Succeeded",
            ConnectOutcome::Failure => "General SOCKS server failure",
            ConnectOutcome::Forbidden => "Connection not allowed by ruleset",
            ConnectOutcome::NetworkUnreachable => "Network unreachable",
            ConnectOutcome::HostUnreachable => "Host unreachable",
            ConnectOutcome::ConnectionRefused => "Connection refused",
            ConnectOutcome::TtlExpired => "TTL expired",
            ConnectOutcome::CommandUnsupported => "Command not supported",
            ConnectOutcome::AddressUnsupported => "Address type not supported",
            ConnectOutcome::Unknown(_) => "Unknown status",
        }
    }
}

impl fmt::Display for ConnectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#04x})", self.message(), self.code())
    }
}

/// Reads a complete CONNECT reply.
///
/// The bound address is drained according to its own address type before the
/// status is looked at, so the stream stays aligned even on failure.
pub async fn read_connect_reply<R>(reader: &mut R) -> Result<ConnectOutcome, TunnelError>
where
    R: AsyncRead + Unpin,
{
    let mut head = [0u8; 3];
    reader.read_exact(&mut head[..2]).await?;

    if head[0] != SOCKS5_VERSION {
        return Err(TunnelError::violation(
            ProtocolField::Version,
            SOCKS5_VERSION,
            head[0],
        ));
    }

    let outcome = ConnectOutcome::from_code(head[1]);

    reader.read_exact(&mut head[2..]).await?;
    let address_type = head[2];

    let trailing = match address_type {
        ADDRESS_TYPE_IPV4 => 4 + 2,
        ADDRESS_TYPE_DOMAIN => reader.read_u8().await? as usize + 2,
        ADDRESS_TYPE_IPV6 => 16 + 2,
        other => {
            return Err(TunnelError::violation(
                ProtocolField::AddressType,
                ADDRESS_TYPE_IPV4,
                other,
            ))
        }
    };

    let mut bound = vec![0u8; trailing];
    reader.read_exact(&mut bound).await?;

    trace!(
        "Connect reply status {:#04x}, drained {} address bytes",
        outcome.code(),
        trailing
    );

    Ok(outcome)
}
