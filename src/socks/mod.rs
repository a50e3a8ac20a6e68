mod address;
mod error;
mod reply;
mod request;

pub use address::DestinationAddress;
pub use error::{ProtocolField, TunnelError};
pub use reply::{read_connect_reply, ConnectOutcome};
pub use request::encode_connect_request;

pub const SOCKS5_VERSION: u8 = 0x05;

pub const METHOD_NO_AUTHENTICATION: u8 = 0x00;
pub const METHOD_USERNAME_PASSWORD: u8 = 0x02;
pub const METHOD_TOKEN: u8 = 0x80;

pub const TOKEN_AUTH_VERSION: u8 = 0x01;
pub const USERNAME_AUTH_VERSION: u8 = 0x01;
pub const AUTH_SUCCESS: u8 = 0x00;

pub const COMMAND_CONNECT: u8 = 0x01;
pub const RESERVED: u8 = 0x00;

pub const ADDRESS_TYPE_IPV4: u8 = 0x01;
pub const ADDRESS_TYPE_DOMAIN: u8 = 0x03;
pub const ADDRESS_TYPE_IPV6: u8 = 0x04;

/// Largest value a single byte length prefix can carry.
pub const MAX_SHORT_FIELD_LENGTH: usize = u8::MAX as usize;
