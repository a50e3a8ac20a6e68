use bytes::{BufMut, BytesMut};

use super::{TunnelError, ADDRESS_TYPE_DOMAIN, ADDRESS_TYPE_IPV4, MAX_SHORT_FIELD_LENGTH};

/// Address sent in the CONNECT request. The destination is never resolved
/// locally, anything that is not a dotted-decimal IPv4 literal is passed to
/// the proxy as a domain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationAddress {
    Ipv4([u8; 4]),
    Domain(String),
}

impl DestinationAddress {
    pub fn from_host(host: &str) -> Result<Self, TunnelError> {
        if let Some(octets) = parse_ipv4_octets(host) {
            return Ok(DestinationAddress::Ipv4(octets));
        }

        if host.len() > MAX_SHORT_FIELD_LENGTH {
            return Err(TunnelError::HostnameTooLong(host.len()));
        }

        Ok(DestinationAddress::Domain(host.to_owned()))
    }

    pub fn address_type(&self) -> u8 {
        match self {
            DestinationAddress::Ipv4(_) => ADDRESS_TYPE_IPV4,
            DestinationAddress::Domain(_) => ADDRESS_TYPE_DOMAIN,
        }
    }

    /// Writes the address type byte followed by the address itself.
    pub fn put_into(&self, buf: &mut BytesMut) {
        buf.put_u8(self.address_type());
        match self {
            DestinationAddress::Ipv4(octets) => buf.put_slice(octets),
            DestinationAddress::Domain(name) => {
                buf.put_u8(name.len() as u8);
                buf.put_slice(name.as_bytes());
            }
        }
    }
}

fn parse_ipv4_octets(host: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = host.split('.').collect();

    if parts.len() != 4 {
        return None;
    }

    let mut octets = [0u8; 4];

    for (octet, part) in octets.iter_mut().zip(parts) {
        let value = part.parse::<i64>().ok()?;

        if !(0..=255).contains(&value) {
            return None;
        }

        *octet = value as u8;
    }

    Some(octets)
}
