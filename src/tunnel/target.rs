use std::fmt;

/// The proxy every tunnel is opened through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub port: u16,
}

impl ProxyTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Final address requested from the proxy with CONNECT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TunnelRequest {
    pub destination_host: String,
    pub destination_port: u16,
}

impl TunnelRequest {
    pub fn new(destination_host: impl Into<String>, destination_port: u16) -> Self {
        Self {
            destination_host: destination_host.into(),
            destination_port,
        }
    }
}

impl fmt::Display for TunnelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.destination_host, self.destination_port)
    }
}
