use std::io::{Error, ErrorKind};
use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, error, info};
use tokio::io::Result;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use crate::tunnel::ProxyTarget;

async fn connect_to_address(address: &str, port: u16) -> Result<TcpStream> {
    let socket_addrs: Vec<SocketAddr> = lookup_host((address, port)).await?.collect();

    if socket_addrs.is_empty() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("Could not resolve address: {}:{}", address, port),
        ));
    }

    let mut error = None;

    for addr in socket_addrs.iter().filter(|addr| addr.is_ipv6()) {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => error = Some(e),
        }
    }

    for addr in socket_addrs.iter().filter(|addr| addr.is_ipv4()) {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => error = Some(e),
        }
    }

    if let Some(e) = error {
        return Err(e);
    }

    Err(Error::new(
        ErrorKind::Other,
        format!("Failed to connect to address: {}:{}", address, port),
    ))
}

/// Opens the TCP connection to the proxy. Only the connect is bounded by
/// `connect_timeout`, reads on the returned stream are not.
pub async fn connect_to_proxy(proxy: &ProxyTarget, connect_timeout: Duration) -> Result<TcpStream> {
    match timeout(connect_timeout, connect_to_address(&proxy.host, proxy.port)).await {
        Ok(Ok(stream)) => {
            info!("Connected to proxy at {}", proxy);
            Ok(stream)
        }
        Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
            error!("Connection refused by proxy at {}", proxy);
            Err(e)
        }
        Ok(Err(e)) => {
            debug!("Error connecting to proxy: {:?}", e);
            Err(e)
        }
        Err(_) => {
            error!(
                "Connecting to proxy at {} timed out after {:?}",
                proxy, connect_timeout
            );
            Err(Error::new(
                ErrorKind::TimedOut,
                format!("Connecting to proxy at {} timed out", proxy),
            ))
        }
    }
}
