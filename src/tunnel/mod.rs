use std::time::Duration;

use log::{debug, info};
use tokio::net::TcpStream;

use crate::common::tcp_client::connect_to_proxy;
use crate::socks::TunnelError;

mod connect;
mod properties;
mod strategy;
mod target;

pub mod basic_client;
pub mod token_client;

pub use properties::{ProxyAuthentication, ProxyProperties, ProxyPropertiesResolver, ResolveError};
pub use strategy::{select_strategy, AuthType, TunnelStrategy};
pub use target::{ProxyTarget, TunnelRequest};
pub use token_client::AuthCredential;

/// Opens a tunnel to `request` through the proxy resolved for `routing_id`.
///
/// The returned stream behaves like a direct connection to the destination.
/// On failure the proxy connection is closed, callers retry by calling again.
pub async fn open_tunnel(
    properties: &ProxyProperties,
    routing_id: &str,
    request: &TunnelRequest,
    connect_timeout: Duration,
) -> Result<TcpStream, TunnelError> {
    let strategy = select_strategy(properties.auth_type());

    debug!(
        "Opening tunnel to {} via {} using {:?} strategy",
        request, properties.proxy, strategy
    );

    let stream = match strategy {
        TunnelStrategy::Token => {
            let token = properties
                .token()
                .ok_or(TunnelError::MissingCredential("token"))?;
            let credential = AuthCredential::new(token, routing_id);

            let stream = connect_to_proxy(&properties.proxy, connect_timeout).await?;
            token_client::negotiate(stream, &credential, request).await?
        }
        TunnelStrategy::BasicCredential => {
            let username = properties
                .username_for(routing_id)
                .ok_or(TunnelError::MissingCredential("username"))?;

            let stream = connect_to_proxy(&properties.proxy, connect_timeout).await?;
            basic_client::negotiate(stream, username, request).await?
        }
    };

    info!("Tunnel to {} is open", request);

    Ok(stream)
}

#[cfg(test)]
pub(crate) mod fixture {
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    /// Plays a fixed proxy script: for every step reads exactly the given
    /// number of bytes and answers with the given response. Afterwards reads
    /// until the client hangs up and returns everything the client sent.
    pub async fn scripted_proxy<S>(mut server: S, steps: Vec<(usize, Vec<u8>)>) -> Vec<u8>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut received = Vec::new();

        for (read_length, response) in steps {
            let mut buf = vec![0u8; read_length];
            if server.read_exact(&mut buf).await.is_err() {
                return received;
            }
            received.extend_from_slice(&buf);

            if server.write_all(&response).await.is_err() {
                return received;
            }
        }

        let mut rest = Vec::new();
        let _ = server.read_to_end(&mut rest).await;
        received.extend_from_slice(&rest);

        received
    }
}
