use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::io::{Error, ErrorKind, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::common::data_bridge::bridge_streams;
use crate::configuration::{BridgeConfiguration, ForwardConfiguration};
use crate::tunnel::{open_tunnel, ProxyPropertiesResolver};

/// Binds every configured forward and serves them until cancelled.
pub async fn start_forwards(
    configuration: Arc<BridgeConfiguration>,
    cancel_token: CancellationToken,
) -> Result<()> {
    if configuration.forwards.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "No forwards are configured.",
        ));
    }

    let mut listeners = Vec::with_capacity(configuration.forwards.len());

    for forward in configuration.forwards.iter() {
        let listener =
            match TcpListener::bind((forward.bind_address().as_str(), forward.bind_port)).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!(
                        "Could not bind {}:{}: {}",
                        forward.bind_address(),
                        forward.bind_port,
                        e
                    );
                    cancel_token.cancel();
                    return Err(e);
                }
            };

        listeners.push(tokio::spawn(serve_forward(
            listener,
            configuration.clone(),
            forward.clone(),
            cancel_token.clone(),
        )));
    }

    for listener in listeners {
        if let Err(e) = listener.await {
            error!("Forward listener task failed: {}", e);
        }
    }

    Ok(())
}

pub async fn serve_forward(
    listener: TcpListener,
    configuration: Arc<BridgeConfiguration>,
    forward: ForwardConfiguration,
    cancel_token: CancellationToken,
) {
    let forward = Arc::new(forward);

    match listener.local_addr() {
        Ok(address) => info!(
            "Forwarding {} to {}:{} via routing id '{}'",
            address, forward.destination_host, forward.destination_port, forward.routing_id
        ),
        Err(e) => debug!("Could not read listener address: {}", e),
    }

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Forward listener stopped.");
                return;
            }
            result = listener.accept() => {
                match result {
                    Ok((client, address)) => {
                        let configuration = configuration.clone();
                        let forward = forward.clone();
                        let cancel_token = cancel_token.clone();
                        tokio::spawn(async move {
                            handle_client(client, address, &configuration, &forward, cancel_token).await;
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
        }
    }
}

async fn handle_client(
    mut client: TcpStream,
    address: SocketAddr,
    configuration: &BridgeConfiguration,
    forward: &ForwardConfiguration,
    cancel_token: CancellationToken,
) {
    let session_id = Uuid::new_v4();
    debug!("[{}] Accepted client {}", session_id, address);

    let properties = match configuration.resolve(&forward.routing_id) {
        Ok(properties) => properties,
        Err(e) => {
            error!("[{}] {}", session_id, e);
            return;
        }
    };

    let request = forward.tunnel_request();

    let mut tunnel = match open_tunnel(
        &properties,
        &forward.routing_id,
        &request,
        configuration.connect_timeout(),
    )
    .await
    {
        Ok(tunnel) => tunnel,
        Err(e) => {
            error!("[{}] Could not open tunnel to {}: {}", session_id, request, e);
            return;
        }
    };

    tokio::select! {
        _ = cancel_token.cancelled() => {
            debug!("[{}] Session cancelled.", session_id);
        }
        result = bridge_streams(&mut client, &mut tunnel) => {
            if let Ok((sent, received)) = result {
                info!(
                    "[{}] Session to {} closed ({} bytes sent, {} bytes received)",
                    session_id, request, sent, received
                );
            }
        }
    }
}
