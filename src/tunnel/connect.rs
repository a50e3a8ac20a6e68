use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::socks::{encode_connect_request, read_connect_reply, DestinationAddress, TunnelError};

/// CONNECT step shared by both tunnel clients.
pub(crate) async fn request_connect<S>(
    stream: &mut S,
    destination: &DestinationAddress,
    port: u16,
) -> Result<(), TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = encode_connect_request(destination, port);
    stream.write_all(&request).await?;
    stream.flush().await?;

    let outcome = read_connect_reply(stream).await?;

    if !outcome.is_success() {
        debug!("Proxy rejected connect request: {}", outcome);
        return Err(TunnelError::ConnectFailure(outcome));
    }

    Ok(())
}
