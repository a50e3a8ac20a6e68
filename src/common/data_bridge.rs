use log::{debug, error};
use tokio::io::{copy_bidirectional, AsyncRead, AsyncWrite, Result};

/// Copies data both ways until either side closes. Returns the number of
/// bytes sent from `from` to `to` and back.
pub async fn bridge_streams<A, B>(from: &mut A, to: &mut B) -> Result<(u64, u64)>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    match copy_bidirectional(from, to).await {
        Ok((sent, received)) => {
            debug!("Bridge closed, sent {} bytes, received {} bytes", sent, received);
            Ok((sent, received))
        }
        Err(e) => {
            error!("Failed to bridge data: {}", e);
            Err(e)
        }
    }
}
