use log::debug;
use tokio::signal;
use tokio_util::sync::CancellationToken;

pub async fn start_cancel_listener(cancel_token: CancellationToken) {
    tokio::select! {
        _ = cancel_token.cancelled() => {}
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                debug!("Error while waiting for ctrl+c signal: {:?}", e);
                return;
            }

            debug!("Received ctrl+c, stopping.");
            cancel_token.cancel();
        }
    }
}
