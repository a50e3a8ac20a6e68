use std::fmt;
use std::io::{Error, ErrorKind};
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use chrono::Local;
use log::{error, info};
use tokio::io::AsyncWriteExt;

use crate::tunnel::{open_tunnel, ProxyPropertiesResolver, TunnelRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    Success,
    Failed(String),
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeReport::Success => write!(f, "TCP Connection is Successful"),
            ProbeReport::Failed(reason) => write!(f, "TCP Connection failed! {}", reason),
        }
    }
}

/// Frames text as a big-endian u16 length followed by UTF-8 bytes.
fn encode_probe_message(text: &str) -> Result<BytesMut, Error> {
    let length = u16::try_from(text.len())
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Probe message is too long."))?;

    let mut buf = BytesMut::with_capacity(2 + text.len());
    buf.put_u16(length);
    buf.put_slice(text.as_bytes());

    Ok(buf)
}

fn probe_text() -> String {
    format!(
        "Test message from socksbridge. At: {}",
        Local::now().format("%Y-%m-%dT%H:%M:%S%.3f")
    )
}

/// Opens a tunnel, sends a single test message and closes it again.
pub async fn run_probe<R>(
    resolver: &R,
    routing_id: &str,
    request: &TunnelRequest,
    connect_timeout: Duration,
) -> ProbeReport
where
    R: ProxyPropertiesResolver,
{
    let report = match probe(resolver, routing_id, request, connect_timeout).await {
        Ok(()) => ProbeReport::Success,
        Err(reason) => {
            error!("Could not perform the socket call: {}", reason);
            ProbeReport::Failed(reason)
        }
    };

    info!("Probe of {} via routing id '{}': {}", request, routing_id, report);

    report
}

async fn probe<R>(
    resolver: &R,
    routing_id: &str,
    request: &TunnelRequest,
    connect_timeout: Duration,
) -> Result<(), String>
where
    R: ProxyPropertiesResolver,
{
    let properties = resolver.resolve(routing_id).map_err(|e| e.to_string())?;

    let mut stream = open_tunnel(&properties, routing_id, request, connect_timeout)
        .await
        .map_err(|e| e.to_string())?;

    let message = encode_probe_message(&probe_text()).map_err(|e| e.to_string())?;

    stream
        .write_all(&message)
        .await
        .map_err(|e| e.to_string())?;

    stream.shutdown().await.map_err(|e| e.to_string())?;

    Ok(())
}
