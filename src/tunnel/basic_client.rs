//! Username-only SOCKS5 client.
//!
//! The system this client replaces installed the username through a
//! process-wide authenticator callback right before a generic SOCKS connect,
//! so two concurrent connects with different usernames could see each
//! other's credential. Here the username travels with the call and no state
//! is shared between sessions.

use bytes::{BufMut, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::socks::{
    DestinationAddress, ProtocolField, TunnelError, AUTH_SUCCESS, MAX_SHORT_FIELD_LENGTH,
    METHOD_NO_AUTHENTICATION, METHOD_USERNAME_PASSWORD, SOCKS5_VERSION, USERNAME_AUTH_VERSION,
};

use super::connect::request_connect;
use super::target::TunnelRequest;

const GREETING: [u8; 4] = [
    SOCKS5_VERSION,
    0x02,
    METHOD_NO_AUTHENTICATION,
    METHOD_USERNAME_PASSWORD,
];

/// RFC 1929 request with an empty password.
fn encode_login_request(username: &str) -> Result<BytesMut, TunnelError> {
    if username.len() > MAX_SHORT_FIELD_LENGTH {
        return Err(TunnelError::UsernameTooLong(username.len()));
    }

    let mut buf = BytesMut::with_capacity(3 + username.len());
    buf.put_u8(USERNAME_AUTH_VERSION);
    buf.put_u8(username.len() as u8);
    buf.put_slice(username.as_bytes());
    buf.put_u8(0x00);

    Ok(buf)
}

pub async fn negotiate<S>(
    mut stream: S,
    username: &str,
    request: &TunnelRequest,
) -> Result<S, TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let login_request = encode_login_request(username)?;
    let destination = DestinationAddress::from_host(&request.destination_host)?;

    stream.write_all(&GREETING).await?;
    stream.flush().await?;

    let mut response = [0u8; 2];
    stream.read_exact(&mut response).await?;

    if response[0] != SOCKS5_VERSION {
        return Err(TunnelError::violation(
            ProtocolField::Version,
            SOCKS5_VERSION,
            response[0],
        ));
    }

    match response[1] {
        METHOD_NO_AUTHENTICATION => trace!("Proxy does not require authentication"),
        METHOD_USERNAME_PASSWORD => {
            login(&mut stream, &login_request).await?;
            debug!("Logged in to proxy as '{}'", username);
        }
        other => {
            return Err(TunnelError::violation(
                ProtocolField::Method,
                METHOD_USERNAME_PASSWORD,
                other,
            ))
        }
    }

    request_connect(&mut stream, &destination, request.destination_port).await?;
    debug!("Tunnel established to {}", request);

    Ok(stream)
}

async fn login<S>(stream: &mut S, login_request: &[u8]) -> Result<(), TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(login_request).await?;
    stream.flush().await?;

    let mut response = [0u8; 2];
    stream.read_exact(&mut response).await?;

    if response[0] != USERNAME_AUTH_VERSION {
        return Err(TunnelError::violation(
            ProtocolField::AuthVersion,
            USERNAME_AUTH_VERSION,
            response[0],
        ));
    }

    if response[1] != AUTH_SUCCESS {
        return Err(TunnelError::AuthenticationFailure {
            status: response[1],
        });
    }

    Ok(())
}
