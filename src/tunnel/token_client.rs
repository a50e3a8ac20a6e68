use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::{BufMut, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::socks::{
    DestinationAddress, ProtocolField, TunnelError, AUTH_SUCCESS, MAX_SHORT_FIELD_LENGTH,
    METHOD_TOKEN, SOCKS5_VERSION, TOKEN_AUTH_VERSION,
};

use super::connect::request_connect;
use super::target::TunnelRequest;

const GREETING: [u8; 3] = [SOCKS5_VERSION, 0x01, METHOD_TOKEN];

/// Bearer token and routing id presented with the token method.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential {
    pub token: String,
    pub routing_id: String,
}

impl AuthCredential {
    pub fn new(token: impl Into<String>, routing_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            routing_id: routing_id.into(),
        }
    }
}

impl std::fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCredential")
            .field("token", &"<redacted>")
            .field("routing_id", &self.routing_id)
            .finish()
    }
}

/// Builds `01 | token length (u32 BE) | token | routing id length (u8) | base64(routing id)`.
pub fn encode_auth_request(credential: &AuthCredential) -> Result<BytesMut, TunnelError> {
    let token = credential.token.as_bytes();
    let token_length =
        u32::try_from(token.len()).map_err(|_| TunnelError::TokenTooLong(token.len()))?;

    let routing_id = STANDARD.encode(credential.routing_id.as_bytes());
    if routing_id.len() > MAX_SHORT_FIELD_LENGTH {
        return Err(TunnelError::RoutingIdTooLong(routing_id.len()));
    }

    let mut buf = BytesMut::with_capacity(1 + 4 + token.len() + 1 + routing_id.len());
    buf.put_u8(TOKEN_AUTH_VERSION);
    buf.put_u32(token_length);
    buf.put_slice(token);
    buf.put_u8(routing_id.len() as u8);
    buf.put_slice(routing_id.as_bytes());

    Ok(buf)
}

/// Runs the token handshake over an already connected transport and hands
/// the transport back once the proxy has connected it to the destination.
///
/// Every input is validated before the first byte is written. Any failure
/// drops the transport, the handshake cannot be resumed.
pub async fn negotiate<S>(
    mut stream: S,
    credential: &AuthCredential,
    request: &TunnelRequest,
) -> Result<S, TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let auth_request = encode_auth_request(credential)?;
    let destination = DestinationAddress::from_host(&request.destination_host)?;

    send_greeting(&mut stream).await?;
    trace!("Token method accepted by proxy");

    authenticate(&mut stream, &auth_request).await?;
    debug!("Authenticated for routing id '{}'", credential.routing_id);

    request_connect(&mut stream, &destination, request.destination_port).await?;
    debug!("Tunnel established to {}", request);

    Ok(stream)
}

async fn send_greeting<S>(stream: &mut S) -> Result<(), TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
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

    if response[1] != METHOD_TOKEN {
        return Err(TunnelError::violation(
            ProtocolField::Method,
            METHOD_TOKEN,
            response[1],
        ));
    }

    Ok(())
}

async fn authenticate<S>(stream: &mut S, auth_request: &[u8]) -> Result<(), TunnelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(auth_request).await?;
    stream.flush().await?;

    let mut response = [0u8; 2];
    stream.read_exact(&mut response).await?;

    if response[0] != TOKEN_AUTH_VERSION {
        return Err(TunnelError::violation(
            ProtocolField::AuthVersion,
            TOKEN_AUTH_VERSION,
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

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use tokio::io::duplex;

    use super::*;
    use crate::socks::ConnectOutcome;
    use crate::tunnel::fixture::scripted_proxy;

    const TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.payload.signature";
    const ROUTING_ID: &str = "loc1";
    const ENCODED_ROUTING_ID: &str = "bG9jMQ==";

    fn credential() -> AuthCredential {
        AuthCredential::new(TOKEN, ROUTING_ID)
    }

    fn auth_length() -> usize {
        1 + 4 + TOKEN.len() + 1 + ENCODED_ROUTING_ID.len()
    }

    fn connect_length(request: &TunnelRequest) -> usize {
        let mut buf = BytesMut::new();
        DestinationAddress::from_host(&request.destination_host)
            .unwrap()
            .put_into(&mut buf);
        3 + buf.len() + 2
    }

    fn ipv4_reply(status: u8) -> Vec<u8> {
        vec![0x05, status, 0x01, 0, 0, 0, 0, 0, 0]
    }

    fn success_script(request: &TunnelRequest) -> Vec<(usize, Vec<u8>)> {
        vec![
            (3, vec![0x05, 0x80]),
            (auth_length(), vec![0x01, 0x00]),
            (connect_length(request), ipv4_reply(0x00)),
        ]
    }

    #[test]
    fn test_auth_request_layout() {
        let encoded = encode_auth_request(&credential()).unwrap();

        let mut expected = vec![0x01];
        expected.extend_from_slice(&(TOKEN.len() as u32).to_be_bytes());
        expected.extend_from_slice(TOKEN.as_bytes());
        expected.push(ENCODED_ROUTING_ID.len() as u8);
        expected.extend_from_slice(ENCODED_ROUTING_ID.as_bytes());

        assert_eq!(encoded.to_vec(), expected);
    }

    #[test]
    fn test_auth_request_length() {
        let longest_routing_id = "r".repeat(189);
        let cases = [
            ("", ""),
            ("t", "a"),
            (TOKEN, "region-eu10"),
            ("x", longest_routing_id.as_str()),
        ];

        for (token, routing_id) in cases {
            let credential = AuthCredential::new(token, routing_id);
            let encoded_routing_id = STANDARD.encode(routing_id);
            let encoded = encode_auth_request(&credential).unwrap();

            assert_eq!(
                encoded.len(),
                1 + 4 + token.len() + 1 + encoded_routing_id.len()
            );
        }
    }

    #[test]
    fn test_long_routing_id_is_rejected() {
        // 190 raw bytes encode to 256 base64 characters
        let credential = AuthCredential::new(TOKEN, "r".repeat(190));

        match encode_auth_request(&credential) {
            Err(TunnelError::RoutingIdTooLong(256)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_debug_does_not_print_token() {
        let printed = format!("{:?}", credential());

        assert!(!printed.contains(TOKEN));
        assert!(printed.contains(ROUTING_ID));
    }

    #[tokio::test]
    async fn test_handshake_to_ipv4_destination() {
        let request = TunnelRequest::new("192.168.1.5", 443);
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(server, success_script(&request)));

        let stream = negotiate(client, &credential(), &request).await.unwrap();
        drop(stream);

        let received = proxy.await.unwrap();
        let connect = &received[3 + auth_length()..];

        assert_eq!(&received[..3], &[0x05, 0x01, 0x80]);
        assert_eq!(
            connect,
            &[0x05, 0x01, 0x00, 0x01, 192, 168, 1, 5, 0x01, 0xBB]
        );
    }

    #[tokio::test]
    async fn test_handshake_to_domain_destination() {
        let request = TunnelRequest::new("mydomain.example.com", 443);
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(server, success_script(&request)));

        let stream = negotiate(client, &credential(), &request).await.unwrap();
        drop(stream);

        let received = proxy.await.unwrap();
        let connect = &received[3 + auth_length()..];

        assert_eq!(&connect[..4], &[0x05, 0x01, 0x00, 0x03]);
        assert_eq!(connect[4] as usize, "mydomain.example.com".len());
        assert_eq!(&connect[5..connect.len() - 2], b"mydomain.example.com");
        assert_eq!(&connect[connect.len() - 2..], &[0x01, 0xBB]);
    }

    #[tokio::test]
    async fn test_established_stream_carries_payload() {
        let request = TunnelRequest::new("10.0.0.7", 5432);
        let (client, mut server) = duplex(4096);

        let proxy = tokio::spawn(async move {
            let mut buf = vec![0u8; 3 + auth_length() + connect_length(&request)];
            server.read_exact(&mut buf[..3]).await.unwrap();
            server.write_all(&[0x05, 0x80]).await.unwrap();
            server.read_exact(&mut buf[3..3 + auth_length()]).await.unwrap();
            server.write_all(&[0x01, 0x00]).await.unwrap();
            server.read_exact(&mut buf[3 + auth_length()..]).await.unwrap();
            server.write_all(&ipv4_reply(0x00)).await.unwrap();
            server.write_all(b"hello from destination").await.unwrap();

            let mut echoed = [0u8; 4];
            server.read_exact(&mut echoed).await.unwrap();
            echoed
        });

        let mut stream = negotiate(client, &credential(), &TunnelRequest::new("10.0.0.7", 5432))
            .await
            .unwrap();

        let mut greeting = [0u8; 22];
        stream.read_exact(&mut greeting).await.unwrap();
        stream.write_all(b"ping").await.unwrap();

        assert_eq!(&greeting, b"hello from destination");
        assert_eq!(&proxy.await.unwrap(), b"ping");
    }

    #[tokio::test]
    async fn test_unexpected_method_aborts_before_auth() {
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(server, vec![(3, vec![0x05, 0x02])]));

        let result = negotiate(client, &credential(), &TunnelRequest::new("10.0.0.1", 80)).await;

        match result {
            Err(TunnelError::ProtocolViolation {
                field: ProtocolField::Method,
                expected: 0x80,
                received: 0x02,
            }) => {}
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        assert_eq!(proxy.await.unwrap(), vec![0x05, 0x01, 0x80]);
    }

    #[tokio::test]
    async fn test_unexpected_version_in_greeting() {
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(server, vec![(3, vec![0x04, 0x80])]));

        let result = negotiate(client, &credential(), &TunnelRequest::new("10.0.0.1", 80)).await;

        assert!(matches!(
            result,
            Err(TunnelError::ProtocolViolation {
                field: ProtocolField::Version,
                ..
            })
        ));
        assert_eq!(proxy.await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_token_aborts_before_connect() {
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(
            server,
            vec![(3, vec![0x05, 0x80]), (auth_length(), vec![0x01, 0x01])],
        ));

        let result = negotiate(client, &credential(), &TunnelRequest::new("10.0.0.1", 80)).await;

        assert!(matches!(
            result,
            Err(TunnelError::AuthenticationFailure { status: 0x01 })
        ));
        assert_eq!(proxy.await.unwrap().len(), 3 + auth_length());
    }

    #[tokio::test]
    async fn test_wrong_auth_version_is_protocol_violation() {
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(
            server,
            vec![(3, vec![0x05, 0x80]), (auth_length(), vec![0x05, 0x00])],
        ));

        let result = negotiate(client, &credential(), &TunnelRequest::new("10.0.0.1", 80)).await;

        assert!(matches!(
            result,
            Err(TunnelError::ProtocolViolation {
                field: ProtocolField::AuthVersion,
                received: 0x05,
                ..
            })
        ));
        proxy.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_status_codes_map_to_failures() {
        let expected = [
            (1u8, ConnectOutcome::Failure),
            (2, ConnectOutcome::Forbidden),
            (3, ConnectOutcome::NetworkUnreachable),
            (4, ConnectOutcome::HostUnreachable),
            (5, ConnectOutcome::ConnectionRefused),
            (6, ConnectOutcome::TtlExpired),
            (7, ConnectOutcome::CommandUnsupported),
            (8, ConnectOutcome::AddressUnsupported),
            (9, ConnectOutcome::Unknown(9)),
            (0x7F, ConnectOutcome::Unknown(0x7F)),
        ];

        for (status, outcome) in expected {
            let request = TunnelRequest::new("192.168.1.5", 443);
            let mut script = success_script(&request);
            script[2].1 = ipv4_reply(status);

            let (client, server) = duplex(4096);
            let proxy = tokio::spawn(scripted_proxy(server, script));

            match negotiate(client, &credential(), &request).await {
                Err(TunnelError::ConnectFailure(reason)) => assert_eq!(reason, outcome),
                other => panic!("status {}: unexpected result: {:?}", status, other.map(|_| ())),
            }

            proxy.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_proxy_closing_mid_handshake_is_transport_failure() {
        let (client, mut server) = duplex(4096);
        let proxy = tokio::spawn(async move {
            let mut greeting = [0u8; 3];
            server.read_exact(&mut greeting).await.unwrap();
            server.write_all(&[0x05]).await.unwrap();
        });

        match negotiate(client, &credential(), &TunnelRequest::new("10.0.0.1", 80)).await {
            Err(TunnelError::Transport(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        proxy.await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_routing_id_writes_nothing() {
        let (client, server) = duplex(4096);
        let proxy = tokio::spawn(scripted_proxy(server, vec![]));
        let credential = AuthCredential::new(TOKEN, "r".repeat(300));

        let result = negotiate(client, &credential, &TunnelRequest::new("10.0.0.1", 80)).await;

        assert!(matches!(result, Err(TunnelError::RoutingIdTooLong(_))));
        assert!(proxy.await.unwrap().is_empty());
    }
}
