use bytes::{BufMut, BytesMut};

use super::{DestinationAddress, COMMAND_CONNECT, RESERVED, SOCKS5_VERSION};

pub fn encode_connect_request(address: &DestinationAddress, port: u16) -> BytesMut {
    let mut buf = BytesMut::with_capacity(262);
    buf.put_u8(SOCKS5_VERSION);
    buf.put_u8(COMMAND_CONNECT);
    buf.put_u8(RESERVED);
    address.put_into(&mut buf);
    buf.put_u16(port);
    buf
}
