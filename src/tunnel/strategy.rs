/// Authentication type declared by the proxy properties of a routing id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthType {
    PasswordAuthentication,
    Token,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunnelStrategy {
    Token,
    BasicCredential,
}

pub fn select_strategy(auth_type: AuthType) -> TunnelStrategy {
    match auth_type {
        AuthType::PasswordAuthentication => TunnelStrategy::BasicCredential,
        AuthType::Token => TunnelStrategy::Token,
    }
}
