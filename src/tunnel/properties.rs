use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::strategy::AuthType;
use super::target::ProxyTarget;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProxyAuthentication {
    Token {
        token: String,
    },
    Basic {
        username: Option<String>,
        #[serde(default)]
        routing_usernames: HashMap<String, String>,
    },
}

impl ProxyAuthentication {
    pub fn auth_type(&self) -> AuthType {
        match self {
            ProxyAuthentication::Token { .. } => AuthType::Token,
            ProxyAuthentication::Basic { .. } => AuthType::PasswordAuthentication,
        }
    }
}

/// Proxy properties resolved for one routing id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyProperties {
    pub proxy: ProxyTarget,
    pub authentication: ProxyAuthentication,
}

impl ProxyProperties {
    pub fn auth_type(&self) -> AuthType {
        self.authentication.auth_type()
    }

    pub fn token(&self) -> Option<&str> {
        match &self.authentication {
            ProxyAuthentication::Token { token } => Some(token),
            ProxyAuthentication::Basic { .. } => None,
        }
    }

    /// Username for the routing id, falling back to the default username.
    pub fn username_for(&self, routing_id: &str) -> Option<&str> {
        match &self.authentication {
            ProxyAuthentication::Basic {
                username,
                routing_usernames,
            } => routing_usernames
                .get(routing_id)
                .or(username.as_ref())
                .map(String::as_str),
            ProxyAuthentication::Token { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum ResolveError {
    UnknownRoutingId(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::UnknownRoutingId(id) => {
                write!(f, "No proxy properties for routing id '{}'", id)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Source of proxy properties keyed by routing id.
pub trait ProxyPropertiesResolver {
    fn resolve(&self, routing_id: &str) -> Result<ProxyProperties, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_properties() -> ProxyProperties {
        ProxyProperties {
            proxy: ProxyTarget::new("127.0.0.1", 20004),
            authentication: ProxyAuthentication::Basic {
                username: Some("default-user".to_owned()),
                routing_usernames: HashMap::from([(
                    "loc-eu".to_owned(),
                    "eu-user".to_owned(),
                )]),
            },
        }
    }

    #[test]
    fn test_username_is_looked_up_per_routing_id() {
        let properties = basic_properties();

        assert_eq!(properties.username_for("loc-eu"), Some("eu-user"));
        assert_eq!(properties.username_for("loc-us"), Some("default-user"));
        assert_eq!(properties.token(), None);
        assert_eq!(properties.auth_type(), AuthType::PasswordAuthentication);
    }

    #[test]
    fn test_token_properties() {
        let properties = ProxyProperties {
            proxy: ProxyTarget::new("127.0.0.1", 20003),
            authentication: ProxyAuthentication::Token {
                token: "jwt".to_owned(),
            },
        };

        assert_eq!(properties.token(), Some("jwt"));
        assert_eq!(properties.username_for("loc-eu"), None);
        assert_eq!(properties.auth_type(), AuthType::Token);
    }

    #[test]
    fn test_authentication_is_tagged_by_type() {
        let parsed: ProxyAuthentication =
            serde_json::from_str(r#"{ "type": "basic", "username": "u" }"#).unwrap();

        assert_eq!(
            parsed,
            ProxyAuthentication::Basic {
                username: Some("u".to_owned()),
                routing_usernames: HashMap::new(),
            }
        );
    }
}
