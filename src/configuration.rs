use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};
use std::path::Path;
use std::time::Duration;

use log::error;
use serde::{Deserialize, Serialize};

use crate::common::validate::{Validatable, Validation};
use crate::common::validate_rules::{
    HostAddressMustBeValid, IpAddressMustBeValid, MustBeGreaterThanZero, MustNotBeEmpty,
    PortMustBeValid, RoutingIdMustFit,
};
use crate::tunnel::{
    ProxyAuthentication, ProxyProperties, ProxyPropertiesResolver, ProxyTarget, ResolveError,
    TunnelRequest,
};

pub const DEFAULT_CONFIGURATION_PATH: &str = "socksbridge.json";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BridgeConfiguration {
    pub proxy_host: String,
    pub proxy_port: u16,
    pub authentication: ProxyAuthentication,
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub forwards: Vec<ForwardConfiguration>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ForwardConfiguration {
    pub bind_address: Option<String>,
    pub bind_port: u16,
    pub routing_id: String,
    pub destination_host: String,
    pub destination_port: u16,
}

impl BridgeConfiguration {
    pub fn proxy_target(&self) -> ProxyTarget {
        ProxyTarget::new(self.proxy_host.clone(), self.proxy_port)
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout_or(None)
    }

    /// Connect timeout with an optional override in seconds taking precedence.
    pub fn connect_timeout_or(&self, override_secs: Option<u64>) -> Duration {
        Duration::from_secs(
            override_secs
                .or(self.connect_timeout_secs)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}

impl ForwardConfiguration {
    pub fn bind_address(&self) -> String {
        self.bind_address
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned())
    }

    pub fn tunnel_request(&self) -> TunnelRequest {
        TunnelRequest::new(self.destination_host.clone(), self.destination_port)
    }
}

impl ProxyPropertiesResolver for BridgeConfiguration {
    fn resolve(&self, routing_id: &str) -> Result<ProxyProperties, ResolveError> {
        let properties = ProxyProperties {
            proxy: self.proxy_target(),
            authentication: self.authentication.clone(),
        };

        if let ProxyAuthentication::Basic { .. } = properties.authentication {
            if properties.username_for(routing_id).is_none() {
                return Err(ResolveError::UnknownRoutingId(routing_id.to_owned()));
            }
        }

        Ok(properties)
    }
}

impl Validatable for BridgeConfiguration {
    fn validate(&self, result: &mut Validation) {
        result.validate_rule::<HostAddressMustBeValid, String>("proxy_host", &self.proxy_host);
        result.validate_rule::<PortMustBeValid, u16>("proxy_port", &self.proxy_port);

        if let Some(timeout) = &self.connect_timeout_secs {
            result.validate_rule::<MustBeGreaterThanZero, u64>("connect_timeout_secs", timeout);
        }

        result.validate_child("authentication", &self.authentication);

        for (index, forward) in self.forwards.iter().enumerate() {
            result.push_breadcrumb("forwards");
            result.validate_child(&index.to_string(), forward);
            result.pop_breadcrumb();

            if let ProxyAuthentication::Basic { .. } = self.authentication {
                if self.resolve(&forward.routing_id).is_err() {
                    result.add_error(&format!(
                        "No username is configured for routing id '{}'.",
                        forward.routing_id
                    ));
                }
            }
        }
    }
}

impl Validatable for ProxyAuthentication {
    fn validate(&self, result: &mut Validation) {
        match self {
            ProxyAuthentication::Token { token } => {
                result.validate_rule::<MustNotBeEmpty, String>("token", token);
            }
            ProxyAuthentication::Basic {
                username,
                routing_usernames,
            } => {
                if username.is_none() && routing_usernames.is_empty() {
                    result.add_error("Either username or routing_usernames must be set.");
                }

                if let Some(username) = username {
                    result.validate_rule::<MustNotBeEmpty, String>("username", username);
                }

                for (routing_id, username) in routing_usernames {
                    result.validate_rule::<RoutingIdMustFit, String>("routing_usernames", routing_id);
                    result.validate_rule::<MustNotBeEmpty, String>(routing_id, username);
                }
            }
        }
    }
}

impl Validatable for ForwardConfiguration {
    fn validate(&self, result: &mut Validation) {
        if let Some(bind_address) = &self.bind_address {
            result.validate_rule::<IpAddressMustBeValid, String>("bind_address", bind_address);
        }

        result.validate_rule::<PortMustBeValid, u16>("bind_port", &self.bind_port);
        result.validate_rule::<RoutingIdMustFit, String>("routing_id", &self.routing_id);
        result.validate_rule::<HostAddressMustBeValid, String>(
            "destination_host",
            &self.destination_host,
        );
        result.validate_rule::<PortMustBeValid, u16>("destination_port", &self.destination_port);
    }
}

pub fn parse_configuration(path: &Path) -> Result<BridgeConfiguration, Error> {
    let file = File::open(path).map_err(|e| {
        error!("Could not open configuration '{}': {}", path.display(), e);
        e
    })?;

    let configuration: BridgeConfiguration = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| {
            error!("Could not parse configuration '{}': {}", path.display(), e);
            Error::new(ErrorKind::InvalidData, e)
        })?;

    let validation = Validation::validate(&configuration);

    if !validation.is_valid() {
        for config_error in validation.errors() {
            error!("{}", config_error);
        }

        return Err(Error::new(
            ErrorKind::InvalidData,
            "Configuration file contains errors.",
        ));
    }

    Ok(configuration)
}
