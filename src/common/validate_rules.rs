use base64::{engine::general_purpose::STANDARD, Engine};

use crate::socks::MAX_SHORT_FIELD_LENGTH;

use super::validate::{Rule, Validation};

pub struct PortMustBeValid;

impl Rule<u16> for PortMustBeValid {
    fn validate(field: &str, value: &u16, result: &mut Validation) {
        if *value == 0 {
            result.add_field_error(field, "Port cannot be zero.");
        }
    }
}

pub struct HostAddressMustBeValid;

impl Rule<String> for HostAddressMustBeValid {
    fn validate(field: &str, value: &String, result: &mut Validation) {
        if value.parse::<std::net::IpAddr>().is_ok() {
            return;
        }

        if value.is_empty() {
            result.add_field_error(field, "Value cannot be empty.");
        } else if value.len() > MAX_SHORT_FIELD_LENGTH {
            result.add_field_error(field, "Value cannot be longer than 255 bytes.");
        } else if !value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '.' || c == '_')
        {
            result.add_field_error(
                field,
                "Can only contain alphanumeric characters, hyphens, underscores and periods.",
            );
        }
    }
}

pub struct IpAddressMustBeValid;

impl Rule<String> for IpAddressMustBeValid {
    fn validate(field: &str, value: &String, result: &mut Validation) {
        if value.parse::<std::net::IpAddr>().is_err() {
            result.add_field_error(field, "Value must be a valid IP address.");
        }
    }
}

pub struct MustNotBeEmpty;

impl Rule<String> for MustNotBeEmpty {
    fn validate(field: &str, value: &String, result: &mut Validation) {
        if value.trim().is_empty() {
            result.add_field_error(field, "Value cannot be empty.");
        }
    }
}

pub struct MustBeGreaterThanZero;

impl Rule<u64> for MustBeGreaterThanZero {
    fn validate(field: &str, value: &u64, result: &mut Validation) {
        if *value == 0 {
            result.add_field_error(field, "Value must be greater than zero.");
        }
    }
}

/// Routing ids travel base64 encoded behind a single length byte.
pub struct RoutingIdMustFit;

impl Rule<String> for RoutingIdMustFit {
    fn validate(field: &str, value: &String, result: &mut Validation) {
        if value.is_empty() {
            result.add_field_error(field, "Value cannot be empty.");
            return;
        }

        let encoded_length = STANDARD.encode(value.as_bytes()).len();

        if encoded_length > MAX_SHORT_FIELD_LENGTH {
            result.add_field_error(
                field,
                &format!(
                    "Encoded routing id is {} bytes, at most 255 bytes are allowed.",
                    encoded_length
                ),
            );
        }
    }
}
