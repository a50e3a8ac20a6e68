pub mod common;
pub mod configuration;
pub mod forward;
pub mod probe;
pub mod socks;
pub mod tunnel;
