pub mod cli;
pub mod data_bridge;
pub mod logger;
pub mod tasks;
pub mod tcp_client;
pub mod validate;
pub mod validate_rules;
