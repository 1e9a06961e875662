//! Transport layer for the Shadow Regent client.

pub mod http_gateway;

pub use http_gateway::HttpGameGateway;
