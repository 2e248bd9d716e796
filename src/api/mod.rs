pub mod handlers;
pub mod models;
pub mod parsers;
pub mod routes;
pub mod upstream_client;

pub use upstream_client::UpstreamClient;
