pub mod client;

pub use client::{LoggingClient, QueryParams};
