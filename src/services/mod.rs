pub mod queries;
pub mod server;
pub mod sync;
