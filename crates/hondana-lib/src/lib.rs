pub mod error;
pub mod models;
pub mod prelude;

/// Version of the catalog models, logged by the client at startup
pub static LIB_VERSION: &str = env!("CARGO_PKG_VERSION");
