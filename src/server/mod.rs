pub mod server;

pub use server::{build_dashboard, resolve_transport, start_server, validate_server_settings};
