pub mod error;
pub mod server;

pub use server::start_http_server;
