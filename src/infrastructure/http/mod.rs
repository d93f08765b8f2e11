//! HTTP Infrastructure - serve 模式

mod handlers;
mod server;
mod state;

pub use server::HttpServer;
pub use state::AppState;
