pub mod config;
pub mod oidc;
pub mod server_runner;
pub mod sessions;
pub mod ui_endpoints;
pub mod utils;
