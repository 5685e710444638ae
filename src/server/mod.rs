pub mod config;
mod error;
mod http_layers;
pub mod metrics;
mod nutrition;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub(self) use nutrition::make_nutrition_routes;
pub use server::{make_app, run_server};
