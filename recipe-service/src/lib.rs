pub mod config;
pub mod models;
pub mod providers;
pub mod service;

pub use config::{ConfigError, ImageConfig, LogFormat, ServiceConfig};
pub use models::*;
pub use providers::{OpenAiImageGenerator, OpenRouterCompletion};
pub use service::{AppState, build_router, create_app};
