pub mod book;
pub mod cache;
pub mod client_key;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod repository;
pub mod response;
pub mod server;
pub mod service;
pub mod throttle;
pub mod validation;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use server::create_app;
pub use throttle::RequestThrottle;
