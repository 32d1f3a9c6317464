pub mod rest;

pub use rest::{routes, ApiConfig, AppState, RestApi};
