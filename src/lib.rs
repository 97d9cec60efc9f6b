pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod predictor;
pub mod registry;
pub mod schema;
pub mod server;
pub mod training;

pub use error::{Error, Result};
