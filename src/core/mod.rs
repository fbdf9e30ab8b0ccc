pub mod config;
pub mod errors;
pub mod http;
pub mod utils;

pub use config::{
    ExamplesConfig,
    TtsConfig,
};
pub use errors::EnrichError;
