pub mod config;
pub mod error;
pub mod pattern;
pub mod score;

pub use config::Config;
pub use error::*;
pub use pattern::*;
pub use score::*;
