#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod page;
pub mod payload;
pub mod pipeline;

pub use config::Config;
pub use pipeline::{RunReport, run};
