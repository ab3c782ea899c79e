//! orderstats: purchase order analysis from a CSV file
//!
//! Orders are loaded into a typed table, enriched with an externally supplied
//! column, split into low and high spenders around a threshold, and summarized
//! (extremes, mean amount, earliest order, busiest month).

pub mod cli;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod transform;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{read_orders, Order, Table};
pub use error::TransformError;
pub use pipeline::{Pipeline, PipelineConfig, RunReport};
pub use stats::{summarize, Summary};
pub use transform::{enrich, split};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
