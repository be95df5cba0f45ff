pub mod config;
pub mod extractor;
pub mod models;
pub mod pipeline;
pub mod plugins;
pub mod prober;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use extractor::{StockReading, TextExtractor};
pub use models::{ProbeError, ProbeErrorKind, ProbeOutcome, ProductSpec, StoreIdentity};
pub use pipeline::{PipelineStats, ResultPipeline};
pub use prober::Prober;
pub use scheduler::{InventoryScheduler, PassSummary};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
