pub mod traits;
pub mod sinks;

pub use sinks::PrometheusSink;
pub use traits::{DriverError, ElementHandle, MetricsSink, PageDriver};
