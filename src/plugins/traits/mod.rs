pub mod driver;
pub mod sink;

pub use driver::{DriverError, ElementHandle, PageDriver};
pub use sink::MetricsSink;
