pub mod prometheus;

pub use prometheus::PrometheusSink;
