pub mod outcome;
pub mod product;

// Re-exports for convenience
pub use outcome::*;
pub use product::*;
