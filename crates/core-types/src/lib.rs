pub mod enums;
pub mod error;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use enums::{DateWindow, RangeOption, ReturnLabel};
pub use error::CoreError;
pub use series::{PricePoint, TimeSeries};
