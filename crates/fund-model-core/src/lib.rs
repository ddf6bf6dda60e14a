pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenario")]
pub mod scenario;

#[cfg(feature = "presentation")]
pub mod presentation;

pub use error::FundModelError;
pub use types::*;

/// Standard result type for the validated fund-model entry points
pub type FundModelResult<T> = Result<T, FundModelError>;
