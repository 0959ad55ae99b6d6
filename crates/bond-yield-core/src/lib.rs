pub mod error;
pub mod fixed_income;
pub mod types;
pub mod validation;

pub use error::{BondError, FieldError};
pub use types::*;

/// Standard result type for all bond analytics operations
pub type BondResult<T> = Result<T, BondError>;
