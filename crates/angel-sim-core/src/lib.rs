pub mod distribution;
pub mod error;
pub mod investment;
pub mod model;
pub mod simulation;
pub mod time_value;
pub mod types;

pub use error::AngelSimError;
pub use types::*;

/// Standard result type for all angel-sim operations
pub type AngelSimResult<T> = Result<T, AngelSimError>;
