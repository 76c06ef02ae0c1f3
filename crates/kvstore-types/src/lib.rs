//! Status values shared by the engine layer.

#[allow(non_snake_case)]
pub mod status_code;

pub mod status;

pub use status::Status;
pub use status_code::*;

/// Result type of engine operations.
pub type Result<T> = std::result::Result<T, Status>;
