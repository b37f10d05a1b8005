//! vh-core: stable foundation for vesselheat.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + validation and spacing helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VhError, VhResult};
pub use numeric::*;
pub use units::*;
