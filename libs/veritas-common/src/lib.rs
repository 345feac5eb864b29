//! Shared building blocks of the verification harness.
//!
//! Everything here is pure: no processes, no I/O. The harness crate owns
//! execution; this crate owns what values mean and how they compare.

pub mod constraints;
pub mod error;
pub mod literal;
pub mod normalize;
pub mod structures;
pub mod types;
pub mod wire;

pub use error::HarnessError;
pub use literal::{Bindings, Value};
