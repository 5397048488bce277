//! Running statistics over one field of a comparison group
//!
//! Accumulators are immutable values: `accumulate` consumes the current state
//! and returns the next one. Absent values never change the state, so sparse
//! optional fields average only over the records that supplied them.

pub mod categorical;
pub mod numeric;

pub use categorical::CategoricalAccumulator;
pub use numeric::NumericAccumulator;
