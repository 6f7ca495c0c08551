//! Metric computation engine
//!
//! Pure functions turning method bodies and type layouts into the numbers
//! the size rules compare against their thresholds.

mod fields;
mod size;

pub use fields::{field_weight, FieldSelector};
pub use size::{instruction_count, logical_line_count};
