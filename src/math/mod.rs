mod float;
mod float_compare;
mod matrix;

pub use float::*;
pub use float_compare::*;
pub use matrix::*;
