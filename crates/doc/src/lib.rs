mod core;
mod ops;

pub use crate::core::*;
pub use crate::ops::*;
