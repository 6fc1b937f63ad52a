mod editable;
mod identity;
pub mod keyboard;
mod leaf;
mod text;

pub use crate::editable::*;
pub use crate::identity::*;
pub use crate::leaf::*;
pub use crate::text::*;
