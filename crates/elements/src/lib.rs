mod elements;
mod options;
mod parse;
mod registry;
mod render;
mod serialize;
mod token;

pub use crate::elements::{builtin_handlers, escape_text, text_to_markdown};
pub use crate::options::*;
pub use crate::parse::*;
pub use crate::registry::*;
pub use crate::render::*;
pub use crate::serialize::*;
pub use crate::token::*;
