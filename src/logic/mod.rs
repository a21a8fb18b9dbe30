pub mod json_text;
pub mod validate;
pub mod variants;

pub use json_text::*;
pub use validate::*;
pub use variants::*;
