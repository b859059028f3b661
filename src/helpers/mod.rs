//! Helper functions for pages, feeds and templates

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
