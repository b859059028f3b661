//! Content module - post documents, their schema and the built collection

mod collection;
pub mod collector;
mod error;
mod frontmatter;
mod markdown;
mod post;
pub mod schema;

pub use collection::{Collection, ContentStore};
pub use collector::ContentCollector;
pub use error::ContentError;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::{MarkdownError, MarkdownRenderer};
pub use post::{reading_time, PostBody, PostRecord};
