//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::I18nConfig;
pub use site::PrefixStrategy;
pub use site::SiteConfig;
pub use site::SitemapConfig;
pub use site::TechItem;
