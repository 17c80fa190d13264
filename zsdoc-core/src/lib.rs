pub mod assets;
pub mod builder;
pub mod config;
pub mod content;
pub mod context;
pub mod helpers;
pub mod highlight;
pub mod site_map;
pub mod template;

// Re-export main types
pub use builder::{BuildError, BuildReport, Site, SiteBuilder, build_site};
pub use content::DocumentationContent;
pub use context::PageContext;
pub use site_map::{FlatSiteMap, PageInfo, SiteNode};
pub use template::{TemplateError, TemplateRenderer};
