//! spacetraveling Generator Library
//!
//! Turns content store data into HTML pages.
//!
//! # Modules
//!
//! - [`template`] - Compiled page layouts with slot interpolation
//! - [`richtext`] - Structured text to HTML
//! - [`pagination`] - Accumulating "load more" post listings
//! - [`navigation`] - Previous/next post resolution
//! - [`post`] - Everything the post page needs, fetched in one go
//! - [`html`] - Page generation (home, post, not found)
//! - [`build`] - Static build orchestration

pub mod build;
pub mod html;
pub mod navigation;
pub mod pagination;
pub mod post;
pub mod richtext;
pub mod template;

pub use build::{BuildStats, Builder};
pub use html::HtmlGenerator;
pub use pagination::{ListAccumulator, LoadMore, PaginationState};
pub use post::{PostView, load_post};
pub use template::{Layout, Template, TemplateContext, Templates};
