//! spacetraveling Core Library
//!
//! Post types, configuration, read-time estimation, and error handling shared by
//! the CMS client, the site generator and the CLI.

pub mod config;
pub mod content;
pub mod error;
pub mod reading;

pub use config::Config;
pub use content::{
    BlockKind, ContentSection, Navigation, PostDocument, PostLink, PostSummary, RichTextBlock,
    Span, SpanKind,
};
pub use error::{CoreError, Result};
pub use reading::{ROUNDING, Rounding, WORDS_PER_MINUTE};
