//! spacetraveling CMS client
//!
//! Access to the headless content store holding the blog posts.
//!
//! # Modules
//!
//! - [`client`] - The [`ContentClient`] trait and its request/response types
//! - [`prismic`] - HTTP implementation against a Prismic-compatible REST API
//! - [`memory`] - In-process store backed by a date-sorted index
//! - [`preview`] - Preview session state (normal vs. preview reference)
//!
//! Clients are constructed once and passed explicitly to whoever needs them;
//! there is no process-wide client.

pub mod client;
pub mod error;
pub mod memory;
pub mod preview;
pub mod prismic;

mod wire;

pub use client::{AdjacentPost, ContentClient, Cursor, Direction, PostPage};
pub use error::{CmsError, Result};
pub use memory::{Fixtures, MemoryStore};
pub use preview::PreviewSession;
pub use prismic::PrismicClient;
