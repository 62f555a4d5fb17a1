//! Previous/next post resolution.

use spacetraveling_cms::{AdjacentPost, CmsError, ContentClient, Direction};
use spacetraveling_core::{Navigation, PostLink};
use tracing::debug;

/// Resolve the posts published immediately before and after `document_id`.
///
/// Both lookups are issued concurrently. A neighbour without a title yields
/// no link.
pub async fn resolve<C>(client: &C, document_id: &str) -> Result<Navigation, CmsError>
where
    C: ContentClient + ?Sized,
{
    let (previous, next) = tokio::join!(
        client.adjacent(document_id, Direction::Descending),
        client.adjacent(document_id, Direction::Ascending),
    );

    let navigation = Navigation {
        previous: previous?.as_ref().and_then(link),
        next: next?.as_ref().and_then(link),
    };

    debug!(
        document_id,
        previous = ?navigation.previous.as_ref().map(|l| &l.uid),
        next = ?navigation.next.as_ref().map(|l| &l.uid),
        "resolved navigation"
    );
    Ok(navigation)
}

fn link(post: &AdjacentPost) -> Option<PostLink> {
    PostLink::new(&post.uid, post.title.as_deref()?)
}
