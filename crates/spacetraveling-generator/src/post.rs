//! Everything the post page needs, fetched in one go.

use spacetraveling_cms::{CmsError, ContentClient, PreviewSession};
use spacetraveling_core::{Navigation, PostDocument, reading};
use tracing::{debug, instrument};

use crate::navigation;

/// A post with its neighbours and estimated reading time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub document: PostDocument,
    pub navigation: Navigation,
    /// Minutes, rounded up.
    pub reading_time: u32,
    /// Whether the document was read through a preview reference.
    pub preview: bool,
}

/// Load the post `uid` under the given session.
///
/// Preview sessions read the document through their reference; navigation
/// always reflects published content.
#[instrument(skip(client, session), fields(preview = session.is_preview()))]
pub async fn load_post<C>(
    client: &C,
    uid: &str,
    session: &PreviewSession,
) -> Result<PostView, CmsError>
where
    C: ContentClient + ?Sized,
{
    let document = client.get_by_uid(uid, session.reference()).await?;
    let navigation = navigation::resolve(client, &document.id).await?;
    let reading_time = reading::estimate(&document.content);

    debug!(id = %document.id, reading_time, "loaded post");

    Ok(PostView {
        document,
        navigation,
        reading_time,
        preview: session.is_preview(),
    })
}
