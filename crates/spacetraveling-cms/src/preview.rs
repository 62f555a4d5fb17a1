//! Preview session state.
//!
//! A session is either reading published content or previewing a release
//! reference. The hosting request carries the marker as a cookie; leaving
//! preview clears it. The reference is stored URL-safe base64 encoded, so
//! nothing in it can end the cookie value early.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Cookie holding the preview reference.
pub const PREVIEW_COOKIE: &str = "spacetraveling.preview";

/// Normal or preview mode for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewSession {
    /// Published content.
    #[default]
    Normal,
    /// Preview content, optionally pinned to a release reference.
    Preview { reference: Option<String> },
}

impl PreviewSession {
    /// Enter preview mode.
    pub fn enter(reference: Option<String>) -> Self {
        Self::Preview {
            reference: reference.filter(|r| !r.is_empty()),
        }
    }

    /// Leave preview mode.
    pub fn exit(self) -> Self {
        Self::Normal
    }

    /// Whether the "leave preview" affordance should be shown.
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview { .. })
    }

    /// Reference to pass to document fetches; `None` reads published content.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Preview { reference } => reference.as_deref(),
            Self::Normal => None,
        }
    }

    /// Read the session from a `Cookie` request header.
    ///
    /// An empty or undecodable cookie value reads as [`PreviewSession::Normal`].
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let Some(value) = header.and_then(|header| {
            header
                .split(';')
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(name, _)| *name == PREVIEW_COOKIE)
                .map(|(_, value)| value.trim_matches('"'))
        }) else {
            return Self::Normal;
        };

        match decode_reference(value) {
            Some(reference) => Self::enter(Some(reference)),
            None => Self::Normal,
        }
    }

    /// `Set-Cookie` value that stores this session.
    pub fn set_cookie(&self) -> String {
        match self {
            Self::Preview {
                reference: Some(reference),
            } => format!(
                "{PREVIEW_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                URL_SAFE_NO_PAD.encode(reference)
            ),
            Self::Preview { reference: None } | Self::Normal => Self::clear_cookie(),
        }
    }

    /// `Set-Cookie` value that removes the preview marker.
    pub fn clear_cookie() -> String {
        format!("{PREVIEW_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

fn decode_reference(value: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    String::from_utf8(bytes).ok().filter(|r| !r.is_empty())
}
