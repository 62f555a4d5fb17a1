//! Site configuration management.

use std::path::Path;

use chrono::Locale;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Largest page size the CMS accepts for a single query.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main configuration structure for spacetraveling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content store connection settings.
    pub cms: CmsConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Image loading settings.
    #[serde(default)]
    pub images: ImageConfig,

    /// Comment widget settings. Comments are disabled when absent.
    #[serde(default)]
    pub comments: Option<CommentsConfig>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,

    /// Locale used for formatted dates (e.g., "pt_BR").
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Content store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// API root of the repository (e.g., "https://my-repo.cdn.prismic.io/api/v2").
    pub endpoint: String,

    /// Access token for private repositories.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Custom type holding blog posts.
    #[serde(default = "default_document_type")]
    pub document_type: String,

    /// Number of posts on each listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Page size for the query that enumerates prebuilt post paths.
    #[serde(default = "default_paths_page_size")]
    pub paths_page_size: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Maximum number of accumulated listing pages to prerender.
    #[serde(default = "default_max_list_pages")]
    pub max_list_pages: usize,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Image configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Quality parameter appended to banner URLs (1-100).
    #[serde(default = "default_image_quality")]
    pub quality: u8,
}

/// utterances comment widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    /// GitHub repository receiving the comment issues ("owner/name").
    pub repo: String,

    /// How pages are matched to issues.
    #[serde(default = "default_issue_term")]
    pub issue_term: String,

    /// Widget theme.
    #[serde(default = "default_comments_theme")]
    pub theme: String,
}

// Default value functions
fn default_locale() -> String {
    "pt_BR".to_string()
}

fn default_document_type() -> String {
    "posts".to_string()
}

fn default_page_size() -> u32 {
    2
}

fn default_paths_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_max_list_pages() -> usize {
    10
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_image_quality() -> u8 {
    75
}

fn default_issue_term() -> String {
    "pathname".to_string()
}

fn default_comments_theme() -> String {
    "dark-blue".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_list_pages: default_max_list_pages(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            quality: default_image_quality(),
        }
    }
}

impl CmsConfig {
    /// Create a configuration for the given endpoint with default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: None,
            document_type: default_document_type(),
            page_size: default_page_size(),
            paths_page_size: default_paths_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Minimal configuration for a site backed by the given CMS endpoint.
    pub fn new(
        title: impl Into<String>,
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                base_url: base_url.into(),
                description: None,
                locale: default_locale(),
            },
            cms: CmsConfig::new(endpoint),
            build: BuildConfig::default(),
            server: ServerConfig::default(),
            images: ImageConfig::default(),
            comments: None,
        }
    }

    /// Load configuration from a TOML file, then apply
    /// `SPACETRAVELING__SECTION__KEY` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CoreError::ConfigNotFound(path.to_path_buf()));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix("SPACETRAVELING")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::invalid("site.title", "cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::invalid("site.base_url", "cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if !self.cms.endpoint.starts_with("http://") && !self.cms.endpoint.starts_with("https://")
        {
            return Err(CoreError::invalid("cms.endpoint", "must be an http(s) URL"));
        }

        if self.cms.page_size == 0 || self.cms.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::invalid(
                "cms.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        if self.cms.paths_page_size == 0 || self.cms.paths_page_size > MAX_PAGE_SIZE {
            return Err(CoreError::invalid(
                "cms.paths_page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        if !(1..=100).contains(&self.images.quality) {
            return Err(CoreError::invalid("images.quality", "must be between 1 and 100"));
        }

        if let Some(comments) = &self.comments
            && !comments.repo.contains('/')
        {
            return Err(CoreError::invalid("comments.repo", "must be in the form owner/name"));
        }

        self.date_locale()?;

        Ok(())
    }

    /// Locale used when formatting publication dates.
    pub fn date_locale(&self) -> Result<Locale> {
        Locale::try_from(self.site.locale.as_str())
            .map_err(|_| CoreError::Locale(self.site.locale.clone()))
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Site-relative URL of a post.
pub fn post_path(uid: &str) -> String {
    format!("/post/{uid}")
}

/// Whether `uid` is a plain slug: ASCII letters, digits, `-` and `_`.
///
/// Only such uids become output paths or redirect targets.
pub fn is_valid_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "spacetraveling."
base_url = "https://example.com"
description = "Um blog sobre viagens espaciais"
locale = "en_US"

[cms]
endpoint = "https://spacetraveling.cdn.prismic.io/api/v2"
access_token = "secret"
page_size = 5
paths_page_size = 50
timeout_secs = 3

[build]
output_dir = "dist"
max_list_pages = 4

[server]
bind_addr = "0.0.0.0:8080"

[images]
quality = 60

[comments]
repo = "owner/blog-comments"
theme = "github-light"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.title, "spacetraveling.");
        assert_eq!(config.site.locale, "en_US");
        assert_eq!(
            config.cms.endpoint,
            "https://spacetraveling.cdn.prismic.io/api/v2"
        );
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 5);
        assert_eq!(config.cms.paths_page_size, 50);
        assert_eq!(config.cms.timeout_secs, 3);
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.max_list_pages, 4);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.images.quality, 60);

        let comments = config.comments.expect("comments configured");
        assert_eq!(comments.repo, "owner/blog-comments");
        assert_eq!(comments.issue_term, "pathname");
        assert_eq!(comments.theme, "github-light");
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        let minimal_config = r#"
[site]
title = "Minimal"
base_url = "https://example.com"

[cms]
endpoint = "https://repo.cdn.prismic.io/api/v2"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.locale, "pt_BR");
        assert_eq!(config.cms.page_size, 2);
        assert_eq!(config.cms.paths_page_size, 100);
        assert_eq!(config.build.output_dir, "public");
        assert_eq!(config.build.max_list_pages, 10);
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.images.quality, 75);
        assert!(config.comments.is_none());
    }

    #[test]
    fn test_url_for() {
        let config = Config::new("Test", "https://example.com/", "https://repo.cdn.prismic.io/api/v2");

        assert_eq!(
            config.url_for("/post/hello"),
            "https://example.com/post/hello"
        );
        assert_eq!(config.url_for("post/hello"), "https://example.com/post/hello");
        assert_eq!(post_path("hello"), "/post/hello");
    }

    #[test]
    fn test_config_validation_empty_title() {
        let config = Config::new("", "https://example.com", "https://repo.cdn.prismic.io/api/v2");
        let err = config.validate().unwrap_err();
        assert_eq!(err.key(), Some("site.title"));
    }

    #[test]
    fn test_config_validation_bad_endpoint() {
        let config = Config::new("Test", "https://example.com", "repo.cdn.prismic.io");
        let err = config.validate().unwrap_err();
        assert_eq!(err.key(), Some("cms.endpoint"));
    }

    #[test]
    fn test_config_validation_page_size() {
        let mut config =
            Config::new("Test", "https://example.com", "https://repo.cdn.prismic.io/api/v2");
        config.cms.paths_page_size = 101;
        assert!(config.validate().is_err());

        config.cms.paths_page_size = 100;
        config.cms.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_comments_repo() {
        let mut config =
            Config::new("Test", "https://example.com", "https://repo.cdn.prismic.io/api/v2");
        config.comments = Some(CommentsConfig {
            repo: "no-owner".to_string(),
            issue_term: default_issue_term(),
            theme: default_comments_theme(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_unknown_locale() {
        let mut config =
            Config::new("Test", "https://example.com", "https://repo.cdn.prismic.io/api/v2");
        config.site.locale = "xx_YY".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Locale(_))));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(CoreError::ConfigNotFound(_))));
    }

    #[test]
    fn test_config_parse_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[site\ntitle = ").expect("write");

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(CoreError::ConfigSource(_))));
    }

    #[test]
    fn test_valid_uid() {
        assert!(is_valid_uid("como-utilizar-hooks"));
        assert!(is_valid_uid("post_2"));
        for uid in ["", "..", "../../../escaped", "a/b", "a b", "%2F", "//evil.example"] {
            assert!(!is_valid_uid(uid), "{uid}");
        }
    }
}
