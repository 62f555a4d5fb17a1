//! HTML generation for the blog pages.
//!
//! Converts listing state and loaded posts into final HTML pages using
//! templates. All text coming from the content store is escaped here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Locale, Utc};
use spacetraveling_core::{
    Config, CoreError, Navigation, PostLink, PostSummary,
    config::{is_valid_uid, post_path},
};
use thiserror::Error;
use tracing::debug;

use crate::{
    pagination::PaginationState,
    post::PostView,
    richtext,
    template::{Layout, TemplateContext, TemplateError, Templates},
};

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Unusable site configuration.
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    templates: Templates,
    config: Config,
    locale: Locale,
}

impl HtmlGenerator {
    /// Create a new HTML generator with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let locale = config.date_locale()?;
        Ok(Self {
            templates: Templates::builtin()?,
            config,
            locale,
        })
    }

    /// Site configuration the pages are rendered with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the post listing page showing everything accumulated so far.
    ///
    /// `page_number` is the number of pages in `state`; the "load more" link
    /// points at the following one while a cursor remains.
    pub fn generate_home(&self, state: &PaginationState, page_number: usize) -> Result<String> {
        debug!(posts = state.items.len(), page_number, "generating listing page");

        let items: String = if state.items.is_empty() {
            r#"<p class="empty">Nenhum post publicado.</p>"#.to_string()
        } else {
            state
                .items
                .iter()
                .map(|post| self.list_item_html(post))
                .collect()
        };

        let load_more = state.has_more().then(|| {
            format!(
                r#"<a href="/page/{}" class="load-more">Carregar mais posts</a>"#,
                page_number + 1
            )
        });

        let ctx = TemplateContext::new()
            .with_var("items", items)
            .with_opt("load_more", load_more);
        let inner_html = self.templates.render(Layout::Home, &ctx)?;

        let canonical = if page_number <= 1 {
            self.config.url_for("/")
        } else {
            self.config.url_for(&format!("/page/{page_number}"))
        };
        let title = format!("Home | {}", self.config.site.title);
        self.wrap(
            &title,
            self.config.site.description.as_deref(),
            &canonical,
            &inner_html,
        )
    }

    /// Generate a post page.
    pub fn generate_post(&self, view: &PostView) -> Result<String> {
        let post = &view.document;
        debug!(uid = %post.uid, preview = view.preview, "generating post page");

        let banner = post.banner_url.as_deref().map(|url| {
            format!(
                r#"<img class="banner" src="{}" alt="{}" />"#,
                escape_html(&banner_src(url, self.config.images.quality)),
                escape_html(&post.title)
            )
        });

        let edited = post.last_publication_date.map(|date| {
            format!(
                r#"<p class="edited">* editado em {}, às {}</p>"#,
                self.format_date(date),
                date.format("%H:%M")
            )
        });

        let content: String = post
            .content
            .iter()
            .map(|section| {
                format!(
                    "<section>\n<h2>{}</h2>\n{}</section>\n",
                    escape_html(&section.heading),
                    richtext::render(&section.body)
                )
            })
            .collect();

        let ctx = TemplateContext::new()
            .with_var("title", escape_html(&post.title))
            .with_var("author", escape_html(&post.author))
            .with_var("reading_time", view.reading_time.to_string())
            .with_var("content", content)
            .with_opt("banner", banner)
            .with_opt("date_html", post.first_publication_date.map(|d| self.time_html(d)))
            .with_opt("edited_html", edited)
            .with_opt("navigation", navigation_html(&view.navigation))
            .with_opt("comments", self.comments_html())
            .with_opt("preview", view.preview.then(|| preview_html(&post.uid)));
        let inner_html = self.templates.render(Layout::Post, &ctx)?;

        let description = (!post.subtitle.is_empty()).then_some(post.subtitle.as_str());
        self.wrap(
            &post.title,
            description,
            &self.config.url_for(&post_path(&post.uid)),
            &inner_html,
        )
    }

    /// Generate the not-found page.
    ///
    /// `preview_slug` is set when the visitor is in preview mode; the page then
    /// offers the way out of it, returning to that post.
    pub fn generate_not_found(&self, preview_slug: Option<&str>) -> Result<String> {
        self.generate_message(
            "Página não encontrada",
            "O post que você procura não existe ou ainda não foi publicado.",
            "/404.html",
            preview_slug,
        )
    }

    /// Generate a page reporting a failure to load content.
    pub fn generate_error(&self, message: &str, preview_slug: Option<&str>) -> Result<String> {
        self.generate_message("Algo deu errado", message, "/", preview_slug)
    }

    fn generate_message(
        &self,
        heading: &str,
        message: &str,
        path: &str,
        preview_slug: Option<&str>,
    ) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("heading", escape_html(heading))
            .with_var("message", escape_html(message))
            .with_opt("preview", preview_slug.map(preview_html));
        let inner_html = self.templates.render(Layout::Message, &ctx)?;
        self.wrap(heading, None, &self.config.url_for(path), &inner_html)
    }

    /// Wrap an inner fragment in the base layout.
    fn wrap(
        &self,
        title: &str,
        description: Option<&str>,
        canonical_url: &str,
        content: &str,
    ) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("lang", self.config.site.locale.replace('_', "-"))
            .with_var("title", escape_html(title))
            .with_opt("description", description.map(escape_html))
            .with_var("canonical_url", escape_html(canonical_url))
            .with_var("site_title", escape_html(&self.config.site.title))
            .with_var("content", content);

        Ok(self.templates.render(Layout::Base, &ctx)?)
    }

    /// Generate HTML for a post card on the listing page.
    fn list_item_html(&self, post: &PostSummary) -> String {
        let date_html = post
            .first_publication_date
            .map(|d| self.time_html(d))
            .unwrap_or_default();

        format!(
            r#"<a href="{}" class="post-card">
    <strong>{}</strong>
    <p>{}</p>
    <div class="info">
        {}
        <span class="author">{}</span>
    </div>
</a>
"#,
            escape_html(&post_path(&post.uid)),
            escape_html(&post.title),
            escape_html(&post.subtitle),
            date_html,
            escape_html(&post.author)
        )
    }

    fn time_html(&self, date: DateTime<Utc>) -> String {
        format!(
            r#"<time datetime="{}">{}</time>"#,
            date.to_rfc3339(),
            self.format_date(date)
        )
    }

    /// Format a date as `dd MMM yyyy` in the configured locale.
    pub fn format_date(&self, date: DateTime<Utc>) -> String {
        date.format_localized("%d %b %Y", self.locale).to_string()
    }

    fn comments_html(&self) -> Option<String> {
        let comments = self.config.comments.as_ref()?;
        Some(format!(
            r#"<div id="comments-uterances"><script src="https://utteranc.es/client.js" crossorigin="anonymous" async repo="{}" issue-term="{}" theme="{}"></script></div>"#,
            escape_html(&comments.repo),
            escape_html(&comments.issue_term),
            escape_html(&comments.theme)
        ))
    }

    /// Output path for the listing page with `page_number` pages.
    pub fn list_output_path(&self, output_dir: &Path, page_number: usize) -> PathBuf {
        if page_number <= 1 {
            output_dir.join("index.html")
        } else {
            output_dir
                .join("page")
                .join(page_number.to_string())
                .join("index.html")
        }
    }

    /// Output path for a post page; `None` when the uid is not a plain slug.
    pub fn post_output_path(&self, output_dir: &Path, uid: &str) -> Option<PathBuf> {
        is_valid_uid(uid).then(|| output_dir.join("post").join(uid).join("index.html"))
    }
}

/// Banner URL with the image quality parameter appended.
pub fn banner_src(url: &str, quality: u8) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}q={quality}")
}

fn navigation_html(navigation: &Navigation) -> Option<String> {
    if navigation.is_empty() {
        return None;
    }

    let link = |post: &Option<PostLink>, class: &str, label: &str| {
        post.as_ref()
            .map(|p| {
                format!(
                    r#"<a href="{}" class="{class}"><div>{}</div><span>{label}</span></a>"#,
                    escape_html(&post_path(&p.uid)),
                    escape_html(&p.title)
                )
            })
            .unwrap_or_default()
    };

    Some(format!(
        r#"<nav class="post-navigation">{}{}</nav>"#,
        link(&navigation.previous, "previous", "Post anterior"),
        link(&navigation.next, "next", "Próximo post")
    ))
}

fn preview_html(uid: &str) -> String {
    let href = if is_valid_uid(uid) {
        format!("/api/exit-preview?slug={uid}")
    } else {
        "/api/exit-preview".to_string()
    };
    format!(r#"<aside class="preview-banner"><a href="{href}">Sair do modo Preview</a></aside>"#)
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use spacetraveling_cms::Cursor;
    use spacetraveling_core::{
        ContentSection, PostDocument, RichTextBlock, SpanKind, config::CommentsConfig,
    };

    use super::*;

    fn test_config() -> Config {
        Config::new(
            "spacetraveling",
            "https://spacetraveling.example.com",
            "https://repo.cdn.prismic.io/api/v2",
        )
    }

    fn generator() -> HtmlGenerator {
        HtmlGenerator::new(test_config()).unwrap()
    }

    fn summary(uid: &str, title: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap()),
            title: title.to_string(),
            subtitle: "Tudo sobre como criar a sua primeira aplicação".to_string(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn view() -> PostView {
        PostView {
            document: PostDocument {
                id: "YFbE".to_string(),
                uid: "como-utilizar-hooks".to_string(),
                first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap()),
                last_publication_date: None,
                title: "Como utilizar Hooks".to_string(),
                subtitle: "Pensando em sincronização".to_string(),
                author: "Joseph Oliveira".to_string(),
                banner_url: Some("https://images.prismic.io/banner.png?auto=compress".to_string()),
                content: vec![ContentSection {
                    heading: "Proin et varius".to_string(),
                    body: vec![
                        RichTextBlock::paragraph("Nullam dolor sapien").with_span(0, 6, SpanKind::Strong),
                    ],
                }],
            },
            navigation: Navigation::default(),
            reading_time: 4,
            preview: false,
        }
    }

    #[test]
    fn test_generate_home_with_load_more() {
        let state = PaginationState {
            items: vec![summary("a", "Primeiro"), summary("b", "Segundo <b>")],
            next_cursor: Some(Cursor::from("next")),
        };

        let html = generator().generate_home(&state, 1).unwrap();
        assert!(html.contains("<title>Home | spacetraveling</title>"));
        assert!(html.contains(r#"href="/post/a""#));
        assert!(html.contains("Segundo &lt;b&gt;"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains(r#"<a href="/page/2" class="load-more">Carregar mais posts</a>"#));
    }

    #[test]
    fn test_generate_home_exhausted() {
        let state = PaginationState {
            items: vec![summary("a", "Primeiro")],
            next_cursor: None,
        };

        let html = generator().generate_home(&state, 3).unwrap();
        assert!(!html.contains("Carregar mais posts"));
        assert!(html.contains("https://spacetraveling.example.com/page/3"));
    }

    #[test]
    fn test_generate_post() {
        let html = generator().generate_post(&view()).unwrap();

        assert!(html.contains("<title>Como utilizar Hooks</title>"));
        assert!(html.contains(r#"content="Pensando em sincronização""#));
        assert!(html.contains("https://images.prismic.io/banner.png?auto=compress&amp;q=75"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("4 min"));
        assert!(html.contains("<h2>Proin et varius</h2>"));
        assert!(html.contains("<p><strong>Nullam</strong> dolor sapien</p>"));
        assert!(!html.contains("editado em"));
        assert!(!html.contains("post-navigation"));
        assert!(!html.contains("comments-uterances"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_generate_post_optional_sections() {
        let mut view = view();
        view.document.banner_url = None;
        view.document.last_publication_date =
            Some(Utc.with_ymd_and_hms(2021, 3, 26, 14, 5, 0).unwrap());
        view.navigation = Navigation {
            previous: PostLink::new("antigo", "Post antigo"),
            next: PostLink::new("novo", "Post novo"),
        };
        view.preview = true;

        let mut config = test_config();
        config.comments = Some(CommentsConfig {
            repo: "owner/blog-comments".to_string(),
            issue_term: "pathname".to_string(),
            theme: "dark-blue".to_string(),
        });
        let html = HtmlGenerator::new(config).unwrap().generate_post(&view).unwrap();

        assert!(!html.contains(r#"class="banner""#));
        assert!(html.contains("* editado em 26 mar 2021, às 14:05"));
        assert!(html.contains(
            r#"<a href="/post/antigo" class="previous"><div>Post antigo</div><span>Post anterior</span></a>"#
        ));
        assert!(html.contains(
            r#"<a href="/post/novo" class="next"><div>Post novo</div><span>Próximo post</span></a>"#
        ));
        assert!(html.contains(r#"repo="owner/blog-comments" issue-term="pathname" theme="dark-blue""#));
        assert!(html.contains(r#"href="/api/exit-preview?slug=como-utilizar-hooks">Sair do modo Preview"#));
    }

    #[test]
    fn test_generate_not_found_and_error() {
        let html = generator().generate_not_found(None).unwrap();
        assert!(html.contains("Página não encontrada"));
        assert!(!html.contains("Sair do modo Preview"));

        let html = generator().generate_error("falha <rede>", None).unwrap();
        assert!(html.contains("falha &lt;rede&gt;"));
        assert!(!html.contains("Sair do modo Preview"));
    }

    #[test]
    fn test_error_pages_offer_preview_exit() {
        let html = generator()
            .generate_error("falha", Some("como-utilizar-hooks"))
            .unwrap();
        assert!(html.contains(r#"href="/api/exit-preview?slug=como-utilizar-hooks">Sair do modo Preview"#));

        let html = generator().generate_not_found(Some("../x")).unwrap();
        assert!(html.contains(r#"href="/api/exit-preview">Sair do modo Preview"#));
    }

    #[test]
    fn test_invalid_locale() {
        let mut config = test_config();
        config.site.locale = "xx_YY".to_string();
        assert!(matches!(HtmlGenerator::new(config), Err(HtmlError::Config(_))));
    }

    #[test]
    fn test_banner_src() {
        assert_eq!(banner_src("https://a/b.png", 75), "https://a/b.png?q=75");
        assert_eq!(banner_src("https://a/b.png?auto=compress", 60), "https://a/b.png?auto=compress&q=60");
    }

    #[test]
    fn test_output_paths() {
        let generator = generator();
        let out = Path::new("public");
        assert_eq!(generator.list_output_path(out, 1), PathBuf::from("public/index.html"));
        assert_eq!(generator.list_output_path(out, 3), PathBuf::from("public/page/3/index.html"));
        assert_eq!(
            generator.post_output_path(out, "como-utilizar-hooks"),
            Some(PathBuf::from("public/post/como-utilizar-hooks/index.html"))
        );
        for uid in ["../../../escaped", "a/b", "", ".."] {
            assert!(generator.post_output_path(out, uid).is_none(), "{uid}");
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
