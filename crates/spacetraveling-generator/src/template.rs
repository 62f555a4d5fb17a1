//! Page layouts with `{{ slot }}` interpolation.
//!
//! Each layout is compiled once into literal text and named slots. A slot
//! written `{{ name? }}` may be left out of the context and renders empty.
//! Slot values are inserted verbatim and never rescanned, so callers escape
//! content store text before it reaches a context.

use std::collections::HashMap;

use thiserror::Error;

/// Layout compilation and rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A required slot had no value in the context.
    #[error("{layout} layout: no value for slot `{slot}`")]
    MissingVariable { layout: &'static str, slot: String },

    /// A `{{` without a matching `}}`.
    #[error("{layout} layout: unclosed slot at byte {offset}")]
    Unclosed { layout: &'static str, offset: usize },

    /// `{{ }}` with no slot name.
    #[error("{layout} layout: empty slot at byte {offset}")]
    EmptySlot { layout: &'static str, offset: usize },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// The layouts pages are assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Document shell: head, styles and the site header.
    Base,
    /// Post listing.
    Home,
    /// Post page.
    Post,
    /// Not-found and error pages.
    Message,
}

impl Layout {
    const ALL: [Layout; 4] = [Layout::Base, Layout::Home, Layout::Post, Layout::Message];

    /// Layout name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Layout::Base => "base",
            Layout::Home => "home",
            Layout::Post => "post",
            Layout::Message => "message",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Layout::Base => DEFAULT_BASE_TEMPLATE,
            Layout::Home => DEFAULT_HOME_TEMPLATE,
            Layout::Post => DEFAULT_POST_TEMPLATE,
            Layout::Message => DEFAULT_MESSAGE_TEMPLATE,
        }
    }
}

/// Slot values for one render.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    slots: HashMap<&'static str, String>,
}

impl TemplateContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a slot.
    #[must_use]
    pub fn with_var(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        self.slots.insert(slot, value.into());
        self
    }

    /// Fill a slot only when a value is present.
    #[must_use]
    pub fn with_opt(self, slot: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_var(slot, value),
            None => self,
        }
    }

    /// Value of a slot, if filled.
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Slot { name: String, optional: bool },
}

/// A compiled layout.
#[derive(Debug, Clone)]
pub struct Template {
    layout: &'static str,
    pieces: Vec<Piece>,
}

impl Template {
    /// Compile `source`; `layout` names it in errors.
    pub fn compile(layout: &'static str, source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                pieces.push(Piece::Text(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or(TemplateError::Unclosed {
                layout,
                offset: offset + open,
            })?;

            let raw = after_open[..close].trim();
            let (name, optional) = match raw.strip_suffix('?') {
                Some(name) => (name.trim_end(), true),
                None => (raw, false),
            };
            if name.is_empty() {
                return Err(TemplateError::EmptySlot {
                    layout,
                    offset: offset + open,
                });
            }
            pieces.push(Piece::Slot {
                name: name.to_string(),
                optional,
            });

            let consumed = open + 2 + close + 2;
            rest = &rest[consumed..];
            offset += consumed;
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest.to_string()));
        }

        Ok(Self { layout, pieces })
    }

    /// Fill the slots from `context`.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Slot { name, optional } => match context.get(name) {
                    Some(value) => out.push_str(value),
                    None if *optional => {}
                    None => {
                        return Err(TemplateError::MissingVariable {
                            layout: self.layout,
                            slot: name.clone(),
                        });
                    }
                },
            }
        }
        Ok(out)
    }
}

/// All site layouts, compiled.
#[derive(Debug, Clone)]
pub struct Templates {
    compiled: Vec<Template>,
}

impl Templates {
    /// Compile the built-in layouts.
    pub fn builtin() -> Result<Self> {
        let compiled = Layout::ALL
            .into_iter()
            .map(|layout| Template::compile(layout.name(), layout.source()))
            .collect::<Result<_>>()?;
        Ok(Self { compiled })
    }

    /// Render one layout.
    pub fn render(&self, layout: Layout, context: &TemplateContext) -> Result<String> {
        // `compiled` follows `Layout::ALL`, which lists variants in declaration order.
        self.compiled[layout as usize].render(context)
    }
}

/// Default base HTML template.
pub const DEFAULT_BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <meta name="description" content="{{ description? }}">
    <link rel="canonical" href="{{ canonical_url }}">
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700&display=swap" rel="stylesheet">
    <style>
        :root {
            --color-bg: #1A1D23;
            --color-heading: #F8F8F8;
            --color-body: #D7D7D7;
            --color-info: #BBBBBB;
            --color-highlight: #FF57B2;
            --color-muted: #282A36;
        }

        *, *::before, *::after { box-sizing: border-box; }
        * { margin: 0; padding: 0; }

        body {
            font-family: 'Inter', system-ui, -apple-system, sans-serif;
            line-height: 1.6;
            color: var(--color-body);
            background: var(--color-bg);
            -webkit-font-smoothing: antialiased;
        }

        a { color: inherit; text-decoration: none; }

        .container { max-width: 720px; margin: 0 auto; padding: 0 1.5rem; }

        .site-header { padding: 4rem 0 3rem; }
        .site-header .logo { font-size: 1.75rem; font-weight: 700; color: var(--color-heading); }
        .site-header .logo span { color: var(--color-highlight); }

        .post-card { display: block; margin-bottom: 3rem; }
        .post-card strong { display: block; font-size: 1.75rem; color: var(--color-heading); }
        .post-card:hover strong { color: var(--color-highlight); }
        .post-card p { margin: 0.5rem 0 1.5rem; font-size: 1.125rem; }

        .info { display: flex; gap: 1.5rem; font-size: 0.875rem; color: var(--color-info); }

        .load-more {
            display: inline-block;
            margin-bottom: 4rem;
            color: var(--color-highlight);
            font-weight: 600;
            font-size: 1.125rem;
        }

        .banner { width: 100%; height: 400px; object-fit: cover; display: block; }

        .post { padding: 4rem 0; }
        .post h1 { font-size: 3rem; line-height: 1.2; color: var(--color-heading); }
        .post .info { margin: 1.5rem 0 0.5rem; }
        .post .edited { font-size: 0.875rem; font-style: italic; color: var(--color-info); }
        .post .content section { margin-top: 4rem; }
        .post .content h2 { font-size: 2.25rem; color: var(--color-heading); margin-bottom: 2rem; }
        .post .content p, .post .content ul, .post .content ol, .post .content pre { margin-bottom: 1.5rem; }
        .post .content a { color: var(--color-highlight); text-decoration: underline; }
        .post .content pre { background: var(--color-muted); padding: 1rem; overflow-x: auto; }
        .post .content img { max-width: 100%; }

        .post footer { margin-top: 4rem; padding-top: 3rem; border-top: 1px solid var(--color-muted); }

        .post-navigation { display: flex; justify-content: space-between; gap: 2rem; margin-bottom: 3rem; }
        .post-navigation a div { color: var(--color-heading); font-size: 1.125rem; }
        .post-navigation a span { color: var(--color-highlight); font-weight: 600; }
        .post-navigation .next { margin-left: auto; text-align: right; }

        .preview-banner { margin-top: 3rem; }
        .preview-banner a {
            display: block;
            padding: 1rem;
            border-radius: 8px;
            background: var(--color-muted);
            color: var(--color-heading);
            text-align: center;
        }

        .message { padding: 4rem 0; }
        .message h1 { color: var(--color-heading); margin-bottom: 1rem; }
        .message a { color: var(--color-highlight); }
    </style>
</head>
<body>
    <header class="site-header container">
        <a href="/" class="logo">{{ site_title }}<span>.</span></a>
    </header>
    {{ content }}
</body>
</html>"##;

/// Default home (post listing) template.
pub const DEFAULT_HOME_TEMPLATE: &str = r#"<main class="container">
    <div class="posts">
        {{ items }}
    </div>
    {{ load_more? }}
</main>"#;

/// Default post template.
pub const DEFAULT_POST_TEMPLATE: &str = r#"{{ banner? }}
<main class="container">
    <article class="post">
        <header>
            <h1>{{ title }}</h1>
            <div class="info">
                {{ date_html? }}
                <span class="author">{{ author }}</span>
                <span class="reading-time">{{ reading_time }} min</span>
            </div>
            {{ edited_html? }}
        </header>
        <div class="content">
            {{ content }}
        </div>
        <footer>
            {{ navigation? }}
            {{ comments? }}
            {{ preview? }}
        </footer>
    </article>
</main>"#;

/// Default template for not-found and error pages.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = r#"<main class="container message">
    <h1>{{ heading }}</h1>
    <p>{{ message }}</p>
    <a href="/">Voltar para o início</a>
    {{ preview? }}
</main>"#;
