//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::Body;
use crate::config::HighlightConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with the default highlight settings
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(highlight: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: highlight.theme.clone(),
            line_numbers: highlight.line_number,
        }
    }

    /// Render markdown into an entry body
    pub fn render(&self, markdown: &str) -> Result<Body> {
        // Front-matter is stripped before this point, so no metadata blocks.
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;

        let mut fence: Option<Fence> = None;
        let events = Parser::new_ext(markdown, options).filter_map(|event| match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                fence = Some(Fence::open(kind));
                None
            }
            Event::End(TagEnd::CodeBlock) => fence
                .take()
                .map(|f| Event::Html(CowStr::from(self.highlight(&f)))),
            Event::Text(text) if fence.is_some() => {
                if let Some(f) = fence.as_mut() {
                    f.code.push_str(&text);
                }
                None
            }
            _ if fence.is_some() => None,
            event => Some(event),
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);

        Ok(Body::new(out))
    }

    fn highlight(&self, fence: &Fence) -> String {
        let lang = fence.lang.as_deref().unwrap_or("text");
        let code = fence.code.as_str();

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return plain_code_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(html) if self.line_numbers => with_gutter(&html, lang),
            Ok(html) => format!(r#"<figure class="highlight {lang}">{html}</figure>"#),
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                plain_code_block(code, lang)
            }
        }
    }
}

/// A fenced or indented code block being collected
struct Fence {
    lang: Option<String>,
    code: String,
}

impl Fence {
    fn open(kind: CodeBlockKind<'_>) -> Self {
        // Info strings may carry attributes after the language: "rust title=main.rs"
        let lang = match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
            CodeBlockKind::Indented => None,
        };
        Self {
            lang,
            code: String::new(),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Put a line-number gutter next to highlighted code
fn with_gutter(html: &str, lang: &str) -> String {
    let count = html.lines().count();
    let gutter: String = (1..=count)
        .map(|n| format!(r#"<span class="line-number">{n}</span>"#))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {lang}"><table><tr><td class="gutter"><pre>{gutter}</pre></td><td class="code">{html}</td></tr></table></figure>"#
    )
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
