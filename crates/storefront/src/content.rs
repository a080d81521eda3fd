//! Markdown content: blog posts and legal pages.
//!
//! Files are loaded from the content directory at startup, frontmatter is
//! parsed with `gray_matter` and bodies are rendered with `comrak`.
//!
//! ```text
//! content/
//!   blog/2024-01-15-hair-care-tips-for-men.md
//!   pages/privacy.md
//! ```
//!
//! # Shortcodes
//!
//! Posts can end with a call to action:
//!
//! ```markdown
//! {{cta "Book your cut" href="/services"}}
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use regex::Regex;
use serde::Deserialize;

/// Legal pages the site links to.
pub const LEGAL_PAGES: &[&str] = &["privacy", "terms", "refund", "cookies", "disclaimer"];

/// Metadata for legal pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Metadata for blog posts.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl Post {
    /// Author initials for the byline avatar.
    #[must_use]
    pub fn author_initials(&self) -> String {
        self.meta
            .author
            .as_deref()
            .unwrap_or("De Legends")
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// All loaded content, held in memory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all content from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if a content directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = Self::load_pages(&content_dir.join("pages"))?;
        let posts = Self::load_posts(&content_dir.join("blog"))?;

        for slug in LEGAL_PAGES {
            if !pages.contains_key(*slug) {
                tracing::warn!(slug, "Legal page missing from content directory");
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        })
    }

    fn load_pages(dir: &Path) -> Result<HashMap<String, Page>, ContentError> {
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(pages);
        }

        for path in markdown_files(dir)? {
            match Self::load_page(&path) {
                Ok(page) => {
                    tracing::debug!("Loaded page: {}", page.slug);
                    pages.insert(page.slug.clone(), page);
                }
                Err(e) => tracing::error!("Failed to load page {:?}: {}", path, e),
            }
        }

        Ok(pages)
    }

    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;
        let slug = file_stem(path)?.to_string();
        let (meta, body) = parse_frontmatter::<PageMeta>(&raw)?;

        Ok(Page {
            slug,
            meta,
            content_html: render_markdown(&body),
        })
    }

    fn load_posts(dir: &Path) -> Result<Vec<Post>, ContentError> {
        let mut posts = Vec::new();

        if !dir.exists() {
            tracing::info!("Blog directory does not exist yet: {:?}", dir);
            return Ok(posts);
        }

        for path in markdown_files(dir)? {
            match Self::load_post(&path) {
                Ok(post) => {
                    tracing::debug!("Loaded post: {}", post.slug);
                    posts.push(post);
                }
                Err(e) => tracing::error!("Failed to load post {:?}: {}", path, e),
            }
        }

        // Newest first
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        Ok(posts)
    }

    fn load_post(path: &Path) -> Result<Post, ContentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;
        let slug = post_slug(file_stem(path)?);
        let (meta, body) = parse_frontmatter::<PostMeta>(&raw)?;

        Ok(Post {
            slug,
            meta,
            content_html: render_markdown(&body),
            reading_time_minutes: reading_time_minutes(&body),
        })
    }

    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// A published post by slug. Drafts are not served.
    #[must_use]
    pub fn get_post(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug && !p.meta.draft)
    }

    /// Published posts, newest first.
    pub fn get_published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.meta.draft)
    }

    /// Featured published posts, newest first.
    pub fn get_featured_posts(&self) -> impl Iterator<Item = &Post> {
        self.get_published_posts().filter(|p| p.meta.featured)
    }

    /// Recent published posts, optionally excluding one slug.
    #[must_use]
    pub fn get_recent_posts(&self, limit: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.get_published_posts()
            .filter(|p| exclude_slug.is_none_or(|s| p.slug != s))
            .take(limit)
            .collect()
    }
}

fn markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, ContentError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;
    Ok(entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect())
}

fn file_stem(path: &Path) -> Result<&str, ContentError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))
}

/// "2024-01-15-my-post" -> "my-post"
fn post_slug(stem: &str) -> String {
    let has_date_prefix = stem.len() > 11
        && stem
            .get(..10)
            .is_some_and(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok())
        && stem.as_bytes().get(10) == Some(&b'-');

    if has_date_prefix {
        stem.get(11..).unwrap_or(stem).to_string()
    } else {
        stem.to_string()
    }
}

fn parse_frontmatter<T: serde::de::DeserializeOwned>(raw: &str) -> Result<(T, String), ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<T> = matter
        .parse(raw)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;
    Ok((meta, parsed.content))
}

/// 200 words per minute, at least one minute.
fn reading_time_minutes(body: &str) -> u32 {
    let words = u32::try_from(body.split_whitespace().count()).unwrap_or(u32::MAX);
    words.div_ceil(200).max(1)
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let processed = process_shortcodes(content);

    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Content is first-party; allows the shortcode HTML through
    options.render.r#unsafe = true;

    markdown_to_html(&processed, &options)
}

/// Matches `{{cta "Label" href="/path"}}`.
static CTA_SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{cta\s+"([^"]+)"(?:\s+href="([^"]*)")?\s*\}\}"#).expect("Invalid regex")
});

fn process_shortcodes(content: &str) -> String {
    CTA_SHORTCODE_RE
        .replace_all(content, |caps: &regex::Captures| {
            let label = &caps[1];
            let href = caps
                .get(2)
                .map_or("/services", |m| m.as_str())
                .trim();
            // Only site-relative links
            let href = if href.starts_with('/') && !href.starts_with("//") {
                href
            } else {
                "/services"
            };
            format!(r#"<p class="cta"><a class="btn btn-gold" href="{href}">{label}</a></p>"#)
        })
        .into_owned()
}

/// Content loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_slug_strips_date_prefix() {
        assert_eq!(post_slug("2024-01-15-hair-care-tips"), "hair-care-tips");
        assert_eq!(post_slug("beard-oil"), "beard-oil");
        assert_eq!(post_slug("2024-beard-trends-2025"), "2024-beard-trends-2025");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes("one two"), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(401)), 3);
    }

    #[test]
    fn test_cta_shortcode() {
        let html = render_markdown(r#"{{cta "Book now" href="/select-location"}}"#);
        assert!(html.contains(r#"href="/select-location""#));
        assert!(html.contains("Book now"));

        let html = render_markdown(r#"{{cta "Book now" href="https://evil.example"}}"#);
        assert!(html.contains(r#"href="/services""#));
    }

    #[test]
    fn test_author_initials() {
        let post = Post {
            slug: "x".to_string(),
            meta: PostMeta {
                title: "X".to_string(),
                excerpt: None,
                author: Some("expert team".to_string()),
                category: None,
                published_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                featured_image: None,
                featured: false,
                draft: false,
            },
            content_html: String::new(),
            reading_time_minutes: 1,
        };
        assert_eq!(post.author_initials(), "ET");
    }

    #[test]
    fn test_load_shipped_content() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let store = ContentStore::load(&dir).unwrap();

        for slug in LEGAL_PAGES {
            assert!(store.get_page(slug).is_some(), "missing legal page {slug}");
        }

        let posts: Vec<_> = store.get_published_posts().collect();
        assert!(!posts.is_empty());
        assert!(
            posts
                .windows(2)
                .all(|w| w[0].meta.published_at >= w[1].meta.published_at)
        );
        assert!(posts.iter().all(|p| !p.meta.draft));
    }
}
