// src/page/render.rs
// =============================================================================
// Turns redirect entries into HTML files.
//
// For each entry:
// 1. Tag the target URL with the referral parameter (if configured)
// 2. Scrape the target for title/description/image (best effort)
// 3. Render the template with that metadata
// 4. Compact the whitespace and write <output>/<name>.html
//
// Pages are independent of each other, so they are rendered as a stream
// of futures with a concurrency limit, the same way link checks run in
// parallel. The renderer only holds read-only state (template, fetcher),
// so every future borrows it without locking.
// =============================================================================

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

use super::meta::{fetch_metadata, tag_url, PageMetadata};
use super::template::{Context, Template};
use crate::error::Error;
use crate::fetch::Fetcher;
use crate::table::RedirectEntry;

/// Outcome of rendering one entry
#[derive(Debug)]
pub struct PageOutcome {
    pub name: String,
    pub result: Result<PathBuf, Error>,
}

pub struct PageRenderer {
    template: Template,
    fetcher: Fetcher,
    output_dir: PathBuf,
    ref_tag: Option<String>,
    scrape: bool,
}

impl PageRenderer {
    pub fn new(template: Template, fetcher: Fetcher, output_dir: impl Into<PathBuf>) -> Self {
        PageRenderer {
            template,
            fetcher,
            output_dir: output_dir.into(),
            ref_tag: None,
            scrape: true,
        }
    }

    /// Appends ?ref=<tag> to every target shown on a page
    pub fn with_ref_tag(mut self, ref_tag: Option<String>) -> Self {
        self.ref_tag = ref_tag;
        self
    }

    /// Turns metadata scraping on or off
    pub fn with_scraping(mut self, scrape: bool) -> Self {
        self.scrape = scrape;
        self
    }

    /// Metadata for an entry: scraped (or default), then config overrides
    pub async fn metadata_for(&self, entry: &RedirectEntry) -> PageMetadata {
        let url = tag_url(&entry.target.url, self.ref_tag.as_deref());
        let meta = if self.scrape {
            fetch_metadata(&self.fetcher, &url).await
        } else {
            PageMetadata::new(url)
        };
        meta.with_overrides(&entry.target)
    }

    /// Renders the page markup for an entry, without touching the disk
    pub fn render(&self, name: &str, meta: &PageMetadata) -> String {
        let mut context = Context::new();
        context
            .set("name", name)
            .set("url", meta.url.as_str())
            // Same URL as a quoted JS string, for use raw inside <script>
            .set("url_js", js_string(&meta.url))
            .set("title", meta.title.as_str())
            .set_opt("description", meta.description.as_deref())
            .set_opt("desc", meta.description.as_deref())
            .set_opt("image", meta.image.as_deref());

        compact_html(&self.template.render(&context))
    }

    /// Renders one entry and writes it to <output>/<name>.html
    pub async fn write_page(&self, entry: &RedirectEntry) -> Result<PathBuf, Error> {
        let meta = self.metadata_for(entry).await;
        let html = self.render(&entry.name, &meta);

        let path = page_path(&self.output_dir, &entry.name);
        // Names with a '/' live in subdirectories
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, html).await?;

        println!("- {}.html", entry.name);
        Ok(path)
    }

    /// Writes every page, running up to `jobs` at once
    ///
    /// Every entry gets an outcome; one failing page does not stop the
    /// others. Outcomes arrive in completion order, not table order.
    pub async fn write_all(&self, entries: Vec<RedirectEntry>, jobs: usize) -> Vec<PageOutcome> {
        let futures = entries.into_iter().map(|entry| async move {
            let result = self.write_page(&entry).await;
            PageOutcome {
                name: entry.name,
                result,
            }
        });

        stream::iter(futures)
            .buffer_unordered(jobs.max(1))
            .collect()
            .await
    }
}

// Browsers do not decode HTML entities inside <script>, so `{{url}}`
// (HTML-escaped) would turn `&` into a literal `&amp;` there. This gives a
// JSON string literal that is also safe to drop into a <script> element:
// `<` and `>` cannot close the tag, `&` cannot be read as an entity.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Where the page for `name` is written
pub fn page_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{}.html", name))
}

/// Trims every line and drops blank ones.
///
/// Adjacent tags are joined directly; any other line break is kept as a
/// single newline, so text and inline scripts keep their meaning.
pub fn compact_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    for line in html.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if !out.is_empty() && !(out.ends_with('>') && line.starts_with('<')) {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `async move` in write_all?
//    - Each future needs to own its entry (it outlives the loop iteration)
//    - `self` is a reference, so moving it into the future just copies the
//      reference; every future borrows the same renderer
//
// 2. Why buffer_unordered and not one task per page?
//    - It never runs more than `jobs` pages at once
//    - Nothing needs to be 'static, so no Arc around the renderer
//
// 3. What is {{{url_js}}}?
//    - Triple braces render a value without HTML escaping
//    - It is only safe because js_string() already escaped it for <script>
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Target;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEMPLATE: &str = r#"
        <html>
          <head>
            <title>{{title}}</title>
            <meta http-equiv="refresh" content="0; url={{url}}">
            {{#desc}}<meta name="description" content="{{desc}}">{{/desc}}
          </head>
          <body>
            <a href="{{url}}">{{title}}</a>
            <script>
              window.location.href = {{{url_js}}}
            </script>
          </body>
        </html>
    "#;

    fn entry(name: &str, url: &str) -> RedirectEntry {
        RedirectEntry {
            name: name.to_string(),
            target: Target::url(url),
        }
    }

    fn renderer(output: &Path) -> PageRenderer {
        let template = Template::parse(TEMPLATE).unwrap();
        PageRenderer::new(template, Fetcher::new(None).unwrap(), output).with_scraping(false)
    }

    #[test]
    fn test_compact_html() {
        let html = "<div>\n   <p>\n     two\n     words\n   </p>\n\n</div>\n";
        assert_eq!(compact_html(html), "<div><p>\ntwo\nwords\n</p></div>");
    }

    #[test]
    fn test_page_path() {
        let out = Path::new("dist");
        assert_eq!(page_path(out, "foo"), PathBuf::from("dist/foo.html"));
        assert_eq!(page_path(out, "a/b"), PathBuf::from("dist/a/b.html"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let meta = PageMetadata::new("https://example.com");
        assert_eq!(renderer.render("foo", &meta), renderer.render("foo", &meta));
    }

    #[test]
    fn test_render_without_description() {
        let dir = tempfile::tempdir().unwrap();
        let html = renderer(dir.path()).render("foo", &PageMetadata::new("https://example.com"));
        assert!(html.contains(r#"content="0; url=https://example.com""#));
        assert!(html.contains(r#"<a href="https://example.com">Redirecting...</a>"#));
        assert!(html.contains(r#"window.location.href = "https://example.com""#));
        assert!(!html.contains("{{"));
        assert!(!html.contains(r#"name="description""#));
    }

    #[tokio::test]
    async fn test_ref_tag_and_overrides_flow_into_page() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path()).with_ref_tag(Some("me.dev".to_string()));
        let entry = RedirectEntry {
            name: "blog".to_string(),
            target: Target {
                url: "https://blog.example.com/".to_string(),
                title: Some("My Blog".to_string()),
                description: Some("Posts".to_string()),
            },
        };

        let meta = renderer.metadata_for(&entry).await;
        assert_eq!(meta.url, "https://blog.example.com/?ref=me.dev");
        assert_eq!(meta.title, "My Blog");

        let html = renderer.render(&entry.name, &meta);
        assert!(html.contains(r#"<meta name="description" content="Posts">"#));
        assert!(html.contains("https://blog.example.com/?ref=me.dev"));
    }

    #[test]
    fn test_js_string() {
        assert_eq!(js_string("https://x/?a=1&b=2"), r#""https://x/?a=1\u0026b=2""#);
        assert_eq!(
            js_string(r#"https://x/"</script>"#),
            r#""https://x/\"\u003c/script\u003e""#
        );
    }

    #[test]
    fn test_shipped_template_keeps_query_in_script() {
        let template = Template::parse(include_str!("../../static/template.html")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let renderer = PageRenderer::new(template, Fetcher::new(None).unwrap(), dir.path());

        let meta = PageMetadata::new("https://example.com/p?a=1&ref=me.dev");
        let html = renderer.render("p", &meta);

        // Attributes are HTML-escaped; the browser decodes them back
        assert!(html.contains(r#"content="0; url=https://example.com/p?a=1&amp;ref=me.dev""#));
        // The script gets a JS string with no HTML entities in it
        assert!(html.contains(
            r#"window.location.replace("https://example.com/p?a=1\u0026ref=me.dev");"#
        ));
        assert!(!html.contains("a=1&amp;ref=me.dev\")"));
    }

    #[tokio::test]
    async fn test_write_all_creates_one_file_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let entries = vec![
            entry("a", "https://a.example"),
            entry("b", "https://b.example"),
            entry("nested/c", "https://c.example"),
        ];

        let outcomes = renderer.write_all(entries, 2).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));

        assert!(dir.path().join("a.html").is_file());
        assert!(dir.path().join("b.html").is_file());
        assert!(dir.path().join("nested/c.html").is_file());
    }

    #[tokio::test]
    async fn test_failed_scrape_uses_default_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<title>Not Found</title>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path()).with_scraping(true);
        let path = renderer
            .write_page(&entry("gone", &server.uri()))
            .await
            .unwrap();

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("<title>Redirecting...</title>"));
        assert!(!html.contains("Not Found"));
        assert!(!html.contains(r#"name="description""#));
    }
}
