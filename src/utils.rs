//! Helpers shared by the scrapers, the harvest engine and `main`.
//!
//! - Element lookup by class substring (class names on the archive carry
//!   build hashes, e.g. `index_articleItem__d-8iK`)
//! - HTML to markdown text conversion
//! - Retry backoff with jitter
//! - String truncation for logging
//! - File system validation for the output folder

use once_cell::sync::Lazy;
use rand::{Rng, rng};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument};

static IMAGE_MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image regex"));
static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

/// Find the first `tag` element whose `class` attribute contains `class_substring`.
///
/// # Examples
///
/// ```ignore
/// let doc = Html::parse_document(r#"<h1 class="index_article-title-h1__x1">Hi</h1>"#);
/// assert!(find_first_by_class_substring(&doc, "h1", "index_article-title-h1").is_some());
/// ```
pub fn find_first_by_class_substring<'a>(
    document: &'a Html,
    tag: &str,
    class_substring: &str,
) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(tag).ok()?;
    document.select(&selector).find(|element| {
        element
            .value()
            .attr("class")
            .is_some_and(|class| class.contains(class_substring))
    })
}

/// Convert an HTML fragment to markdown-style text.
///
/// Links are kept, images are dropped and runs of blank lines are collapsed.
/// Falls back to the plain text of the fragment when the conversion yields
/// nothing.
pub fn html_to_markdown(html: &str) -> String {
    let markdown = html2md::parse_html(html);
    let markdown = IMAGE_MARKDOWN.replace_all(&markdown, "");
    let markdown = EXCESS_BLANK_LINES.replace_all(&markdown, "\n\n");
    let markdown = markdown.trim();

    if markdown.is_empty() {
        debug!("html2md produced no text, falling back to plain text");
        let fragment = Html::parse_fragment(html);
        return fragment
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
    }
    markdown.to_string()
}

/// Delay before retry number `attempt` (1-based).
///
/// ```text
/// delay = min(base * 2^(attempt-1), max) + random_jitter(0..250ms)
/// ```
///
/// A zero `base` disables backoff entirely, jitter included.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if base.is_zero() {
        return Duration::ZERO;
    }
    let shift = attempt.saturating_sub(1).min(16);
    let delay = base.saturating_mul(1 << shift).min(max);
    let jitter_ms: u64 = rng().random_range(0..=250);
    delay + Duration::from_millis(jitter_ms)
}

/// Sleep for [`backoff_delay`], skipping the timer when there is nothing to wait for.
pub async fn backoff(attempt: u32, base: Duration, max: Duration) {
    let delay = backoff_delay(attempt, base, max);
    if !delay.is_zero() {
        debug!(attempt, ?delay, "Backing off before retry");
        tokio::time::sleep(delay).await;
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    if !fs::metadata(path).await?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            "path exists and is not a directory",
        ));
    }
    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let result = truncate_for_log("ééé", 1);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[test]
    fn test_find_first_by_class_substring() {
        let doc = Html::parse_document(
            r#"<div class="other">x</div>
               <div class="index_richTextContent__abc">first</div>
               <div class="index_richTextContent__def">second</div>"#,
        );
        let found = find_first_by_class_substring(&doc, "div", "index_richTextContent").unwrap();
        assert_eq!(found.text().collect::<String>(), "first");
        assert!(find_first_by_class_substring(&doc, "span", "index_richTextContent").is_none());
        assert!(find_first_by_class_substring(&doc, "div", "index_markdownContent").is_none());
    }

    #[test]
    fn test_html_to_markdown_keeps_links_drops_images() {
        let md = html_to_markdown(
            r#"<p>Read the <a href="https://example.com/rules">rules</a>.</p>
               <p><img src="https://example.com/banner.png" alt="banner"></p>
               <p>Second paragraph</p>"#,
        );
        assert!(md.contains("[rules](https://example.com/rules)"));
        assert!(md.contains("Second paragraph"));
        assert!(!md.contains("banner.png"));
        assert!(!md.contains("\n\n\n"));
    }

    #[test]
    fn test_backoff_delay_zero_base_disabled() {
        assert_eq!(
            backoff_delay(3, Duration::ZERO, Duration::from_secs(10)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let max = Duration::from_secs(2);
        let delay = backoff_delay(10, Duration::from_secs(1), max);
        assert!(delay >= max);
        assert!(delay <= max + Duration::from_millis(250));
    }

    #[test]
    fn test_backoff_delay_doubles() {
        let delay = backoff_delay(3, Duration::from_millis(100), Duration::from_secs(10));
        assert!(delay >= Duration::from_millis(400));
        assert!(delay <= Duration::from_millis(650));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        assert!(ensure_writable_dir(&file).await.is_err());
    }
}
