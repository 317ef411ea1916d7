//! Test doubles and HTML fixtures shaped like the announcement archive.

use crate::error::FetchError;
use crate::fetch::PageFetcher;
use scraper::Html;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub const ORIGIN: &str = "https://www.okx.com";

#[derive(Debug, Clone)]
enum Scripted {
    Page(String),
    Fail(u16),
}

/// A [`PageFetcher`] serving canned responses per URL.
///
/// Each URL has a queue of responses. Responses are consumed in order and
/// the last one repeats forever. Unknown URLs answer HTTP 404.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    routes: RefCell<HashMap<String, VecDeque<Scripted>>>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.push(url, Scripted::Page(html.into()))
    }

    pub fn failure(self, url: &str, status: u16) -> Self {
        self.push(url, Scripted::Fail(status))
    }

    fn push(self, url: &str, response: Scripted) -> Self {
        self.routes
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Html, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let next = {
            let mut routes = self.routes.borrow_mut();
            routes.get_mut(url).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };
        match next {
            Some(Scripted::Page(html)) => Ok(Html::parse_document(&html)),
            Some(Scripted::Fail(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Absolute URL of listing page `page` for the category `slug`.
pub fn listing_url(slug: &str, page: u32) -> String {
    let base = format!("{ORIGIN}/help/section/announcements-{slug}");
    if page > 1 {
        format!("{base}/page/{page}")
    } else {
        base
    }
}

/// A listing page with `(article slug, display date)` items, e.g.
/// `("earn-apr-boost", "Mar 05, 2025")`.
pub fn listing_page(items: &[(&str, &str)], total_pages: Option<u32>) -> String {
    let mut html = String::from("<html><body><ul class=\"index_articleList__x\">");
    for (slug, date) in items {
        html.push_str(&format!(
            "<li class=\"index_articleItem__d-8iK\">\
               <a href=\"/help/{slug}\"><div class=\"index_title__y\">{slug}</div></a>\
               <span data-testid=\"DateDisplay\">Published on {date}</span>\
             </li>"
        ));
    }
    html.push_str("</ul>");
    if let Some(total) = total_pages {
        html.push_str("<ul class=\"okui-pagination\">");
        for n in 1..=total {
            html.push_str(&format!(
                "<li><a data-e2e-okd-pagination-pager=\"{n}\" href=\"#\">{n}</a></li>"
            ));
        }
        html.push_str("<li><a data-e2e-okd-pagination-pager=\"next\" href=\"#\">Next</a></li></ul>");
    }
    html.push_str("</body></html>");
    html
}

/// Absolute URL of the article with the given slug.
pub fn article_url(slug: &str) -> String {
    format!("{ORIGIN}/help/{slug}")
}

/// An article page; `None` leaves the element out.
pub fn article_page(title: Option<&str>, body: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    if let Some(title) = title {
        html.push_str(&format!(
            "<h1 class=\"index_article-title-h1__Qc9Yx\">  {title}  </h1>"
        ));
    }
    if let Some(body) = body {
        html.push_str(&format!(
            "<div class=\"index_richTextContent__Ab12\">{body}</div>"
        ));
    }
    html.push_str("</body></html>");
    html
}

/// An archive homepage whose navigation links to the given category hrefs.
pub fn homepage(hrefs: &[&str]) -> String {
    let mut html = String::from("<html><body><nav aria-label=\"Announcements\"><ul>");
    for href in hrefs {
        html.push_str(&format!("<li><a href=\"{href}\">{href}</a></li>"));
    }
    html.push_str("</ul></nav></body></html>");
    html
}
