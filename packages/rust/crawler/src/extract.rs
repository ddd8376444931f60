//! Structured content extraction from fetched HTML.
//!
//! [`extract`] turns one page into a [`PageRecord`]: title, headings,
//! paragraphs, every outbound link, and the subset of links the crawl may
//! follow. It never mutates crawl state; the visited registry is only read
//! to decide which links to propose as children.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use sitedoc_shared::{DEFAULT_LINK_TEXT, Heading, Link, NO_TITLE, PageRecord};

use crate::visited::VisitedSet;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));
static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Extract a [`PageRecord`] from the markup of `url`.
pub fn extract(url: &Url, html: &str, visited: &VisitedSet) -> PageRecord {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE)
        .next()
        .map(|el| collapse_whitespace(&element_text(el)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let headings = doc
        .select(&HEADINGS)
        .filter_map(|el| {
            let level = heading_level(el.value().name())?;
            Some(Heading {
                level,
                text: element_text(el),
            })
        })
        .collect();

    let paragraphs = doc
        .select(&PARAGRAPHS)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect();

    let mut links = Vec::new();
    let mut child_urls = Vec::new();

    for el in doc.select(&ANCHORS) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };

        let text = match element_text(el) {
            t if t.is_empty() => DEFAULT_LINK_TEXT.to_string(),
            t => t,
        };

        match url.join(href) {
            Ok(resolved) => {
                if is_child_candidate(url, &resolved) && !visited.contains(resolved.as_str()) {
                    child_urls.push(resolved.to_string());
                }
                links.push(Link {
                    text,
                    url: resolved.to_string(),
                });
            }
            Err(_) => links.push(Link {
                text,
                url: href.to_string(),
            }),
        }
    }

    PageRecord {
        url: url.to_string(),
        title,
        headings,
        paragraphs,
        links,
        child_urls,
        error: None,
    }
}

/// Whether `link` is an http(s) URL on the same host and port as `page`.
pub fn is_child_candidate(page: &Url, link: &Url) -> bool {
    matches!(link.scheme(), "http" | "https") && same_authority(page, link)
}

fn same_authority(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

/// Element text trimmed at both ends; inner whitespace is left as found.
fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn heading_level(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')?
        .parse()
        .ok()
        .filter(|level| (1..=6).contains(level))
}
