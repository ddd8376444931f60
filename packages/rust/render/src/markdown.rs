//! Markdown rendering of a page record.
//!
//! Layout: YAML frontmatter, the page title, the source URL, then either the
//! error block or a content section (headings, then paragraphs) followed by a
//! links section, and a generation footer.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use url::Url;

use sitedoc_shared::{DEFAULT_LINK_TEXT, NodeIndex, PageRecord};

/// Links listed per document after de-duplication.
const MAX_LINKS: usize = 30;

/// Render `record` as a Markdown document.
pub fn render_markdown(record: &PageRecord, index: &NodeIndex, generated_at: DateTime<Utc>) -> String {
    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = match clean_text(&record.title) {
        t if t.is_empty() => "Untitled".to_string(),
        t => t,
    };

    let mut md = build_frontmatter(record, &title, index, &timestamp);

    let _ = writeln!(md, "# {}\n", escape_markdown(&title));
    let _ = writeln!(md, "**URL:** {}\n", url_ref(&record.url));
    md.push_str("---\n\n");

    if let Some(error) = &record.error {
        let _ = writeln!(md, "> **Error:** {}\n", escape_markdown(&clean_text(error)));
        push_footer(&mut md, &timestamp);
        return md;
    }

    let mut content_added = false;

    if !record.headings.is_empty() || !record.paragraphs.is_empty() {
        md.push_str("## Content\n\n");

        for heading in &record.headings {
            let text = clean_text(&heading.text);
            if text.is_empty() {
                continue;
            }
            let level = usize::from(heading.level).saturating_add(2).min(6);
            let _ = writeln!(md, "{} {}\n", "#".repeat(level), escape_markdown(&text));
            content_added = true;
        }

        for paragraph in &record.paragraphs {
            let text = clean_text(paragraph);
            if text.is_empty() {
                continue;
            }
            let _ = writeln!(md, "{}\n", escape_markdown(&text));
            content_added = true;
        }
    }

    if !record.links.is_empty() {
        md.push_str("## Links\n\n");
        for (text, url) in unique_links(record).into_iter().take(MAX_LINKS) {
            if text == DEFAULT_LINK_TEXT || text == url {
                let _ = writeln!(md, "- {}", url_ref(url));
            } else {
                let _ = writeln!(md, "- **{}:** {}", escape_markdown(&text), url_ref(url));
            }
        }
        md.push('\n');
    }

    if !content_added && record.links.is_empty() {
        md.push_str("_No structured content found on this page._\n\n");
    }

    push_footer(&mut md, &timestamp);
    md
}

/// Links de-duplicated by text, keeping the shortest URL for each text.
///
/// Texts keep the position of their first occurrence.
fn unique_links(record: &PageRecord) -> Vec<(String, &str)> {
    let mut ordered: Vec<(String, &str)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for link in &record.links {
        if link.url.is_empty() {
            continue;
        }
        let text = match clean_text(&link.text) {
            t if t.is_empty() => DEFAULT_LINK_TEXT.to_string(),
            t => t,
        };

        match positions.get(&text) {
            Some(&pos) => {
                if link.url.len() < ordered[pos].1.len() {
                    ordered[pos].1 = link.url.as_str();
                }
            }
            None => {
                positions.insert(text.clone(), ordered.len());
                ordered.push((text, link.url.as_str()));
            }
        }
    }

    ordered
}

/// A URL as an autolink when it parses as an absolute URL, else as a code span.
fn url_ref(raw: &str) -> String {
    let autolinkable = Url::parse(raw).is_ok()
        && !raw.chars().any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>');
    if autolinkable {
        format!("<{raw}>")
    } else {
        code_span(&clean_text(raw))
    }
}

/// Wrap `text` in a backtick fence longer than any backtick run inside it.
fn code_span(text: &str) -> String {
    let longest_run = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

fn push_footer(md: &mut String, timestamp: &str) {
    md.push_str("---\n\n");
    let _ = writeln!(md, "_Generated {timestamp}_");
}

/// Build a YAML frontmatter block.
fn build_frontmatter(record: &PageRecord, title: &str, index: &NodeIndex, timestamp: &str) -> String {
    let mut fm = String::from("---\n");
    let _ = writeln!(fm, "source_url: \"{}\"", escape_yaml_string(&record.url));
    let _ = writeln!(fm, "title: \"{}\"", escape_yaml_string(title));
    let _ = writeln!(fm, "node: \"{index}\"");
    let _ = writeln!(fm, "generated_at: \"{timestamp}\"");
    if let Some(error) = &record.error {
        let _ = writeln!(fm, "error: \"{}\"", escape_yaml_string(&clean_text(error)));
    }
    fm.push_str("---\n\n");
    fm
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Drop NUL bytes and collapse every whitespace run (newlines, tabs) to one space.
pub(crate) fn clean_text(text: &str) -> String {
    text.replace('\0', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backslash-escape characters Markdown would otherwise interpret.
pub(crate) fn escape_markdown(text: &str) -> String {
    static SPECIAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([\\`*_\[\]<>#|])").expect("valid regex"));

    SPECIAL_RE.replace_all(text, r"\$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sitedoc_shared::{Heading, Link};

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn sample_record() -> PageRecord {
        PageRecord {
            url: "https://example.com/".into(),
            title: "Example Domain".into(),
            headings: vec![
                Heading { level: 1, text: "Welcome".into() },
                Heading { level: 5, text: "Deep".into() },
                Heading { level: 2, text: "  ".into() },
            ],
            paragraphs: vec!["First paragraph.".into(), "Second\n\tparagraph.".into()],
            links: vec![
                Link { text: "Docs".into(), url: "https://example.com/documentation".into() },
                Link { text: "Docs".into(), url: "https://example.com/docs".into() },
                Link { text: DEFAULT_LINK_TEXT.into(), url: "https://example.com/img".into() },
                Link { text: "https://example.com/raw".into(), url: "https://example.com/raw".into() },
            ],
            child_urls: vec![],
            error: None,
        }
    }

    #[test]
    fn renders_frontmatter_and_title() {
        let md = render_markdown(&sample_record(), &NodeIndex::root(2).child(1), generated_at());

        assert!(md.starts_with("---\n"));
        assert!(md.contains("source_url: \"https://example.com/\""));
        assert!(md.contains("title: \"Example Domain\""));
        assert!(md.contains("node: \"2-1\""));
        assert!(md.contains("generated_at: \"2024-01-15T10:30:00Z\""));
        assert!(md.contains("# Example Domain\n"));
        assert!(md.contains("**URL:** <https://example.com/>"));
        assert!(md.ends_with("_Generated 2024-01-15T10:30:00Z_\n"));
    }

    #[test]
    fn renders_content_section() {
        let md = render_markdown(&sample_record(), &NodeIndex::root(1), generated_at());

        assert!(md.contains("## Content\n"));
        assert!(md.contains("\n### Welcome\n"));
        assert!(md.contains("\n###### Deep\n"));
        assert!(md.contains("Second paragraph."));
        assert!(!md.contains("No structured content"));

        let welcome = md.find("Welcome").unwrap();
        let first = md.find("First paragraph.").unwrap();
        assert!(welcome < first);
    }

    #[test]
    fn links_are_deduplicated_by_text() {
        let md = render_markdown(&sample_record(), &NodeIndex::root(1), generated_at());

        assert!(md.contains("- **Docs:** <https://example.com/docs>"));
        assert!(!md.contains("documentation"));
        assert!(md.contains("- <https://example.com/img>"));
        assert!(md.contains("- <https://example.com/raw>"));
    }

    #[test]
    fn link_list_is_capped() {
        let record = PageRecord {
            url: "https://example.com/".into(),
            title: "Many".into(),
            links: (0..40)
                .map(|i| Link {
                    text: format!("Page {i}"),
                    url: format!("https://example.com/{i}"),
                })
                .collect(),
            ..PageRecord::default()
        };
        let md = render_markdown(&record, &NodeIndex::root(1), generated_at());

        assert_eq!(md.matches("\n- **Page").count(), MAX_LINKS);
        assert!(md.contains("Page 29"));
        assert!(!md.contains("Page 30"));
    }

    #[test]
    fn error_record_renders_only_the_error() {
        let record = PageRecord::failed("https://example.com/missing", "network error: HTTP 404 Not Found");
        let md = render_markdown(&record, &NodeIndex::root(1), generated_at());

        assert!(md.contains("error: \"network error: HTTP 404 Not Found\""));
        assert!(md.contains("> **Error:** network error: HTTP 404 Not Found"));
        assert!(md.contains("# Untitled"));
        assert!(!md.contains("## Content"));
        assert!(!md.contains("## Links"));
    }

    #[test]
    fn empty_page_gets_placeholder() {
        let record = PageRecord {
            url: "https://example.com/".into(),
            title: "Blank".into(),
            ..PageRecord::default()
        };
        let md = render_markdown(&record, &NodeIndex::root(1), generated_at());
        assert!(md.contains("_No structured content found on this page._"));
    }

    #[test]
    fn unparseable_urls_render_as_code_spans() {
        let record = PageRecord {
            url: "not a url".into(),
            title: "Broken".into(),
            links: vec![
                Link { text: "Broken".into(), url: "http://[broken".into() },
                Link { text: "Tick".into(), url: "a`b <c>".into() },
            ],
            ..PageRecord::default()
        };
        let md = render_markdown(&record, &NodeIndex::root(1), generated_at());

        assert!(md.contains("**URL:** `not a url`"));
        assert!(!md.contains("<not a url>"));
        assert!(md.contains("- **Broken:** `http://[broken`"));
        assert!(md.contains("- **Tick:** ``a`b <c>``"));
    }

    #[test]
    fn link_text_whitespace_is_collapsed() {
        let record = PageRecord {
            url: "https://example.com/".into(),
            title: "Links".into(),
            links: vec![Link { text: "Read\n   more".into(), url: "https://example.com/more".into() }],
            ..PageRecord::default()
        };
        let md = render_markdown(&record, &NodeIndex::root(1), generated_at());
        assert!(md.contains("- **Read more:** <https://example.com/more>"));
    }

    #[test]
    fn code_span_fences_outgrow_backtick_runs() {
        assert_eq!(code_span("plain"), "`plain`");
        assert_eq!(code_span("a``b"), "```a``b```");
        assert_eq!(code_span("`edge"), "`` `edge ``");
    }

    #[test]
    fn text_is_cleaned_and_escaped() {
        assert_eq!(clean_text(" a\0b \r\n c\t "), "ab c");
        assert_eq!(escape_markdown("*bold* [x] #1 a_b"), r"\*bold\* \[x\] \#1 a\_b");
        assert_eq!(escape_yaml_string(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
    }
}
