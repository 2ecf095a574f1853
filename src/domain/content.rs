//! HTML sanitization for blog post bodies.

use std::collections::{HashMap, HashSet};

use ammonia::Builder as AmmoniaBuilder;
use once_cell::sync::Lazy;

static BLOG_SANITIZER: Lazy<AmmoniaBuilder<'static>> = Lazy::new(build_blog_sanitizer);

/// Strip everything outside the blog body allow-list.
pub fn sanitize_blog_html(html: &str) -> String {
    BLOG_SANITIZER.clean(html).to_string()
}

fn build_blog_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "p",
        "h1",
        "h2",
        "h3",
        "strong",
        "em",
        "a",
        "ul",
        "ol",
        "li",
        "blockquote",
        "code",
        "pre",
    ]);
    builder.tags(tags);
    builder.generic_attributes(HashSet::new());
    builder.tag_attributes(HashMap::from([(
        "a",
        HashSet::from(["href", "target", "rel"]),
    )]));
    builder.url_schemes(HashSet::from(["http", "https"]));
    // `rel` is author-controlled here; ammonia refuses to manage it at the same time.
    builder.link_rel(None);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_and_unknown_tags_are_removed() {
        let html = sanitize_blog_html(
            "<p>Hello <span>there</span></p><script>alert(1)</script><img src=\"x\">",
        );
        assert_eq!(html, "<p>Hello there</p>");
    }

    #[test]
    fn links_keep_allowed_attributes_only() {
        let html = sanitize_blog_html(
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener\" onclick=\"x()\">go</a>",
        );
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("rel=\"noopener\""));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn non_http_schemes_are_dropped() {
        let html = sanitize_blog_html("<a href=\"javascript:alert(1)\">x</a>");
        assert!(!html.contains("javascript"));
    }
}
