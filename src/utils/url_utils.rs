// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将职位卡片中的链接解析为绝对URL
pub fn resolve_url(base_url: &Url, href: &str) -> Result<Url, ParseError> {
    base_url.join(href.trim())
}

/// 只接受 http/https 链接，`javascript:`、`mailto:` 等一律丢弃
pub fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_page() -> Url {
        Url::parse("https://de.indeed.com/jobs?q=rust&l=Berlin").unwrap()
    }

    #[test]
    fn test_absolute_link_is_kept() {
        assert_eq!(
            resolve_url(&search_page(), "https://at.indeed.com/viewjob?jk=1")
                .unwrap()
                .as_str(),
            "https://at.indeed.com/viewjob?jk=1"
        );
    }

    #[test]
    fn test_root_relative_link_uses_page_host() {
        assert_eq!(
            resolve_url(&search_page(), "/rc/clk?jk=abc&from=vj")
                .unwrap()
                .as_str(),
            "https://de.indeed.com/rc/clk?jk=abc&from=vj"
        );
    }

    #[test]
    fn test_protocol_relative_link() {
        assert_eq!(
            resolve_url(&search_page(), " //ch.indeed.com/viewjob?jk=2 ")
                .unwrap()
                .as_str(),
            "https://ch.indeed.com/viewjob?jk=2"
        );
    }

    #[test]
    fn test_non_web_schemes_are_rejected() {
        let base = search_page();
        assert!(is_web_url(&resolve_url(&base, "/viewjob?jk=3").unwrap()));
        assert!(!is_web_url(&resolve_url(&base, "javascript:void(0)").unwrap()));
        assert!(!is_web_url(&resolve_url(&base, "mailto:jobs@example.com").unwrap()));
    }
}
