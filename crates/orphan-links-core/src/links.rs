//! Internal-link detection by permalink containment.
//!
//! A document links to a target when its body contains the target's
//! absolute permalink or the site-relative form obtained by stripping the
//! site root prefix.

/// The two textual forms under which a document can be linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub absolute: String,
    /// `None` when the relative form is too generic to match on (`""` or `"/"`).
    pub relative: Option<String>,
}

impl LinkTarget {
    pub fn new(permalink: &str, site_root: &str) -> Self {
        let site_root = site_root.trim_end_matches('/');
        let relative = if site_root.is_empty() {
            permalink
        } else {
            permalink.strip_prefix(site_root).unwrap_or(permalink)
        };
        let relative = if relative.chars().count() > 1 && relative != permalink {
            Some(relative.to_string())
        } else {
            None
        };
        Self {
            absolute: permalink.to_string(),
            relative,
        }
    }

    /// Whether `body` references this target.
    pub fn is_linked_from(&self, body: &str) -> bool {
        if !self.absolute.is_empty() && body.contains(&self.absolute) {
            return true;
        }
        match &self.relative {
            Some(rel) => body.contains(rel.as_str()),
            None => false,
        }
    }
}

fn is_link_token(token: &str) -> bool {
    token.contains("://") || (token.starts_with('/') && token.chars().count() > 1)
}

/// Percentage of whitespace-delimited tokens in `body` that are URLs.
pub fn link_density(body: &str) -> f64 {
    let mut total = 0usize;
    let mut links = 0usize;
    for token in body.split_whitespace() {
        total += 1;
        if is_link_token(token) {
            links += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        links as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_form_strips_site_root() {
        let t = LinkTarget::new("https://example.com/coffee/beans/", "https://example.com");
        assert_eq!(t.relative.as_deref(), Some("/coffee/beans/"));

        let t = LinkTarget::new("https://example.com/coffee/", "https://example.com/");
        assert_eq!(t.relative.as_deref(), Some("/coffee/"));
    }

    #[test]
    fn home_page_relative_form_is_ignored() {
        let t = LinkTarget::new("https://example.com/", "https://example.com");
        assert_eq!(t.relative, None);
        assert!(!t.is_linked_from("see /other/ page"));
        assert!(t.is_linked_from("visit https://example.com/ today"));
    }

    #[test]
    fn foreign_permalink_has_no_relative_form() {
        let t = LinkTarget::new("https://other.org/a/", "https://example.com");
        assert_eq!(t.relative, None);
    }

    #[test]
    fn detects_either_form() {
        let t = LinkTarget::new("https://example.com/grinders/", "https://example.com");
        assert!(t.is_linked_from("Read https://example.com/grinders/ first."));
        assert!(t.is_linked_from("<a href=\"/grinders/\">grinders</a>"));
        assert!(!t.is_linked_from("Grinders are great."));
    }

    #[test]
    fn density_counts_url_tokens() {
        assert_eq!(link_density(""), 0.0);
        assert_eq!(link_density("no links here at all"), 0.0);
        let d = link_density("see https://example.com/a and /b/ now");
        assert!((d - 40.0).abs() < 1e-9);
        assert_eq!(link_density("a / b"), 0.0);
    }
}
