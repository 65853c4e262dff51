//! The `NNN-name` ordering convention for scanned content.
//!
//! A numeric prefix orders an entry among its siblings and keeps it in the
//! navigation; entries without one sort last and are hidden. Dashes in the
//! name become spaces, so `020-Getting-Started.md` is the page
//! "Getting Started" whose path segment is `Getting_Started`.

/// Result of parsing an entry stem like `020-Getting-Started`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Ordering prefix, if any.
    pub number: Option<u32>,
    /// Name with the prefix stripped and dashes turned into spaces.
    pub name: String,
}

impl ParsedName {
    pub fn is_numbered(&self) -> bool {
        self.number.is_some()
    }
}

/// Parse a file or directory stem.
///
/// - `"020-Getting-Started"` → number=Some(20), name="Getting Started"
/// - `"010"` → number=Some(10), name=""
/// - `"drafts"` → number=None, name="drafts"
/// - `"wip-notes"` → number=None, name="wip notes"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    let (number, rest) = match stem.split_once('-') {
        Some((prefix, rest)) => match prefix.parse::<u32>() {
            Ok(n) => (Some(n), rest),
            Err(_) => (None, stem),
        },
        None => match stem.parse::<u32>() {
            Ok(n) => (Some(n), ""),
            Err(_) => (None, stem),
        },
    };
    ParsedName {
        number,
        name: rest.replace('-', " "),
    }
}

/// Sibling order: numbered entries ascending, then unnumbered by stem.
pub fn sort_key(stem: &str) -> (u32, String) {
    let number = parse_entry_name(stem).number.unwrap_or(u32::MAX);
    (number, stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word() {
        let p = parse_entry_name("020-Getting-Started");
        assert_eq!(p.number, Some(20));
        assert_eq!(p.name, "Getting Started");
        assert!(p.is_numbered());
    }

    #[test]
    fn number_only() {
        let p = parse_entry_name("010");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "");
    }

    #[test]
    fn trailing_dash_leaves_empty_name() {
        assert_eq!(parse_entry_name("010-").name, "");
    }

    #[test]
    fn unnumbered_keeps_whole_stem() {
        let p = parse_entry_name("wip-notes");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "wip notes");
        assert!(!p.is_numbered());
    }

    #[test]
    fn numbered_sorts_before_unnumbered() {
        let mut stems = vec!["drafts", "020-B", "010-A", "alpha"];
        stems.sort_by_key(|s| sort_key(s));
        assert_eq!(stems, ["010-A", "020-B", "alpha", "drafts"]);
    }

    #[test]
    fn prefix_compares_numerically() {
        assert!(sort_key("9-Nine") < sort_key("10-Ten"));
    }
}
