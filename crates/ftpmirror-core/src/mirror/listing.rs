//! LIST line parser.
//!
//! Each line yields an attribute token and a name. The attribute's first
//! character classifies the entry: `-` file, `d` directory, anything else
//! unknown. Listings are assumed to be Unix `ls -l` style:
//!
//! ```text
//! drwxr-xr-x   2 user group  4096 Jan  1 12:00 dirname
//! -rw-r--r--   1 user group  1234 Jan  1  2025 file name.txt
//! lrwxrwxrwx   1 user group    42 Jan  1 12:00 link -> target
//! ```
//!
//! For full records like these the name is everything after the date, so
//! embedded spaces survive. Shorter or unfamiliar lines fall back to the
//! last whitespace-separated token.

use crate::mirror::error::{MirrorError, Result};
use crate::mirror::types::PathType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNIX_LINE: Regex = Regex::new(
        r"(?x)
        ^[dlcbps-][rwxsStT-]{9}[+@.]?\s+   # permissions
        \d+\s+                             # link count
        \S+\s+                             # owner
        \S+\s+                             # group
        \d+\s+                             # size
        \w{3}\s+\d{1,2}\s+[\d:]+\s         # date
        (.+)$                              # name (possibly with -> target)
        "
    )
    .expect("unix listing pattern compiles");
}

/// One parsed listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    /// First whitespace-delimited field (e.g. `drwxr-xr-x`).
    pub attribute: String,
    pub name: String,
}

impl ListingRecord {
    /// Parse one raw listing line.
    ///
    /// Fails with `MalformedListing` when the line has fewer than two
    /// whitespace-separated tokens.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let (attribute, last) = match (tokens.next(), tokens.next_back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(MirrorError::MalformedListing(line.to_string())),
        };

        let name = match UNIX_LINE.captures(line).and_then(|c| c.get(1)) {
            Some(full) => {
                let full = full.as_str().trim_start();
                if attribute.starts_with('l') {
                    full.split(" -> ").next().unwrap_or(full)
                } else {
                    full
                }
            }
            None => last,
        };

        Ok(Self {
            attribute: attribute.to_string(),
            name: name.to_string(),
        })
    }

    /// Classify by the first character of the attribute token.
    pub fn kind(&self) -> PathType {
        match self.attribute.as_bytes().first() {
            Some(b'-') => PathType::File,
            Some(b'd') => PathType::Directory,
            _ => PathType::Unknown,
        }
    }

    /// `.` or `..`, which must never be walked or emitted.
    pub fn is_self_or_parent(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Parse a whole listing, preserving server order.
///
/// Blank lines and the `total N` header are dropped silently; malformed
/// lines are dropped with a warning.
pub fn parse_listing<S: AsRef<str>>(lines: &[S]) -> Vec<ListingRecord> {
    lines
        .iter()
        .map(|line| -> &str { line.as_ref() })
        .filter(|line| !line.trim().is_empty() && !is_total_header(line))
        .filter_map(|line| match ListingRecord::parse(line) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping listing line: {}", e);
                None
            }
        })
        .collect()
}

fn is_total_header(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    matches!(
        (tokens.next(), tokens.next(), tokens.next()),
        (Some("total"), Some(n), None) if n.bytes().all(|b| b.is_ascii_digit())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_file_line() {
        let r = ListingRecord::parse("-rw-r--r--   1 user group  1234 Jan  1 12:00 readme.txt").unwrap();
        assert_eq!(r.attribute, "-rw-r--r--");
        assert_eq!(r.name, "readme.txt");
        assert_eq!(r.kind(), PathType::File);
    }

    #[test]
    fn unix_dir_line() {
        let r = ListingRecord::parse("drwxr-xr-x   2 root root  4096 Mar  1 09:30 subdir").unwrap();
        assert_eq!(r.kind(), PathType::Directory);
        assert_eq!(r.name, "subdir");
        assert!(!r.is_self_or_parent());
    }

    #[test]
    fn dot_entries_are_flagged() {
        let r = ListingRecord::parse("drwxr-xr-x   2 root root  4096 Mar  1 09:30 .").unwrap();
        assert!(r.is_self_or_parent());
        let r = ListingRecord::parse("drwxr-xr-x   9 root root  4096 Mar  1 09:30 ..").unwrap();
        assert!(r.is_self_or_parent());
    }

    #[test]
    fn name_with_spaces_survives_full_record() {
        let r = ListingRecord::parse("-rw-r--r--   1 ftp ftp  10 Jan  1  2025 annual report.pdf").unwrap();
        assert_eq!(r.name, "annual report.pdf");
    }

    #[test]
    fn symlink_is_unknown_and_target_is_stripped() {
        let r = ListingRecord::parse("lrwxrwxrwx   1 root root    22 Jan  5 08:00 latest -> /var/target").unwrap();
        assert_eq!(r.kind(), PathType::Unknown);
        assert_eq!(r.name, "latest");
    }

    #[test]
    fn short_line_falls_back_to_last_token() {
        let r = ListingRecord::parse("drwx------ 3 backups").unwrap();
        assert_eq!(r.kind(), PathType::Directory);
        assert_eq!(r.name, "backups");

        let r = ListingRecord::parse("-r 1").unwrap();
        assert_eq!(r.attribute, "-r");
        assert_eq!(r.name, "1");
    }

    #[test]
    fn single_token_line_is_malformed() {
        let err = ListingRecord::parse("garbage").unwrap_err();
        assert!(matches!(err, MirrorError::MalformedListing(ref l) if l == "garbage"));
        assert!(ListingRecord::parse("   ").is_err());
    }

    #[test]
    fn windows_style_line_is_unknown() {
        let r = ListingRecord::parse("01-01-26  12:00AM      <DIR> Documents").unwrap();
        assert_eq!(r.kind(), PathType::Unknown);
        assert_eq!(r.name, "Documents");
    }

    #[test]
    fn listing_keeps_order_and_drops_noise() {
        let lines = vec![
            "total 12",
            "drwxr-xr-x   2 ftp ftp  4096 Jan  1 12:00 b",
            "",
            "oops",
            "-rw-r--r--   1 ftp ftp    10 Jan  1 12:00 a",
        ];
        let records = parse_listing(&lines);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn total_header_needs_a_number() {
        assert!(is_total_header("total 0"));
        assert!(!is_total_header("total x"));
        assert!(!is_total_header("total 1 2"));
    }
}
