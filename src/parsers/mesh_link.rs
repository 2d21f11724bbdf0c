/*!
Parser for the link lines printed by the mesh daemon's dot-draw output.

A link line looks like:

```text
"82.130.102.52" -> "82.130.103.111"[label="1.094"];
```

Anything else in the dump (`digraph`, braces, node declarations) is ignored.
*/

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One reported link: who, to whom, and how good. Quality is kept as the text the daemon printed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub dest: String,
    pub quality: String,
}

impl LinkRecord {
    pub fn new(source: impl Into<String>, dest: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            quality: quality.into(),
        }
    }

    /// Apply `f` to both endpoints, keeping the quality.
    pub fn map_endpoints<F>(self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        Self {
            source: f(&self.source),
            dest: f(&self.dest),
            quality: self.quality,
        }
    }
}

/// Compiled once. Octets must not run into a following digit, the filler between the groups is
/// lazy so the first two addresses and the first float closing the label are the ones captured.
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^""#,
        r"((?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?))",
        r"\D.*?",
        r"((?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?))",
        r"\D.*?",
        r"([+-]?\d*\.\d+)",
        r#""\];"#,
    ))
    .expect("link pattern is a valid regex")
});

/// Parse a single line. `None` if the line is not a link line.
pub fn parse_link_line(line: &str) -> Option<LinkRecord> {
    let caps = LINK_RE.captures(line)?;
    Some(LinkRecord::new(&caps[1], &caps[2], &caps[3]))
}

/// Lazily parse every link line in a text blob. Calling it again on the same text restarts from the top.
pub fn parse_links(text: &str) -> impl Iterator<Item = LinkRecord> + '_ {
    text.lines().filter_map(parse_link_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_line() {
        let rec = parse_link_line(r#""10.0.0.1" -> "10.0.0.2"[label="0.987"];"#).unwrap();
        assert_eq!(rec, LinkRecord::new("10.0.0.1", "10.0.0.2", "0.987"));
    }

    #[test]
    fn test_parse_multi_digit_octets() {
        let rec =
            parse_link_line(r#""82.130.102.52" -> "82.130.103.111"[label="1.094"];"#).unwrap();
        assert_eq!(rec.source, "82.130.102.52");
        assert_eq!(rec.dest, "82.130.103.111");
        assert_eq!(rec.quality, "1.094");
    }

    #[test]
    fn test_parse_high_octets() {
        let rec =
            parse_link_line(r#""255.249.199.1" -> "192.168.0.255"[label="12.5"];"#).unwrap();
        assert_eq!(rec.source, "255.249.199.1");
        assert_eq!(rec.dest, "192.168.0.255");
        assert_eq!(rec.quality, "12.5");
    }

    #[test]
    fn test_quality_without_leading_digit() {
        let rec = parse_link_line(r#""10.0.0.1" -> "10.0.0.2"[label=".5"];"#).unwrap();
        assert_eq!(rec.quality, ".5");
    }

    #[test]
    fn test_non_link_lines_skipped() {
        let dump = concat!(
            "digraph topology\n",
            "{\n",
            "\"10.0.0.1\" -> \"10.0.0.2\"[label=\"0.987\"];\n",
            "\"10.0.0.2\"[shape=box];\n",
            "\"10.0.0.3\" -> \"10.0.0.0/24\"[label=\"HNA\"];\n",
            "  \"10.0.0.4\" -> \"10.0.0.5\"[label=\"1.000\"];\n",
            "}\n",
        );
        let records: Vec<_> = parse_links(dump).collect();
        assert_eq!(records, vec![LinkRecord::new("10.0.0.1", "10.0.0.2", "0.987")]);
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert_eq!(parse_links("").count(), 0);
        assert_eq!(parse_links("hello\nworld\n\n").count(), 0);
        assert_eq!(parse_links(r#""10.0.0.1" -> "10.0.0.2"[label="0.987"]"#).count(), 0);
        assert_eq!(parse_links(r#""10.0.0.1" -> "10.0.0.2"[label="1"];"#).count(), 0);
        assert_eq!(parse_links(r#""300.0.0.1" -> "10.0.0.2"[label="1.0"];"#).count(), 0);
    }

    #[test]
    fn test_permissive_filler_and_trailing_text() {
        let line = r#""10.0.0.1" => somewhere "10.0.0.9" extra [weight="3", label="0.250"]; // comment"#;
        let rec = parse_link_line(line).unwrap();
        assert_eq!(rec, LinkRecord::new("10.0.0.1", "10.0.0.9", "0.250"));
    }

    #[test]
    fn test_crlf_input() {
        let dump = "\"10.0.0.1\" -> \"10.0.0.2\"[label=\"0.987\"];\r\n\"10.0.0.2\" -> \"10.0.0.1\"[label=\"1.000\"];\r\n";
        let records: Vec<_> = parse_links(dump).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], LinkRecord::new("10.0.0.2", "10.0.0.1", "1.000"));
    }

    #[test]
    fn test_parse_is_restartable() {
        let dump = "\"10.0.0.1\" -> \"10.0.0.2\"[label=\"0.987\"];\n";
        assert_eq!(parse_links(dump).count(), 1);
        assert_eq!(parse_links(dump).count(), 1);
    }

    #[test]
    fn test_map_endpoints() {
        let rec = LinkRecord::new("a", "b", "1.0").map_endpoints(|s| s.to_uppercase());
        assert_eq!(rec, LinkRecord::new("A", "B", "1.0"));
    }
}
