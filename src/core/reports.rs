//! Reading values out of the XML reports the analyzers write.
//!
//! The reports are flat enough that start tags and their attributes are all
//! that is needed: an attribute of the first matching element, or how many
//! elements of a kind there are.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, ErrorCode, Result};
use crate::paths;
use crate::utils::io;

fn attribute_pattern() -> Option<Regex> {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).ok()
}

fn start_tag_pattern(element: &str) -> Option<Regex> {
    Regex::new(&format!(r"<{}(?:\s([^>]*?))?/?>", regex::escape(element))).ok()
}

pub struct XmlReport {
    source: String,
    content: String,
}

impl XmlReport {
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_file(path, "read report")?;
        Ok(Self::parse(paths::display(path), content))
    }

    pub fn parse(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// Attributes of every `<element ...>` start tag, in document order.
    pub fn elements(&self, element: &str) -> Vec<HashMap<String, String>> {
        let (Some(pattern), Some(attribute)) = (start_tag_pattern(element), attribute_pattern())
        else {
            return Vec::new();
        };

        pattern
            .captures_iter(&self.content)
            .map(|captures| {
                captures
                    .get(1)
                    .map(|attrs| parse_attributes(&attribute, attrs.as_str()))
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn count(&self, element: &str) -> usize {
        self.elements(element).len()
    }

    pub fn attribute(&self, element: &str, attribute: &str) -> Option<String> {
        self.elements(element)
            .into_iter()
            .find_map(|mut attrs| attrs.remove(attribute))
    }

    /// Attribute of the first `element` whose `key` attribute equals `value`.
    pub fn attribute_where(
        &self,
        element: &str,
        (key, value): (&str, &str),
        attribute: &str,
    ) -> Option<String> {
        self.elements(element)
            .into_iter()
            .filter(|attrs| attrs.get(key).is_some_and(|v| v == value))
            .find_map(|mut attrs| attrs.remove(attribute))
    }

    /// Turn a missing value into an error naming the report.
    pub fn require(&self, value: Option<String>, what: &str) -> Result<String> {
        value.ok_or_else(|| self.invalid(format!("{} not found", what)))
    }

    /// An error about this report's content, naming the report.
    pub fn invalid(&self, problem: impl Into<String>) -> Error {
        let problem = problem.into();
        Error::new(
            ErrorCode::InternalUnexpected,
            format!("{} in report {}", problem, self.source),
            serde_json::json!({ "report": self.source, "problem": problem }),
        )
    }
}

fn parse_attributes(pattern: &Regex, raw: &str) -> HashMap<String, String> {
    pattern
        .captures_iter(raw)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_string();
            let value = c.get(2).or_else(|| c.get(3))?.as_str();
            Some((name, unescape(value)))
        })
        .collect()
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOC: &str = r#"<?xml version="1.0"?>
<results>
  <header cloc_version="1.08" elapsed_seconds="0.5" n_files="42"/>
  <languages>
    <language name="XML" files_count="4" blank="0" comment="3" code="210" />
    <language name="C#" files_count="38" blank="500" comment="120" code="4321" />
    <total sum_files="42" blank="500" comment="123" code="4531" />
  </languages>
</results>"#;

    #[test]
    fn attribute_where_picks_matching_element() {
        let report = XmlReport::parse("cloc.xml", CLOC);
        assert_eq!(
            report.attribute_where("language", ("name", "C#"), "code").as_deref(),
            Some("4321")
        );
        assert_eq!(report.attribute("total", "sum_files").as_deref(), Some("42"));
        assert_eq!(report.attribute_where("language", ("name", "VB"), "code"), None);
    }

    #[test]
    fn element_names_do_not_match_prefixes() {
        let report = XmlReport::parse("cloc.xml", CLOC);
        assert_eq!(report.count("language"), 2);
        assert_eq!(report.count("languages"), 1);
    }

    #[test]
    fn counts_issue_elements() {
        let xml = r#"<FxCopReport><Messages>
            <Message><Issue Level="Error">a</Issue><Issue Level="Warning">b</Issue></Message>
            <Message><Issue>c</Issue></Message>
        </Messages></FxCopReport>"#;
        assert_eq!(XmlReport::parse("FxCop.xml", xml).count("Issue"), 3);
    }

    #[test]
    fn values_are_unescaped() {
        let report = XmlReport::parse("x.xml", r#"<project name="Shop &amp; Co" functionCoverage='81.5'>"#);
        assert_eq!(report.attribute("project", "name").as_deref(), Some("Shop & Co"));
        assert_eq!(report.attribute("project", "functionCoverage").as_deref(), Some("81.5"));
    }

    #[test]
    fn require_names_the_report() {
        let report = XmlReport::parse("Coverage.xml", "<coverageReport/>");
        let err = report
            .require(report.attribute("project", "functionCoverage"), "project/@functionCoverage")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalUnexpected);
        assert_eq!(
            err.message,
            "project/@functionCoverage not found in report Coverage.xml"
        );
        assert_eq!(err.details["report"], "Coverage.xml");
    }
}
