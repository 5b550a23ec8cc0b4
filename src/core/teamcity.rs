//! Build statistics and status text for the CI server.
//!
//! Quality tasks record key/value statistics and status lines while they run.
//! At the end of a run they are written to `teamcity-info.xml` in the project
//! root, where the CI server picks them up.

use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::utils::io;

pub const INFO_FILE: &str = "teamcity-info.xml";
pub const PROJECT_NAME_VAR: &str = "TEAMCITY_PROJECT_NAME";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatistics {
    pub statistics: Vec<Statistic>,
    pub status_text: Vec<String>,
}

impl BuildStatistics {
    /// Record a statistic. A key recorded twice keeps the latest value.
    pub fn add_statistic(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        log_status!("teamcity", "{} = {}", key, value);

        match self.statistics.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.value = value,
            None => self.statistics.push(Statistic { key, value }),
        }
    }

    pub fn append_status_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        log_status!("teamcity", "{}", text);
        self.status_text.push(text);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.statistics
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.statistics.is_empty() && self.status_text.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<build>\n");

        if !self.status_text.is_empty() {
            xml.push_str("  <statusInfo>\n");
            for text in &self.status_text {
                xml.push_str(&format!(
                    "    <text action=\"append\"> {}</text>\n",
                    escape_xml(text)
                ));
            }
            xml.push_str("  </statusInfo>\n");
        }

        for statistic in &self.statistics {
            xml.push_str(&format!(
                "  <statisticValue key=\"{}\" value=\"{}\"/>\n",
                escape_xml(&statistic.key),
                escape_xml(&statistic.value)
            ));
        }

        xml.push_str("</build>\n");
        xml
    }

    /// Write `teamcity-info.xml` into `root`. Nothing is written when empty.
    pub fn write(&self, root: &Path) -> Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }

        let path = root.join(INFO_FILE);
        io::write_file(&path, &self.to_xml(), "write build statistics")?;
        log_status!("teamcity", "Wrote {}", path.display());
        Ok(true)
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Whether the run happens under the CI server.
pub fn is_ci() -> bool {
    std::env::var_os(PROJECT_NAME_VAR).is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn latest_statistic_value_wins() {
        let mut stats = BuildStatistics::default();
        stats.add_statistic("LOC.CS", "100");
        stats.add_statistic("LOC.CS", "120");

        assert_eq!(stats.statistics.len(), 1);
        assert_eq!(stats.get("LOC.CS"), Some("120"));
    }

    #[test]
    fn xml_escapes_values() {
        let mut stats = BuildStatistics::default();
        stats.append_status_text("3 FxCop violation(s) <new>");
        stats.add_statistic("FxCopViolations", "3");

        assert_eq!(
            stats.to_xml(),
            "<build>\n  <statusInfo>\n    <text action=\"append\"> 3 FxCop violation(s) &lt;new&gt;</text>\n  </statusInfo>\n  <statisticValue key=\"FxCopViolations\" value=\"3\"/>\n</build>\n"
        );
    }

    #[test]
    fn write_skips_empty_statistics() {
        let dir = TempDir::new().unwrap();
        assert!(!BuildStatistics::default().write(dir.path()).unwrap());
        assert!(!dir.path().join(INFO_FILE).exists());

        let mut stats = BuildStatistics::default();
        stats.add_statistic("NCoverCodeCoverage", "81.5");
        assert!(stats.write(dir.path()).unwrap());

        let written = fs::read_to_string(dir.path().join(INFO_FILE)).unwrap();
        assert!(written.contains("key=\"NCoverCodeCoverage\" value=\"81.5\""));
    }
}
