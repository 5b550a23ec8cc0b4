//! Option maps and their rendering into command-line switches.
//!
//! An [`OptionMap`] keeps insertion order; several wrapped tools care about the
//! order of their switches.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Scalar(String),
    Flag(bool),
    Nested(OptionMap),
}

impl OptionValue {
    /// Falsy values never produce a switch.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Scalar(value) => !value.is_empty(),
            OptionValue::Flag(value) => *value,
            OptionValue::Nested(_) => true,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Scalar(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Scalar(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        OptionValue::Scalar(value.clone())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Scalar(value.to_string())
    }
}

impl From<OptionMap> for OptionValue {
    fn from(value: OptionMap) -> Self {
        OptionValue::Nested(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value
            .map(Into::into)
            .unwrap_or(OptionValue::Flag(false))
    }
}

/// Ordered option name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a tool spells its switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchStyle {
    pub prefix: &'static str,
    pub value_separator: &'static str,
    pub nested_separator: &'static str,
}

impl SwitchStyle {
    /// `-key:value -flag -key:a=1,b`
    pub const DASH: SwitchStyle = SwitchStyle {
        prefix: "-",
        value_separator: ":",
        nested_separator: ",",
    };

    /// `/key:value /flag /key:a=1;b`
    pub const SLASH: SwitchStyle = SwitchStyle {
        prefix: "/",
        value_separator: ":",
        nested_separator: ";",
    };
}

impl Default for SwitchStyle {
    fn default() -> Self {
        SwitchStyle::DASH
    }
}

/// Render an option map into one token per switch, in insertion order.
pub fn render_switches(options: &OptionMap, style: SwitchStyle) -> Vec<String> {
    options
        .iter()
        .filter(|(_, value)| value.is_truthy())
        .filter_map(|(key, value)| render_switch(key, value, style))
        .collect()
}

/// Same as [`render_switches`], joined with single spaces.
pub fn render_switch_line(options: &OptionMap, style: SwitchStyle) -> String {
    render_switches(options, style).join(" ")
}

fn render_switch(key: &str, value: &OptionValue, style: SwitchStyle) -> Option<String> {
    match value {
        OptionValue::Flag(true) => Some(format!("{}{}", style.prefix, key)),
        OptionValue::Flag(false) => None,
        OptionValue::Scalar(value) => Some(format!(
            "{}{}{}{}",
            style.prefix, key, style.value_separator, value
        )),
        OptionValue::Nested(nested) => Some(format!(
            "{}{}{}{}",
            style.prefix,
            key,
            style.value_separator,
            render_pairs(nested, style)
        )),
    }
}

fn render_pairs(nested: &OptionMap, style: SwitchStyle) -> String {
    nested
        .iter()
        .filter(|(_, value)| value.is_truthy())
        .map(|(key, value)| match value {
            OptionValue::Flag(_) => key.to_string(),
            OptionValue::Scalar(value) => format!("{}={}", key, value),
            OptionValue::Nested(inner) => format!("{}={}", key, render_pairs(inner, style)),
        })
        .collect::<Vec<_>>()
        .join(style.nested_separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OptionMap {
        OptionMap::new()
            .with("tool", "/bin/x")
            .with("Configuration", "Release")
            .with("TreatWarningsAsErrors", true)
            .with("Props", OptionMap::new().with("A", "1").with("B", true))
    }

    #[test]
    fn renders_scalars_flags_and_nested_maps_in_order() {
        let mut options = sample();
        options.remove("tool");

        assert_eq!(
            render_switch_line(&options, SwitchStyle::DASH),
            "-Configuration:Release -TreatWarningsAsErrors -Props:A=1,B"
        );
    }

    #[test]
    fn falsy_values_emit_nothing() {
        let options = OptionMap::new()
            .with("verb", "sync")
            .with("whatif", false)
            .with("skip", "")
            .with("retry", Option::<String>::None)
            .with(
                "dest",
                OptionMap::new()
                    .with("auto", true)
                    .with("computerName", "")
                    .with("includeAcls", false),
            );

        assert_eq!(render_switches(&options, SwitchStyle::DASH), vec!["-verb:sync", "-dest:auto"]);
    }

    #[test]
    fn nested_map_without_truthy_entries_keeps_the_key() {
        let options = OptionMap::new()
            .with("p", OptionMap::new().with("A", false).with("B", ""))
            .with("q", OptionMap::new());
        assert_eq!(render_switches(&options, SwitchStyle::SLASH), vec!["/p:", "/q:"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let options = sample();
        let first = render_switch_line(&options, SwitchStyle::DASH);
        for _ in 0..10 {
            assert_eq!(render_switch_line(&options, SwitchStyle::DASH), first);
        }
    }

    #[test]
    fn overwritten_key_keeps_position() {
        let mut options = OptionMap::new().with("a", "1").with("b", "2");
        options.insert("a", "3");

        assert_eq!(render_switch_line(&options, SwitchStyle::DASH), "-a:3 -b:2");
    }

    #[test]
    fn slash_style_uses_semicolons_between_pairs() {
        let options = OptionMap::new().with("nologo", true).with(
            "p",
            OptionMap::new()
                .with("Configuration", "Debug")
                .with("TreatWarningsAsErrors", "true"),
        );

        assert_eq!(
            render_switch_line(&options, SwitchStyle::SLASH),
            "/nologo /p:Configuration=Debug;TreatWarningsAsErrors=true"
        );
    }

    #[test]
    fn values_are_not_escaped() {
        let options = OptionMap::new().with("OutputFile", "C:/out dir/Update.sql");
        assert_eq!(
            render_switches(&options, SwitchStyle::SLASH),
            vec!["/OutputFile:C:/out dir/Update.sql"]
        );
    }
}
