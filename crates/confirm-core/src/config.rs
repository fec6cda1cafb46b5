//! Loaded configuration: section name -> option name -> raw string value.

use serde::Serialize;
use std::collections::BTreeMap;

/// Options of a single config section.
pub type SectionValues = BTreeMap<String, String>;

/// A configuration file flattened to two levels of plain strings.
///
/// This is what the loader hands to the validator and the generators; the
/// original file syntax (INI or YAML) is gone by the time it exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Config {
    sections: BTreeMap<String, SectionValues>,
}

impl Config {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a section exists, even if it ends up with no options.
    pub fn ensure_section(&mut self, section: impl Into<String>) -> &mut SectionValues {
        self.sections.entry(section.into()).or_default()
    }

    /// Set an option value, creating the section if needed.
    pub fn insert(
        &mut self,
        section: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.ensure_section(section)
            .insert(option.into(), value.into());
    }

    /// Get the options of a section.
    pub fn section(&self, name: &str) -> Option<&SectionValues> {
        self.sections.get(name)
    }

    /// Get a single option value.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .map(String::as_str)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Iterate over sections in lexicographic order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionValues)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<S, O, V> FromIterator<(S, O, V)> for Config
where
    S: Into<String>,
    O: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, O, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (section, option, value) in iter {
            config.insert(section, option, value);
        }
        config
    }
}
