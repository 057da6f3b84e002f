//! Navigation sections and the canonical `lower <-> Capitalized` name mapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("section id must not be empty")]
    Empty,
    #[error("unknown section: {0}")]
    Unknown(String),
}

/// Lowercase canonical identifier of a section.
///
/// Doubles as the anchor name of the section's region in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId(String);

impl SectionId {
    /// Parse either form (`"news"` or `"News"`) into the canonical lowercase id.
    pub fn parse(raw: &str) -> Result<Self, SectionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SectionError::Empty);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Anchor name of the section's region.
    #[must_use]
    pub fn anchor(&self) -> &str {
        &self.0
    }

    /// Capitalized form: first character uppercased, remainder unchanged.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SectionId {
    type Error = SectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SectionId> for String {
    fn from(value: SectionId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    display_name: String,
}

impl Section {
    #[must_use]
    pub fn new(id: SectionId) -> Self {
        let display_name = id.display_name();
        Self { id, display_name }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn anchor(&self) -> &str {
        self.id.anchor()
    }
}

/// The fixed, ordered set of sections known for the lifetime of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    /// Navigation entries in display order.
    pub const DEFAULT_NAMES: [&'static str; 6] =
        ["Mindful", "Quotes", "Mood", "News", "Favorites", "Journal"];

    /// Build a catalog from display names. Duplicate ids are rejected.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, SectionError> {
        let mut sections: Vec<Section> = Vec::new();
        for name in names {
            let id = SectionId::parse(name)?;
            if sections.iter().any(|s| s.id == id) {
                continue;
            }
            sections.push(Section::new(id));
        }
        if sections.is_empty() {
            return Err(SectionError::Empty);
        }
        Ok(Self { sections })
    }

    /// Look up a section by either name form.
    pub fn resolve(&self, raw: &str) -> Result<&Section, SectionError> {
        let id = SectionId::parse(raw)?;
        self.get(&id)
            .ok_or_else(|| SectionError::Unknown(raw.trim().to_string()))
    }

    #[must_use]
    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &SectionId) -> bool {
        self.get(id).is_some()
    }

    /// First entry; the initial active section.
    #[must_use]
    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.iter().map(Section::id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionCatalog {
    fn default() -> Self {
        let sections = Self::DEFAULT_NAMES
            .iter()
            .map(|name| Section::new(SectionId(name.to_lowercase())))
            .collect();
        Self { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_forms() {
        let lower = SectionId::parse("news").unwrap();
        let upper = SectionId::parse("News").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "news");
        assert_eq!(lower.display_name(), "News");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(SectionId::parse("   "), Err(SectionError::Empty));
    }

    #[test]
    fn default_catalog_order() {
        let catalog = SectionCatalog::default();
        let names: Vec<_> = catalog.iter().map(Section::display_name).collect();
        assert_eq!(
            names,
            vec!["Mindful", "Quotes", "Mood", "News", "Favorites", "Journal"]
        );
        assert_eq!(catalog.first().anchor(), "mindful");
    }

    #[test]
    fn resolve_unknown_section() {
        let catalog = SectionCatalog::default();
        assert_eq!(
            catalog.resolve("Weather"),
            Err(SectionError::Unknown("Weather".to_string()))
        );
    }

    #[test]
    fn from_names_skips_duplicates() {
        let catalog = SectionCatalog::from_names(["A", "a", "B"]).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn serde_uses_canonical_form() {
        let id: SectionId = serde_json::from_str("\"Journal\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"journal\"");
    }
}
