use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

const ABOUT_JSON: &str = include_str!("../content/about.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse page content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("section #{index} has no id")]
    MissingSectionId { index: usize },
    #[error("section id `{0}` is used more than once")]
    DuplicateSection(String),
    #[error("section `{0}` has no items")]
    EmptySection(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AboutContent {
    pub title: String,
    pub tagline: String,
    pub hero: Hero,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub closing: Vec<Prose>,
    pub footer: String,
}

/// Opening block. Observed like the other sections but never animated.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Hero {
    pub id: String,
    pub heading: String,
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// A section that reveals itself the first time it scrolls into view.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Section {
    pub id: String,
    pub heading: String,
    pub layout: Layout,
    #[serde(default)]
    pub intro: Option<String>,
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub outro: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Numbered steps, numbers taken from list position.
    Steps,
    Cards,
    Stacked,
    List,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ContentItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Plain prose block without reveal tracking.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Prose {
    pub class: String,
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl AboutContent {
    fn validate(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        if self.hero.id.trim().is_empty() {
            return Err(ContentError::MissingSectionId { index: 0 });
        }
        seen.insert(self.hero.id.as_str());

        for (index, section) in self.sections.iter().enumerate() {
            if section.id.trim().is_empty() {
                return Err(ContentError::MissingSectionId { index: index + 1 });
            }
            if !seen.insert(section.id.as_str()) {
                return Err(ContentError::DuplicateSection(section.id.clone()));
            }
            if section.items.is_empty() {
                return Err(ContentError::EmptySection(section.id.clone()));
            }
        }
        Ok(())
    }
}

/// Parses and validates page content from JSON.
pub fn parse(json: &str) -> Result<AboutContent, ContentError> {
    let content: AboutContent = serde_json::from_str(json)?;
    content.validate()?;
    Ok(content)
}

/// Loads the content bundled into the binary.
pub fn load() -> Result<AboutContent, ContentError> {
    parse(ABOUT_JSON)
}
