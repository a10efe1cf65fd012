//! Curated learning resources keyed by knowledge level.
//!
//! The knowledge level is a coarser ladder than [`crate::core::Tier`] and is
//! only used to pick reading material.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl KnowledgeLevel {
    /// >= 80 is advanced, >= 60 intermediate, anything else beginner.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Advanced
        } else if percentage >= 60.0 {
            Self::Intermediate
        } else {
            Self::Beginner
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for KnowledgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Article,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(default)]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Reading material per knowledge level, general tips, and the hands-on
/// exercises that close a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLibrary {
    #[serde(default)]
    pub levels: HashMap<KnowledgeLevel, Vec<Resource>>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub exercises: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
}

impl ResourceLibrary {
    /// Resources for `level`; levels without material fall back to the
    /// beginner list.
    #[must_use]
    pub fn for_level(&self, level: KnowledgeLevel) -> &[Resource] {
        self.levels
            .get(&level)
            .filter(|list| !list.is_empty())
            .or_else(|| self.levels.get(&KnowledgeLevel::Beginner))
            .map_or(&[], Vec::as_slice)
    }

    /// The first `n` tips.
    #[must_use]
    pub fn tips(&self, n: usize) -> &[String] {
        &self.tips[..n.min(self.tips.len())]
    }

    #[must_use]
    pub fn exercises(&self) -> &[String] {
        &self.exercises
    }

    /// Closing call to action; blank strings count as absent.
    #[must_use]
    pub fn challenge(&self) -> Option<&str> {
        self.challenge
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.values().all(Vec::is_empty)
            && self.tips.is_empty()
            && self.exercises.is_empty()
            && self.challenge().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Resource {
        Resource {
            title: title.to_string(),
            kind: ResourceKind::Article,
            url: None,
            platform: None,
            description: String::new(),
        }
    }

    #[test]
    fn knowledge_level_ladder() {
        assert_eq!(KnowledgeLevel::from_percentage(80.0), KnowledgeLevel::Advanced);
        assert_eq!(KnowledgeLevel::from_percentage(79.9), KnowledgeLevel::Intermediate);
        assert_eq!(KnowledgeLevel::from_percentage(60.0), KnowledgeLevel::Intermediate);
        assert_eq!(KnowledgeLevel::from_percentage(59.9), KnowledgeLevel::Beginner);
    }

    #[test]
    fn missing_level_falls_back_to_beginner() {
        let mut library = ResourceLibrary::default();
        library
            .levels
            .insert(KnowledgeLevel::Beginner, vec![article("Basics")]);
        library
            .levels
            .insert(KnowledgeLevel::Advanced, vec![article("Threat models")]);

        assert_eq!(library.for_level(KnowledgeLevel::Intermediate)[0].title, "Basics");
        assert_eq!(library.for_level(KnowledgeLevel::Advanced)[0].title, "Threat models");
        assert!(ResourceLibrary::default().for_level(KnowledgeLevel::Advanced).is_empty());
    }

    #[test]
    fn tips_are_bounded() {
        let library = ResourceLibrary {
            tips: vec!["a".into(), "b".into()],
            ..ResourceLibrary::default()
        };
        assert_eq!(library.tips(4).len(), 2);
        assert_eq!(library.tips(1), ["a".to_string()]);
    }

    #[test]
    fn deserializes_from_document() {
        let raw = r#"{
            "levels": {"beginner": [{"title": "Intro", "kind": "video", "platform": "Web"}]},
            "tips": ["Audit monthly"]
        }"#;
        let library: ResourceLibrary = serde_json::from_str(raw).unwrap();
        let intro = &library.for_level(KnowledgeLevel::Beginner)[0];
        assert_eq!(intro.kind, ResourceKind::Video);
        assert_eq!(intro.platform.as_deref(), Some("Web"));
        assert!(!library.is_empty());
        assert!(library.exercises().is_empty());
        assert_eq!(library.challenge(), None);
    }

    #[test]
    fn exercises_and_challenge_close_the_library() {
        let raw = r#"{
            "exercises": ["Audit every app", "Reset defaults"],
            "challenge": "  Review permissions this week!  "
        }"#;
        let library: ResourceLibrary = serde_json::from_str(raw).unwrap();
        assert_eq!(library.exercises().len(), 2);
        assert_eq!(library.challenge(), Some("Review permissions this week!"));
        assert!(!library.is_empty());

        let blank = ResourceLibrary {
            challenge: Some("   ".into()),
            ..ResourceLibrary::default()
        };
        assert_eq!(blank.challenge(), None);
        assert!(blank.is_empty());
    }
}
