//! Maven-style coordinates for resolved dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a coordinate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatesError {
    /// Fewer than three `:`-separated segments.
    #[error("Expected group:artifact:version, got '{0}'")]
    MissingSegments(String),
    /// More than four `:`-separated segments.
    #[error("Too many segments in coordinates '{0}'")]
    TooManySegments(String),
    /// A segment was present but empty.
    #[error("Empty {segment} in coordinates '{input}'")]
    EmptySegment {
        /// Which segment was empty.
        segment: &'static str,
        /// The full input string.
        input: String,
    },
}

/// Coordinates of an artifact resolved by the dependency manager.
///
/// Ordered field by field so that collections of coordinates sort
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MavenCoordinates {
    /// Group identifier (`com.example`).
    pub group_id: String,
    /// Artifact identifier (`widgets`).
    pub artifact_id: String,
    /// Version string, uninterpreted.
    pub version: String,
    /// Packaging extension (`aar`, `jar`).
    pub packaging: String,
    /// Optional classifier (`sources`, `debug`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl MavenCoordinates {
    /// Packaging used when a coordinate string carries no `@` suffix.
    pub const DEFAULT_PACKAGING: &'static str = "jar";

    /// Packaging assumed for Android library coordinates without `@` suffix.
    pub const LIBRARY_PACKAGING: &'static str = "aar";

    /// Create coordinates with the default packaging and no classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: Self::DEFAULT_PACKAGING.to_string(),
            classifier: None,
        }
    }

    /// Set the packaging.
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Set the classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Whether these coordinates carry a classifier.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Parse Android library coordinates, defaulting packaging to `aar`.
    ///
    /// `"com.example:widgets:1.0".parse()` yields `@jar`; libraries keyed
    /// by coordinates must go through here so their keys match.
    pub fn parse_library(s: &str) -> Result<Self, CoordinatesError> {
        Self::parse_with_packaging(s, Self::LIBRARY_PACKAGING)
    }

    fn parse_with_packaging(s: &str, default_packaging: &str) -> Result<Self, CoordinatesError> {
        let (body, packaging) = match s.rsplit_once('@') {
            Some((body, packaging)) => (body, packaging),
            None => (s, default_packaging),
        };

        let segments: Vec<&str> = body.split(':').collect();
        if segments.len() < 3 {
            return Err(CoordinatesError::MissingSegments(s.to_string()));
        }
        if segments.len() > 4 {
            return Err(CoordinatesError::TooManySegments(s.to_string()));
        }

        let names = ["group", "artifact", "version", "classifier"];
        for (segment, name) in segments.iter().zip(names) {
            if segment.is_empty() {
                return Err(CoordinatesError::EmptySegment {
                    segment: name,
                    input: s.to_string(),
                });
            }
        }
        if packaging.is_empty() {
            return Err(CoordinatesError::EmptySegment {
                segment: "packaging",
                input: s.to_string(),
            });
        }

        Ok(Self {
            group_id: segments[0].to_string(),
            artifact_id: segments[1].to_string(),
            version: segments[2].to_string(),
            packaging: packaging.to_string(),
            classifier: segments.get(3).map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, "@{}", self.packaging)
    }
}

impl FromStr for MavenCoordinates {
    type Err = CoordinatesError;

    /// Parse `group:artifact:version[:classifier][@packaging]`, defaulting
    /// packaging to `jar`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_packaging(s, Self::DEFAULT_PACKAGING)
    }
}
