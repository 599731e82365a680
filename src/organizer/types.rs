//! Shared types for the organizer: attribute schema and classification records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// The literal the model emits for an attribute it could not determine.
pub const NULL_TOKEN: &str = "null";

/// True for `"null"` in any case, with or without surrounding whitespace.
pub fn is_null_token(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(NULL_TOKEN)
}

/// A classifiable field. The schema is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    ContentType,
    Author,
    Title,
    Year,
    Topic,
    Subtopic,
}

impl Attribute {
    /// Every attribute, in schema order.
    pub const ALL: [Attribute; 6] = [
        Attribute::ContentType,
        Attribute::Author,
        Attribute::Title,
        Attribute::Year,
        Attribute::Topic,
        Attribute::Subtopic,
    ];

    /// Stable lowercase key used in model replies and configuration.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ContentType => "content_type",
            Self::Author => "author",
            Self::Title => "title",
            Self::Year => "year",
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Whether this attribute draws its values from the topic taxonomy
    pub fn is_topical(&self) -> bool {
        matches!(self, Self::Topic | Self::Subtopic)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.trim().to_lowercase())
            .ok_or_else(|| ConfigError::UnknownAttribute(s.to_string()))
    }
}

/// Closed set of content types offered to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Book,
    Article,
    Thesis,
    Report,
    Manual,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Book,
        ContentType::Article,
        ContentType::Thesis,
        ContentType::Report,
        ContentType::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
            Self::Thesis => "thesis",
            Self::Report => "report",
            Self::Manual => "manual",
        }
    }

    /// Known content type for a model label, accepting a few synonyms
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "book" => Some(Self::Book),
            "article" | "paper" => Some(Self::Article),
            "thesis" | "dissertation" => Some(Self::Thesis),
            "report" => Some(Self::Report),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Parsed attribute values for one document.
///
/// One optional field per schema attribute; anything else the model returned
/// is kept in `extra` and never used for paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub content_type: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ClassificationRecord {
    /// Value of an attribute, or `None` when absent, blank or the null token
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        let raw = match attribute {
            Attribute::ContentType => &self.content_type,
            Attribute::Author => &self.author,
            Attribute::Title => &self.title,
            Attribute::Year => &self.year,
            Attribute::Topic => &self.topic,
            Attribute::Subtopic => &self.subtopic,
        };
        raw.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !is_null_token(v))
    }

    pub fn set(&mut self, attribute: Attribute, value: String) {
        let slot = match attribute {
            Attribute::ContentType => &mut self.content_type,
            Attribute::Author => &mut self.author,
            Attribute::Title => &mut self.title,
            Attribute::Year => &mut self.year,
            Attribute::Topic => &mut self.topic,
            Attribute::Subtopic => &mut self.subtopic,
        };
        *slot = Some(value);
    }

    /// Content type if it is one of the known kinds
    pub fn known_content_type(&self) -> Option<ContentType> {
        self.get(Attribute::ContentType).and_then(ContentType::from_label)
    }

    /// One-line description for status messages
    pub fn describe(&self) -> String {
        Attribute::ALL
            .iter()
            .filter_map(|a| self.get(*a).map(|v| format!("{}={}", a.key(), v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_token_is_case_and_whitespace_insensitive() {
        assert!(is_null_token("null"));
        assert!(is_null_token(" NULL "));
        assert!(is_null_token("Null\n"));
        assert!(!is_null_token("nullable"));
        assert!(!is_null_token(""));
    }

    #[test]
    fn test_attribute_keys_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_key(attribute.key()), Some(attribute));
        }
        assert_eq!(Attribute::from_key("publisher"), None);
    }

    #[test]
    fn test_attribute_parse_rejects_unknown() {
        assert_eq!("Title".parse::<Attribute>().unwrap(), Attribute::Title);
        assert!(matches!(
            "isbn".parse::<Attribute>(),
            Err(ConfigError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_record_get_hides_null_and_blank() {
        let mut record = ClassificationRecord::default();
        record.set(Attribute::Title, "Deep Learning".to_string());
        record.set(Attribute::Author, "NULL".to_string());
        record.set(Attribute::Year, "   ".to_string());

        assert_eq!(record.get(Attribute::Title), Some("Deep Learning"));
        assert_eq!(record.get(Attribute::Author), None);
        assert_eq!(record.get(Attribute::Year), None);
        assert_eq!(record.get(Attribute::Topic), None);
    }

    #[test]
    fn test_known_content_type() {
        let mut record = ClassificationRecord::default();
        record.set(Attribute::ContentType, "Book".to_string());
        assert_eq!(record.known_content_type(), Some(ContentType::Book));

        record.set(Attribute::ContentType, "poster".to_string());
        assert_eq!(record.known_content_type(), None);
    }

    #[test]
    fn test_content_type_from_label() {
        assert_eq!(ContentType::from_label(" Paper "), Some(ContentType::Article));
        assert_eq!(ContentType::from_label("dissertation"), Some(ContentType::Thesis));
        for kind in ContentType::ALL {
            assert_eq!(ContentType::from_label(kind.as_str()), Some(kind));
        }
        assert_eq!(ContentType::from_label("null"), None);
    }

    #[test]
    fn test_describe_skips_missing() {
        let mut record = ClassificationRecord::default();
        record.set(Attribute::Title, "Dune".to_string());
        record.set(Attribute::Year, "1965".to_string());
        assert_eq!(record.describe(), "title=Dune, year=1965");
    }
}
