//! Output names derived from classification attributes
//!
//! Both builders are pure functions of `(ClassificationRecord, OrganizerConfig)`:
//! every configured attribute yields exactly one segment, and segments only
//! ever contain `[a-z0-9_]`.

use std::path::PathBuf;

use super::types::{is_null_token, Attribute, ClassificationRecord};
use crate::config::OrganizerConfig;

/// Longest segment kept, well under the 255 byte limit of common filesystems
const MAX_SEGMENT_LEN: usize = 100;

/// Longest file stem: 255 bytes minus `.pdf` and a `_<u32>` collision suffix
pub const MAX_FILE_STEM_LEN: usize = 255 - ".pdf".len() - "_4294967295".len();

/// Normalize a value for use in a path:
/// - lowercase
/// - spaces become underscores
/// - everything outside `[a-zA-Z0-9_]` is dropped
pub fn normalize_segment(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(MAX_SEGMENT_LEN)
        .collect()
}

/// Normalized value of `attribute`, or `unknown_<key>` when it is absent,
/// null, or normalizes to nothing
pub fn attribute_segment(record: &ClassificationRecord, attribute: Attribute) -> String {
    let normalized = record
        .get(attribute)
        .map(normalize_segment)
        .unwrap_or_default();

    if normalized.is_empty() || is_null_token(&normalized) {
        format!("unknown_{}", attribute.key())
    } else {
        normalized
    }
}

/// Builds filenames and subdirectories for classified documents
pub struct AttributePathBuilder<'a> {
    config: &'a OrganizerConfig,
}

impl<'a> AttributePathBuilder<'a> {
    pub fn new(config: &'a OrganizerConfig) -> Self {
        Self { config }
    }

    /// File stem: filename attributes joined with the configured separator.
    /// No extension.
    pub fn build_filename(&self, record: &ClassificationRecord) -> String {
        let separator = self.config.separator.as_char().to_string();
        let stem = self
            .config
            .filename_attributes
            .iter()
            .map(|a| attribute_segment(record, *a))
            .collect::<Vec<_>>()
            .join(&separator);

        // Config validation rejects an empty list; keep the invariant anyway
        if stem.is_empty() {
            return attribute_segment(record, Attribute::Title);
        }
        cap_stem(stem, self.config.separator.as_char())
    }

    /// Relative directory with one level per subfolder attribute
    pub fn build_subdirectory(&self, record: &ClassificationRecord) -> PathBuf {
        self.config
            .subfolder_attributes
            .iter()
            .map(|a| attribute_segment(record, *a))
            .collect()
    }
}

/// Cut the joined stem to `MAX_FILE_STEM_LEN` bytes without leaving a
/// dangling separator
fn cap_stem(stem: String, separator: char) -> String {
    if stem.len() <= MAX_FILE_STEM_LEN {
        return stem;
    }
    let mut end = MAX_FILE_STEM_LEN;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem[..end]
        .trim_end_matches(|c| c == separator || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Separator;

    fn record(pairs: &[(Attribute, &str)]) -> ClassificationRecord {
        let mut record = ClassificationRecord::default();
        for (attribute, value) in pairs {
            record.set(*attribute, value.to_string());
        }
        record
    }

    #[test]
    fn test_normalize_segment() {
        assert_eq!(normalize_segment("Deep Learning"), "deep_learning");
        assert_eq!(normalize_segment("C++: A Tour (3rd ed.)"), "c_a_tour_3rd_ed");
        assert_eq!(normalize_segment("Gödel, Escher, Bach"), "gdel_escher_bach");
        assert_eq!(normalize_segment("../../etc/passwd"), "etcpasswd");
        assert_eq!(normalize_segment("!!!"), "");
    }

    #[test]
    fn test_normalize_segment_length_limit() {
        let long = "a".repeat(300);
        assert_eq!(normalize_segment(&long).len(), MAX_SEGMENT_LEN);
    }

    #[test]
    fn test_filename_title_year_hyphen() {
        let config = OrganizerConfig::default()
            .with_filename(vec![Attribute::Title, Attribute::Year], Separator::Hyphen);
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Title, "Deep Learning"), (Attribute::Year, "2016")]);

        assert_eq!(builder.build_filename(&record), "deep_learning-2016");
    }

    #[test]
    fn test_filename_substitutes_unknown() {
        let config = OrganizerConfig::default().with_filename(
            vec![Attribute::Author, Attribute::Title, Attribute::Year],
            Separator::Dot,
        );
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Title, "Dune"), (Attribute::Author, "null")]);

        assert_eq!(builder.build_filename(&record), "unknown_author.dune.unknown_year");
    }

    #[test]
    fn test_filename_value_normalizing_to_empty() {
        let config = OrganizerConfig::default();
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Title, "???")]);

        assert_eq!(builder.build_filename(&record), "unknown_title");
    }

    #[test]
    fn test_filename_value_normalizing_to_null() {
        let config = OrganizerConfig::default();
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Title, "N.U.L.L.")]);

        assert_eq!(builder.build_filename(&record), "unknown_title");
    }

    #[test]
    fn test_long_values_stay_within_filename_limit() {
        let config = OrganizerConfig::default().with_filename(
            vec![Attribute::Title, Attribute::Author, Attribute::Topic],
            Separator::Hyphen,
        );
        let builder = AttributePathBuilder::new(&config);
        let title = "A Very Long Title About Distributed Systems ".repeat(4);
        let author = "Firstname Middlename Lastname and Coauthors ".repeat(4);
        let topic = "Computer Security Topics ".repeat(6);
        let record = record(&[
            (Attribute::Title, title.as_str()),
            (Attribute::Author, author.as_str()),
            (Attribute::Topic, topic.as_str()),
        ]);

        let stem = builder.build_filename(&record);
        assert!(stem.len() <= MAX_FILE_STEM_LEN, "{} bytes", stem.len());
        assert!(format!("{}_4294967295.pdf", stem).len() <= 255);
        assert!(stem.starts_with("a_very_long_title"));
        assert!(!stem.ends_with('-') && !stem.ends_with('_'));
    }

    #[test]
    fn test_filename_space_separator() {
        let config = OrganizerConfig::default()
            .with_filename(vec![Attribute::Year, Attribute::Title], Separator::Space);
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Title, "War and Peace"), (Attribute::Year, "1869")]);

        assert_eq!(builder.build_filename(&record), "1869 war_and_peace");
    }

    #[test]
    fn test_filename_only_allowed_characters() {
        let config = OrganizerConfig::default().with_filename(
            vec![Attribute::Title, Attribute::Author, Attribute::Topic],
            Separator::Underscore,
        );
        let builder = AttributePathBuilder::new(&config);
        let values = ["Naïve Bayes / Spam?", "O'Neil, Cathy", "  ", "null", "<script>", "日本語"];

        for title in values {
            for author in values {
                let record = record(&[(Attribute::Title, title), (Attribute::Author, author)]);
                let name = builder.build_filename(&record);
                assert!(!name.is_empty());
                assert!(
                    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                    "unexpected character in {:?}",
                    name
                );
                assert!(!name.contains("null"), "null leaked into {:?}", name);
            }
        }
    }

    #[test]
    fn test_subdirectory_nests_per_attribute() {
        let config = OrganizerConfig::default()
            .with_subfolders(vec![Attribute::ContentType, Attribute::Topic]);
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::ContentType, "book"), (Attribute::Topic, "null")]);

        assert_eq!(
            builder.build_subdirectory(&record),
            PathBuf::from("book").join("unknown_topic")
        );
    }

    #[test]
    fn test_subdirectory_empty_config() {
        let config = OrganizerConfig::default().with_subfolders(vec![]);
        let builder = AttributePathBuilder::new(&config);

        assert_eq!(builder.build_subdirectory(&ClassificationRecord::default()), PathBuf::new());
    }

    #[test]
    fn test_builders_are_deterministic() {
        let config = OrganizerConfig::default()
            .with_subfolders(vec![Attribute::Topic, Attribute::Subtopic, Attribute::Year]);
        let builder = AttributePathBuilder::new(&config);
        let record = record(&[(Attribute::Topic, "Computer Science"), (Attribute::Subtopic, "ML")]);

        let first = builder.build_subdirectory(&record);
        for _ in 0..3 {
            assert_eq!(builder.build_subdirectory(&record), first);
        }
        assert_eq!(
            first,
            PathBuf::from("computer_science").join("ml").join("unknown_year")
        );
    }
}
