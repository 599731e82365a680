use crate::config::OrganizerConfig;
use crate::organizer::types::{Attribute, ContentType, NULL_TOKEN};

/// Build the classification request for one document.
///
/// Pure: the same text and config always produce the same prompt.
pub fn build_classification_prompt(content: &str, config: &OrganizerConfig) -> String {
    let content_types = ContentType::ALL
        .iter()
        .map(|c| format!("'{}'", c.as_str()))
        .chain(std::iter::once(format!("'{}'", NULL_TOKEN)))
        .collect::<Vec<_>>()
        .join(", ");

    let example = Attribute::ALL
        .iter()
        .map(|a| format!("\"{}\": \"{}\"", a.key(), a.key().to_uppercase()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        r#"Based on the following text extract of the first pages of a PDF file, classify the document.

EXTRACT:
---
{content}
---

Answer with a single JSON object with exactly these fields: {{{example}}}.

RULES:
- CONTENT_TYPE must be one of [{content_types}].
- If CONTENT_TYPE is known, also retrieve the AUTHOR, the YEAR of publication and the TITLE of the original document.
- YEAR is a four digit year.
- Any field you cannot determine must be the string '{null}'.
- If CONTENT_TYPE is '{null}', every other field must be '{null}' as well."#,
        content = content,
        example = example,
        content_types = content_types,
        null = NULL_TOKEN,
    );

    if config.topics_in_scope() && !config.taxonomy.is_empty() {
        prompt.push_str(&format!(
            r#"
- TOPIC must be one of the broad fields below and SUBTOPIC one of the subfields listed for it:
{}"#,
            config.taxonomy.render()
        ));
    } else {
        prompt.push_str("\n- TOPIC is the broad field of the document and SUBTOPIC a narrower area within it.");
    }

    prompt.push_str("\n\nReturn ONLY the JSON object, no other text.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_content_and_schema() {
        let prompt = build_classification_prompt("Deep Learning by Ian Goodfellow", &OrganizerConfig::default());

        assert!(prompt.contains("Deep Learning by Ian Goodfellow"));
        for attribute in Attribute::ALL {
            assert!(
                prompt.contains(&format!("\"{}\"", attribute.key())),
                "missing field {}",
                attribute
            );
        }
        assert!(prompt.contains("'book', 'article', 'thesis', 'report', 'manual', 'null'"));
        assert!(prompt.contains("must be the string 'null'"));
    }

    #[test]
    fn test_taxonomy_only_when_topics_in_scope() {
        let plain = OrganizerConfig::default();
        assert!(!build_classification_prompt("text", &plain).contains("computer_science"));

        let topical = OrganizerConfig::default()
            .with_subfolders(vec![Attribute::ContentType, Attribute::Topic]);
        let prompt = build_classification_prompt("text", &topical);
        assert!(prompt.contains("- computer_science: machine_learning"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let config = OrganizerConfig::default();
        assert_eq!(
            build_classification_prompt("same", &config),
            build_classification_prompt("same", &config)
        );
    }
}
