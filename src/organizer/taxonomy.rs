//! Topic taxonomy offered to the model: broad field -> subfields

use std::collections::BTreeMap;

const DEFAULT_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "computer_science",
        &[
            "machine_learning",
            "algorithms",
            "programming_languages",
            "databases",
            "distributed_systems",
            "security",
            "computer_graphics",
        ],
    ),
    (
        "mathematics",
        &["algebra", "analysis", "geometry", "probability", "statistics", "logic"],
    ),
    (
        "physics",
        &["classical_mechanics", "quantum_mechanics", "relativity", "thermodynamics", "astrophysics"],
    ),
    (
        "biology",
        &["genetics", "ecology", "neuroscience", "molecular_biology"],
    ),
    (
        "engineering",
        &["electrical", "mechanical", "civil", "control_systems"],
    ),
    (
        "economics",
        &["microeconomics", "macroeconomics", "finance", "econometrics"],
    ),
    (
        "humanities",
        &["history", "philosophy", "literature", "linguistics"],
    ),
];

/// Two-level mapping of broad fields to subfields, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    fields: Vec<(String, Vec<String>)>,
}

impl Taxonomy {
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(f, subs)| (f.as_str(), subs.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as an indented list for the prompt
    pub fn render(&self) -> String {
        self.fields
            .iter()
            .map(|(field, subs)| format!("- {}: {}", field, subs.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            fields: DEFAULT_TAXONOMY
                .iter()
                .map(|(field, subs)| {
                    (
                        field.to_string(),
                        subs.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomy_is_populated() {
        let taxonomy = Taxonomy::default();
        assert!(!taxonomy.is_empty());
        let (field, subs) = taxonomy.fields().next().unwrap();
        assert_eq!(field, "computer_science");
        assert!(subs.iter().any(|s| s == "machine_learning"));
    }

    #[test]
    fn test_from_map_and_render() {
        let mut map = BTreeMap::new();
        map.insert("law".to_string(), vec!["contracts".to_string(), "tax".to_string()]);
        map.insert("art".to_string(), vec!["painting".to_string()]);

        let taxonomy = Taxonomy::from_map(map);
        assert_eq!(taxonomy.render(), "- art: painting\n- law: contracts, tax");
    }
}
