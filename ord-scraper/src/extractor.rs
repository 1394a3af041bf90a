use crate::schema::{Compound, Reaction, ReactionSchema};
use crate::types::{ComponentEntry, ComponentMap, ScrapeRecord, CORE_CATEGORIES};
use std::sync::Arc;
use tracing::debug;

const UNKNOWN_ROLE: &str = "UNKNOWN";
const IDENTIFIER_SEPARATOR: &str = "; ";

/// Lowercases an input group name and turns underscores into spaces.
pub fn normalize_input_name(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

/// All non-empty identifier values of a compound, in their original order.
pub fn identifier_text(compound: &Compound) -> String {
    compound
        .identifiers
        .iter()
        .map(|ident| ident.value.as_str())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(IDENTIFIER_SEPARATOR)
}

/// A reaction counts as successful when its first outcome lists products.
pub fn is_successful(reaction: &Reaction) -> bool {
    reaction
        .outcomes
        .first()
        .is_some_and(|outcome| !outcome.products.is_empty())
}

/// Flattens reaction inputs into per-category component lists.
///
/// Each input group is matched against the ordered category list by
/// substring, first match wins. Groups matching no category are filed
/// under their own normalized name, which may be blank.
pub struct Extractor {
    categories: Vec<String>,
    schema: Arc<dyn ReactionSchema>,
}

impl Extractor {
    pub fn new(categories: Vec<String>, schema: Arc<dyn ReactionSchema>) -> Self {
        Self { categories, schema }
    }

    pub fn with_core_categories(schema: Arc<dyn ReactionSchema>) -> Self {
        Self::new(CORE_CATEGORIES.iter().map(|c| c.to_string()).collect(), schema)
    }

    pub fn extract(&self, reaction: &Reaction, dataset_id: &str) -> ScrapeRecord {
        ScrapeRecord::Reaction {
            dataset_id: dataset_id.to_string(),
            reaction_id: reaction.reaction_id.clone(),
            components: self.components(reaction),
            success: is_successful(reaction),
        }
    }

    fn components(&self, reaction: &Reaction) -> ComponentMap {
        let mut components: ComponentMap = self
            .categories
            .iter()
            .map(|category| (category.clone(), Vec::new()))
            .collect();

        for (input_key, input) in &reaction.inputs {
            let normalized = normalize_input_name(input_key);
            let category = self.classify(&normalized).unwrap_or(normalized.as_str()).to_string();

            for compound in &input.components {
                let value = identifier_text(compound);
                if value.is_empty() {
                    debug!("Skipping component without identifiers in input {:?}", input_key);
                    continue;
                }

                let entry = ComponentEntry {
                    value,
                    role: self.role_name(compound.reaction_role),
                };
                components.entry(category.clone()).or_default().push(entry);
            }
        }

        components
    }

    fn classify(&self, normalized: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| normalized.contains(category.as_str()))
            .map(String::as_str)
    }

    fn role_name(&self, code: i32) -> String {
        self.schema
            .role_name(code)
            .unwrap_or_else(|_| UNKNOWN_ROLE.to_string())
    }
}
