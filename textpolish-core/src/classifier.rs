use crate::config::{Configuration, FeatureToggles};
use crate::normalizer::non_blank_lines;
use crate::rules::RuleEngine;
use crate::types::ClassifiedLine;

/// Assigns each non-blank line of cleaned text a structural category.
pub struct StructuralClassifier;

impl Default for StructuralClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify every non-blank, trimmed line. Blank lines produce nothing.
    pub fn classify(
        &self,
        text: &str,
        toggles: &FeatureToggles,
        config: &Configuration,
    ) -> Vec<ClassifiedLine> {
        let lines = non_blank_lines(text);
        if lines.is_empty() {
            return Vec::new();
        }

        log::debug!(
            "Classifying {} line(s) with toggles: {}",
            lines.len(),
            toggles.describe()
        );

        // Rules are read once for the whole pass
        let engine = RuleEngine::compile(config);
        lines
            .into_iter()
            .map(|line| {
                let classified = engine.classify_line(line, toggles);
                log::trace!(
                    "{:>7} <- '{}'",
                    classified.category,
                    line.chars().take(30).collect::<String>()
                );
                classified
            })
            .collect()
    }
}
