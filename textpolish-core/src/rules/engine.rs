use crate::config::{Configuration, FeatureToggles, Rule};
use crate::error::PatternError;
use crate::types::{Category, ClassifiedLine};
use regex::Regex;

/// Categories that carry rules, in classification priority order.
pub const PRIORITY: [Category; 4] = [
    Category::H1,
    Category::H2,
    Category::H3,
    Category::Special,
];

/// Compile a rule pattern so that it only matches at the start of a line.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| PatternError::Invalid {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// A compiled rule that may claim a line for its category.
pub trait LineRule {
    fn apply(&self, line: &str) -> Option<ClassifiedLine>;
    fn name(&self) -> &str;
    fn category(&self) -> Category;
}

/// Heading rule: a match at the start claims the whole line.
pub struct HeadingRule {
    category: Category,
    name: String,
    regex: Regex,
}

impl HeadingRule {
    pub fn new(category: Category, rule: &Rule) -> Result<Self, PatternError> {
        Ok(Self {
            category,
            name: rule.name.clone(),
            regex: compile_pattern(&rule.pattern)?,
        })
    }
}

impl LineRule for HeadingRule {
    fn apply(&self, line: &str) -> Option<ClassifiedLine> {
        self.regex
            .is_match(line)
            .then(|| ClassifiedLine::whole(line, self.category, Some(&self.name)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }
}

/// Special rule: splits the line into an emphasized lead-in and a remainder.
pub struct LeadInRule {
    name: String,
    regex: Regex,
}

impl LeadInRule {
    pub fn new(rule: &Rule) -> Result<Self, PatternError> {
        Ok(Self {
            name: rule.name.clone(),
            regex: compile_pattern(&rule.pattern)?,
        })
    }

    /// Byte offset where the lead-in ends.
    ///
    /// With two or more groups the last group starts the remainder; a single
    /// group ends the lead-in; without groups the whole match is the lead-in.
    fn split_point(&self, line: &str) -> Option<usize> {
        let caps = self.regex.captures(line)?;
        let whole = caps.get(0)?;
        let split = match caps.len() - 1 {
            0 => whole.end(),
            1 => caps.get(1).map_or(whole.end(), |g| g.end()),
            groups => caps.get(groups).map_or(whole.end(), |g| g.start()),
        };
        Some(split)
    }
}

impl LineRule for LeadInRule {
    fn apply(&self, line: &str) -> Option<ClassifiedLine> {
        let split = self.split_point(line)?;
        let (lead_in, remainder) = line.split_at(split);
        if lead_in.is_empty() {
            return None;
        }
        Some(ClassifiedLine::special(
            line,
            lead_in,
            remainder.trim(),
            &self.name,
        ))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Special
    }
}

fn boxed<R: LineRule + 'static>(rule: R) -> Box<dyn LineRule> {
    Box::new(rule)
}

/// Per-pass rule set: every enabled, compilable rule in priority order.
///
/// Built once per classification pass so a configuration edit can never
/// change the rules halfway through a document.
pub struct RuleEngine {
    rules: Vec<Box<dyn LineRule>>,
    skipped: usize,
}

impl RuleEngine {
    pub fn compile(config: &Configuration) -> Self {
        let mut rules: Vec<Box<dyn LineRule>> = Vec::new();
        let mut skipped = 0;

        for category in PRIORITY {
            for rule in config.get(category).enabled_rules() {
                let compiled = match category {
                    Category::Special => LeadInRule::new(rule).map(boxed),
                    _ => HeadingRule::new(category, rule).map(boxed),
                };
                match compiled {
                    Ok(compiled) => rules.push(compiled),
                    Err(e) => {
                        // Fails closed: the rule simply never matches
                        log::warn!("Skipping {} rule '{}': {}", category, rule.name, e);
                        skipped += 1;
                    }
                }
            }
        }

        log::debug!(
            "Compiled {} rule(s), skipped {} unusable",
            rules.len(),
            skipped
        );
        Self { rules, skipped }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Enabled rules that were left out because their pattern is unusable.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// First match wins, in priority order; unmatched lines are body text.
    pub fn classify_line(&self, line: &str, toggles: &FeatureToggles) -> ClassifiedLine {
        self.rules
            .iter()
            .filter(|rule| toggles.is_enabled(rule.category()))
            .find_map(|rule| rule.apply(line))
            .unwrap_or_else(|| ClassifiedLine::normal(line))
    }
}
