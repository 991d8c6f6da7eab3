// Argument groups shared by subcommands, and output formatting for `process`

use anyhow::Result;
use clap::{ArgAction, Args, ValueEnum};
use textpolish_core::{
    Alignment, Category, ClassifiedLine, Configuration, DocumentProcessor, FeatureToggles,
    FontWeight, Length, ProcessedDocument, RenderTarget, StyleDescriptor, Theme,
};

/// What `process` writes to its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Cleaned plain text
    Text,
    /// One classified line per row
    Lines,
    /// Themed preview HTML
    Preview,
    /// Word/WPS paste-ready HTML
    Interchange,
    /// Cleaned text, classified lines and summary as JSON
    Json,
}

/// Per-invocation overrides of the persisted category toggles
#[derive(Debug, Clone, Default, Args)]
pub struct ToggleOverrides {
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub h1: Option<bool>,
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub h2: Option<bool>,
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub h3: Option<bool>,
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub special: Option<bool>,
}

impl ToggleOverrides {
    pub fn is_empty(&self) -> bool {
        self.h1.is_none() && self.h2.is_none() && self.h3.is_none() && self.special.is_none()
    }

    pub fn apply(&self, mut toggles: FeatureToggles) -> FeatureToggles {
        let overrides = [
            (Category::H1, self.h1),
            (Category::H2, self.h2),
            (Category::H3, self.h3),
            (Category::Special, self.special),
        ];
        for (category, value) in overrides {
            if let Some(enabled) = value {
                toggles.set(category, enabled);
            }
        }
        toggles
    }
}

/// Style attributes to change; anything left out keeps its current value
#[derive(Debug, Clone, Default, Args)]
pub struct StyleOverrides {
    #[arg(long)]
    pub font_family: Option<String>,
    /// e.g. `16pt`
    #[arg(long)]
    pub font_size: Option<Length>,
    #[arg(long)]
    pub font_kerning: Option<Length>,
    /// `normal` or `bold`
    #[arg(long)]
    pub font_weight: Option<FontWeight>,
    /// `left`, `center`, `right` or `justify`
    #[arg(long)]
    pub alignment: Option<Alignment>,
    #[arg(long)]
    pub text_indent: Option<Length>,
    #[arg(long)]
    pub description: Option<String>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self.font_family.is_none()
            && self.font_size.is_none()
            && self.font_kerning.is_none()
            && self.font_weight.is_none()
            && self.alignment.is_none()
            && self.text_indent.is_none()
            && self.description.is_none()
    }

    pub fn apply(&self, style: StyleDescriptor) -> StyleDescriptor {
        let overrides = self.clone();
        StyleDescriptor {
            font_family: overrides.font_family.unwrap_or(style.font_family),
            font_size: overrides.font_size.unwrap_or(style.font_size),
            font_kerning: overrides.font_kerning.unwrap_or(style.font_kerning),
            font_weight: overrides.font_weight.unwrap_or(style.font_weight),
            alignment: overrides.alignment.unwrap_or(style.alignment),
            text_indent: overrides.text_indent.unwrap_or(style.text_indent),
            description: overrides.description.unwrap_or(style.description),
        }
    }
}

/// Render a processed document in the requested output format
pub fn format_document(
    processor: &DocumentProcessor,
    document: &ProcessedDocument,
    config: &Configuration,
    format: OutputFormat,
    theme: Theme,
) -> Result<String> {
    let output = match format {
        OutputFormat::Text => document.cleaned_text.clone(),
        OutputFormat::Lines => format_line_listing(&document.lines),
        OutputFormat::Preview => processor.render(document, config, RenderTarget::Preview(theme)),
        OutputFormat::Interchange => processor.render(document, config, RenderTarget::Interchange),
        OutputFormat::Json => serde_json::to_string_pretty(document)?,
    };
    Ok(output)
}

/// `h1       第一章概述`, with special lines shown as `[lead-in] remainder`
pub fn format_line_listing(lines: &[ClassifiedLine]) -> String {
    lines
        .iter()
        .map(|line| match line.lead_in() {
            Some((lead_in, remainder)) => {
                format!("{:<8} [{}] {}", line.category.as_str(), lead_in, remainder)
            }
            None => format!("{:<8} {}", line.category.as_str(), line.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One row per rule: index, on/off marker, name and pattern
pub fn format_rules(config: &Configuration, category: Category) -> String {
    let category_config = config.get(category);
    let mut out = format!("{} ({})\n", category.label(), category.as_str());
    if category_config.patterns.is_empty() {
        out.push_str("  (无规则)\n");
    }
    for (index, rule) in category_config.patterns.iter().enumerate() {
        let marker = if rule.enabled { "✓" } else { "✗" };
        out.push_str(&format!("  {index:>2} {marker} {}  {}\n", rule.name, rule.pattern));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_overrides_only_touch_given_categories() {
        let overrides = ToggleOverrides {
            h2: Some(false),
            special: Some(false),
            ..ToggleOverrides::default()
        };
        let toggles = overrides.apply(FeatureToggles::default());
        assert!(toggles.enable_h1);
        assert!(!toggles.enable_h2);
        assert!(toggles.enable_h3);
        assert!(!toggles.enable_special);
        assert!(ToggleOverrides::default().is_empty());
    }

    #[test]
    fn style_overrides_keep_unset_fields() {
        let base = Configuration::default().style(Category::H1).clone();
        let overrides = StyleOverrides {
            font_size: Some(Length::pt(18.0)),
            alignment: Some(Alignment::Left),
            ..StyleOverrides::default()
        };
        let updated = overrides.apply(base.clone());
        assert_eq!(updated.font_size, Length::pt(18.0));
        assert_eq!(updated.alignment, Alignment::Left);
        assert_eq!(updated.font_family, base.font_family);
        assert_eq!(updated.font_weight, base.font_weight);
        assert!(!overrides.is_empty());
    }

    #[test]
    fn line_listing_shows_lead_in() {
        let lines = vec![
            ClassifiedLine::whole("第一章概述", Category::H1, Some("章节标题")),
            ClassifiedLine::special("结论：很好", "结论：", "很好", "冒号前加粗"),
            ClassifiedLine::normal("正文。"),
        ];
        assert_eq!(
            format_line_listing(&lines),
            "h1       第一章概述\nspecial  [结论：] 很好\nnormal   正文。"
        );
    }

    #[test]
    fn rules_listing_marks_disabled_rules() {
        let mut config = Configuration::default();
        let mut h2 = config.get(Category::H2).clone();
        h2.patterns[0].enabled = false;
        config.set(Category::H2, h2);

        let listing = format_rules(&config, Category::H2);
        assert!(listing.starts_with("二级标题 (h2)\n"));
        assert!(listing.contains(" 0 ✗ "));
        assert!(format_rules(&config, Category::Normal).contains("(无规则)"));
    }

    #[test]
    fn json_output_carries_lines_and_summary() {
        let processor = DocumentProcessor::new();
        let config = Configuration::default();
        let document = processor
            .process("前言\n内容", &FeatureToggles::default(), &config)
            .unwrap();
        let json =
            format_document(&processor, &document, &config, OutputFormat::Json, Theme::Light)
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lines"][0]["category"], "h1");
        assert_eq!(value["summary"]["line_count"], 2);
    }
}
