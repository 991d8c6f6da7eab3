use crate::error::LengthParseError;
use crate::types::Category;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_font_family() -> String {
    "方正仿宋_GBK".to_string()
}

fn default_font_size() -> Length {
    Length::pt(16.0)
}

fn default_font_kerning() -> Length {
    Length::pt(1.0)
}

fn default_text_indent() -> Length {
    Length::pt(0.0)
}

// ===== STYLE DESCRIPTOR =====

/// A numeric typographic length with its unit, persisted as `"16.0000pt"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Length {
    pub value: f64,
    pub unit: String,
}

impl Length {
    pub fn new(value: f64, unit: &str) -> Self {
        Self {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn pt(value: f64) -> Self {
        Self::new(value, "pt")
    }

    /// Value in points when the unit is absolute.
    pub fn as_points(&self) -> Option<f64> {
        match self.unit.as_str() {
            "pt" => Some(self.value),
            "px" => Some(self.value * 0.75),
            "in" => Some(self.value * 72.0),
            "cm" => Some(self.value * 72.0 / 2.54),
            "mm" => Some(self.value * 72.0 / 25.4),
            _ => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}{}", self.value, self.unit)
    }
}

impl FromStr for Length {
    type Err = LengthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LengthParseError::Empty);
        }

        let split = trimmed
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
            .map(|(i, _)| i)
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);

        if number.is_empty() || number == "-" || number == "+" {
            return Err(LengthParseError::MissingNumber(trimmed.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| LengthParseError::InvalidNumber(trimmed.to_string()))?;
        // Overflowing digit strings parse to infinity, which cannot round-trip
        if !value.is_finite() {
            return Err(LengthParseError::InvalidNumber(trimmed.to_string()));
        }

        let unit = unit.trim();
        if !(unit.chars().all(|c| c.is_ascii_alphabetic()) || unit == "%") {
            return Err(LengthParseError::InvalidUnit(trimmed.to_string()));
        }
        // A bare number is a point size
        let unit = if unit.is_empty() { "pt" } else { unit };

        Ok(Self::new(value, &unit.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Length {
    type Error = LengthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_css(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontWeight::Bold)
    }
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(FontWeight::Normal),
            "bold" => Ok(FontWeight::Bold),
            other => Err(format!("unknown font weight '{other}' (expected normal or bold)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_css(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            "justify" => Ok(Alignment::Justify),
            other => Err(format!(
                "unknown alignment '{other}' (expected left, center, right or justify)"
            )),
        }
    }
}

/// Typographic attributes of one category. Replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleDescriptor {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: Length,
    #[serde(default = "default_font_kerning")]
    pub font_kerning: Length,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub alignment: Alignment,
    /// First-line indent
    #[serde(default = "default_text_indent")]
    pub text_indent: Length,
    #[serde(default)]
    pub description: String,
}

impl Default for StyleDescriptor {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_kerning: default_font_kerning(),
            font_weight: FontWeight::Normal,
            alignment: Alignment::Left,
            text_indent: default_text_indent(),
            description: String::new(),
        }
    }
}

impl StyleDescriptor {
    pub fn new(font_family: &str, font_size_pt: f64) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size: Length::pt(font_size_pt),
            ..Self::default()
        }
    }

    pub fn with_kerning(self, kerning_pt: f64) -> Self {
        Self {
            font_kerning: Length::pt(kerning_pt),
            ..self
        }
    }

    pub fn with_weight(self, font_weight: FontWeight) -> Self {
        Self {
            font_weight,
            ..self
        }
    }

    pub fn with_alignment(self, alignment: Alignment) -> Self {
        Self { alignment, ..self }
    }

    pub fn with_indent(self, indent_pt: f64) -> Self {
        Self {
            text_indent: Length::pt(indent_pt),
            ..self
        }
    }

    pub fn with_description(self, description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..self
        }
    }
}

// ===== RULES =====

/// A named, toggleable line pattern. Patterns are matched from the start of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub pattern: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
}

impl Rule {
    pub fn new(pattern: &str, name: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            name: name.to_string(),
            enabled: true,
            description: String::new(),
        }
    }

    pub fn with_description(self, description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..self
        }
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub style: StyleDescriptor,
    /// Ordered; order only matters for first-match tie-breaking
    #[serde(default)]
    pub patterns: Vec<Rule>,
}

impl CategoryConfig {
    pub fn new(style: StyleDescriptor, patterns: Vec<Rule>) -> Self {
        Self { style, patterns }
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.patterns.iter().filter(|rule| rule.enabled)
    }
}

// ===== CONFIGURATION =====

/// Style and rules for every category. All five categories are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialConfiguration")]
pub struct Configuration {
    h1: CategoryConfig,
    h2: CategoryConfig,
    h3: CategoryConfig,
    normal: CategoryConfig,
    special: CategoryConfig,
}

impl Configuration {
    pub fn get(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::H1 => &self.h1,
            Category::H2 => &self.h2,
            Category::H3 => &self.h3,
            Category::Normal => &self.normal,
            Category::Special => &self.special,
        }
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut CategoryConfig {
        match category {
            Category::H1 => &mut self.h1,
            Category::H2 => &mut self.h2,
            Category::H3 => &mut self.h3,
            Category::Normal => &mut self.normal,
            Category::Special => &mut self.special,
        }
    }

    pub fn style(&self, category: Category) -> &StyleDescriptor {
        &self.get(category).style
    }

    /// Replace a category wholesale, keeping `normal` rule-less.
    pub fn set(&mut self, category: Category, mut config: CategoryConfig) {
        if !category.accepts_rules() && !config.patterns.is_empty() {
            log::warn!(
                "Dropping {} rule(s) given for '{}': body text has no rules",
                config.patterns.len(),
                category
            );
            config.patterns.clear();
        }
        *self.get_mut(category) = config;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryConfig)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Patterns of the enabled rules of a category, in order.
    pub fn enabled_patterns(&self, category: Category) -> Vec<&str> {
        self.get(category)
            .enabled_rules()
            .map(|rule| rule.pattern.as_str())
            .collect()
    }

    /// Distinct font families in category order.
    pub fn font_families(&self) -> Vec<&str> {
        let mut families: Vec<&str> = Vec::new();
        for (_, config) in self.iter() {
            let family = config.style.font_family.as_str();
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }

    /// Overlay the categories present in `partial`; returns the replaced categories.
    pub fn apply(&mut self, partial: PartialConfiguration) -> Vec<Category> {
        let mut replaced = Vec::new();
        for (category, config) in partial.into_entries() {
            self.set(category, config);
            replaced.push(category);
        }
        replaced
    }

    /// The compiled-in fallback configuration.
    pub fn compiled_default() -> Self {
        Self {
            h1: CategoryConfig::new(
                StyleDescriptor::new("方正小标宋_GBK", 18.0)
                    .with_kerning(22.0)
                    .with_alignment(Alignment::Center)
                    .with_description(
                        "一级标题：第一章第二章到换行符为止，字体：方正小标宋_GBK；字号：小二；格式：居中",
                    ),
                vec![
                    Rule::new(r"^第[一二三四五六七八九十\d]+章", "章节标题")
                        .with_description("第一章、第二章等"),
                    Rule::new(r"^前言$", "前言标题").with_description("前言"),
                ],
            ),
            h2: CategoryConfig::new(
                StyleDescriptor::new("方正黑体_GBK", 16.0)
                    .with_alignment(Alignment::Center)
                    .with_description(
                        "二级标题：第一节第二节到换行符为止或者一、二、到换行符为止，字体：方正黑体_GBK；字号：三号；格式：居中",
                    ),
                vec![
                    Rule::new(r"^第[一二三四五六七八九十\d]+节", "节次标题")
                        .with_description("第一节、第二节等"),
                    Rule::new(r"^[一二三四五六七八九十]+、", "序号标题")
                        .with_description("一、二、等"),
                ],
            ),
            h3: CategoryConfig::new(
                StyleDescriptor::new("方正楷体_GBK", 16.0)
                    .with_weight(FontWeight::Bold)
                    .with_alignment(Alignment::Justify)
                    .with_description(
                        "三级标题：段落的开始第一句到句号为止，字体：方正楷体_GBK；字号：三号加粗；格式：两端对齐",
                    ),
                vec![Rule::new(r"^（[一二三四五六七八九十\d]+）", "带括号序号")
                    .with_description("（一）、（二）等")],
            ),
            normal: CategoryConfig::new(
                StyleDescriptor::new("方正仿宋_GBK", 16.0)
                    .with_alignment(Alignment::Justify)
                    .with_indent(36.0)
                    .with_description("正文：字体：方正仿宋_GBK；字号：三号；格式：首行缩进2字符"),
                Vec::new(),
            ),
            special: CategoryConfig::new(
                StyleDescriptor::new("方正楷体_GBK", 16.0)
                    .with_weight(FontWeight::Bold)
                    .with_alignment(Alignment::Justify)
                    .with_description("特殊格式：特殊句式识别"),
                vec![
                    Rule::new(r"^（([一二三四五六七八九十\d]+)）([^。]+。)(.*)", "括号序号标题")
                        .with_description("（一）、（二）等格式到句号"),
                    Rule::new(r"^([一二三四五六七八九十\d]+[是的][^。]*。)(.*)", "特殊句式到句号")
                        .with_description("第一句到句号"),
                    Rule::new(r"^([^：]*：)(.*)", "标题到冒号").with_description("段落开头到冒号"),
                ],
            ),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::compiled_default()
    }
}

impl From<PartialConfiguration> for Configuration {
    fn from(partial: PartialConfiguration) -> Self {
        let mut config = Self::compiled_default();
        config.apply(partial);
        config
    }
}

/// A category mapping where any category may be absent (import files, bundled defaults).
/// Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<CategoryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2: Option<CategoryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h3: Option<CategoryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<CategoryConfig>,
    #[serde(alias = "special_format", skip_serializing_if = "Option::is_none")]
    pub special: Option<CategoryConfig>,
}

impl PartialConfiguration {
    pub fn is_empty(&self) -> bool {
        self.h1.is_none()
            && self.h2.is_none()
            && self.h3.is_none()
            && self.normal.is_none()
            && self.special.is_none()
    }

    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| match c {
                Category::H1 => self.h1.is_some(),
                Category::H2 => self.h2.is_some(),
                Category::H3 => self.h3.is_some(),
                Category::Normal => self.normal.is_some(),
                Category::Special => self.special.is_some(),
            })
            .collect()
    }

    pub fn into_entries(self) -> Vec<(Category, CategoryConfig)> {
        [
            (Category::H1, self.h1),
            (Category::H2, self.h2),
            (Category::H3, self.h3),
            (Category::Normal, self.normal),
            (Category::Special, self.special),
        ]
        .into_iter()
        .filter_map(|(category, config)| config.map(|c| (category, c)))
        .collect()
    }
}

// ===== FILE FORMATS =====

/// Structured text formats accepted for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// YAML for `.yaml`/`.yml`, JSON for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            _ => FileFormat::Json,
        }
    }
}

/// Parse a category mapping. Any error fails the whole document.
pub fn parse_partial(contents: &str, format: FileFormat) -> Result<PartialConfiguration> {
    let partial: PartialConfiguration = match format {
        FileFormat::Json => serde_json::from_str(contents)?,
        FileFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(partial)
}

/// Load the bundled default-configuration file shipped alongside the program.
///
/// The file is either a bare category mapping or an application file with the
/// mapping under `default_user_config`. Listed categories overlay the
/// compiled-in defaults.
pub fn load_bundled_defaults(path: &Path) -> Result<Configuration> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundled config {}", path.display()))?;

    let document: serde_json::Value = match FileFormat::from_path(path) {
        FileFormat::Json => serde_json::from_str(&contents)?,
        FileFormat::Yaml => serde_yaml::from_str(&contents)?,
    };
    let mapping = match document.get("default_user_config") {
        Some(inner) => inner.clone(),
        None => document,
    };

    let partial: PartialConfiguration = serde_json::from_value(mapping)
        .map_err(|e| anyhow!("Invalid bundled config {}: {}", path.display(), e))?;
    if partial.is_empty() {
        return Err(anyhow!(
            "Bundled config {} defines no categories",
            path.display()
        ));
    }

    Ok(Configuration::from(partial))
}

// ===== FEATURE TOGGLES =====

/// Which rule categories take part in classification. Persisted as UI settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggles {
    #[serde(default = "default_true")]
    pub enable_h1: bool,
    #[serde(default = "default_true")]
    pub enable_h2: bool,
    #[serde(default = "default_true")]
    pub enable_h3: bool,
    #[serde(default = "default_true")]
    pub enable_special: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            enable_h1: true,
            enable_h2: true,
            enable_h3: true,
            enable_special: true,
        }
    }
}

impl FeatureToggles {
    pub fn all_disabled() -> Self {
        Self {
            enable_h1: false,
            enable_h2: false,
            enable_h3: false,
            enable_special: false,
        }
    }

    /// `normal` is always active.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::H1 => self.enable_h1,
            Category::H2 => self.enable_h2,
            Category::H3 => self.enable_h3,
            Category::Special => self.enable_special,
            Category::Normal => true,
        }
    }

    /// Setting `normal` has no effect.
    pub fn set(&mut self, category: Category, enabled: bool) {
        match category {
            Category::H1 => self.enable_h1 = enabled,
            Category::H2 => self.enable_h2 = enabled,
            Category::H3 => self.enable_h3 = enabled,
            Category::Special => self.enable_special = enabled,
            Category::Normal => {}
        }
    }

    pub fn active_categories(&self) -> Vec<Category> {
        [Category::H1, Category::H2, Category::H3, Category::Special]
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// `一级标题、特殊格式`, or `无格式` when nothing is active.
    pub fn describe(&self) -> String {
        let labels: Vec<&str> = self
            .active_categories()
            .iter()
            .map(|c| c.label())
            .collect();
        if labels.is_empty() {
            "无格式".to_string()
        } else {
            labels.join("、")
        }
    }
}
