use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== CATEGORY =====
// Closed set of line roles. Priority order for classification is the
// declaration order of the heading levels followed by special, then normal.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    H1,
    H2,
    H3,
    Normal,
    #[serde(alias = "special_format")]
    Special,
}

impl Category {
    /// Every category, in persisted key order.
    pub const ALL: [Category; 5] = [
        Category::H1,
        Category::H2,
        Category::H3,
        Category::Normal,
        Category::Special,
    ];

    /// Heading categories, in classification priority order.
    pub const HEADINGS: [Category; 3] = [Category::H1, Category::H2, Category::H3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::H1 => "h1",
            Category::H2 => "h2",
            Category::H3 => "h3",
            Category::Normal => "normal",
            Category::Special => "special",
        }
    }

    /// Human-readable label used in status notices.
    pub fn label(&self) -> &'static str {
        match self {
            Category::H1 => "一级标题",
            Category::H2 => "二级标题",
            Category::H3 => "三级标题",
            Category::Normal => "正文",
            Category::Special => "特殊格式",
        }
    }

    /// Outline level for heading categories.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            Category::H1 => Some(1),
            Category::H2 => Some(2),
            Category::H3 => Some(3),
            Category::Normal | Category::Special => None,
        }
    }

    /// Only `normal` is rule-less.
    pub fn accepts_rules(&self) -> bool {
        !matches!(self, Category::Normal)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h1" => Ok(Category::H1),
            "h2" => Ok(Category::H2),
            "h3" => Ok(Category::H3),
            "normal" => Ok(Category::Normal),
            "special" | "special_format" => Ok(Category::Special),
            other => Err(format!(
                "unknown category '{other}' (expected one of: h1, h2, h3, normal, special)"
            )),
        }
    }
}

// ===== CLASSIFIED LINES =====
// Ephemeral output of the classifier; never persisted.

/// Text of a classified line, split into a lead-in and remainder for `special`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum LineParts {
    Whole,
    LeadIn { lead_in: String, remainder: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    /// Trimmed line text as it appeared in the cleaned input
    pub text: String,
    pub category: Category,
    pub parts: LineParts,
    /// Name of the rule that assigned the category (None for `normal`)
    pub rule_name: Option<String>,
}

impl ClassifiedLine {
    pub fn whole(text: &str, category: Category, rule_name: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            category,
            parts: LineParts::Whole,
            rule_name: rule_name.map(str::to_string),
        }
    }

    pub fn normal(text: &str) -> Self {
        Self::whole(text, Category::Normal, None)
    }

    pub fn special(text: &str, lead_in: &str, remainder: &str, rule_name: &str) -> Self {
        Self {
            text: text.to_string(),
            category: Category::Special,
            parts: LineParts::LeadIn {
                lead_in: lead_in.to_string(),
                remainder: remainder.to_string(),
            },
            rule_name: Some(rule_name.to_string()),
        }
    }

    /// Lead-in and remainder for `special` lines, `None` otherwise.
    pub fn lead_in(&self) -> Option<(&str, &str)> {
        match &self.parts {
            LineParts::LeadIn { lead_in, remainder } => Some((lead_in, remainder)),
            LineParts::Whole => None,
        }
    }
}

// ===== RENDER TARGETS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_flag(is_dark: bool) -> Self {
        if is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// On-screen structural review, themed palette and pixel sizing
    Preview(Theme),
    /// Paste-ready word-processor document with point-based typography
    Interchange,
}
