use super::digits::WESTERN_FONT;
use super::renderer::StyleEmitter;
use crate::config::{Configuration, StyleDescriptor};
use crate::types::{Category, Theme};

/// Preview colors for one theme. All values are 6-digit hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub body: &'static str,
    pub h1: &'static str,
    pub h2: &'static str,
    pub h3: &'static str,
    pub special: &'static str,
    pub normal: &'static str,
}

impl ThemePalette {
    pub const LIGHT: ThemePalette = ThemePalette {
        body: "#333333",
        h1: "#2c3e50",
        h2: "#34495e",
        h3: "#2980b9",
        special: "#e74c3c",
        normal: "#333333",
    };

    pub const DARK: ThemePalette = ThemePalette {
        body: "#ffffff",
        h1: "#74b9ff",
        h2: "#a29bfe",
        h3: "#fd79a8",
        special: "#ff7675",
        normal: "#dddddd",
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::LIGHT,
            Theme::Dark => Self::DARK,
        }
    }

    pub fn color(&self, category: Category) -> &'static str {
        match category {
            Category::H1 => self.h1,
            Category::H2 => self.h2,
            Category::H3 => self.h3,
            Category::Special => self.special,
            Category::Normal => self.normal,
        }
    }
}

/// On-screen structure check: fixed UI font, pixel sizes, themed colors.
/// Category styles only decide which block a line becomes.
pub struct PreviewEmitter {
    palette: ThemePalette,
}

impl PreviewEmitter {
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: ThemePalette::for_theme(theme),
        }
    }

    pub fn palette(&self) -> &ThemePalette {
        &self.palette
    }
}

impl StyleEmitter for PreviewEmitter {
    fn document(&self, _config: &Configuration, body: &str) -> String {
        let p = &self.palette;
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>格式预览</title>
<style>
body {{
    font-family: "Microsoft YaHei", "SimSun", serif;
    font-size: 14px;
    line-height: 1.5;
    margin: 15px;
    color: {body};
}}

h1 {{
    font-size: 18px;
    font-weight: bold;
    text-align: center;
    margin: 10px 0;
    color: {h1};
}}

h2 {{
    font-size: 16px;
    font-weight: bold;
    text-align: center;
    margin: 8px 0;
    color: {h2};
}}

h3 {{
    font-size: 14px;
    font-weight: bold;
    text-align: left;
    margin: 6px 0;
    color: {h3};
}}

p.MsoNormal {{
    margin: 5px 0;
    text-indent: 2em;
    text-align: justify;
    font-size: 14px;
    color: {normal};
}}

.special-bold {{
    font-weight: bold;
    color: {special};
}}

.normal-text {{
    font-weight: normal;
    color: {normal};
}}
</style>
</head>
<body>
{body_markup}
</body>
</html>"#,
            body = p.body,
            h1 = p.h1,
            h2 = p.h2,
            h3 = p.h3,
            normal = p.normal,
            special = p.special,
            body_markup = body,
        )
    }

    fn heading(&self, category: Category, _style: &StyleDescriptor, content: &str) -> String {
        let tag = category.as_str();
        format!("<{tag}>{content}</{tag}>")
    }

    fn lead_in_paragraph(
        &self,
        _lead_in_style: &StyleDescriptor,
        _body_style: &StyleDescriptor,
        lead_in: &str,
        remainder: &str,
    ) -> String {
        if remainder.is_empty() {
            format!(r#"<p class="MsoNormal"><span class="special-bold">{lead_in}</span></p>"#)
        } else {
            format!(
                r#"<p class="MsoNormal"><span class="special-bold">{lead_in}</span><span class="normal-text">{remainder}</span></p>"#
            )
        }
    }

    fn paragraph(&self, _style: &StyleDescriptor, content: &str) -> String {
        format!(r#"<p class="MsoNormal"><span class="normal-text">{content}</span></p>"#)
    }

    fn western_digits(&self, digits: &str) -> String {
        format!("<span style=\"font-family:'{WESTERN_FONT}';\">{digits}</span>")
    }
}
