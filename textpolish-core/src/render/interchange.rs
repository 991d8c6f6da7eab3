// Word-processor interchange markup.
//
// Property names, the mso-* extensions and the 4-decimal point lengths are
// what a word processor reads back on paste. Keep them byte-stable.

use super::digits::WESTERN_FONT;
use super::renderer::StyleEmitter;
use crate::config::{Alignment, Configuration, StyleDescriptor};
use crate::types::Category;
use quick_xml::escape::escape;
use std::fmt::Write;

const OFFICE_NAMESPACES: &str = r#"xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:w="urn:schemas-microsoft-com:office:word" xmlns="http://www.w3.org/TR/REC-html40""#;
const DOCUMENT_TITLE: &str = "处理后的文档";
const GENERATOR: &str = "Microsoft Word 14";

pub struct InterchangeEmitter;

impl Default for InterchangeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl InterchangeEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Inline run style: the category font in every script slot, size and kerning.
    fn span_style(style: &StyleDescriptor) -> String {
        let family = escape(&style.font_family);
        let mut css = format!(
            "mso-spacerun:'yes';\
             mso-fareast-font-family:{family};\
             mso-ascii-font-family:{family};\
             mso-hansi-font-family:{family};\
             mso-bidi-font-family:{family};\
             font-size:{};\
             mso-font-kerning:{};",
            style.font_size, style.font_kerning
        );
        if style.font_weight.is_bold() {
            css.push_str("font-weight:bold;");
        }
        css
    }

    fn paragraph_alignment(style: &StyleDescriptor) -> String {
        let mut css = format!("text-align:{};", style.alignment.as_css());
        if style.alignment == Alignment::Justify {
            css.push_str("text-justify:inter-ideograph;");
        }
        css
    }

    /// Font family as it may appear inside the embedded stylesheet.
    ///
    /// Quotes, braces, semicolons and angle brackets are dropped so a family
    /// name can neither end a declaration nor close the `<style>` element.
    fn stylesheet_family(family: &str) -> String {
        family
            .chars()
            .filter(|c| {
                !c.is_control() && !matches!(c, '"' | '\'' | ';' | '{' | '}' | '<' | '>' | '\\')
            })
            .collect()
    }

    fn font_declarations(css: &mut String, style: &StyleDescriptor) {
        let family = Self::stylesheet_family(&style.font_family);
        for slot in ["fareast", "ascii", "hansi", "bidi"] {
            let _ = writeln!(css, "    mso-{slot}-font-family: {family};");
        }
        let _ = writeln!(css, "    font-size: {};", style.font_size);
    }

    fn alignment_declarations(css: &mut String, style: &StyleDescriptor) {
        let _ = writeln!(css, "    text-align: {};", style.alignment.as_css());
        if style.alignment == Alignment::Justify {
            css.push_str("    text-justify: inter-ideograph;\n");
        }
    }

    fn normal_rule(css: &mut String, style: &StyleDescriptor) {
        css.push_str("p.MsoNormal {\n");
        css.push_str("    mso-style-name: 正文;\n");
        css.push_str("    margin: 0pt;\n");
        css.push_str("    margin-bottom: .0001pt;\n");
        let _ = writeln!(css, "    text-indent: {};", style.text_indent);
        css.push_str("    mso-pagination: none;\n");
        Self::alignment_declarations(css, style);
        Self::font_declarations(css, style);
        let _ = writeln!(css, "    font-weight: {};", style.font_weight.as_css());
        let _ = writeln!(css, "    mso-font-kerning: {};", style.font_kerning);
        css.push_str("    line-height: 100%;\n");
        css.push_str("}\n\n");
    }

    fn heading_rule(css: &mut String, level: u8, style: &StyleDescriptor) {
        let _ = writeln!(css, "h{level} {{");
        let _ = writeln!(css, "    mso-style-name: \"标题 {level}\";");
        css.push_str("    mso-style-next: 正文;\n");
        css.push_str("    mso-para-margin-top: 0pt;\n");
        css.push_str("    mso-para-margin-bottom: 0pt;\n");
        css.push_str("    page-break-after: avoid;\n");
        css.push_str("    mso-pagination: lines-together;\n");
        Self::alignment_declarations(css, style);
        if style.text_indent.value != 0.0 {
            let _ = writeln!(css, "    text-indent: {};", style.text_indent);
        }
        let _ = writeln!(css, "    mso-outline-level: {level};");
        css.push_str("    line-height: 100%;\n");
        Self::font_declarations(css, style);
        let _ = writeln!(css, "    font-weight: {};", style.font_weight.as_css());
        let _ = writeln!(css, "    mso-font-kerning: {};", style.font_kerning);
        css.push_str("}\n\n");
    }

    /// Embedded stylesheet keyed by category.
    fn stylesheet(config: &Configuration) -> String {
        let mut css = String::new();
        for family in config.font_families() {
            let family = Self::stylesheet_family(family);
            let _ = write!(css, "@font-face {{\n    font-family: \"{family}\";\n}}\n\n");
        }

        Self::normal_rule(&mut css, config.style(Category::Normal));
        for category in Category::HEADINGS {
            if let Some(level) = category.heading_level() {
                Self::heading_rule(&mut css, level, config.style(category));
            }
        }

        css.push_str(
            "@page {\n    \
             mso-page-border-surround-header: no;\n    \
             mso-page-border-surround-footer: no;\n\
             }\n\n\
             @page Section0 {\n}\n\n\
             div.Section0 {\n    page: Section0;\n}",
        );
        css
    }
}

impl StyleEmitter for InterchangeEmitter {
    fn document(&self, config: &Configuration, body: &str) -> String {
        let stylesheet = Self::stylesheet(config);
        format!(
            r#"<html {OFFICE_NAMESPACES}>
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<meta name="ProgId" content="Word.Document">
<meta name="Generator" content="{GENERATOR}">
<title>{DOCUMENT_TITLE}</title>
<style>
{stylesheet}
</style>
</head>
<body style="tab-interval:21pt;text-justify-trim:punctuation;">
<!--StartFragment-->
{body}
<!--EndFragment-->
</body>
</html>"#
        )
    }

    fn heading(&self, category: Category, style: &StyleDescriptor, content: &str) -> String {
        let tag = category.as_str();
        format!(
            r#"<{tag}><span style="{}">{content}</span></{tag}>"#,
            Self::span_style(style)
        )
    }

    fn lead_in_paragraph(
        &self,
        lead_in_style: &StyleDescriptor,
        body_style: &StyleDescriptor,
        lead_in: &str,
        remainder: &str,
    ) -> String {
        let mut html = format!(
            r#"<p class="MsoNormal" style="{}"><b><span style="{}">{lead_in}</span></b>"#,
            Self::paragraph_alignment(lead_in_style),
            Self::span_style(lead_in_style)
        );
        if !remainder.is_empty() {
            let _ = write!(
                html,
                r#"<span style="{}">{remainder}</span>"#,
                Self::span_style(body_style)
            );
        }
        html.push_str("</p>");
        html
    }

    fn paragraph(&self, style: &StyleDescriptor, content: &str) -> String {
        format!(
            r#"<p class="MsoNormal"><span style="{}">{content}</span></p>"#,
            Self::span_style(style)
        )
    }

    fn western_digits(&self, digits: &str) -> String {
        format!(
            "<span style=\"font-family:'{WESTERN_FONT}';\
             mso-ascii-font-family:'{WESTERN_FONT}';\
             mso-hansi-font-family:'{WESTERN_FONT}';\
             mso-bidi-font-family:'{WESTERN_FONT}';\">{digits}</span>"
        )
    }
}
