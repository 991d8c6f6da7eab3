// Text normalization for text pasted out of AI chat answers.
//
// The steps run in a fixed order; later steps assume the cleanup done by
// earlier ones. The whole pass is pure and never fails.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// ASCII punctuation and the full-width form used next to CJK ideographs.
pub const PUNCTUATION_MAP: [(char, char); 9] = [
    (',', '，'),
    (';', '；'),
    (':', '：'),
    ('!', '！'),
    ('?', '？'),
    ('(', '（'),
    (')', '）'),
    ('[', '【'),
    (']', '】'),
];

/// Quote delimiters and the open/close marks re-applied around quoted spans.
/// Both marks are the straight ASCII quote for now.
const QUOTE_STYLES: [(char, &str, &str); 2] = [('"', "\"", "\""), ('\'', "'", "'")];

const CJK_IDEOGRAPH: &str = r"[\x{4e00}-\x{9fff}]";

// Bullets, list dashes and geometric markers, plus whatever whitespace follows them
static LIST_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[·•▪▫◦‣⁃▲▼◆◇■□●○]\s*").expect("valid list marker regex"));

static EXCESS_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid paragraph break regex"));

static DOUBLE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid double break regex"));

static PUNCTUATION_RULES: LazyLock<Vec<PunctuationRule>> = LazyLock::new(|| {
    PUNCTUATION_MAP
        .iter()
        .map(|&(ascii, full_width)| PunctuationRule::new(ascii, full_width))
        .collect()
});

static QUOTED_SPANS: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    QUOTE_STYLES
        .iter()
        .map(|&(delimiter, open, close)| {
            let quote = regex::escape(&delimiter.to_string());
            let pattern = format!("{quote}([^{quote}]*){quote}");
            (Regex::new(&pattern).expect("valid quoted span regex"), open, close)
        })
        .collect()
});

/// Localizes one ASCII punctuation mark when it touches CJK ideographs.
struct PunctuationRule {
    full_width: char,
    /// Ideograph on both sides
    interior: Regex,
    /// Mark opens a line and an ideograph follows
    line_start: Regex,
    /// Mark closes a line and an ideograph precedes
    line_end: Regex,
}

impl PunctuationRule {
    fn new(ascii: char, full_width: char) -> Self {
        let mark = regex::escape(&ascii.to_string());
        let cjk = CJK_IDEOGRAPH;
        // `[^\S\n]` is horizontal whitespace: adjacency never reaches across a line break
        let gap = r"[^\S\n]*";
        Self {
            full_width,
            interior: Regex::new(&format!(r"({cjk}){gap}{mark}{gap}({cjk})"))
                .expect("valid interior punctuation regex"),
            line_start: Regex::new(&format!(r"(?m)^{gap}{mark}{gap}({cjk})"))
                .expect("valid line-start punctuation regex"),
            line_end: Regex::new(&format!(r"(?m)({cjk}){gap}{mark}{gap}$"))
                .expect("valid line-end punctuation regex"),
        }
    }

    fn apply(&self, text: String) -> String {
        let full = self.full_width;

        // Matches consume the ideograph on each side, so chains such as
        // `中,文,字` need repeated passes. Every pass removes at least one mark.
        let mut text = text;
        loop {
            let next = match self
                .interior
                .replace_all(&text, |caps: &Captures| format!("{}{}{}", &caps[1], full, &caps[2]))
            {
                Cow::Owned(next) => next,
                Cow::Borrowed(_) => break,
            };
            text = next;
        }

        let text = self
            .line_start
            .replace_all(&text, |caps: &Captures| format!("{}{}", full, &caps[1]))
            .into_owned();
        self.line_end
            .replace_all(&text, |caps: &Captures| format!("{}{}", &caps[1], full))
            .into_owned()
    }
}

pub struct TextNormalizer;

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Clean raw pasted text into compact, punctuation-localized text.
    ///
    /// Blank or whitespace-only input short-circuits to an empty string.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let text = strip_list_markers(text);
        let text = localize_punctuation(text);
        let text = normalize_quotes(text);
        let text = remove_inline_spacing(&text);
        let text = trim_lines(&text);
        let text = collapse_paragraph_breaks(&text);

        text.trim().to_string()
    }
}

/// Convenience wrapper around [`TextNormalizer::normalize`].
pub fn normalize(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

/// Trimmed, non-blank lines of `text`.
pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn strip_list_markers(text: &str) -> String {
    LIST_MARKERS.replace_all(text, "").into_owned()
}

fn localize_punctuation(text: String) -> String {
    PUNCTUATION_RULES
        .iter()
        .fold(text, |text, rule| rule.apply(text))
}

fn normalize_quotes(text: String) -> String {
    QUOTED_SPANS
        .iter()
        .fold(text, |text, (regex, open, close)| {
            regex
                .replace_all(&text, |caps: &Captures| format!("{}{}{}", open, &caps[1], close))
                .into_owned()
        })
}

// Chinese text carries no inter-character spacing
fn remove_inline_spacing(text: &str) -> String {
    text.chars().filter(|c| *c != ' ' && *c != '\t').collect()
}

fn trim_lines(text: &str) -> String {
    text.split('\n').map(str::trim).collect::<Vec<_>>().join("\n")
}

// Compact layout: every paragraph break becomes a single newline
fn collapse_paragraph_breaks(text: &str) -> String {
    let text = EXCESS_BREAKS.replace_all(text, "\n\n");
    DOUBLE_BREAKS.replace_all(&text, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<&'static str> {
        vec![
            "第一章　概述\n\n这是正文内容。",
            "中,文,字;再来:好!吗?",
            "• 第一项\n● 第二项\n\n\n\n■ 第三项",
            "Plain English, with (parens) and [brackets]!",
            "  中文 , 混合 English: text\t内容  \n\n\n  (注释)\n",
            ",开头\n结尾,\n\n他说\"你好\"，'好'",
            "总计1,234.5元，增长12%。",
            "　　全角空格缩进的段落\n\n\n下一段",
        ]
    }

    #[test]
    fn latin_punctuation_is_left_alone() {
        assert_eq!(normalize("a,b"), "a,b");
        assert_eq!(normalize("Hello, world! (ok)"), "Hello,world!(ok)");
    }

    #[test]
    fn punctuation_between_ideographs_is_localized() {
        assert_eq!(normalize("中,文"), "中，文");
        assert_eq!(normalize("中 , 文"), "中，文");
        assert_eq!(normalize("中,文,字"), "中，文，字");
        assert_eq!(normalize("中(文)字"), "中（文）字");
        assert_eq!(normalize("中[文]字"), "中【文】字");
    }

    #[test]
    fn punctuation_at_line_boundaries_is_localized() {
        assert_eq!(normalize(",中文"), "，中文");
        assert_eq!(normalize("中文!"), "中文！");
        assert_eq!(normalize("问题?\n答案:"), "问题？\n答案：");
        // Latin on the other side of a boundary mark stays ASCII
        assert_eq!(normalize("abc!"), "abc!");
    }

    #[test]
    fn list_markers_are_removed() {
        assert_eq!(normalize("• 第一项\n● 第二项"), "第一项\n第二项");
        assert_eq!(normalize("·要点▪细节"), "要点细节");
    }

    #[test]
    fn quotes_keep_their_delimiters() {
        assert_eq!(normalize("他说\"你好\""), "他说\"你好\"");
        assert_eq!(normalize("'单引号'"), "'单引号'");
    }

    #[test]
    fn paragraph_breaks_collapse_to_single_newlines() {
        assert_eq!(normalize("a\n\n\nb\n\nc"), "a\nb\nc");
        assert_eq!(normalize("甲\n \n\t\n乙"), "甲\n乙");
    }

    #[test]
    fn blank_input_short_circuits() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  \n\t "), "");
    }

    #[test]
    fn full_width_space_inside_a_line_survives() {
        assert_eq!(
            normalize("第一章　概述\n\n这是正文内容。"),
            "第一章　概述\n这是正文内容。"
        );
        assert_eq!(normalize("　　缩进段落"), "缩进段落");
    }

    #[test]
    fn output_has_no_spaces_tabs_or_blank_lines() {
        for sample in samples() {
            let out = normalize(sample);
            assert!(!out.contains(' '), "space in {out:?}");
            assert!(!out.contains('\t'), "tab in {out:?}");
            assert!(!out.contains("\n\n"), "blank line in {out:?}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for sample in samples() {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn non_blank_lines_drops_empty_lines() {
        assert_eq!(non_blank_lines(" a \n\n  \nb"), vec!["a", "b"]);
    }
}
