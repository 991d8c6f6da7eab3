use quick_xml::escape::escape;
use regex::Regex;
use std::sync::LazyLock;

/// Font used for Western digits inside Eastern-font paragraphs.
pub const WESTERN_FONT: &str = "Times New Roman";

// Digits with thousands separators, decimal points and an optional percent sign
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,.]*%?").expect("valid digit run regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Split `text` into plain text and digit runs.
///
/// A run directly after a Latin letter belongs to an alphanumeric token
/// (`A4`, `GB2312`) and stays plain text.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for run in DIGIT_RUN.find_iter(text) {
        let after_letter = text[..run.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if after_letter {
            continue;
        }
        if run.start() > cursor {
            out.push(Segment::Text(&text[cursor..run.start()]));
        }
        out.push(Segment::Digits(run.as_str()));
        cursor = run.end();
    }

    if cursor < text.len() {
        out.push(Segment::Text(&text[cursor..]));
    }
    out
}

/// Escape `text` for markup and pass each digit run through `wrap`.
pub fn markup_with_digits(text: &str, wrap: impl Fn(&str) -> String) -> String {
    segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(plain) => escape(plain).into_owned(),
            Segment::Digits(digits) => wrap(digits),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_number_with_separators() {
        assert_eq!(
            segments("总计1,234.5元"),
            vec![
                Segment::Text("总计"),
                Segment::Digits("1,234.5"),
                Segment::Text("元")
            ]
        );
    }

    #[test]
    fn percent_belongs_to_the_run() {
        assert_eq!(
            segments("增长12%。"),
            vec![Segment::Text("增长"), Segment::Digits("12%"), Segment::Text("。")]
        );
    }

    #[test]
    fn alphanumeric_tokens_stay_whole() {
        assert_eq!(segments("纸张A4规格"), vec![Segment::Text("纸张A4规格")]);
        assert_eq!(
            segments("GB2312与2024年"),
            vec![
                Segment::Text("GB2312与"),
                Segment::Digits("2024"),
                Segment::Text("年")
            ]
        );
    }

    #[test]
    fn text_without_digits_is_one_segment() {
        assert_eq!(segments("没有数字"), vec![Segment::Text("没有数字")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn markup_escapes_text_and_wraps_digits() {
        let out = markup_with_digits("a<b>共3项&", |d| format!("[{d}]"));
        assert_eq!(out, "a&lt;b&gt;共[3]项&amp;");
    }
}
