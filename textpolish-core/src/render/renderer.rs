use super::digits::markup_with_digits;
use super::interchange::InterchangeEmitter;
use super::preview::PreviewEmitter;
use crate::config::{Configuration, StyleDescriptor};
use crate::types::{Category, ClassifiedLine, RenderTarget};

/// Target-specific markup for the one shared traversal.
///
/// Content arguments are already escaped, with digit runs wrapped by
/// [`StyleEmitter::western_digits`].
pub trait StyleEmitter {
    /// Complete document around the rendered body.
    fn document(&self, config: &Configuration, body: &str) -> String;

    /// Heading block for `h1`..`h3`.
    fn heading(&self, category: Category, style: &StyleDescriptor, content: &str) -> String;

    /// Paragraph with an emphasized lead-in. `remainder` may be empty.
    fn lead_in_paragraph(
        &self,
        lead_in_style: &StyleDescriptor,
        body_style: &StyleDescriptor,
        lead_in: &str,
        remainder: &str,
    ) -> String;

    /// Body-text paragraph.
    fn paragraph(&self, style: &StyleDescriptor, content: &str) -> String;

    /// Span forcing the Western font on a digit run.
    fn western_digits(&self, digits: &str) -> String;
}

pub struct DocumentRenderer;

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        lines: &[ClassifiedLine],
        config: &Configuration,
        target: RenderTarget,
    ) -> String {
        match target {
            RenderTarget::Interchange => {
                self.render_with(lines, config, &InterchangeEmitter::new())
            }
            RenderTarget::Preview(theme) => {
                self.render_with(lines, config, &PreviewEmitter::new(theme))
            }
        }
    }

    pub fn render_with(
        &self,
        lines: &[ClassifiedLine],
        config: &Configuration,
        emitter: &dyn StyleEmitter,
    ) -> String {
        let body = self.render_body(lines, config, emitter);
        emitter.document(config, &body)
    }

    /// One block per line, newline-separated, without the document envelope.
    pub fn render_body(
        &self,
        lines: &[ClassifiedLine],
        config: &Configuration,
        emitter: &dyn StyleEmitter,
    ) -> String {
        lines
            .iter()
            .map(|line| self.render_line(line, config, emitter))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_line(
        &self,
        line: &ClassifiedLine,
        config: &Configuration,
        emitter: &dyn StyleEmitter,
    ) -> String {
        let inline = |text: &str| markup_with_digits(text, |d| emitter.western_digits(d));

        match (line.category, line.lead_in()) {
            (category @ (Category::H1 | Category::H2 | Category::H3), _) => {
                emitter.heading(category, config.style(category), &inline(&line.text))
            }
            (Category::Special, Some((lead_in, remainder))) => emitter.lead_in_paragraph(
                config.style(Category::Special),
                config.style(Category::Normal),
                &inline(lead_in),
                &inline(remainder),
            ),
            // A special line without a split keeps its emphasis as a whole
            (Category::Special, None) => emitter.lead_in_paragraph(
                config.style(Category::Special),
                config.style(Category::Normal),
                &inline(&line.text),
                "",
            ),
            (Category::Normal, _) => {
                emitter.paragraph(config.style(Category::Normal), &inline(&line.text))
            }
        }
    }
}
