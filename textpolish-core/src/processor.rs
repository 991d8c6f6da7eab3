use crate::classifier::StructuralClassifier;
use crate::config::{Configuration, FeatureToggles};
use crate::error::ProcessError;
use crate::normalizer::TextNormalizer;
use crate::render::DocumentRenderer;
use crate::types::{Category, ClassifiedLine, RenderTarget};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        log::debug!("{}: {}µs", step_name, elapsed.as_micros());
        self.timings.push((step_name.to_string(), elapsed));

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            log::debug!(
                "   {:.<20} {}µs ({:.1}%)",
                step,
                duration.as_micros(),
                percentage
            );
        }
        log::debug!("   {:.<20} {}µs", "Total", total.as_micros());
    }
}

/// Counts and context for one processing pass, shown after processing.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSummary {
    /// Characters (not bytes) in the raw input
    pub original_chars: usize,
    pub cleaned_chars: usize,
    pub line_count: usize,
    pub category_counts: BTreeMap<Category, usize>,
    pub active_categories: Vec<Category>,
    /// e.g. `一级标题、二级标题`
    pub active_formats: String,
    pub created_at: DateTime<Local>,
}

impl ProcessingSummary {
    fn new(raw: &str, cleaned: &str, lines: &[ClassifiedLine], toggles: &FeatureToggles) -> Self {
        let mut category_counts = BTreeMap::new();
        for line in lines {
            *category_counts.entry(line.category).or_insert(0) += 1;
        }

        Self {
            original_chars: raw.chars().count(),
            cleaned_chars: cleaned.chars().count(),
            line_count: lines.len(),
            category_counts,
            active_categories: toggles.active_categories(),
            active_formats: toggles.describe(),
            created_at: Local::now(),
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// `原始: 120 字符 → 处理后: 96 字符`
    pub fn char_report(&self) -> String {
        format!(
            "原始: {} 字符 → 处理后: {} 字符",
            self.original_chars, self.cleaned_chars
        )
    }
}

/// Result of one normalize + classify pass.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub cleaned_text: String,
    pub lines: Vec<ClassifiedLine>,
    pub summary: ProcessingSummary,
}

/// Orchestrates normalize → classify → render.
///
/// Holds no configuration: the caller passes one snapshot per pass.
pub struct DocumentProcessor {
    normalizer: TextNormalizer,
    classifier: StructuralClassifier,
    renderer: DocumentRenderer,
    profiling: bool,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            classifier: StructuralClassifier::new(),
            renderer: DocumentRenderer::new(),
            profiling: false,
        }
    }

    /// Log per-step timings at debug level.
    pub fn with_profiling(self, profiling: bool) -> Self {
        Self { profiling, ..self }
    }

    /// Normalize and classify raw text.
    ///
    /// Blank input is a warning-class [`ProcessError::EmptyInput`]; nothing
    /// else fails.
    pub fn process(
        &self,
        raw: &str,
        toggles: &FeatureToggles,
        config: &Configuration,
    ) -> Result<ProcessedDocument, ProcessError> {
        if raw.trim().is_empty() {
            return Err(ProcessError::EmptyInput);
        }

        let mut profiler = StepProfiler::new(self.profiling);
        let cleaned_text = profiler.time_step("normalize", || self.normalizer.normalize(raw));
        let lines = profiler.time_step("classify", || {
            self.classifier.classify(&cleaned_text, toggles, config)
        });
        profiler.log_summary();

        let summary = ProcessingSummary::new(raw, &cleaned_text, &lines, toggles);
        log::info!("{} ({} line(s))", summary.char_report(), summary.line_count);

        Ok(ProcessedDocument {
            cleaned_text,
            lines,
            summary,
        })
    }

    pub fn render(
        &self,
        document: &ProcessedDocument,
        config: &Configuration,
        target: RenderTarget,
    ) -> String {
        let mut profiler = StepProfiler::new(self.profiling);
        let markup = profiler.time_step("render", || {
            self.renderer.render(&document.lines, config, target)
        });
        profiler.log_summary();
        markup
    }

    /// One full pass against a single configuration snapshot.
    pub fn process_and_render(
        &self,
        raw: &str,
        toggles: &FeatureToggles,
        config: &Configuration,
        target: RenderTarget,
    ) -> Result<(ProcessedDocument, String), ProcessError> {
        let document = self.process(raw, toggles, config)?;
        let markup = self.render(&document, config, target);
        Ok((document, markup))
    }
}
