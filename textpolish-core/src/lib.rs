// TextPolish Core Library
//
// Cleans text pasted out of AI chat answers and turns it into a styled
// document: rule-driven line classification (h1 > h2 > h3 > special > normal)
// rendered either as a themed preview or as word-processor interchange markup.
// Rules and styles live in a persisted, user-editable configuration store.

pub mod types;
pub mod error;
pub mod normalizer;
pub mod config;
pub mod storage;
pub mod store;
pub mod rules;
pub mod classifier;
pub mod render;
pub mod processor;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{ConfigError, LengthParseError, PatternError, ProcessError, StorageError};
pub use normalizer::{non_blank_lines, normalize, TextNormalizer};
pub use config::{
    Alignment, CategoryConfig, Configuration, FeatureToggles, FileFormat, FontWeight, Length,
    PartialConfiguration, Rule, StyleDescriptor,
};
pub use storage::{ConfigStorage, FileStorage, NoOpStorage};
pub use store::{ConfigSource, ConfigStore};
pub use rules::{validate_configuration, RuleEngine, RuleValidationReport};
pub use classifier::StructuralClassifier;
pub use render::{DocumentRenderer, StyleEmitter};
pub use processor::{DocumentProcessor, ProcessedDocument, ProcessingSummary};
