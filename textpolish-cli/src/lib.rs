// All processing lives in textpolish-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod app_dirs;
pub mod options;

// Re-export core types for convenience
pub use textpolish_core::*;

// Re-export CLI utilities
pub use app_dirs::AppDirs;
pub use options::{format_document, format_line_listing, format_rules, OutputFormat};
