// Document rendering: one traversal over classified lines, two markup targets
// - renderer.rs: DocumentRenderer and the StyleEmitter strategy trait
// - interchange.rs: word-processor paste format (points, mso-* styles)
// - preview.rs: themed on-screen preview (pixels, fixed palette)
// - digits.rs: Western-digit segmentation and text escaping

pub mod digits;
pub mod interchange;
pub mod preview;
pub mod renderer;

pub use digits::{segments, Segment, WESTERN_FONT};
pub use interchange::InterchangeEmitter;
pub use preview::{PreviewEmitter, ThemePalette};
pub use renderer::{DocumentRenderer, StyleEmitter};
