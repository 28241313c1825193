// src/page/mod.rs
// =============================================================================
// Everything about a single redirect page.
//
// Submodules:
// - meta: scrapes title/description/image from the redirect target
// - template: mustache-style template parsing and rendering
// - render: renders entries and writes <name>.html files
// =============================================================================

mod meta;
mod render;
mod template;

pub use render::PageRenderer;
pub use template::Template;
