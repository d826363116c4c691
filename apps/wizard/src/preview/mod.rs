// Preview Renderer: pure projection of the DocumentModel through a template.
// Recomputed on every model change; never stored as a source of truth.

pub mod placeholder;
pub mod renderer;
pub mod templates;

pub use renderer::{render, render_selected, RenderError, RenderOptions, RenderedDocument};
