//! Drawing the diagram onto a [`Surface`].
//!
//! The renderer walks the model in a fixed paint order: canvas
//! background, section bands, edges (with any in-flight animation dot),
//! node shapes, node labels. It knows nothing about the backend; the
//! bundled [`SvgSurface`] is one implementation of the surface trait.

mod renderer;
mod svg;

pub use renderer::draw_diagram;
pub use svg::SvgSurface;
