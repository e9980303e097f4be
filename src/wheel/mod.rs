//! Chart wheel: geometry, rendering and the SVG surface

pub mod geometry;
pub mod render;
pub mod svg;
pub mod tables;

pub use geometry::{compute, Canvas, Placeholder, Wheel, WheelGeometry, WheelLayout};
pub use render::{RenderOutcome, RenderState, Stroke, Surface, TextStyle, WheelRenderer};
pub use svg::SvgSurface;

use crate::store::ChartRecord;

/// Render a single chart to an SVG document of `size` x `size` pixels
pub fn render_svg(record: ChartRecord, size: f64) -> (String, RenderOutcome) {
    let mut renderer = WheelRenderer::new(SvgSurface::new(size, size));
    let outcome = renderer.set_chart_data(record);
    (renderer.into_surface().finish(), outcome)
}
