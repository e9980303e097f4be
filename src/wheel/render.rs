//! Paints wheel geometry onto a drawing surface

use glam::DVec2;
use tracing::{debug, warn};

use super::geometry::{self, Canvas, Placeholder, Wheel, WheelGeometry};
use crate::store::ChartRecord;

/// Stroke style for outlines and lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub const fn solid(color: &'static str, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub const fn dashed(color: &'static str, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: &'static str,
    pub size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub const fn new(color: &'static str, size: f64, bold: bool) -> Self {
        Self { color, size, bold }
    }
}

/// A 2-D target the renderer can paint on
pub trait Surface {
    /// Width and height in pixels
    fn size(&self) -> (f64, f64);

    /// Wipe everything painted so far
    fn clear(&mut self);

    fn circle(&mut self, center: DVec2, radius: f64, stroke: Stroke, fill: Option<&str>);

    fn line(&mut self, from: DVec2, to: DVec2, stroke: Stroke);

    /// Text centred on `at`; `\n` separates lines
    fn text(&mut self, at: DVec2, text: &str, style: TextStyle);
}

/// Whether a chart is currently assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Empty,
    Populated,
}

/// What the last repaint actually showed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Wheel,
    Placeholder,
    /// A chart was assigned but could not be laid out
    Degraded,
}

/// Owns a surface and the chart shown on it; every change repaints everything
pub struct WheelRenderer<S: Surface> {
    surface: S,
    record: Option<ChartRecord>,
    last_outcome: RenderOutcome,
}

impl<S: Surface> WheelRenderer<S> {
    pub fn new(surface: S) -> Self {
        let mut renderer = Self {
            surface,
            record: None,
            last_outcome: RenderOutcome::Placeholder,
        };
        renderer.repaint();
        renderer
    }

    pub fn set_chart_data(&mut self, record: ChartRecord) -> RenderOutcome {
        debug!("Rendering chart {}", record.id);
        self.record = Some(record);
        self.repaint()
    }

    pub fn clear(&mut self) -> RenderOutcome {
        self.record = None;
        self.repaint()
    }

    pub fn state(&self) -> RenderState {
        match self.record {
            Some(_) => RenderState::Populated,
            None => RenderState::Empty,
        }
    }

    pub fn record(&self) -> Option<&ChartRecord> {
        self.record.as_ref()
    }

    pub fn last_outcome(&self) -> RenderOutcome {
        self.last_outcome
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Repaint the whole surface from the current record.
    ///
    /// Layout failures are logged and painted as the placeholder.
    pub fn repaint(&mut self) -> RenderOutcome {
        let (width, height) = self.surface.size();
        let canvas = Canvas::new(width, height);
        self.surface.clear();

        let payload = self.record.as_ref().map(|r| &r.chart_payload);
        let outcome = match geometry::compute(payload, canvas) {
            Ok(WheelGeometry::Wheel(wheel)) => {
                paint_wheel(&mut self.surface, &wheel);
                RenderOutcome::Wheel
            }
            Ok(WheelGeometry::Placeholder(placeholder)) => {
                paint_placeholder(&mut self.surface, &placeholder);
                RenderOutcome::Placeholder
            }
            Err(e) => {
                warn!("Error drawing chart wheel: {}", e);
                paint_placeholder(&mut self.surface, &Placeholder::for_canvas(canvas));
                RenderOutcome::Degraded
            }
        };

        self.last_outcome = outcome;
        outcome
    }
}

pub fn paint_placeholder(surface: &mut impl Surface, placeholder: &Placeholder) {
    surface.circle(
        placeholder.center,
        placeholder.radius,
        Stroke::solid("#cccccc", 2.0),
        None,
    );
    surface.text(
        placeholder.center,
        placeholder.caption,
        TextStyle::new("#999999", 12.0, false),
    );
}

pub fn paint_wheel(surface: &mut impl Surface, wheel: &Wheel) {
    let layout = &wheel.layout;

    // Background
    surface.circle(
        layout.center,
        layout.outer_radius,
        Stroke::solid("#f0f0f0", 1.0),
        Some("#fafafa"),
    );

    // Zodiac ring
    for sector in &wheel.signs {
        surface.line(
            sector.divider.from,
            sector.divider.to,
            Stroke::solid(sector.sign.color, 1.0),
        );
        surface.text(
            sector.glyph_anchor,
            sector.sign.glyph,
            TextStyle::new("#333333", 16.0, true),
        );
    }
    surface.circle(layout.center, layout.outer_radius, Stroke::solid("#333333", 2.0), None);
    surface.circle(layout.center, layout.house_radius, Stroke::solid("#333333", 2.0), None);

    // House cusps
    for cusp in &wheel.cusps {
        surface.line(cusp.ray.from, cusp.ray.to, Stroke::solid("#666666", 2.0));
        surface.text(
            cusp.label_anchor,
            &cusp.number.to_string(),
            TextStyle::new("#333333", 10.0, true),
        );
    }

    // Aspects under the planets
    for aspect in &wheel.aspects {
        surface.line(aspect.chord.from, aspect.chord.to, Stroke::dashed(aspect.color, 1.0));
    }

    // Planets
    for planet in &wheel.planets {
        surface.circle(planet.anchor, 12.0, Stroke::solid(planet.color, 2.0), Some("#ffffff"));
        surface.text(planet.anchor, planet.glyph, TextStyle::new(planet.color, 14.0, true));

        let label = if planet.retrograde {
            format!("{} R", planet.label)
        } else {
            planet.label.clone()
        };
        surface.text(planet.label_anchor, &label, TextStyle::new(planet.color, 8.0, false));
    }
}
