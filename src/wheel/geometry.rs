//! Chart wheel geometry
//!
//! Pure projection of a chart payload onto drawing primitives. Angles are
//! plain degrees everywhere and only become radians inside [`polar`]. A
//! longitude of 0° (0 Aries) is drawn at the top of the wheel, so the drawn
//! angle is `longitude - 90°` in screen coordinates (y grows downwards).

use glam::{dvec2, DVec2};

use super::tables::{self, SignInfo, SIGNS};
use crate::chart::ChartPayload;
use crate::error::GeometryError;

pub const OUTER_MARGIN: f64 = 30.0;
pub const PLACEHOLDER_MARGIN: f64 = 20.0;
pub const HOUSE_RATIO: f64 = 0.75;
pub const PLANET_RATIO: f64 = 0.85;
/// Aspect chords sit on this fraction of the planet ring
pub const ASPECT_RATIO: f64 = 0.7;

const LABEL_OFFSET_DEG: f64 = 15.0;
const HOUSE_LABEL_RATIO: f64 = 0.9;
const DEGREE_LABEL_GAP: f64 = 25.0;
const MAX_CUSPS: usize = 12;

pub const PLACEHOLDER_CAPTION: &str = "Chart Wheel\n(Awaiting Chart Data)";

/// Output surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn square(size: f64) -> Self {
        Self::new(size, size)
    }

    pub fn center(&self) -> DVec2 {
        dvec2(self.width / 2.0, self.height / 2.0)
    }

    fn half_extent(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }
}

/// Drawn angle for an ecliptic longitude
pub fn drawn_angle(longitude: f64) -> f64 {
    longitude - 90.0
}

/// Point `radius` away from `center` along `angle_deg`
pub fn polar(center: DVec2, radius: f64, angle_deg: f64) -> DVec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    center + radius * dvec2(cos, sin)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: DVec2,
    pub to: DVec2,
}

/// Ring radii of a wheel drawn on a given canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelLayout {
    pub center: DVec2,
    pub outer_radius: f64,
    pub house_radius: f64,
    pub planet_radius: f64,
    pub aspect_radius: f64,
}

impl WheelLayout {
    pub fn for_canvas(canvas: Canvas) -> Result<Self, GeometryError> {
        let outer_radius = canvas.half_extent() - OUTER_MARGIN;
        if !outer_radius.is_finite() || outer_radius <= 0.0 {
            return Err(GeometryError::CanvasTooSmall {
                width: canvas.width,
                height: canvas.height,
            });
        }

        let planet_radius = outer_radius * PLANET_RATIO;
        Ok(Self {
            center: canvas.center(),
            outer_radius,
            house_radius: outer_radius * HOUSE_RATIO,
            planet_radius,
            aspect_radius: planet_radius * ASPECT_RATIO,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignSector {
    pub index: usize,
    pub sign: SignInfo,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Boundary line between the house ring and the outer ring
    pub divider: Segment,
    pub glyph_anchor: DVec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseCusp {
    /// 1-based house number
    pub number: usize,
    pub longitude: f64,
    pub angle: f64,
    pub ray: Segment,
    pub label_anchor: DVec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanetGlyph {
    pub name: &'static str,
    pub glyph: &'static str,
    pub color: &'static str,
    pub longitude: f64,
    pub angle: f64,
    pub anchor: DVec2,
    /// Longitude to one decimal, e.g. `95.4°`
    pub label: String,
    pub label_anchor: DVec2,
    pub retrograde: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AspectChord {
    pub planet1: String,
    pub planet2: String,
    pub aspect_type: String,
    pub color: &'static str,
    pub orb: f64,
    pub chord: Segment,
}

/// A fully laid out chart wheel
#[derive(Debug, Clone, PartialEq)]
pub struct Wheel {
    pub layout: WheelLayout,
    pub signs: Vec<SignSector>,
    pub cusps: Vec<HouseCusp>,
    pub planets: Vec<PlanetGlyph>,
    pub aspects: Vec<AspectChord>,
}

/// Empty ring with a caption, shown when there is no chart to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub center: DVec2,
    pub radius: f64,
    pub caption: &'static str,
}

impl Placeholder {
    pub fn for_canvas(canvas: Canvas) -> Self {
        Self {
            center: canvas.center(),
            radius: (canvas.half_extent() - PLACEHOLDER_MARGIN).max(0.0),
            caption: PLACEHOLDER_CAPTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WheelGeometry {
    Placeholder(Placeholder),
    Wheel(Wheel),
}

impl WheelGeometry {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, WheelGeometry::Placeholder(_))
    }

    pub fn as_wheel(&self) -> Option<&Wheel> {
        match self {
            WheelGeometry::Wheel(wheel) => Some(wheel),
            WheelGeometry::Placeholder(_) => None,
        }
    }
}

/// Lay out a chart payload on `canvas`.
///
/// A missing or empty payload yields the placeholder. Unknown planets and
/// aspects with a missing endpoint are dropped; only applying aspects get a
/// chord.
pub fn compute(
    payload: Option<&ChartPayload>,
    canvas: Canvas,
) -> Result<WheelGeometry, GeometryError> {
    let payload = match payload {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(WheelGeometry::Placeholder(Placeholder::for_canvas(canvas))),
    };

    let layout = WheelLayout::for_canvas(canvas)?;

    Ok(WheelGeometry::Wheel(Wheel {
        layout,
        signs: zodiac_ring(&layout),
        cusps: house_cusps(&layout, &payload.houses)?,
        planets: planet_glyphs(&layout, payload)?,
        aspects: aspect_chords(&layout, payload),
    }))
}

fn zodiac_ring(layout: &WheelLayout) -> Vec<SignSector> {
    let glyph_radius = (layout.outer_radius + layout.house_radius) / 2.0;

    SIGNS
        .iter()
        .enumerate()
        .map(|(index, sign)| {
            let start_angle = drawn_angle(index as f64 * 30.0);
            SignSector {
                index,
                sign: *sign,
                start_angle,
                end_angle: start_angle + 30.0,
                divider: Segment {
                    from: polar(layout.center, layout.house_radius, start_angle),
                    to: polar(layout.center, layout.outer_radius, start_angle),
                },
                glyph_anchor: polar(layout.center, glyph_radius, start_angle + LABEL_OFFSET_DEG),
            }
        })
        .collect()
}

fn house_cusps(layout: &WheelLayout, houses: &[f64]) -> Result<Vec<HouseCusp>, GeometryError> {
    if houses.len() > MAX_CUSPS {
        return Err(GeometryError::TooManyCusps(houses.len()));
    }

    houses
        .iter()
        .enumerate()
        .map(|(i, &longitude)| {
            if !longitude.is_finite() {
                return Err(GeometryError::InvalidCusp { house: i + 1 });
            }
            let angle = drawn_angle(longitude);
            Ok(HouseCusp {
                number: i + 1,
                longitude,
                angle,
                ray: Segment {
                    from: layout.center,
                    to: polar(layout.center, layout.house_radius, angle),
                },
                label_anchor: polar(
                    layout.center,
                    layout.house_radius * HOUSE_LABEL_RATIO,
                    angle + LABEL_OFFSET_DEG,
                ),
            })
        })
        .collect()
}

fn planet_glyphs(
    layout: &WheelLayout,
    payload: &ChartPayload,
) -> Result<Vec<PlanetGlyph>, GeometryError> {
    let mut glyphs = Vec::new();

    for (name, position) in &payload.planets {
        let Some(info) = tables::planet(name) else {
            continue;
        };
        if !position.longitude.is_finite() {
            return Err(GeometryError::InvalidLongitude {
                planet: name.clone(),
            });
        }

        let angle = drawn_angle(position.longitude);
        glyphs.push(PlanetGlyph {
            name: info.name,
            glyph: info.glyph,
            color: info.color,
            longitude: position.longitude,
            angle,
            anchor: polar(layout.center, layout.planet_radius, angle),
            label: format!("{:.1}°", position.longitude),
            label_anchor: polar(layout.center, layout.planet_radius + DEGREE_LABEL_GAP, angle),
            retrograde: position.retrograde,
        });
    }

    Ok(glyphs)
}

fn aspect_chords(layout: &WheelLayout, payload: &ChartPayload) -> Vec<AspectChord> {
    payload
        .aspects
        .iter()
        .filter(|aspect| aspect.applying)
        .filter_map(|aspect| {
            let lon1 = payload.planets.get(&aspect.planet1)?.longitude;
            let lon2 = payload.planets.get(&aspect.planet2)?.longitude;
            if !lon1.is_finite() || !lon2.is_finite() {
                return None;
            }

            Some(AspectChord {
                planet1: aspect.planet1.clone(),
                planet2: aspect.planet2.clone(),
                aspect_type: aspect.aspect_type.clone(),
                color: tables::aspect_color(&aspect.aspect_type),
                orb: aspect.orb,
                chord: Segment {
                    from: polar(layout.center, layout.aspect_radius, drawn_angle(lon1)),
                    to: polar(layout.center, layout.aspect_radius, drawn_angle(lon2)),
                },
            })
        })
        .collect()
}
