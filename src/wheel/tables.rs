//! Static lookup tables for the chart wheel

/// One zodiac sign, in zodiac order from Aries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInfo {
    pub glyph: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

pub const SIGNS: [SignInfo; 12] = [
    SignInfo { glyph: "♈", name: "Aries", color: "#ff6b6b" },
    SignInfo { glyph: "♉", name: "Taurus", color: "#4ecdc4" },
    SignInfo { glyph: "♊", name: "Gemini", color: "#45b7d1" },
    SignInfo { glyph: "♋", name: "Cancer", color: "#96ceb4" },
    SignInfo { glyph: "♌", name: "Leo", color: "#feca57" },
    SignInfo { glyph: "♍", name: "Virgo", color: "#48dbfb" },
    SignInfo { glyph: "♎", name: "Libra", color: "#ff9ff3" },
    SignInfo { glyph: "♏", name: "Scorpio", color: "#54a0ff" },
    SignInfo { glyph: "♐", name: "Sagittarius", color: "#5f27cd" },
    SignInfo { glyph: "♑", name: "Capricorn", color: "#00d2d3" },
    SignInfo { glyph: "♒", name: "Aquarius", color: "#ff9f43" },
    SignInfo { glyph: "♓", name: "Pisces", color: "#a55eea" },
];

/// A planet the wheel knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetInfo {
    pub name: &'static str,
    pub glyph: &'static str,
    pub color: &'static str,
}

/// The seven traditional planets; anything else is left off the wheel
pub const PLANETS: [PlanetInfo; 7] = [
    PlanetInfo { name: "Sun", glyph: "☉", color: "#ff6b35" },
    PlanetInfo { name: "Moon", glyph: "☽", color: "#a8dadc" },
    PlanetInfo { name: "Mercury", glyph: "☿", color: "#457b9d" },
    PlanetInfo { name: "Venus", glyph: "♀", color: "#e63946" },
    PlanetInfo { name: "Mars", glyph: "♂", color: "#f77f00" },
    PlanetInfo { name: "Jupiter", glyph: "♃", color: "#fcbf49" },
    PlanetInfo { name: "Saturn", glyph: "♄", color: "#003566" },
];

pub fn planet(name: &str) -> Option<&'static PlanetInfo> {
    PLANETS.iter().find(|p| p.name == name)
}

pub const DEFAULT_ASPECT_COLOR: &str = "#333333";

pub fn aspect_color(aspect_type: &str) -> &'static str {
    match aspect_type {
        "Conjunction" => "#333333",
        "Sextile" => "#4CAF50",
        "Square" => "#f44336",
        "Trine" => "#2196F3",
        "Opposition" => "#ff9800",
        _ => DEFAULT_ASPECT_COLOR,
    }
}
