//! Chart payload and judgment types shared by the store and the wheel

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Verdict labels produced by the judgment engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Judgment {
    Yes,
    No,
    Unclear,
    NotRadical,
    Error,
    Unknown,
}

impl Judgment {
    pub const ALL: [Judgment; 6] = [
        Judgment::Yes,
        Judgment::No,
        Judgment::Unclear,
        Judgment::NotRadical,
        Judgment::Error,
        Judgment::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Yes => "YES",
            Judgment::No => "NO",
            Judgment::Unclear => "UNCLEAR",
            Judgment::NotRadical => "NOT RADICAL",
            Judgment::Error => "ERROR",
            Judgment::Unknown => "UNKNOWN",
        }
    }

    /// Parse a stored label. Anything unrecognized reads as `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "YES" => Judgment::Yes,
            "NO" => Judgment::No,
            "UNCLEAR" => Judgment::Unclear,
            "NOT RADICAL" | "NOT_RADICAL" => Judgment::NotRadical,
            "ERROR" => Judgment::Error,
            _ => Judgment::Unknown,
        }
    }
}

impl Default for Judgment {
    fn default() -> Self {
        Judgment::Unknown
    }
}

impl From<String> for Judgment {
    fn from(label: String) -> Self {
        Judgment::from_label(&label)
    }
}

impl From<Judgment> for &'static str {
    fn from(judgment: Judgment) -> Self {
        judgment.as_str()
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sun-proximity descriptor (cazimi, combust, under the beams, free of Sun)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolarCondition {
    #[serde(default)]
    pub condition: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SolarCondition {
    pub const FREE: &'static str = "Free of Sun";

    /// True when the planet is unaffected by the Sun
    pub fn is_free(&self) -> bool {
        self.condition.is_empty() || self.condition == Self::FREE
    }
}

/// A planet's placement inside a radix chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub longitude: f64,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub house: u8,
    #[serde(default)]
    pub dignity_score: i32,
    #[serde(default)]
    pub retrograde: bool,
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub solar_condition: Option<SolarCondition>,
    /// Keys the engine added that are not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanetPosition {
    pub fn at(longitude: f64) -> Self {
        Self {
            longitude,
            sign: String::new(),
            house: 0,
            dignity_score: 0,
            retrograde: false,
            solar_condition: None,
            extra: Map::new(),
        }
    }
}

/// An angular relationship between two planets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub planet1: String,
    pub planet2: String,
    #[serde(rename = "aspect")]
    pub aspect_type: String,
    #[serde(default)]
    pub orb: f64,
    #[serde(default)]
    pub applying: bool,
    #[serde(default)]
    pub degrees_to_exact: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Houses, planets and aspects of a radix chart.
///
/// Planet and aspect entries are decoded one by one: an entry that does not
/// decode (a point with no longitude, say) is dropped without touching the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub houses: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_planets")]
    pub planets: BTreeMap<String, PlanetPosition>,
    #[serde(default, deserialize_with = "lenient_aspects")]
    pub aspects: Vec<Aspect>,
    /// Ascendant, midheaven and anything else the engine reported
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartPayload {
    pub fn is_empty(&self) -> bool {
        self.houses.is_empty() && self.planets.is_empty() && self.aspects.is_empty()
    }

    /// Decode a payload from a stored judgment result.
    ///
    /// Accepts either a full engine result (payload nested under `chart_data`)
    /// or a bare payload. Malformed input decodes to the empty payload.
    pub fn from_value(value: &Value) -> Self {
        let payload = match value.get("chart_data") {
            Some(nested) if nested.is_object() => nested,
            _ => value,
        };

        match serde_json::from_value(payload.clone()) {
            Ok(chart) => chart,
            Err(e) => {
                debug!("Unreadable chart payload, treating as empty: {}", e);
                ChartPayload::default()
            }
        }
    }

    /// A numeric top-level field such as `ascendant` or `midheaven`
    pub fn angle(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }
}

fn lenient_planets<'de, D>(deserializer: D) -> Result<BTreeMap<String, PlanetPosition>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(name, entry)| match serde_json::from_value(entry) {
            Ok(position) => Some((name, position)),
            Err(e) => {
                debug!("Skipping planet {}: {}", name, e);
                None
            }
        })
        .collect())
}

fn lenient_aspects<'de, D>(deserializer: D) -> Result<Vec<Aspect>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(aspect) => Some(aspect),
            Err(e) => {
                debug!("Skipping aspect: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Completed result handed over by the judgment engine.
///
/// `chart_data` is kept as the engine wrote it so storing a result loses
/// nothing; [`JudgmentResult::chart`] gives the typed view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JudgmentResult {
    #[serde(default)]
    pub judgment: Judgment,
    #[serde(default)]
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Value>,
    /// Everything else the engine reported (reasoning, timing, form data...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JudgmentResult {
    pub fn new(judgment: Judgment, confidence: u8) -> Self {
        Self {
            judgment,
            confidence,
            chart_data: None,
            extra: Map::new(),
        }
    }

    pub fn with_chart(mut self, chart: ChartPayload) -> Self {
        self.chart_data = serde_json::to_value(chart).ok();
        self
    }

    pub fn chart(&self) -> ChartPayload {
        self.chart_data
            .as_ref()
            .map(ChartPayload::from_value)
            .unwrap_or_default()
    }

    /// Confidence clamped to a percentage
    pub fn confidence_percent(&self) -> u8 {
        self.confidence.min(100)
    }
}
