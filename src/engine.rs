//! Judgment engine boundary
//!
//! The engine that turns a question into a verdict lives outside this crate.
//! Callers ask an engine for its [`EngineCapability`] up front and pass that
//! value along, instead of consulting a global availability flag.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::chart::JudgmentResult;

/// A horary question as submitted to an engine
#[derive(Debug, Clone, Default)]
pub struct Question {
    pub text: String,
    pub location: String,
    /// Engine-specific options (house system, timezone, overrides...)
    pub settings: Map<String, Value>,
}

/// Result of checking whether an engine can be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCapability {
    Available,
    Unavailable { reason: String },
}

impl EngineCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, EngineCapability::Available)
    }
}

pub trait JudgmentEngine {
    /// Unique identifier
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    fn capability(&self) -> EngineCapability;

    /// Judge a question. Only called after `capability()` reported `Available`.
    fn judge(&self, question: &Question) -> Result<JudgmentResult>;
}

/// Engine stand-in that replays a result the real engine already wrote to disk
pub struct ResultFileEngine {
    path: PathBuf,
}

impl ResultFileEngine {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl JudgmentEngine for ResultFileEngine {
    fn id(&self) -> &str {
        "file:ResultFile"
    }

    fn description(&self) -> &str {
        "Precomputed judgment result (JSON file)"
    }

    fn capability(&self) -> EngineCapability {
        if self.path.is_file() {
            EngineCapability::Available
        } else {
            EngineCapability::Unavailable {
                reason: format!("result file {} not found", self.path.display()),
            }
        }
    }

    fn judge(&self, _question: &Question) -> Result<JudgmentResult> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let result = serde_json::from_str(&content)
            .with_context(|| format!("Invalid judgment result in {}", self.path.display()))?;
        Ok(result)
    }
}

/// Look up `form_data.<key>` in an engine result, where engines echo the submitted form
pub fn form_field<'a>(result: &'a JudgmentResult, key: &str) -> Option<&'a str> {
    result
        .extra
        .get("form_data")
        .and_then(|form| form.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
