pub mod chart;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;
pub mod wheel;

pub use chart::{ChartPayload, Judgment, JudgmentResult};
pub use config::Config;
pub use engine::{EngineCapability, JudgmentEngine, ResultFileEngine};
pub use error::{GeometryError, StoreError, StoreResult};
pub use store::ChartStore;
