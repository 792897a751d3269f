pub mod wind_analyzer;

pub use wind_analyzer::{DataQuality, SpeedStats, WindAnalyzer, WindStatistics};
