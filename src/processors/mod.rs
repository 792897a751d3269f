pub mod aggregator;
pub mod filter_pipeline;
pub mod rose_processor;
pub mod window_resolver;

pub use aggregator::Aggregator;
pub use filter_pipeline::{
    keep_snow_only, keep_wind_at_least, remove_calm, FilterPipeline, KeepSnowOnly,
    KeepWindAtLeast, ObservationFilter, RemoveCalm,
};
pub use rose_processor::{select_window, RoseProcessor, RoseResult, StationOutcome};
pub use window_resolver::{ResolvedWindow, WindowResolver};
