pub mod observation_reader;

pub use observation_reader::{ColumnMapping, ObservationReader};
