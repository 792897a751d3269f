pub mod criteria;
pub mod direction;
pub mod observation;
pub mod pivot;
pub mod station;

pub use criteria::{DateWindow, FilterCriteria};
pub use direction::{to_degrees, to_label, CompassDirection, WindDirection};
pub use observation::{Observation, WindSample};
pub use pivot::{AbsolutePivot, PercentagePivot, Pivot, PivotRow, RowLabel};
pub use station::StationMetadata;
