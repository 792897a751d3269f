/// Direction sentinel for calm weather
pub const CALM_CODE: &str = "CALM";

/// Precipitation category for snow
pub const SNOW_PRECIPITATION_CODE: i64 = 2;

/// Timestamp format of normalized station archives (DD.MM.YYYY HH:MM)
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Date format accepted for calendar-date windows
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Default source column names
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "dt_time";
pub const DEFAULT_DIRECTION_COLUMN: &str = "Wind_dir";
pub const DEFAULT_SPEED_COLUMN: &str = "wind_speed";
pub const DEFAULT_PRECIPITATION_COLUMN: &str = "precipitation";

/// Synoptic observation hours, ascending
pub const SYNOPTIC_HOURS: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 21];

/// Filter defaults
pub const DEFAULT_WIND_THRESHOLD: f64 = 3.0;

/// Percentage table rules
pub const PERCENT_ZERO_THRESHOLD: f64 = 0.05;
pub const DEFAULT_PERCENT_PRECISION: usize = 1;
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 0.2;

/// Table labels
pub const TOTAL_LABEL: &str = "Total,%";
pub const SPEED_HEADER: &str = "Wind speed, m/s / Direction";
pub const CHECK_ROW_LABEL: &str = "Sum check:";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const ENV_PREFIX: &str = "WINDROSE";
