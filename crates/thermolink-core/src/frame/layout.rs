pub const MODE_RANGE: std::ops::Range<usize> = 2..4;

pub const MODE_CURRENT: &str = "00";
pub const MODE_HISTORY: &str = "10";
pub const MODE_AGGREGATE: &str = "01";
pub const MODE_ALARM: &str = "02";
pub const MODE_SYSTEM: &str = "03";

pub const CURRENT_T0_RANGE: std::ops::Range<usize> = 10..14;
pub const CURRENT_T20_RANGE: std::ops::Range<usize> = 14..18;
pub const CURRENT_T40_RANGE: std::ops::Range<usize> = 18..22;

pub const HISTORY_T80_RANGE: std::ops::Range<usize> = 6..10;
pub const HISTORY_T100_RANGE: std::ops::Range<usize> = 10..14;

pub const AGGREGATE_MEAN_RANGE: std::ops::Range<usize> = 10..14;
pub const AGGREGATE_MAX_RANGE: std::ops::Range<usize> = 14..18;
pub const AGGREGATE_MIN_RANGE: std::ops::Range<usize> = 18..22;

pub const ALARM_FLAG_OFFSET: usize = 7;
pub const BATTERY_RANGE: std::ops::Range<usize> = 6..8;

pub const T20_OFFSET_S: i64 = 20 * 60;
pub const T40_OFFSET_S: i64 = 40 * 60;
pub const T80_OFFSET_S: i64 = 80 * 60;
pub const T100_OFFSET_S: i64 = 100 * 60;

pub const CURRENT_MIN_LEN: usize = CURRENT_T40_RANGE.end;
pub const HISTORY_MIN_LEN: usize = HISTORY_T100_RANGE.end;
pub const AGGREGATE_MIN_LEN: usize = AGGREGATE_MIN_RANGE.end;
pub const ALARM_MIN_LEN: usize = ALARM_FLAG_OFFSET + 1;
pub const SYSTEM_MIN_LEN: usize = BATTERY_RANGE.end;
