use time::OffsetDateTime;

use crate::schema::Precision;

/// Converts ticks since the Unix epoch to UTC calendar time, exact to the
/// precision. `None` for pre-epoch ticks and for instants past the calendar
/// range.
pub fn ticks_to_datetime(ticks: i64, precision: Precision) -> Option<OffsetDateTime> {
    if ticks < 0 {
        return None;
    }
    let nanos = i128::from(ticks) * precision.nanos_per_tick();
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

/// Inverse of [`ticks_to_datetime`]. `None` when `dt` is pre-epoch, does not
/// fit in i64 ticks, or carries resolution finer than the precision.
pub fn datetime_to_ticks(dt: OffsetDateTime, precision: Precision) -> Option<i64> {
    let nanos = dt.unix_timestamp_nanos();
    let per_tick = precision.nanos_per_tick();
    if nanos < 0 || nanos % per_tick != 0 {
        return None;
    }
    i64::try_from(nanos / per_tick).ok()
}
