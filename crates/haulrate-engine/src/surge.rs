use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;

use haulrate_core::pricing::{SurgeZone, TimeSurge};
use haulrate_core::types::Schedule;

/// Evaluate the scheduling-proximity surcharge.
///
/// Same-day, next-day, and weekend conditions are checked against `today`;
/// when more than one applies, the single highest amount wins rather than
/// stacking. Zero-amount surges are treated as disabled.
pub(crate) fn time_surge(
    schedule: Option<&Schedule>,
    today: NaiveDate,
    config: &TimeSurge,
) -> Option<(&'static str, Decimal)> {
    let schedule = schedule?;
    let mut candidates: Vec<(&'static str, Decimal)> = Vec::new();

    if schedule.date == today {
        candidates.push(("Surge (same-day)", config.same_day));
    }
    if Some(schedule.date) == today.succ_opt() {
        candidates.push(("Surge (next-day)", config.next_day));
    }
    if matches!(schedule.date.weekday(), Weekday::Sat | Weekday::Sun) {
        candidates.push(("Surge (weekend)", config.weekend));
    }

    candidates
        .into_iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .max_by_key(|(_, amount)| *amount)
}

/// Find the surge zone to charge for a pickup point, if any.
///
/// A zone applies when it is active, its day/time window contains `now`, its
/// boundary contains the point, and its amount is positive. Among multiple
/// applicable zones the highest amount wins, matching the original
/// highest-multiplier-wins rule.
pub(crate) fn active_zone<'a>(
    coords: Option<(f64, f64)>,
    now: DateTime<Utc>,
    zones: &'a [SurgeZone],
) -> Option<&'a SurgeZone> {
    let (lat, lng) = coords?;

    zones
        .iter()
        .filter(|zone| zone.amount > Decimal::ZERO)
        .filter(|zone| zone_window_active(zone, now))
        .filter(|zone| point_in_polygon(lat, lng, &zone.boundary))
        .max_by_key(|zone| zone.amount)
}

/// Whether a zone's activation window (day-of-week plus time-of-day)
/// contains the given instant. Ignores the boundary polygon.
#[must_use]
pub fn zone_window_active(zone: &SurgeZone, now: DateTime<Utc>) -> bool {
    if !zone.is_active {
        return false;
    }

    let day = u8::try_from(now.weekday().num_days_from_monday()).unwrap_or(0);
    if !zone.days_of_week.is_empty() && !zone.days_of_week.contains(&day) {
        return false;
    }

    let time = now.time();
    if zone.start_time.is_some_and(|start| time < start) {
        return false;
    }
    if zone.end_time.is_some_and(|end| time > end) {
        return false;
    }

    true
}

/// Ray-casting point-in-polygon test over `[lat, lng]` vertices.
///
/// Points exactly on an edge may land either side; zone boundaries are
/// coarse service-area polygons, so edge behavior is not load-bearing.
pub(crate) fn point_in_polygon(lat: f64, lng: f64, polygon: &[[f64; 2]]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (lat_i, lng_i) = (polygon[i][0], polygon[i][1]);
        let (lat_j, lng_j) = (polygon[j][0], polygon[j][1]);

        let crosses = (lat_i > lat) != (lat_j > lat);
        if crosses && lng < (lng_j - lng_i) * (lat - lat_i) / (lat_j - lat_i) + lng_i {
            inside = !inside;
        }
        j = i;
    }
    inside
}
