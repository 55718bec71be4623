//! When does it get properly dark?
//!
//! Night starts at astronomical dusk: the evening moment the sun's centre sinks
//! 18° below the horizon. Sun positions come from the NREL SPA implementation
//! in `solar_positioning`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use solar_positioning::{Horizon, SunriseResult, spa};

use crate::{location::Coordinates, model::ForecastInterval};

/// Difference between terrestrial and universal time. Good to a few seconds
/// for the current decade, far below the forecast's 3-hour resolution.
const DELTA_T_SECONDS: f64 = 69.0;

const SECONDS_PER_HOUR: f64 = 3_600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightStart {
    /// Astronomical dusk on that day.
    At(DateTime<Utc>),
    /// The sun never gets 18° below the horizon (high-latitude summer).
    Never,
    /// The sun never climbs above -18° (deep polar night).
    AllDay,
}

/// Local mean solar time at `lon`, as an offset from UTC.
fn solar_offset(lon: f64) -> FixedOffset {
    let seconds = (lon / 15.0 * SECONDS_PER_HOUR).round() as i32;
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

/// Calendar day in local mean solar time, i.e. the day whose solar noon is
/// closest to `at`.
pub fn solar_date(at: DateTime<Utc>, lon: f64) -> NaiveDate {
    at.with_timezone(&solar_offset(lon)).date_naive()
}

/// Nightfall on the local mean solar day `date` at `coords`.
///
/// The day runs from local mean midnight to midnight, so the returned dusk is
/// the one following that day's solar noon, wherever `coords` sits relative
/// to Greenwich.
pub fn night_start(date: NaiveDate, coords: Coordinates) -> Result<NightStart, String> {
    let midnight = solar_offset(coords.lon)
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .ok_or_else(|| format!("no local midnight on {date}"))?;

    let result = spa::sunrise_sunset_for_horizon(
        midnight,
        coords.lat,
        coords.lon,
        DELTA_T_SECONDS,
        Horizon::AstronomicalTwilight,
    )
    .map_err(|e| e.to_string())?;

    let start = match result {
        // The evening crossing of the -18° horizon.
        SunriseResult::RegularDay { sunset, .. } => NightStart::At(sunset.with_timezone(&Utc)),
        SunriseResult::AllNight { .. } => NightStart::AllDay,
        _ => NightStart::Never,
    };

    Ok(start)
}

/// Whether the interval starts at or after nightfall at `coords`.
pub fn is_night(interval: &ForecastInterval, coords: Coordinates) -> bool {
    let date = solar_date(interval.from, coords.lon);

    match night_start(date, coords) {
        Ok(NightStart::At(dusk)) => interval.from >= dusk,
        Ok(NightStart::AllDay) => true,
        Ok(NightStart::Never) => false,
        Err(error) => {
            tracing::warn!(
                lat = coords.lat,
                lon = coords.lon,
                %date,
                %error,
                "Could not compute nightfall, treating interval as daytime"
            );
            false
        }
    }
}
