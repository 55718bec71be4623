use std::fmt::{Display, Write};

use chrono::TimeZone;
use stargazer_core::ForecastInterval;

/// One line per interval, in the given time zone.
pub fn render<Tz>(intervals: &[ForecastInterval], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if intervals.is_empty() {
        return "No clear night skies in the forecast.\n".to_string();
    }

    let mut out = String::new();
    for interval in intervals {
        let from = interval.from.with_timezone(tz);
        let to = interval.to.with_timezone(tz);
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{} - {}  clouds {:>3}%",
            from.format("%a %d %b %H:%M"),
            to.format("%H:%M"),
            interval.forecast.cloud_cover()
        );
    }
    out
}
