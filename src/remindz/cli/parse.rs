use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a due date typed by the user. RFC 3339 carries its own offset;
/// anything else is wall-clock time in `tz`.
pub fn parse_due<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| {
            format!(
                "Could not read due date '{}' (expected YYYY-MM-DD HH:MM)",
                input
            )
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("{} does not exist in the local time zone", input))
}
