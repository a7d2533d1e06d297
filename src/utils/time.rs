use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

pub const TIMEZONE_NAME: &str = "Asia/Bangkok";

// Asia/Bangkok has no DST
const BANGKOK_OFFSET_SECS: i32 = 7 * 3600;

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn bangkok() -> FixedOffset {
    FixedOffset::east_opt(BANGKOK_OFFSET_SECS).expect("UTC+7 is a valid offset")
}

pub fn utc_to_bangkok(dt: DateTime<Utc>) -> DateTime<FixedOffset> {
    dt.with_timezone(&bangkok())
}

/// Parses an admin-entered timestamp. Naive values are Bangkok wall-clock time;
/// values carrying an offset are honoured as given.
pub fn parse_bangkok_datetime(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("`{}` is not an ISO 8601 datetime", input))?;

    naive
        .and_local_timezone(bangkok())
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("`{}` is ambiguous in {}", input, TIMEZONE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn naive_input_is_bangkok_time() {
        let utc = parse_bangkok_datetime("2025-12-01T08:00:00").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 12, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn space_separated_and_date_only() {
        assert_eq!(
            parse_bangkok_datetime("2025-12-01 07:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_bangkok_datetime("2025-12-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 11, 30, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn explicit_offset_wins() {
        let utc = parse_bangkok_datetime("2025-12-01T08:00:00Z").unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_bangkok_datetime("next tuesday").is_err());
    }
}
