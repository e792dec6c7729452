use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime};

/// Parses the date shapes the API is known to return: plain ISO dates,
/// RFC 3339 timestamps, naive ISO timestamps and RFC 2822 (as emitted by the
/// server's JSON encoder for datetime values).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    None
}

/// Long Indonesian date, e.g. `17 Agustus 1945`.
///
/// Unparseable input is returned unchanged so nothing silently disappears
/// from a card; missing input yields an empty string.
pub fn format_long_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return String::new();
    };
    match parse_date(raw) {
        Some(date) => date.format_localized("%-d %B %Y", Locale::id_ID).to_string(),
        None => {
            tracing::debug!(raw, "unrecognised date format");
            raw.to_string()
        }
    }
}

/// "birth - death" line for a member card; living people end in "Sekarang".
pub fn life_span(birth: Option<&str>, death: Option<&str>) -> String {
    let end = match death.map(str::trim).filter(|d| !d.is_empty()) {
        Some(death) => format_long_date(Some(death)),
        None => "Sekarang".to_string(),
    };
    format!("{} - {}", format_long_date(birth), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates_in_indonesian() {
        assert_eq!(format_long_date(Some("1945-08-17")), "17 Agustus 1945");
        assert_eq!(format_long_date(Some("2001-01-05T10:00:00Z")), "5 Januari 2001");
        assert_eq!(format_long_date(Some("1999-12-31T23:00:00")), "31 Desember 1999");
    }

    #[test]
    fn formats_rfc2822_timestamps() {
        assert_eq!(
            format_long_date(Some("Tue, 01 Mar 2022 00:00:00 GMT")),
            "1 Maret 2022"
        );
    }

    #[test]
    fn missing_and_unparseable_dates() {
        assert_eq!(format_long_date(None), "");
        assert_eq!(format_long_date(Some("  ")), "");
        assert_eq!(format_long_date(Some("sekitar 1900")), "sekitar 1900");
    }

    #[test]
    fn life_span_for_living_person() {
        assert_eq!(life_span(Some("1980-06-01"), None), "1 Juni 1980 - Sekarang");
        assert_eq!(
            life_span(Some("1900-01-01"), Some("1970-10-02")),
            "1 Januari 1900 - 2 Oktober 1970"
        );
    }
}
