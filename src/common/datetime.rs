// src/common/datetime.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

// Formatos aceitos sem fuso: tratados como UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Interpreta datas ISO 8601 com ou sem fuso (`2026-02-10T10:00:00Z`,
/// `2026-02-10T10:00:00+01:00`, `2026-02-10T10:00:00`, `2026-02-10`).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn invalid<E: de::Error>(raw: &str) -> E {
    E::custom(format!(
        "invalid datetime `{raw}`, use ISO 8601 (e.g. 2026-02-10T10:00:00)"
    ))
}

// Para `#[serde(deserialize_with = "...")]` nos payloads.
pub mod flexible {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).ok_or_else(|| invalid(&raw))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => parse_datetime(&raw).map(Some).ok_or_else(|| invalid(&raw)),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_offset_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 10, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2026-02-10T10:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2026-02-10T10:00:00+00:00"), Some(expected));
        assert_eq!(parse_datetime("2026-02-10T11:00:00+01:00"), Some(expected));
        assert_eq!(parse_datetime("2026-02-10T10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2026-02-10T10:00"), Some(expected));
        assert_eq!(parse_datetime("2026-02-10T10:00:00.000"), Some(expected));
    }

    #[test]
    fn date_only_means_midnight() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2026-02-10"), Some(expected));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_datetime("tomorrow"), None);
        assert_eq!(parse_datetime("2026-13-40T10:00:00"), None);
    }
}
