//! Serde helpers for the backend's date and time formats.

/// `HH:mm` time-of-day format used for slots, cart entries and bookings.
pub const TIME_FORMAT: &str = "%H:%M";

/// Serialize a `NaiveTime` as `HH:mm`.
///
/// Use with `#[serde(with = "crate::models::wire::hhmm")]`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::TIME_FORMAT;

    /// Serialize as `HH:mm`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    /// Deserialize from `HH:mm`, also accepting `HH:mm:ss`.
    ///
    /// # Errors
    ///
    /// Fails when the string is not a valid time of day.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(D::Error::custom)
    }
}

/// Parse `HH:mm` (or `HH:mm:ss`) user or wire input.
///
/// # Errors
///
/// Returns the chrono parse error when neither format matches.
pub fn parse_time(raw: &str) -> Result<chrono::NaiveTime, chrono::ParseError> {
    let raw = raw.trim();
    chrono::NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| chrono::NaiveTime::parse_from_str(raw, "%H:%M:%S"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveTime;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "super::hhmm")]
        time: NaiveTime,
    }

    #[test]
    fn test_hhmm_wire_format() {
        let slot = Slot {
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        };
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"time":"09:30"}"#);
    }

    #[test]
    fn test_hhmm_accepts_seconds() {
        let slot: Slot = serde_json::from_str(r#"{"time":"18:00:00"}"#).unwrap();
        assert_eq!(slot.time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert!(serde_json::from_str::<Slot>(r#"{"time":"25:00"}"#).is_err());
    }
}
