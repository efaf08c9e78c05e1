// src/utils/id_generator.rs
use chrono::{DateTime, Utc};

pub const DEFAULT_ID_PREFIX: &str = "AIHS";

/// Builds admission reference ids of the form `{prefix}-{unix_millis}`.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(&self) -> String {
        self.generate_with_timestamp(Utc::now())
    }

    /// Generate ID with a specific timestamp (useful for testing)
    pub fn generate_with_timestamp(&self, timestamp: DateTime<Utc>) -> String {
        format!("{}-{}", self.prefix, timestamp.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_generation() {
        let id = IdGenerator::default().generate();
        let millis = id.strip_prefix("AIHS-").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_id_from_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 30).unwrap();
        let id = IdGenerator::default().generate_with_timestamp(at);
        assert_eq!(id, format!("AIHS-{}", at.timestamp_millis()));
    }

    #[test]
    fn test_custom_prefix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let ids = IdGenerator::new("MKUZO-2024");
        assert_eq!(ids.prefix(), "MKUZO-2024");
        assert_eq!(ids.generate_with_timestamp(at), format!("MKUZO-2024-{}", at.timestamp_millis()));
    }
}
