use serde::{Deserialize, Serialize};

/// The expected SQLite table schema for meter readings.
///
/// The table is populated by an external collection pipeline (one cumulative
/// kWh sample per building every ten minutes) and read by gridwatch.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS meter_readings (
///     building    TEXT NOT NULL,
///     data_value  REAL NOT NULL,
///     recorded_at TEXT NOT NULL
/// );
/// ```
///
/// `recorded_at` is stored as `YYYY-MM-DD HH:MM:SS` text, which sorts
/// lexicographically in chronological order.
pub const METER_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS meter_readings (
    building    TEXT NOT NULL,
    data_value  REAL NOT NULL,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_meter_building ON meter_readings(building);
CREATE INDEX IF NOT EXISTS idx_meter_building_recorded ON meter_readings(building, recorded_at);
";

/// A single cumulative meter reading as stored in the meter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub building: String,
    /// Cumulative active energy in kWh at the sample instant.
    pub data_value: f64,
    /// Sample instant in wire format (`YYYY-MM-DD HH:MM:SS`).
    pub recorded_at: String,
}

impl EnergyReading {
    pub fn new(building: impl Into<String>, data_value: f64, recorded_at: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            data_value,
            recorded_at: recorded_at.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_roundtrip() {
        let reading = EnergyReading::new("B1", 1500.0, "2024-09-01 00:00:00");
        let json = serde_json::to_string(&reading).unwrap();
        let parsed: EnergyReading = serde_json::from_str(&json).unwrap();
        assert_eq!(reading, parsed);
    }

    #[test]
    fn wire_timestamps_sort_chronologically() {
        // The DDL relies on lexicographic ordering of recorded_at.
        let earlier = "2024-09-01 09:59:59";
        let later = "2024-09-01 10:00:00";
        assert!(earlier < later);
    }
}
