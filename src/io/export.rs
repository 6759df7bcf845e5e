//! Export the annotated observations to CSV.
//!
//! The export mirrors the loaded table so a run can be inspected in a
//! spreadsheet without querying the database.

use std::path::Path;

use crate::domain::ObservationSet;
use crate::error::AppError;

/// Write every observation (with its outlier flag) to a CSV file.
pub fn write_observations_csv(path: &Path, observations: &ObservationSet) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    // serde only emits the header with the first record.
    if observations.is_empty() {
        writer
            .write_record([
                "country",
                "country_code",
                "country_group",
                "indicator_code",
                "indicator_name",
                "year",
                "value",
                "is_outlier",
            ])
            .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;
    }

    for obs in observations {
        writer
            .serialize(obs)
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchTask, Observation};
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_rows() {
        let task = FetchTask {
            country_code: "MAR".to_string(),
            country_group: "AFRICA_TOP5".to_string(),
            indicator_code: "NY.GDP.MKTP.KD.ZG".to_string(),
            indicator_name: "GDP Growth (%)".to_string(),
        };
        let mut flagged = Observation::from_task(&task, "Morocco", 2020, -7.2);
        flagged.is_outlier = true;
        let set: ObservationSet = vec![Observation::from_task(&task, "Morocco", 2021, 8.0), flagged].into();

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_observations_csv(&path, &set).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "country,country_code,country_group,indicator_code,indicator_name,year,value,is_outlier"
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Morocco,MAR,AFRICA_TOP5,NY.GDP.MKTP.KD.ZG,GDP Growth (%),2020,-7.2,true");
    }

    #[test]
    fn empty_set_still_has_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_observations_csv(&path, &ObservationSet::new()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("country,country_code,"));
        assert_eq!(text.lines().count(), 1);
    }
}
