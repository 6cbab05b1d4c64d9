use crate::time_code::TimeCode;
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capture cadence of the CONUS sector.
pub const STRIDE_MINUTES: i64 = 5;

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct FilenameRecord {
    filename: String,
}

/// Every filename from `start` to `end` inclusive at a five-minute stride.
///
/// Returns an empty list when `end` precedes `start`.
pub fn generate_filenames(start: TimeCode, end: TimeCode, suffix: &str) -> Vec<String> {
    let stride = Duration::minutes(STRIDE_MINUTES);
    let end = end.datetime();

    let mut names = vec![];
    let mut dt = start.datetime();
    while dt <= end {
        names.push(format!("{}{}", TimeCode::from_datetime(dt), suffix));
        dt += stride;
    }
    names
}

/// Write the single-column `filename` record, replacing any existing file.
pub fn write_record<P: AsRef<Path>>(path: P, names: &[String]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create record file {}", path.display()))?;
    for name in names {
        writer.serialize(FilenameRecord {
            filename: name.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_record<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<FilenameRecord>()
        .map(|record| -> Result<String> { Ok(record?.filename) })
        .collect()
}

/// Decode both time-codes, generate the filenames and persist them to `csv_path`.
pub fn generate_and_record<P: AsRef<Path>>(
    start_code: &str,
    end_code: &str,
    suffix: &str,
    csv_path: P,
) -> Result<Vec<String>> {
    let start = TimeCode::parse(start_code)?;
    let end = TimeCode::parse(end_code)?;
    if end < start {
        tracing::warn!("End time-code {end} precedes start time-code {start}");
    }

    let names = generate_filenames(start, end, suffix);
    write_record(&csv_path, &names)?;

    println!(
        "Generated {} filenames → {}",
        names.len(),
        csv_path.as_ref().display()
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SUFFIX: &str = "_GOES19-ABI-CONUS-GEOCOLOR-1250x750.jpg";

    fn code(s: &str) -> TimeCode {
        TimeCode::parse(s).unwrap()
    }

    #[test]
    fn test_ten_minutes_yields_three_names() {
        let names = generate_filenames(code("20252991716"), code("20252991726"), SUFFIX);
        assert_eq!(
            names,
            vec![
                format!("20252991716{SUFFIX}"),
                format!("20252991721{SUFFIX}"),
                format!("20252991726{SUFFIX}"),
            ]
        );
    }

    #[test]
    fn test_count_and_stride() {
        // 17:16 on day 299 to 10:48 on day 302 is not a whole number of strides
        let start = code("20252991716");
        let end = code("20253021048");
        let names = generate_filenames(start, end, "");

        let minutes = (end.datetime() - start.datetime()).num_minutes();
        assert_eq!(names.len() as i64, minutes / STRIDE_MINUTES + 1);

        for pair in names.windows(2) {
            let a = code(&pair[0]).datetime();
            let b = code(&pair[1]).datetime();
            assert_eq!(b - a, Duration::minutes(STRIDE_MINUTES));
        }
        assert_eq!(names.last().unwrap(), "20253021046");
    }

    #[test]
    fn test_crosses_year_boundary() {
        let names = generate_filenames(code("20243662355"), code("20250010005"), "");
        assert_eq!(
            names,
            vec!["20243662355", "20250010000", "20250010005"]
        );
    }

    #[test]
    fn test_end_before_start_is_empty() {
        let names = generate_filenames(code("20252991726"), code("20252991716"), SUFFIX);
        assert!(names.is_empty());
    }

    #[test]
    fn test_single_instant() {
        let names = generate_filenames(code("20252991716"), code("20252991716"), ".jpg");
        assert_eq!(names, vec!["20252991716.jpg"]);
    }

    #[test]
    fn test_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filenames.csv");
        fs::write(&path, "stale content that should be replaced\n").unwrap();

        let names =
            generate_and_record("20252991716", "20252991726", SUFFIX, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), names.len() + 1);
        assert_eq!(lines[0], "filename");
        assert_eq!(lines[1], format!("20252991716{SUFFIX}"));
        assert!(content.ends_with('\n'));

        assert_eq!(read_record(&path).unwrap(), names);
    }

    #[test]
    fn test_malformed_code_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filenames.csv");
        assert!(generate_and_record("2025299", "20252991726", SUFFIX, &path).is_err());
        assert!(!path.exists());
    }
}
