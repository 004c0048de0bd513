//! Report generation for screening results
//!
//! Output formatters for batch screening runs:
//!
//! - **JSON**: machine-readable document for programmatic consumption
//! - **CSV**: spreadsheet-compatible rows for bulk review
//!
//! # Usage
//!
//! ```ignore
//! use premaster::report;
//!
//! // Picks the format from the extension, defaulting to CSV
//! report::generate("report.json", &records)?;
//! report::generate("report.csv", &records)?;
//! ```

pub mod csv;
pub mod json;

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::analyzer::{AnalysisResult, ReviewStatus, SegmentStatus};

/// One screened file, as reports consume it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub file_path: String,
    pub file_name: String,
    pub review_status: ReviewStatus,
    pub analysis: AnalysisResult,
}

impl TrackRecord {
    pub fn new(file_path: String, file_name: String, analysis: AnalysisResult) -> Self {
        let review_status = analysis.review_status();
        Self {
            file_path,
            file_name,
            review_status,
            analysis,
        }
    }
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, records: &[TrackRecord]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, records),
        _ => csv::write(&mut file, records),
    }
}

/// Summary statistics for a batch of screened files
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub clean: usize,
    pub ai_suspected: usize,
    pub copyright_matched: usize,
}

impl Summary {
    pub fn from_records(records: &[TrackRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for r in records {
            match r.review_status {
                ReviewStatus::Clean => summary.clean += 1,
                ReviewStatus::AiSuspected => summary.ai_suspected += 1,
                ReviewStatus::CopyrightMatched => summary.copyright_matched += 1,
            }
        }

        summary
    }
}

pub(crate) fn segment_counts(analysis: &AnalysisResult) -> (usize, usize) {
    let ai = analysis
        .segments
        .iter()
        .filter(|s| s.status == SegmentStatus::AiDetected)
        .count();
    let copyright = analysis
        .segments
        .iter()
        .filter(|s| s.status == SegmentStatus::CopyrightMatch)
        .count();
    (ai, copyright)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analyzer::AnalysisSegment;

    // ==========================================================================
    // SUMMARY STATISTICS TESTS
    // ==========================================================================
    //
    // The Summary struct aggregates review statuses for a batch of files.
    // This is displayed at the top of reports and the CLI run footer.
    // ==========================================================================

    pub(crate) fn record_with(status: SegmentStatus, name: &str) -> TrackRecord {
        let analysis = AnalysisResult {
            ai_probability: 10,
            copyright_matches: vec![],
            segments: vec![AnalysisSegment {
                start: 0.0,
                end: 10.0,
                status,
                description: String::new(),
                confidence: 0,
            }],
        };
        TrackRecord::new(format!("/uploads/{}", name), name.to_string(), analysis)
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_records(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.clean, 0);
        assert_eq!(summary.ai_suspected, 0);
        assert_eq!(summary.copyright_matched, 0);
    }

    #[test]
    fn test_summary_all_clean() {
        let records = vec![
            record_with(SegmentStatus::Clean, "a.mp3"),
            record_with(SegmentStatus::Clean, "b.mp3"),
            record_with(SegmentStatus::Clean, "c.mp3"),
        ];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.clean, 3);
        assert_eq!(summary.ai_suspected, 0);
        assert_eq!(summary.copyright_matched, 0);
    }

    #[test]
    fn test_summary_mixed() {
        let records = vec![
            record_with(SegmentStatus::Clean, "a.mp3"),
            record_with(SegmentStatus::Clean, "b.mp3"),
            record_with(SegmentStatus::AiDetected, "c.mp3"),
            record_with(SegmentStatus::CopyrightMatch, "d.mp3"),
        ];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.clean, 2);
        assert_eq!(summary.ai_suspected, 1);
        assert_eq!(summary.copyright_matched, 1);
    }

    #[test]
    fn test_summary_default() {
        let summary = Summary::default();

        assert_eq!(summary.total, 0);
        assert_eq!(summary.clean, 0);
        assert_eq!(summary.ai_suspected, 0);
        assert_eq!(summary.copyright_matched, 0);
    }

    #[test]
    fn test_record_derives_review_status() {
        let flagged = record_with(SegmentStatus::CopyrightMatch, "hit.mp3");
        assert_eq!(flagged.review_status, ReviewStatus::CopyrightMatched);

        let clean = record_with(SegmentStatus::Clean, "ok.mp3");
        assert_eq!(clean.review_status, ReviewStatus::Clean);
    }

    // ==========================================================================
    // FORMAT DISPATCH TESTS
    // ==========================================================================

    #[test]
    fn test_generate_picks_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let records = vec![record_with(SegmentStatus::Clean, "a.mp3")];

        generate(&path, &records).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.trim_start().starts_with('{'));
        assert!(body.contains("\"summary\""));
    }

    #[test]
    fn test_generate_defaults_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.report");
        let records = vec![record_with(SegmentStatus::Clean, "a.mp3")];

        generate(&path, &records).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("file_name,"));
    }

    #[test]
    fn test_segment_count_split() {
        let mut record = record_with(SegmentStatus::AiDetected, "a.mp3");
        record.analysis.segments.push(AnalysisSegment {
            start: 10.0,
            end: 20.0,
            status: SegmentStatus::CopyrightMatch,
            description: String::new(),
            confidence: 90,
        });

        let (ai, copyright) = segment_counts(&record.analysis);
        assert_eq!(ai, 1);
        assert_eq!(copyright, 1);
    }
}
