//! JSON report writer
//!
//! Emits one pretty-printed document per run:
//!
//! ```json
//! {
//!   "generated": "2025-04-02T14:31:07-04:00",
//!   "summary": { "total": 2, "clean": 1, ... },
//!   "files": [ { "filePath": ..., "analysis": { ... } } ]
//! }
//! ```
//!
//! The `files` entries embed the full screening verdict, so a review
//! station can load a batch report instead of hitting the API per track.

use std::io::{self, Write};

use chrono::Local;
use serde::Serialize;

use super::{Summary, TrackRecord};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    generated: String,
    summary: Summary,
    files: &'a [TrackRecord],
}

/// Write all records as a single JSON document
pub fn write<W: Write>(out: &mut W, records: &[TrackRecord]) -> io::Result<()> {
    let report = Report {
        generated: Local::now().to_rfc3339(),
        summary: Summary::from_records(records),
        files: records,
    };

    let body = serde_json::to_string_pretty(&report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    out.write_all(body.as_bytes())?;
    out.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::SegmentStatus;
    use crate::report::tests::record_with;

    // ==========================================================================
    // JSON DOCUMENT SHAPE TESTS
    // ==========================================================================

    #[test]
    fn test_document_has_envelope_fields() {
        let records = vec![
            record_with(SegmentStatus::Clean, "a.mp3"),
            record_with(SegmentStatus::AiDetected, "b.flac"),
        ];
        let mut buf = Vec::new();
        write(&mut buf, &records).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert!(doc["generated"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(doc["summary"]["total"], 2);
        assert_eq!(doc["summary"]["clean"], 1);
        assert_eq!(doc["summary"]["aiSuspected"], 1);
        assert_eq!(doc["files"].as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_files_embed_full_analysis() {
        let records = vec![record_with(SegmentStatus::CopyrightMatch, "hit.mp3")];
        let mut buf = Vec::new();
        write(&mut buf, &records).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let file = &doc["files"][0];

        assert_eq!(file["fileName"], "hit.mp3");
        assert_eq!(file["filePath"], "/uploads/hit.mp3");
        assert_eq!(file["reviewStatus"], "COPYRIGHT_MATCHED");
        assert_eq!(file["analysis"]["aiProbability"], 10);
        assert_eq!(
            file["analysis"]["segments"][0]["status"],
            "COPYRIGHT_MATCH"
        );
    }

    #[test]
    fn test_empty_batch_is_valid_json() {
        let mut buf = Vec::new();
        write(&mut buf, &[]).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["summary"]["total"], 0);
        assert_eq!(doc["files"].as_array().map(|a| a.len()), Some(0));
    }
}
