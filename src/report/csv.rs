//! CSV report writer
//!
//! One row per screened file, importable into any spreadsheet. Fields that
//! can carry commas or quotes (names, paths, match lists) are escaped per
//! RFC 4180.

use std::io::{self, Write};

use super::{segment_counts, TrackRecord};

const HEADER: &str = "file_name,file_path,duration_secs,review_status,\
                      ai_probability,segments,ai_segments,copyright_segments,matches";

/// Write all records as CSV rows under a fixed header
pub fn write<W: Write>(out: &mut W, records: &[TrackRecord]) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;

    for record in records {
        let (ai_segments, copyright_segments) = segment_counts(&record.analysis);

        let matches = record
            .analysis
            .copyright_matches
            .iter()
            .map(|m| {
                format!(
                    "{} [{} {}%]",
                    m.title, m.platform, m.match_percentage
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        writeln!(
            out,
            "{},{},{:.1},{},{},{},{},{},{}",
            escape(&record.file_name),
            escape(&record.file_path),
            record.analysis.screened_secs(),
            record.review_status,
            record.analysis.ai_probability,
            record.analysis.segments.len(),
            ai_segments,
            copyright_segments,
            escape(&matches),
        )?;
    }

    Ok(())
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
