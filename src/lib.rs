//! Premaster - Normalize music uploads and screen them before release
//!
//! Premaster is the intake step of a music distribution pipeline. Every
//! upload is rendered to one canonical master format (24-bit/48kHz WAV)
//! and run through a content screen that estimates how likely the track
//! is AI-generated and simulates fingerprint matches against a reference
//! catalog.
//!
//! # Overview
//!
//! Distributors receive tracks in whatever format the artist had lying
//! around. Downstream tooling wants exactly one format, so the pipeline
//! decodes anything the probe recognizes, resamples to 48kHz, and writes
//! 24-bit WAV. The same decoded audio feeds the screen, which is fully
//! deterministic: re-running a batch always reproduces the same verdicts,
//! byte for byte.
//!
//! # Quick Start
//!
//! ```no_run
//! use premaster::{Analyzer, ReviewStatus};
//!
//! let data = std::fs::read("upload.mp3")?;
//!
//! let analyzer = Analyzer::new();
//! let result = analyzer.analyze(&data);
//!
//! match result.review_status() {
//!     ReviewStatus::Clean => println!("Ready for release"),
//!     ReviewStatus::AiSuspected => {
//!         println!("{}% likely generated", result.ai_probability)
//!     }
//!     ReviewStatus::CopyrightMatched => {
//!         println!("{} fingerprint hit(s)", result.copyright_matches.len())
//!     }
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Screening verdicts
//!
//! The screen splits the track into 10-second segments, each carrying
//! exactly one status:
//!
//! | Status | Meaning |
//! |--------|---------|
//! | `CLEAN` | Nothing flagged |
//! | `AI_DETECTED` | Synthetic spectral pattern, confidence attached |
//! | `COPYRIGHT_MATCH` | Fingerprint hit against the reference catalog |
//!
//! Copyright checks run before AI checks, so a segment never carries both.
//!
//! # Modules
//!
//! - [`audio`]: decoding, resampling and 24-bit WAV rendering
//! - [`analyzer`]: feature extraction and the content screen
//! - [`report`]: output formatters (JSON, CSV)
//! - [`serve`]: HTTP upload surface for review stations

pub mod analyzer;
pub mod audio;
pub mod error;
pub mod report;
pub mod serve;

pub use analyzer::{
    AnalysisResult, Analyzer, Catalog, CatalogEntry, Platform, ReviewStatus, SegmentStatus,
};
pub use error::{Error, Result};
