use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use premaster::audio::EncodedAudio;
use premaster::report::{self, Summary, TrackRecord};
use premaster::{audio, Analyzer, Catalog, ReviewStatus, SegmentStatus};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "premaster")]
#[command(author, version, about = "Normalize music uploads and screen them for AI and copyright flags")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// File or directory to screen (same as the analyze subcommand)
    path: Option<PathBuf>,

    /// Reference catalog JSON (defaults to the built-in list)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output report file (.csv, .json)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "premaster-reports", global = true)]
    report_dir: PathBuf,

    /// Don't auto-generate CSV report
    #[arg(long, global = true)]
    no_report: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Show flagged segments and feature detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Screen a file or directory (default when a bare path is given)
    Analyze {
        /// File or directory to screen
        path: PathBuf,
    },

    /// Render a whole track to canonical 24-bit/48kHz WAV
    Normalize {
        /// Source audio file
        input: PathBuf,

        /// Track title used for the output file name (default: input stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Directory to write the WAV into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Cut a preview clip and render it to 24-bit/48kHz WAV
    Clip {
        /// Source audio file
        input: PathBuf,

        /// Clip start within the track, in seconds
        #[arg(short, long)]
        start: f64,

        /// Clip length in seconds
        #[arg(short, long, default_value = "60")]
        duration: f64,

        /// Track title used for the output file name (default: input stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Directory to write the WAV into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print source format facts as JSON
    Inspect {
        /// Audio file to probe
        input: PathBuf,
    },

    /// Start the HTTP upload service
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },
}

fn main() {
    let mut args = Args::parse();

    let filter = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    // Handle subcommands first; a bare path falls through to analyze
    let explicit_path = match args.command.take() {
        Some(Command::Analyze { path }) => Some(path),
        Some(Command::Normalize { input, title, out_dir }) => {
            run_normalize(&input, title, &out_dir);
            return;
        }
        Some(Command::Clip { input, start, duration, title, out_dir }) => {
            run_clip(&input, start, duration, title, &out_dir);
            return;
        }
        Some(Command::Inspect { input }) => {
            run_inspect(&input);
            return;
        }
        Some(Command::Serve { port }) => {
            let analyzer = build_analyzer(args.catalog.as_deref());
            if let Err(e) = premaster::serve::start(port, analyzer) {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
            return;
        }
        None => None,
    };

    let path = if let Some(p) = explicit_path.or_else(|| args.path.clone()) {
        p
    } else {
        eprintln!("Usage: premaster <PATH>");
        eprintln!("Run 'premaster --help' for more options.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    // Formats the decoder actually handles; anything else still screens
    // from fallback features if uploaded over HTTP, but the batch walk
    // sticks to real audio
    let supported_extensions: std::collections::HashSet<&str> =
        ["flac", "wav", "wave", "mp3", "m4a", "aac", "ogg", "oga"]
            .iter()
            .cloned()
            .collect();

    // Collect audio files
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| supported_extensions.contains(ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    } else if path.exists() {
        vec![path.clone()]
    } else {
        vec![]
    };

    if files.is_empty() {
        eprintln!("No audio files found (supported: flac, wav, mp3, m4a, aac, ogg)");
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mPremaster - Upload Screening\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} audio file(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let analyzer = build_analyzer(args.catalog.as_deref());

    // Screen files in parallel; unreadable files are skipped, not faked
    let records: Vec<TrackRecord> = files
        .par_iter()
        .filter_map(|path| {
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    if let Some(ref pb) = pb {
                        pb.inc(1);
                    }
                    return None;
                }
            };

            let result = analyzer.analyze(&data);
            let record = TrackRecord::new(
                path.display().to_string(),
                path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
                result,
            );

            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(record.file_name.clone());
            }
            Some(record)
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let skipped = files.len() - records.len();

    // Print results
    if !args.quiet {
        for r in &records {
            let (color, label) = match r.review_status {
                ReviewStatus::Clean => ("\x1b[32m", "CLEAN"),
                ReviewStatus::AiSuspected => ("\x1b[33m", "AI?"),
                ReviewStatus::CopyrightMatched => ("\x1b[31m", "MATCH"),
            };
            let reset = "\x1b[0m";

            let matches_str = if r.analysis.copyright_matches.is_empty() {
                "-".to_string()
            } else {
                r.analysis
                    .copyright_matches
                    .iter()
                    .map(|m| m.title.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            };

            println!(
                "{}{:<8}{} {:>3}%  {:>3} seg  {:<28}  {}",
                color,
                format!("[{}]", label),
                reset,
                r.analysis.ai_probability,
                r.analysis.segments.len(),
                truncate(&matches_str, 28),
                &r.file_name
            );

            if args.verbose {
                for m in &r.analysis.copyright_matches {
                    eprintln!(
                        "    Match: {} by {} on {} ({}%, {:.0}s-{:.0}s)",
                        m.title, m.artist, m.platform, m.match_percentage,
                        m.segment_start, m.segment_end
                    );
                }
                for s in r
                    .analysis
                    .segments
                    .iter()
                    .filter(|s| s.status != SegmentStatus::Clean)
                {
                    eprintln!(
                        "    {:>5.0}s-{:<5.0}s {} ({}%)",
                        s.start, s.end, s.status, s.confidence
                    );
                }
            }
        }
    }

    // Summary
    let summary = Summary::from_records(&records);

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Clean:\x1b[0m    {}", summary.clean);
        eprintln!("  \x1b[33m? AI flag:\x1b[0m  {}", summary.ai_suspected);
        eprintln!("  \x1b[31m✗ Matched:\x1b[0m  {}", summary.copyright_matched);
        if skipped > 0 {
            eprintln!("  \x1b[90mSkipped:\x1b[0m    {}", skipped);
        }
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        // Auto-generate report
        std::fs::create_dir_all(&args.report_dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("premaster_report_{}.csv", timestamp);
        Some(args.report_dir.join(filename))
    } else {
        None
    };

    // Generate report
    if let Some(ref output_path) = report_path {
        if let Err(e) = report::generate(output_path, &records) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mScreening complete.\x1b[0m");
    }

    // Exit with appropriate code
    if summary.copyright_matched > 0 {
        std::process::exit(2);
    } else if summary.ai_suspected > 0 {
        std::process::exit(1);
    }
}

fn build_analyzer(catalog: Option<&Path>) -> Analyzer {
    match catalog {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => Analyzer::new().with_catalog(catalog),
            Err(e) => {
                eprintln!("Failed to load catalog {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Analyzer::new(),
    }
}

fn run_normalize(input: &Path, title: Option<String>, out_dir: &Path) {
    let data = read_or_exit(input);
    let title = resolve_title(title, input);

    match audio::normalize_track(&data, &title) {
        Ok(encoded) => save_encoded(out_dir, &encoded),
        Err(e) => {
            eprintln!("Failed to normalize {}: {}", input.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_clip(input: &Path, start: f64, duration: f64, title: Option<String>, out_dir: &Path) {
    let data = read_or_exit(input);
    let title = resolve_title(title, input);

    match audio::extract_clip(&data, &title, start, duration) {
        Ok(encoded) => save_encoded(out_dir, &encoded),
        Err(e) => {
            eprintln!("Failed to clip {}: {}", input.display(), e);
            std::process::exit(1);
        }
    }
}

fn run_inspect(input: &Path) {
    let data = read_or_exit(input);

    match audio::inspect(&data) {
        Ok(info) => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing info: {}", e),
        },
        Err(e) => {
            eprintln!("Failed to inspect {}: {}", input.display(), e);
            std::process::exit(1);
        }
    }
}

fn read_or_exit(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn save_encoded(out_dir: &Path, encoded: &EncodedAudio) {
    std::fs::create_dir_all(out_dir).ok();
    let path = out_dir.join(&encoded.file_name);

    match std::fs::write(&path, &encoded.data) {
        Ok(()) => {
            eprintln!(
                "\x1b[32mSaved: {} ({} bytes)\x1b[0m",
                path.display(),
                encoded.data.len()
            );
        }
        Err(e) => {
            eprintln!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn resolve_title(title: Option<String>, input: &Path) -> String {
    title.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track")
            .to_string()
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
