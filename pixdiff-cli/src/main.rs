//! pixdiff CLI - CSS clone pixel-difference scorer
//!
//! Compare a candidate screenshot against a target and print a similarity
//! score, optionally saving the color-coded diff overlay.

mod config;

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, ColorChoice, Parser, ValueEnum};
use colored::Colorize;
use log::{debug, info};
use pixdiff::{compare_with_params, ComparisonResult, DiffParams, RasterBuffer, ScoreTier};
use serde::Serialize;

use crate::config::{FileConfig, ParamOverrides};

/// Pixel-difference scorer for CSS clone challenges
///
/// Compares a candidate rendering against a target rendering and reports a
/// similarity score from 0 to 100. A score of 100 means pixel-identical.
///
/// Score tiers:
///   80 - 100  - high
///   50 - 80   - medium
///    0 - 50   - low
#[derive(Parser, Debug)]
#[command(name = "pixdiff")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    Score a candidate against a target:
        pixdiff candidate.png target.png

    Show the score tier with colors:
        pixdiff -t candidate.png target.png

    CI mode - fail if score drops below a threshold:
        pixdiff --min-score 90 candidate.png target.png

    Score every PNG in two directories:
        pixdiff --batch candidates/ targets/

    Output JSON for scripting:
        pixdiff --json candidate.png target.png

    Save the diff overlay:
        pixdiff --diff diff.png candidate.png target.png

    Ignore alpha entirely:
        pixdiff --weights 0.299,0.587,0.114,0 candidate.png target.png

EXIT CODES:
    0 - Success (score meets --min-score if specified)
    1 - Score below threshold (--min-score)
    2 - Error (file not found, invalid image, etc.)")]
struct Cli {
    /// Candidate image or directory (the recreation being scored)
    #[arg(value_name = "CANDIDATE")]
    candidate: PathBuf,

    /// Target image or directory (the design to match)
    #[arg(value_name = "TARGET")]
    target: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output JSON (shorthand for --format json)
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Show score tier with colors (shorthand for --format tier)
    #[arg(short, long, conflicts_with = "format")]
    tier: bool,

    /// Save the diff overlay as PNG (a directory in batch mode)
    #[arg(short, long, value_name = "FILE")]
    diff: Option<PathBuf>,

    /// Minimum acceptable score (exit code 1 if below)
    ///
    /// Useful for CI pipelines to enforce a passing grade.
    /// Tier boundaries: 80 (high), 50 (medium)
    #[arg(long, value_name = "SCORE")]
    min_score: Option<f64>,

    /// Batch mode: compare matching files in two directories
    #[arg(long, short = 'b')]
    batch: bool,

    /// File extensions to include in batch mode (comma-separated)
    #[arg(long, default_value = "png,jpg,jpeg", value_delimiter = ',')]
    extensions: Vec<String>,

    /// TOML config file with `min_score` and a `[params]` table
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Noise floor (default: 0.005)
    ///
    /// Per-pixel differences below this add nothing to the total
    /// but still count toward the pixel total.
    #[arg(long, value_name = "DIFF")]
    noise_floor: Option<f64>,

    /// Visibility threshold for the diff overlay (default: 0.01)
    #[arg(long, value_name = "DIFF")]
    visibility_threshold: Option<f64>,

    /// Fraction of the hue wheel used by the diff overlay (default: 0.7)
    #[arg(long, value_name = "FRACTION")]
    hue_span: Option<f64>,

    /// Channel weights as r,g,b,a (default: 0.299,0.587,0.114,0.1)
    #[arg(long, value_name = "R,G,B,A", value_delimiter = ',')]
    weights: Option<Vec<f64>>,

    /// Quiet mode - only output the score number
    #[arg(long, short = 's', action = ArgAction::SetTrue)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Continue on errors in batch mode
    #[arg(long)]
    keep_going: bool,

    /// Show summary statistics in batch mode
    #[arg(long)]
    summary: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain text output with score
    Text,
    /// JSON output with all metrics
    Json,
    /// Include the score tier (with colors)
    Tier,
    /// Minimal - just the score number
    Score,
}

/// Resolved run settings: CLI flags layered over the config file.
struct Settings {
    params: DiffParams,
    min_score: Option<f64>,
}

#[derive(Serialize)]
struct JsonOutput {
    score: f64,
    tier: &'static str,
    candidate: String,
    target: String,
    candidate_size: [usize; 2],
    target_size: [usize; 2],
    diff_size: [usize; 2],
    visible_pixels: usize,
    params: DiffParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold_failed: Option<bool>,
}

#[derive(Serialize)]
struct BatchJsonOutput {
    results: Vec<JsonOutput>,
    summary: BatchSummary,
}

#[derive(Serialize)]
struct BatchSummary {
    total: usize,
    passed: usize,
    failed: usize,
    errors: usize,
    min_score: f64,
    max_score: f64,
    mean_score: f64,
}

/// One scored pair plus the input sizes.
struct Scored {
    result: ComparisonResult,
    candidate_size: (usize, usize),
    target_size: (usize, usize),
}

struct BatchEntry {
    candidate: PathBuf,
    target: PathBuf,
    outcome: Result<Scored>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    setup_colors(&cli);

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            report_error(&cli, &e);
            return ExitCode::from(2);
        }
    };

    if cli.batch || (cli.candidate.is_dir() && cli.target.is_dir()) {
        run_batch(&cli, &settings)
    } else {
        run_single(&cli, &settings)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn setup_colors(cli: &Cli) {
    match cli.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            // Disable colors if not a terminal
            if !io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn report_error(cli: &Cli, e: &anyhow::Error) {
    if !cli.quiet {
        eprintln!("{}: {:#}", "error".red().bold(), e);
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    let overrides = ParamOverrides {
        noise_floor: cli.noise_floor,
        visibility_threshold: cli.visibility_threshold,
        hue_span: cli.hue_span,
        weights: cli.weights.clone(),
    };
    let params = overrides.apply(file.params)?;
    debug!("effective params: {params:?}");

    Ok(Settings {
        params,
        min_score: cli.min_score.or(file.min_score),
    })
}

fn run_single(cli: &Cli, settings: &Settings) -> ExitCode {
    let scored = match score_pair(&cli.candidate, &cli.target, &settings.params) {
        Ok(scored) => scored,
        Err(e) => {
            report_error(cli, &e);
            return ExitCode::from(2);
        }
    };

    if let Some(diff_path) = &cli.diff {
        if let Err(e) = save_diff(&scored.result.diff_image, diff_path) {
            report_error(cli, &e);
            return ExitCode::from(2);
        }
        if !cli.quiet && get_format(cli) != OutputFormat::Json {
            eprintln!("Diff saved to: {}", diff_path.display());
        }
    }

    if let Err(e) = output_single_result(cli, settings, &scored) {
        report_error(cli, &e);
        return ExitCode::from(2);
    }

    if below_threshold(settings, scored.result.score) {
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn run_batch(cli: &Cli, settings: &Settings) -> ExitCode {
    for (label, dir) in [("candidate", &cli.candidate), ("target", &cli.target)] {
        if !dir.is_dir() {
            eprintln!(
                "{}: {label} path '{}' is not a directory",
                "error".red().bold(),
                dir.display()
            );
            return ExitCode::from(2);
        }
    }

    let pairs = match find_matching_files(&cli.candidate, &cli.target, &cli.extensions) {
        Ok(pairs) => pairs,
        Err(e) => {
            report_error(cli, &e);
            return ExitCode::from(2);
        }
    };

    if pairs.is_empty() {
        eprintln!(
            "{}: no matching image files found",
            "warning".yellow().bold()
        );
        return ExitCode::from(2);
    }

    if let Some(dir) = &cli.diff {
        if let Err(e) = fs::create_dir_all(dir)
            .with_context(|| format!("failed to create diff directory '{}'", dir.display()))
        {
            report_error(cli, &e);
            return ExitCode::from(2);
        }
    }

    let mut entries: Vec<BatchEntry> = Vec::new();
    let mut had_errors = false;
    let mut threshold_failed = false;

    for (candidate, target) in pairs {
        let outcome = score_pair(&candidate, &target, &settings.params).and_then(|scored| {
            if let Some(dir) = &cli.diff {
                save_diff(&scored.result.diff_image, &batch_diff_path(dir, &candidate))?;
            }
            Ok(scored)
        });

        match &outcome {
            Ok(scored) => {
                if below_threshold(settings, scored.result.score) {
                    threshold_failed = true;
                }
            }
            Err(e) => {
                had_errors = true;
                if !cli.keep_going {
                    eprintln!(
                        "{}: {}: {:#}",
                        "error".red().bold(),
                        candidate.display(),
                        e
                    );
                    return ExitCode::from(2);
                }
            }
        }

        entries.push(BatchEntry {
            candidate,
            target,
            outcome,
        });
    }

    if let Err(e) = output_batch_results(cli, settings, &entries) {
        report_error(cli, &e);
        return ExitCode::from(2);
    }

    if threshold_failed {
        ExitCode::from(1)
    } else if had_errors {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn below_threshold(settings: &Settings, score: f64) -> bool {
    settings.min_score.is_some_and(|min| score < min)
}

fn find_matching_files(
    candidate_dir: &Path,
    target_dir: &Path,
    extensions: &[String],
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

    let mut pairs = Vec::new();

    let entries = fs::read_dir(candidate_dir).with_context(|| {
        format!("failed to read directory '{}'", candidate_dir.display())
    })?;

    for entry in entries {
        let path = entry.context("failed to read directory entry")?.path();

        if !path.is_file() {
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !extensions.contains(&ext) {
            continue;
        }

        let Some(filename) = path.file_name() else {
            continue;
        };
        let target_path = target_dir.join(filename);

        if target_path.exists() {
            pairs.push((path, target_path));
        } else {
            debug!("no target for {}", path.display());
        }
    }

    pairs.sort();
    Ok(pairs)
}

fn batch_diff_path(dir: &Path, candidate: &Path) -> PathBuf {
    let stem = candidate
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    dir.join(format!("{stem}.diff.png"))
}

fn load_raster(path: &Path) -> Result<RasterBuffer> {
    let img = image::open(path)
        .with_context(|| format!("failed to load '{}'", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    info!("loaded {} ({width}x{height})", path.display());
    Ok(RasterBuffer::new(
        width as usize,
        height as usize,
        img.into_raw(),
    )?)
}

fn score_pair(candidate: &Path, target: &Path, params: &DiffParams) -> Result<Scored> {
    let candidate_img = load_raster(candidate)?;
    let target_img = load_raster(target)?;

    if candidate_img.dimensions() != target_img.dimensions() {
        info!(
            "size mismatch: {}x{} vs {}x{}, comparing over bounding box",
            candidate_img.width(),
            candidate_img.height(),
            target_img.width(),
            target_img.height()
        );
    }

    let result = compare_with_params(&candidate_img, &target_img, params)?;

    Ok(Scored {
        result,
        candidate_size: candidate_img.dimensions(),
        target_size: target_img.dimensions(),
    })
}

fn save_diff(diff: &RasterBuffer, path: &Path) -> Result<()> {
    let (width, height) = diff.dimensions();
    if diff.is_empty() {
        bail!("diff image is empty ({width}x{height}), nothing to save");
    }
    let img = image::RgbaImage::from_raw(
        u32::try_from(width).context("diff width exceeds u32")?,
        u32::try_from(height).context("diff height exceeds u32")?,
        diff.as_bytes().to_vec(),
    )
    .context("diff buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to save diff to '{}'", path.display()))?;
    info!("saved diff overlay to {}", path.display());
    Ok(())
}

fn get_format(cli: &Cli) -> OutputFormat {
    if cli.json {
        OutputFormat::Json
    } else if cli.tier {
        OutputFormat::Tier
    } else if cli.quiet {
        OutputFormat::Score
    } else {
        cli.format
    }
}

fn tier_color(tier: ScoreTier) -> colored::Color {
    use colored::Color;
    match tier {
        ScoreTier::High => Color::Green,
        ScoreTier::Medium => Color::Yellow,
        ScoreTier::Low => Color::Red,
    }
}

fn format_percent(score: f64) -> String {
    format!("{score:.2}%")
}

fn json_output(
    settings: &Settings,
    scored: &Scored,
    candidate: &Path,
    target: &Path,
) -> JsonOutput {
    let result = &scored.result;
    let (dw, dh) = result.diff_image.dimensions();
    JsonOutput {
        score: result.score,
        tier: result.tier().label(),
        candidate: candidate.display().to_string(),
        target: target.display().to_string(),
        candidate_size: [scored.candidate_size.0, scored.candidate_size.1],
        target_size: [scored.target_size.0, scored.target_size.1],
        diff_size: [dw, dh],
        visible_pixels: result.visible_pixels,
        params: settings.params.clone(),
        threshold_failed: settings.min_score.map(|min| result.score < min),
    }
}

fn output_single_result(cli: &Cli, settings: &Settings, scored: &Scored) -> Result<()> {
    let result = &scored.result;
    let tier = result.tier();
    let color = tier_color(tier);
    let score_str = format_percent(result.score);

    match get_format(cli) {
        OutputFormat::Score => {
            println!("{:.4}", result.score);
        }
        OutputFormat::Text => {
            match settings.min_score {
                Some(min) if result.score < min => println!(
                    "Similarity score: {} (below threshold {})",
                    score_str.color(color),
                    min
                ),
                _ => println!("Similarity score: {}", score_str.color(color)),
            }
        }
        OutputFormat::Tier => {
            println!(
                "Similarity score: {} ({})",
                score_str.color(color),
                tier.label().color(color).bold()
            );
            let (dw, dh) = result.diff_image.dimensions();
            println!(
                "Visible differences: {} of {} pixels",
                result.visible_pixels,
                dw * dh
            );

            if let Some(min) = settings.min_score {
                if result.score < min {
                    println!(
                        "{}",
                        format!("Threshold failed: {:.2} < {}", result.score, min)
                            .red()
                            .bold()
                    );
                } else {
                    println!(
                        "{}",
                        format!("Threshold passed: {:.2} >= {}", result.score, min).green()
                    );
                }
            }
        }
        OutputFormat::Json => {
            let output = json_output(settings, scored, &cli.candidate, &cli.target);
            let json =
                serde_json::to_string_pretty(&output).context("failed to serialize JSON")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn output_batch_results(cli: &Cli, settings: &Settings, entries: &[BatchEntry]) -> Result<()> {
    let format = get_format(cli);

    let mut scores: Vec<f64> = Vec::new();
    let mut passed = 0;
    let mut failed = 0;
    let mut errors = 0;

    for entry in entries {
        match &entry.outcome {
            Ok(scored) => {
                scores.push(scored.result.score);
                if below_threshold(settings, scored.result.score) {
                    failed += 1;
                } else {
                    passed += 1;
                }
            }
            Err(_) => errors += 1,
        }
    }

    let min_score = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    match format {
        OutputFormat::Json => {
            let results = entries
                .iter()
                .filter_map(|entry| {
                    let scored = entry.outcome.as_ref().ok()?;
                    Some(json_output(settings, scored, &entry.candidate, &entry.target))
                })
                .collect();

            let batch_output = BatchJsonOutput {
                results,
                summary: BatchSummary {
                    total: entries.len(),
                    passed,
                    failed,
                    errors,
                    min_score: if min_score.is_finite() { min_score } else { 0.0 },
                    max_score: if max_score.is_finite() { max_score } else { 0.0 },
                    mean_score,
                },
            };

            let json = serde_json::to_string_pretty(&batch_output)
                .context("failed to serialize JSON")?;
            println!("{json}");
        }
        OutputFormat::Score => {
            for entry in entries {
                if let Ok(scored) = &entry.outcome {
                    println!("{:.4}", scored.result.score);
                }
            }
        }
        OutputFormat::Text | OutputFormat::Tier => {
            let name_width = entries
                .iter()
                .map(|entry| entry.candidate.file_name().unwrap_or_default().len())
                .max()
                .unwrap_or(20);

            for entry in entries {
                let filename = entry
                    .candidate
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("?");

                match &entry.outcome {
                    Ok(scored) => {
                        let tier = scored.result.tier();
                        let color = tier_color(tier);
                        let score_str = format_percent(scored.result.score);

                        let status = if settings.min_score.is_some() {
                            if below_threshold(settings, scored.result.score) {
                                "FAIL".red().bold()
                            } else {
                                "PASS".green().bold()
                            }
                        } else {
                            tier.label().color(color).bold()
                        };

                        println!(
                            "{:width$}  {:>8}  {}",
                            filename,
                            score_str.color(color),
                            status,
                            width = name_width
                        );
                    }
                    Err(e) => {
                        println!(
                            "{:width$}  {:>8}  {}",
                            filename,
                            "-".dimmed(),
                            format!("ERROR: {e:#}").red(),
                            width = name_width
                        );
                    }
                }
            }

            if cli.summary || entries.len() > 1 {
                println!();
                println!("{}", "Summary:".bold());
                println!(
                    "  Total: {}  Passed: {}  Failed: {}  Errors: {}",
                    entries.len(),
                    passed.to_string().green(),
                    if failed > 0 {
                        failed.to_string().red()
                    } else {
                        failed.to_string().normal()
                    },
                    if errors > 0 {
                        errors.to_string().red()
                    } else {
                        errors.to_string().normal()
                    }
                );
                if !scores.is_empty() {
                    println!(
                        "  Scores: min={:.2}  max={:.2}  mean={:.2}",
                        min_score, max_score, mean_score
                    );
                }
            }
        }
    }

    let _ = io::stdout().flush();

    Ok(())
}
