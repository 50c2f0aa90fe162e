//! Code Screenshot OCR
//!
//! Extracts source code text from screenshots of code editors. Dark-theme
//! screenshots are detected and inverted before recognition, Tesseract runs
//! under several configurations, and the most code-like result is kept.

mod config;
mod ocr;
mod output;
mod paths;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::ocr::{SelectionResult, TesseractCli};
use crate::output::TextStats;

/// Extracts code text from an editor screenshot
#[derive(Parser, Debug)]
#[command(name = "codeshot")]
#[command(about = "Extracts source code text from editor screenshots, including dark themes")]
struct Args {
    /// Screenshot to read
    image: PathBuf,

    /// Path to config.json (defaults to next to the executable, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving extracted_text_<timestamp>.txt
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Tesseract language code
    #[arg(long)]
    lang: Option<String>,

    /// Characters stripped from the recognized text (default "|:")
    #[arg(long)]
    remove_chars: Option<String>,

    /// Run the OCR configurations concurrently
    #[arg(long)]
    parallel: bool,

    /// Print the full result as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Do not write the result file
    #[arg(long)]
    no_save: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a SelectionResult,
    stats: TextStats,
    saved_to: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = config::load_config(args.config.as_deref());
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(lang) = args.lang {
        config.language = lang;
    }
    if let Some(chars) = args.remove_chars {
        config.remove_chars = chars.chars().collect();
    }
    config.parallel |= args.parallel;

    let image = ocr::load_oriented(&args.image)?;

    let engine = TesseractCli::new(ocr::tesseract_or_default(&config), config.language.clone());
    let save_dir = (!args.no_save).then_some(config.output_dir.as_path());
    let (result, saved_to) =
        output::extract_and_save(image, &engine, &config.extract_options(), save_dir)?;
    let stats = TextStats::of(&result.text);

    if args.json {
        let report = JsonReport {
            result: &result,
            stats,
            saved_to,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&result, stats, saved_to.as_deref());
    }

    Ok(())
}

fn print_report(result: &SelectionResult, stats: TextStats, saved_to: Option<&std::path::Path>) {
    let rule = "=".repeat(70);

    println!("Average brightness: {:.1}", result.brightness);
    if result.dark_mode {
        println!("Detected dark mode (dark background, light text); colors inverted");
    } else {
        println!("Detected light mode (light background, dark text)");
    }

    println!();
    for candidate in &result.candidates {
        match &candidate.error {
            Some(e) => println!("  {}: error - {}", candidate.configuration, e),
            None => println!(
                "  {}: {} characters, score {:.1}",
                candidate.configuration,
                candidate.cleaned_text.chars().count(),
                candidate.score
            ),
        }
    }
    println!(
        "Best result: {} (score {:.1})",
        result.winner,
        result.winning_score()
    );

    println!();
    println!("{}", rule);
    println!("EXTRACTED TEXT");
    println!("{}", rule);
    println!("{}", result.text);
    println!("{}", rule);

    if let Some(path) = saved_to {
        println!("Saved as: {}", path.display());
    }

    println!("Statistics:");
    println!("  - Total characters: {}", stats.characters);
    println!("  - Total lines: {}", stats.lines);
    println!("  - Non-empty lines: {}", stats.non_empty_lines);
}
