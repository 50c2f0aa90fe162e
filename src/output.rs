//! Persistence of the selected transcription.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use image::DynamicImage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::fmt::Display;
use tracing::info;

use crate::ocr::clean::trim_blank;
use crate::ocr::{self, ExtractOptions, RecognitionEngine, SelectionResult};

/// Output file name for a run completed at `completed_at`:
/// `extracted_text_<YYYYMMDD_HHMMSS>.txt`
pub fn output_file_name<Tz: TimeZone>(completed_at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("extracted_text_{}.txt", completed_at.format("%Y%m%d_%H%M%S"))
}

/// Writes the text as UTF-8 into `dir`, creating the directory if needed.
pub fn save_result<Tz: TimeZone>(dir: &Path, text: &str, completed_at: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz::Offset: Display,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(output_file_name(completed_at));
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Runs the pipeline and, when `save_dir` is set, writes the winning text.
///
/// Engine failures never abort the run: the file is written even when every
/// configuration failed and the text is empty.
pub fn extract_and_save(
    image: DynamicImage,
    engine: &dyn RecognitionEngine,
    options: &ExtractOptions,
    save_dir: Option<&Path>,
) -> Result<(SelectionResult, Option<PathBuf>)> {
    let result = ocr::extract_code(image, engine, options)?;

    let saved_to = match save_dir {
        Some(dir) => {
            let path = save_result(dir, &result.text, &Local::now())?;
            info!("Saved as {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok((result, saved_to))
}

/// Summary statistics of the extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub lines: usize,
    pub non_empty_lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            lines: text.lines().count(),
            non_empty_lines: text.lines().filter(|l| !trim_blank(l).is_empty()).count(),
        }
    }
}
