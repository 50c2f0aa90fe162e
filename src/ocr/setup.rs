use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use super::engine::OcrError;
use crate::config::AppConfig;
use crate::paths;

/// Common install locations checked when Tesseract is not on PATH.
const COMMON_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

const SYSTEM_TESSDATA_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

pub struct TesseractPaths {
    pub executable: PathBuf,
    /// `None` lets Tesseract fall back to its compiled-in data directory
    pub tessdata: Option<PathBuf>,
}

fn executable_name() -> &'static str {
    if cfg!(windows) { "tesseract.exe" } else { "tesseract" }
}

/// Locates Tesseract and its language data. Nothing is downloaded.
pub fn ensure_tesseract(config: &AppConfig) -> Result<TesseractPaths, OcrError> {
    let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
    let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref(), &config.language);

    match tesseract_version(&executable) {
        Some(version) => info!("Tesseract found at {} ({})", executable.display(), version),
        None => warn!(
            "Tesseract at {} did not report a version",
            executable.display()
        ),
    }

    match &tessdata {
        Some(dir) => info!("Using tessdata at {}", dir.display()),
        None => info!("Using Tesseract's default tessdata location"),
    }

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Like [`ensure_tesseract`], but a failed lookup falls back to a bare
/// `tesseract` command so the run still produces a (possibly empty) result.
pub fn tesseract_or_default(config: &AppConfig) -> TesseractPaths {
    ensure_tesseract(config).unwrap_or_else(|e| {
        warn!("Tesseract not found ({}); trying `tesseract` on PATH", e);
        TesseractPaths {
            executable: PathBuf::from(executable_name()),
            tessdata: find_tessdata_dir(config.tessdata_dir.as_deref(), &config.language),
        }
    })
}

/// Finds the Tesseract executable: configured path, local dir, PATH, then common paths.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf, OcrError> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(OcrError::NotFound(format!(
            "configured path {} does not exist",
            path.display()
        )));
    }

    let local_exe = paths::get_tesseract_dir().join(executable_name());
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if tesseract_version(Path::new("tesseract")).is_some() {
        return Ok(PathBuf::from("tesseract"));
    }

    for path in COMMON_PATHS {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(OcrError::NotFound(
        "install Tesseract-OCR or set tesseract_path in config.json".to_string(),
    ))
}

/// Finds a tessdata directory containing `<language>.traineddata`.
pub fn find_tessdata_dir(configured: Option<&Path>, language: &str) -> Option<PathBuf> {
    if let Some(dir) = configured {
        return Some(dir.to_path_buf());
    }

    let traineddata = format!("{}.traineddata", language);

    let local_tessdata = paths::get_tesseract_dir().join("tessdata");
    if local_tessdata.join(&traineddata).exists() {
        return Some(local_tessdata);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if p.join(&traineddata).exists() {
            return Some(p);
        }
        let p = p.join("tessdata");
        if p.join(&traineddata).exists() {
            return Some(p);
        }
    }

    SYSTEM_TESSDATA_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.join(&traineddata).exists())
}

/// Returns the first line of `tesseract --version`, or `None` if it cannot be run.
pub fn tesseract_version(executable: &Path) -> Option<String> {
    let output = Command::new(executable).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    // Older releases print the banner on stderr
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
