use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::GrayImage;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::setup::TesseractPaths;

/// Failure of a single recognition call.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Tesseract not found: {0}")]
    NotFound(String),
    #[error("failed to write temporary image: {0}")]
    ImageWrite(#[from] image::ImageError),
    #[error("failed to run Tesseract: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Tesseract failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("recognition for {0} panicked")]
    Panicked(String),
}

/// A text recognizer that can be run under different tuning strings.
///
/// Each call is independent; a failure only affects that call.
pub trait RecognitionEngine: Send + Sync {
    fn recognize(&self, img: &GrayImage, params: &str) -> Result<String, OcrError>;
}

/// Runs the `tesseract` command line tool and reads plain text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
}

impl TesseractCli {
    pub fn new(paths: TesseractPaths, language: impl Into<String>) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            language: language.into(),
        }
    }

    /// Builds the argument list: input, `stdout`, tessdata/language, then
    /// the tuning string split on whitespace.
    fn build_args(&self, input: &Path, params: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![input.into(), "stdout".into()];
        if let Some(tessdata) = &self.tessdata {
            args.push("--tessdata-dir".into());
            args.push(tessdata.into());
        }
        args.push("-l".into());
        args.push(self.language.as_str().into());
        args.extend(params.split_whitespace().map(OsString::from));
        args
    }
}

impl RecognitionEngine for TesseractCli {
    fn recognize(&self, img: &GrayImage, params: &str) -> Result<String, OcrError> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        let args = self.build_args(temp_input.path(), params);
        debug!("Running {} {:?}", self.executable.display(), args);

        let output = Command::new(&self.executable).args(&args).output()?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(tessdata: Option<&str>) -> TesseractCli {
        TesseractCli::new(
            TesseractPaths {
                executable: PathBuf::from("tesseract"),
                tessdata: tessdata.map(PathBuf::from),
            },
            "eng",
        )
    }

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_build_args_passes_params_verbatim() {
        let args = cli(None).build_args(
            Path::new("in.png"),
            "--oem 3 --psm 6 -c preserve_interword_spaces=1",
        );

        assert_eq!(
            args_as_strings(&args),
            vec![
                "in.png", "stdout", "-l", "eng", "--oem", "3", "--psm", "6", "-c",
                "preserve_interword_spaces=1",
            ]
        );
    }

    #[test]
    fn test_build_args_with_tessdata() {
        let args = cli(Some("/opt/tessdata")).build_args(Path::new("in.png"), "--oem 3 --psm 3");

        assert_eq!(
            args_as_strings(&args),
            vec![
                "in.png", "stdout", "--tessdata-dir", "/opt/tessdata", "-l", "eng", "--oem", "3",
                "--psm", "3",
            ]
        );
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let engine = TesseractCli::new(
            TesseractPaths {
                executable: PathBuf::from("/nonexistent/definitely-not-tesseract"),
                tessdata: None,
            },
            "eng",
        );
        let img = GrayImage::new(4, 4);

        let result = engine.recognize(&img, "--oem 3 --psm 6");

        assert!(matches!(result, Err(OcrError::Spawn(_))));
    }
}
