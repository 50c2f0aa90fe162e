pub mod clean;
pub mod engine;
pub mod polarity;
pub mod preprocess;
pub mod recognize;
pub mod score;
pub mod select;
pub mod setup;

pub use clean::{DEFAULT_REMOVE_CHARS, TextNormalizer};
pub use engine::{RecognitionEngine, TesseractCli};
pub use polarity::{DEFAULT_DARK_THRESHOLD, load_oriented, normalize_polarity};
pub use preprocess::binarize;
pub use recognize::recognize_all;
pub use score::score_code;
pub use select::{Candidate, SelectionResult};
pub use setup::tesseract_or_default;

use anyhow::{Result, anyhow};
use image::DynamicImage;
use tracing::info;

/// Tunables for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub remove_chars: Vec<char>,
    pub dark_threshold: f64,
    pub parallel: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            remove_chars: DEFAULT_REMOVE_CHARS.to_vec(),
            dark_threshold: DEFAULT_DARK_THRESHOLD,
            parallel: false,
        }
    }
}

/// High-level function: oriented screenshot → best code transcription.
///
/// Normalizes polarity, binarizes, recognizes under every configuration,
/// cleans and scores each candidate, then selects the winner.
pub fn extract_code(
    img: DynamicImage,
    engine: &dyn RecognitionEngine,
    options: &ExtractOptions,
) -> Result<SelectionResult> {
    let normalizer = TextNormalizer::new(&options.remove_chars)?;

    let polarity = normalize_polarity(img, options.dark_threshold);
    let binary = binarize(&polarity.image);
    info!("Binarized {}x{} image", binary.width(), binary.height());

    let candidates: Vec<Candidate> = recognize_all(engine, &binary, options.parallel)
        .into_iter()
        .map(|recognition| {
            let raw_text = recognition.raw_text().to_string();
            let cleaned_text = normalizer.clean(&raw_text);
            let score = score_code(&cleaned_text);
            info!("{}: score {:.1}", recognition.configuration, score);
            Candidate {
                configuration: recognition.configuration,
                raw_text,
                cleaned_text,
                score,
                error: recognition.result.err().map(|e| e.to_string()),
            }
        })
        .collect();

    let result = select::select(candidates, polarity.brightness, polarity.dark_mode)
        .ok_or_else(|| anyhow!("No OCR configurations were run"))?;

    info!(
        "Best result: {} (score {:.1})",
        result.winner,
        result.winning_score()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::OcrError;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use recognize::OcrConfiguration;
    use std::sync::Mutex;

    /// Engine returning fixed text per configuration and keeping the images it saw.
    struct FakeEngine {
        outputs: [Result<&'static str, &'static str>; 3],
        seen: Mutex<Vec<GrayImage>>,
    }

    impl FakeEngine {
        fn new(outputs: [Result<&'static str, &'static str>; 3]) -> Self {
            Self {
                outputs,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecognitionEngine for FakeEngine {
        fn recognize(&self, img: &GrayImage, params: &str) -> Result<String, OcrError> {
            self.seen.lock().unwrap().push(img.clone());
            let idx = OcrConfiguration::ALL
                .iter()
                .position(|c| c.engine_parameters() == params)
                .expect("known parameters");
            match self.outputs[idx] {
                Ok(text) => Ok(text.to_string()),
                Err(stderr) => Err(OcrError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: stderr.to_string(),
                }),
            }
        }
    }

    /// Dark screenshot: mean brightness 40 with a brighter "text" stripe.
    fn dark_screenshot() -> DynamicImage {
        let img = RgbImage::from_fn(10, 10, |_, y| {
            if y == 5 { Rgb([220, 220, 220]) } else { Rgb([20, 20, 20]) }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_dark_screenshot_end_to_end() {
        let image = dark_screenshot();
        assert!((polarity::mean_brightness(&image) - 40.0).abs() < 1e-9);

        let engine = FakeEngine::new([
            Ok("foo bar"),
            Ok("function foo() {}\n"),
            Ok("function foo"),
        ]);

        let result = extract_code(image, &engine, &ExtractOptions::default()).unwrap();

        assert!(result.dark_mode);
        assert_eq!(result.winner, OcrConfiguration::SourceCode);
        assert_eq!(result.text, "function foo() {}\n");
        assert_eq!(result.candidates[1].score, 9.0);
        assert_eq!(result.candidates[0].score, 0.0);
        assert_eq!(result.candidates[2].score, 7.0);

        // Inverted then binarized: the text stripe is black on white
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].get_pixel(0, 5), &Luma([0]));
        assert_eq!(seen[0].get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn test_winner_text_is_a_cleaned_candidate() {
        let engine = FakeEngine::new([
            Ok("let  a = 1; | let b = 2;"),
            Ok("x"),
            Err("crashed"),
        ]);

        let result = extract_code(dark_screenshot(), &engine, &ExtractOptions::default()).unwrap();

        assert_eq!(result.winner, OcrConfiguration::Standard);
        assert_eq!(result.text, "let a = 1; let b = 2;");
        assert!(result.candidates.iter().any(|c| c.cleaned_text == result.text));
        assert_eq!(result.candidates[2].raw_text, "");
        assert!(result.candidates[2].error.is_some());
    }

    #[test]
    fn test_all_failures_degrade_to_empty_text() {
        let engine = FakeEngine::new([Err("a"), Err("b"), Err("c")]);
        let light = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([250])));

        let result = extract_code(light, &engine, &ExtractOptions::default()).unwrap();

        assert!(!result.dark_mode);
        assert_eq!(result.winner, OcrConfiguration::Standard);
        assert_eq!(result.text, "");
        assert!(result.scores.iter().all(|&(_, score)| score == 0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let outputs = [
            Ok("const a = 1;"),
            Ok("const a = 1;"),
            Ok("window.document"),
        ];
        let sequential = extract_code(
            dark_screenshot(),
            &FakeEngine::new(outputs),
            &ExtractOptions::default(),
        )
        .unwrap();
        let parallel = extract_code(
            dark_screenshot(),
            &FakeEngine::new(outputs),
            &ExtractOptions {
                parallel: true,
                ..ExtractOptions::default()
            },
        )
        .unwrap();

        assert_eq!(sequential.winner, parallel.winner);
        assert_eq!(sequential.text, parallel.text);
        assert_eq!(sequential.scores, parallel.scores);
    }
}
