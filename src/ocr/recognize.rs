//! Runs the recognition engine under each fixed configuration.

use std::fmt;
use std::thread;

use image::GrayImage;
use serde::Serialize;
use tracing::{info, warn};

use super::engine::{OcrError, RecognitionEngine};

/// Engine tuning variants, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OcrConfiguration {
    /// Single uniform block of text
    Standard,
    /// Single uniform block, inter-word spacing preserved for indentation
    SourceCode,
    /// Fully automatic page segmentation
    SingleBlock,
}

impl OcrConfiguration {
    /// Every configuration, in the order used to break score ties.
    pub const ALL: [OcrConfiguration; 3] = [
        OcrConfiguration::Standard,
        OcrConfiguration::SourceCode,
        OcrConfiguration::SingleBlock,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OcrConfiguration::Standard => "Standard",
            OcrConfiguration::SourceCode => "SourceCode",
            OcrConfiguration::SingleBlock => "SingleBlock",
        }
    }

    /// Tuning string handed verbatim to the engine.
    pub fn engine_parameters(self) -> &'static str {
        match self {
            OcrConfiguration::Standard => "--oem 3 --psm 6",
            OcrConfiguration::SourceCode => "--oem 3 --psm 6 -c preserve_interword_spaces=1",
            OcrConfiguration::SingleBlock => "--oem 3 --psm 3",
        }
    }
}

impl fmt::Display for OcrConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one engine invocation.
#[derive(Debug)]
pub struct Recognition {
    pub configuration: OcrConfiguration,
    pub result: Result<String, OcrError>,
}

impl Recognition {
    /// Recognized text, or empty when the invocation failed.
    pub fn raw_text(&self) -> &str {
        self.result.as_deref().unwrap_or("")
    }
}

fn run_one(
    engine: &dyn RecognitionEngine,
    img: &GrayImage,
    configuration: OcrConfiguration,
) -> Recognition {
    let result = engine.recognize(img, configuration.engine_parameters());
    match &result {
        Ok(text) => info!("{}: {} characters recognized", configuration, text.chars().count()),
        Err(e) => warn!("{}: recognition failed: {}", configuration, e),
    }
    Recognition {
        configuration,
        result,
    }
}

/// Recognizes `img` once per configuration, in definition order.
///
/// A failed invocation is recorded and the remaining configurations still
/// run. With `parallel`, each configuration runs on its own scoped thread;
/// the returned order is the definition order regardless of completion order.
pub fn recognize_all(
    engine: &dyn RecognitionEngine,
    img: &GrayImage,
    parallel: bool,
) -> Vec<Recognition> {
    if !parallel {
        return OcrConfiguration::ALL
            .iter()
            .map(|&configuration| run_one(engine, img, configuration))
            .collect();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = OcrConfiguration::ALL
            .iter()
            .map(|&configuration| {
                (
                    configuration,
                    scope.spawn(move || run_one(engine, img, configuration)),
                )
            })
            .collect();

        handles
            .into_iter()
            .map(|(configuration, handle)| {
                handle.join().unwrap_or_else(|_| {
                    warn!("{}: recognition thread panicked", configuration);
                    Recognition {
                        configuration,
                        result: Err(OcrError::Panicked(configuration.to_string())),
                    }
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns canned text per tuning string and records calls.
    struct ScriptedEngine {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
        panic_on: Option<&'static str>,
    }

    impl ScriptedEngine {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
                panic_on: None,
            }
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn recognize(&self, _img: &GrayImage, params: &str) -> Result<String, OcrError> {
            self.calls.lock().unwrap().push(params.to_string());
            if self.panic_on == Some(params) {
                panic!("engine crashed");
            }
            if self.fail_on == Some(params) {
                return Err(OcrError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: "bad image".to_string(),
                });
            }
            Ok(format!("text for {}", params))
        }
    }

    #[test]
    fn test_configuration_order_and_parameters() {
        let names: Vec<_> = OcrConfiguration::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Standard", "SourceCode", "SingleBlock"]);

        assert_eq!(OcrConfiguration::Standard.engine_parameters(), "--oem 3 --psm 6");
        assert_eq!(
            OcrConfiguration::SourceCode.engine_parameters(),
            "--oem 3 --psm 6 -c preserve_interword_spaces=1"
        );
        assert_eq!(OcrConfiguration::SingleBlock.engine_parameters(), "--oem 3 --psm 3");
    }

    #[test]
    fn test_sequential_runs_every_configuration_in_order() {
        let engine = ScriptedEngine::new();
        let img = GrayImage::new(2, 2);

        let results = recognize_all(&engine, &img, false);

        assert_eq!(results.len(), 3);
        let calls = engine.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            OcrConfiguration::ALL
                .iter()
                .map(|c| c.engine_parameters().to_string())
                .collect::<Vec<_>>()
        );
        assert_eq!(results[1].configuration, OcrConfiguration::SourceCode);
        assert_eq!(
            results[1].raw_text(),
            "text for --oem 3 --psm 6 -c preserve_interword_spaces=1"
        );
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut engine = ScriptedEngine::new();
        engine.fail_on = Some("--oem 3 --psm 6");
        let img = GrayImage::new(2, 2);

        let results = recognize_all(&engine, &img, false);

        assert_eq!(results.len(), 3);
        assert!(results[0].result.is_err());
        assert_eq!(results[0].raw_text(), "");
        assert!(results[1].result.is_ok());
        assert!(results[2].result.is_ok());
    }

    #[test]
    fn test_parallel_keeps_definition_order() {
        let engine = ScriptedEngine::new();
        let img = GrayImage::new(2, 2);

        let results = recognize_all(&engine, &img, true);

        let order: Vec<_> = results.iter().map(|r| r.configuration).collect();
        assert_eq!(order, OcrConfiguration::ALL.to_vec());
        assert_eq!(engine.calls.lock().unwrap().len(), 3);
        assert_eq!(results[2].raw_text(), "text for --oem 3 --psm 3");
    }

    #[test]
    fn test_parallel_panic_becomes_empty_text() {
        let mut engine = ScriptedEngine::new();
        engine.panic_on = Some("--oem 3 --psm 3");
        let img = GrayImage::new(2, 2);

        let results = recognize_all(&engine, &img, true);

        assert!(matches!(results[2].result, Err(OcrError::Panicked(_))));
        assert_eq!(results[2].raw_text(), "");
        assert!(results[0].result.is_ok());
    }
}
