use serde::Serialize;

use super::recognize::OcrConfiguration;

/// One configuration's full processing result.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub configuration: OcrConfiguration,
    pub raw_text: String,
    pub cleaned_text: String,
    pub score: f64,
    /// Engine failure message, when the invocation failed
    pub error: Option<String>,
}

/// Winning candidate plus the full table for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResult {
    pub winner: OcrConfiguration,
    pub text: String,
    pub brightness: f64,
    pub dark_mode: bool,
    /// Per-configuration scores in definition order
    pub scores: Vec<(OcrConfiguration, f64)>,
    pub candidates: Vec<Candidate>,
}

impl SelectionResult {
    pub fn winning_score(&self) -> f64 {
        self.candidates
            .iter()
            .find(|c| c.configuration == self.winner)
            .map_or(0.0, |c| c.score)
    }
}

/// Index of the highest-scoring candidate.
///
/// Scans left to right and only replaces the current best on a strictly
/// greater score, so ties go to the earliest candidate.
pub fn best_index(candidates: &[Candidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        match best {
            Some((_, score)) if candidate.score <= score => {}
            _ => best = Some((idx, candidate.score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Picks the winner. Returns `None` only for an empty candidate list.
pub fn select(
    candidates: Vec<Candidate>,
    brightness: f64,
    dark_mode: bool,
) -> Option<SelectionResult> {
    let idx = best_index(&candidates)?;
    let winner = &candidates[idx];
    let scores = candidates.iter().map(|c| (c.configuration, c.score)).collect();

    Some(SelectionResult {
        winner: winner.configuration,
        text: winner.cleaned_text.clone(),
        brightness,
        dark_mode,
        scores,
        candidates,
    })
}
