//! Confidence-threshold calibration over a corpus of recorded predictions.
//!
//! Each fixture case stores the raw model output of both passes together with the
//! alignment set the highlighting expects, so thresholds can be compared without a model.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::text::Utf16Text;
use crate::alignment::{align_from_predictions, assert_well_formed, pass_is_asked, Side};
use crate::error::AlignmentError;
use crate::pipeline::traits::Tokenizer;
use crate::types::{Alignment, Prediction, Token};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCase {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Overrides the FROM tokenizer when present.
    #[serde(default)]
    pub from_tokens: Option<Vec<Token>>,
    /// Overrides the TO tokenizer when present.
    #[serde(default)]
    pub to_tokens: Option<Vec<Token>>,
    pub forward: Vec<Prediction>,
    pub reverse: Vec<Prediction>,
    pub expected: Vec<Alignment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub thresholds: Vec<ThresholdReport>,
    pub best_min_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub fixture_path: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub min_confidence: f64,
    pub matched: usize,
    pub mismatched: usize,
    pub match_ratio: f64,
    pub mismatched_ids: Vec<String>,
}

pub fn load_fixture_cases(path: &Path) -> Result<Vec<FixtureCase>, AlignmentError> {
    let data =
        std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read fixture cases", e))?;
    serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse fixture cases", e))
}

/// Replays one case through snapping, filtering, combination and simplification.
pub fn replay_case(
    case: &FixtureCase,
    from_tokenizer: &dyn Tokenizer,
    to_tokenizer: &dyn Tokenizer,
    min_confidence: f64,
) -> Result<Vec<Alignment>, AlignmentError> {
    let from_text = Utf16Text::new(&case.from)?;
    let to_text = Utf16Text::new(&case.to)?;
    let from_tokens = case
        .from_tokens
        .clone()
        .unwrap_or_else(|| from_tokenizer.tokenize(&case.from));
    let to_tokens = case
        .to_tokens
        .clone()
        .unwrap_or_else(|| to_tokenizer.tokenize(&case.to));
    assert_well_formed(&from_tokens, &from_text);
    assert_well_formed(&to_tokens, &to_text);

    let forward_questions = question_count(&from_tokens, &to_text);
    let reverse_questions = question_count(&to_tokens, &from_text);
    if case.forward.len() != forward_questions || case.reverse.len() != reverse_questions {
        return Err(AlignmentError::invalid_input(format!(
            "case '{}': {} forward / {} reverse predictions for {} forward / {} reverse questions",
            case.id,
            case.forward.len(),
            case.reverse.len(),
            forward_questions,
            reverse_questions
        )));
    }

    Ok(align_from_predictions(
        Side {
            text: &from_text,
            tokens: &from_tokens,
        },
        Side {
            text: &to_text,
            tokens: &to_tokens,
        },
        &case.forward,
        &case.reverse,
        min_confidence,
    ))
}

fn question_count(pivots: &[Token], context: &Utf16Text<'_>) -> usize {
    if pass_is_asked(pivots, context) {
        pivots.len()
    } else {
        0
    }
}

pub fn evaluate_threshold(
    cases: &[FixtureCase],
    from_tokenizer: &dyn Tokenizer,
    to_tokenizer: &dyn Tokenizer,
    min_confidence: f64,
) -> Result<ThresholdReport, AlignmentError> {
    let mut mismatched_ids = Vec::new();
    for case in cases {
        let actual = replay_case(case, from_tokenizer, to_tokenizer, min_confidence)?;
        if actual != case.expected {
            tracing::debug!(
                case = case.id.as_str(),
                min_confidence,
                expected = ?case.expected,
                ?actual,
                "report: case mismatch"
            );
            mismatched_ids.push(case.id.clone());
        }
    }
    let matched = cases.len() - mismatched_ids.len();
    Ok(ThresholdReport {
        min_confidence,
        matched,
        mismatched: mismatched_ids.len(),
        match_ratio: if cases.is_empty() {
            0.0
        } else {
            matched as f64 / cases.len() as f64
        },
        mismatched_ids,
    })
}

/// Threshold with the most exact matches; ties go to the earliest candidate.
pub fn best_min_confidence(reports: &[ThresholdReport]) -> Option<f64> {
    reports
        .iter()
        .fold(None::<&ThresholdReport>, |best, report| match best {
            Some(b) if b.matched >= report.matched => Some(b),
            _ => Some(report),
        })
        .map(|report| report.min_confidence)
}

pub fn build_report(
    fixture_path: &Path,
    case_count: usize,
    thresholds: Vec<ThresholdReport>,
) -> Report {
    Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: chrono::Utc::now().to_rfc3339(),
            fixture_path: fixture_path.display().to_string(),
            case_count,
        },
        best_min_confidence: best_min_confidence(&thresholds),
        thresholds,
    }
}

/// Writes `report` as pretty JSON, creating parent directories as needed.
pub fn write_report(path: &Path, report: &Report) -> Result<(), AlignmentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AlignmentError::io("create report directory", e))?;
    }
    let file = File::create(path).map_err(|e| AlignmentError::io("create report file", e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AlignmentError::json("serialize report", e))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| AlignmentError::io("write report file", e))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
