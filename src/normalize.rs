//! Canonical score vectors for the simple (radio / checkbox) choice editor.
//!
//! In single selection normal form the best choice scores 1 and every other
//! choice 0. In multiple selection normal form the correct choices share a
//! score of 1 in hundredths, the last one absorbing the rounding residual,
//! and every other choice scores -1.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Multiple,
}

impl SelectionMode {
    pub fn from_multiple_selections(multiple_selections: bool) -> Self {
        if multiple_selections { SelectionMode::Multiple } else { SelectionMode::Single }
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(SelectionMode::Single),
            "multiple" => Ok(SelectionMode::Multiple),
            _ => Err(format!("Unknown selection mode: {}", s)),
        }
    }
}

/// Score given to incorrect choices in multiple selection normal form.
pub const INCORRECT_SCORE: f64 = -1.0;

pub fn normalize(scores: &[f64], mode: SelectionMode) -> Vec<f64> {
    match mode {
        SelectionMode::Single => single_selection(scores),
        SelectionMode::Multiple => multiple_selection(scores),
    }
}

pub fn is_in_normal_form(scores: &[f64], mode: SelectionMode) -> bool {
    normalize(scores, mode) == scores
}

fn single_selection(scores: &[f64]) -> Vec<f64> {
    let best = scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &s)| match best {
            Some((_, top)) if s <= top || s.is_nan() => best,
            _ => Some((i, s)),
        });
    (0..scores.len())
        .map(|i| if best.map(|(b, _)| b) == Some(i) { 1.0 } else { 0.0 })
        .collect()
}

fn multiple_selection(scores: &[f64]) -> Vec<f64> {
    let positive = scores.iter().filter(|&&s| s > 0.0).count();
    if positive == 0 {
        return vec![0.0; scores.len()];
    }

    // Hundredths, refined so that every correct choice stays above zero.
    let mut scale = 100.0;
    while scale < positive as f64 {
        scale *= 10.0;
    }
    let common = (scale / positive as f64).floor() / scale;
    let last = (scale + 0.5 - scale * common * (positive - 1) as f64).floor() / scale;

    let last_index = scores.iter().rposition(|&s| s > 0.0);
    scores
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            if s <= 0.0 || s.is_nan() {
                INCORRECT_SCORE
            } else if Some(i) == last_index {
                last
            } else {
                common
            }
        })
        .collect()
}
