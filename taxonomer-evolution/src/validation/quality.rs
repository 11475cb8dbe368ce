//! Transition-level quality score

use crate::changes::{ChangeRecord, Status};

/// `(valid + 0.5 * warning) / total`, 1.0 for a transition with no changes
///
/// Normalised by the number of changes only, so the score reads the same
/// for ten routine edits and for a mass reorganisation.
pub fn quality_score(records: &[ChangeRecord]) -> f64 {
    if records.is_empty() {
        return 1.0;
    }
    let (valid, warning) = records.iter().fold((0usize, 0usize), |(v, w), r| match r.status {
        Status::Valid => (v + 1, w),
        Status::Warning => (v, w + 1),
        Status::Error => (v, w),
    });
    (valid as f64 + 0.5 * warning as f64) / records.len() as f64
}
