//! Elbow selection over an inertia curve.

use crate::MathError;

/// Discrete curvature estimate of an inertia curve.
///
/// Computes `v[i+2] - 2*v[i+2] + v[i]` for `i = 0..len-2`. This is not the
/// central second difference `v[i] - 2*v[i+1] + v[i+2]`; the form is kept
/// so that existing elbow choices are reproduced exactly.
#[must_use]
pub fn second_differences(values: &[f64]) -> Vec<f64> {
    values.windows(3).map(|w| w[2] - 2.0 * w[2] + w[0]).collect()
}

/// Pick the elbow cluster count from a sweep of `(k, inertia)` results.
///
/// `candidates` and `inertias` are parallel slices in ascending `k` order.
/// The count at position `argmax(second_differences) + 1` is returned; the
/// first maximum wins ties. With fewer than three candidates the curve has
/// no curvature estimate and the largest candidate is returned.
///
/// # Errors
/// Returns an error if the slices are empty or differ in length.
pub fn select_elbow(candidates: &[usize], inertias: &[f64]) -> Result<usize, MathError> {
    if candidates.len() != inertias.len() {
        return Err(MathError::DimensionMismatch {
            expected: candidates.len(),
            actual: inertias.len(),
        });
    }
    let Some(&largest) = candidates.last() else {
        return Err(MathError::EmptyData);
    };
    if candidates.len() < 3 {
        return Ok(largest);
    }

    let diffs = second_differences(inertias);
    let mut best = 0;
    for (i, d) in diffs.iter().enumerate() {
        if *d > diffs[best] {
            best = i;
        }
    }
    Ok(candidates[best + 1])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn second_difference_formula() {
        let diffs = second_differences(&[100.0, 40.0, 30.0, 25.0]);
        assert_eq!(diffs.len(), 2);
        // v[i] - v[i+2]
        assert_relative_eq!(diffs[0], 70.0);
        assert_relative_eq!(diffs[1], 15.0);
    }

    #[test]
    fn elbow_offsets_index_by_two_for_unit_start() {
        let ks: Vec<usize> = (1..=10).collect();
        let inertias = [100.0, 40.0, 30.0, 25.0, 21.0, 18.0, 16.0, 14.5, 13.5, 13.0];
        // largest v[i] - v[i+2] is at i = 0
        assert_eq!(select_elbow(&ks, &inertias).unwrap(), 2);
    }

    #[test]
    fn elbow_first_maximum_wins() {
        let ks = [1, 2, 3, 4, 5];
        let inertias = [10.0, 10.0, 5.0, 5.0, 0.0];
        // diffs: [5, 5, 5]
        assert_eq!(select_elbow(&ks, &inertias).unwrap(), 2);
    }

    #[test]
    fn elbow_later_drop() {
        let ks = [1, 2, 3, 4, 5, 6];
        let inertias = [50.0, 49.0, 48.0, 10.0, 9.0, 8.5];
        // diffs: [2, 39, 39, 1.5] -> first max at i = 1
        assert_eq!(select_elbow(&ks, &inertias).unwrap(), 3);
    }

    #[rstest]
    #[case(&[1], &[4.0], 1)]
    #[case(&[1, 2], &[4.0, 0.0], 2)]
    fn elbow_short_sweep_takes_largest(
        #[case] ks: &[usize],
        #[case] inertias: &[f64],
        #[case] expected: usize,
    ) {
        assert_eq!(select_elbow(ks, inertias).unwrap(), expected);
    }

    #[test]
    fn elbow_errors() {
        assert!(matches!(select_elbow(&[], &[]), Err(MathError::EmptyData)));
        assert!(matches!(
            select_elbow(&[1, 2, 3], &[1.0]),
            Err(MathError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }
}
