//! Correlation coefficients.
//!
//! All functions return `NaN` when the coefficient is undefined: inputs of
//! different length, fewer than two observations, a constant input, or any
//! `NaN` observation.

use std::cmp::Ordering;

/// Pearson's linear correlation coefficient.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if !well_formed(x, y) {
        return f64::NAN;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Spearman's rank correlation: Pearson over average ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if !well_formed(x, y) {
        return f64::NAN;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Kendall's tau-b, which corrects for ties in either input.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> f64 {
    if !well_formed(x, y) {
        return f64::NAN;
    }

    let n = x.len();
    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    let mut tied_x_only: i64 = 0;
    let mut tied_y_only: i64 = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i].partial_cmp(&x[j]).unwrap_or(Ordering::Equal);
            let dy = y[i].partial_cmp(&y[j]).unwrap_or(Ordering::Equal);
            match (dx, dy) {
                (Ordering::Equal, Ordering::Equal) => {}
                (Ordering::Equal, _) => tied_x_only += 1,
                (_, Ordering::Equal) => tied_y_only += 1,
                (a, b) if a == b => concordant += 1,
                _ => discordant += 1,
            }
        }
    }

    let untied = concordant + discordant;
    let denom = (((untied + tied_x_only) as f64) * ((untied + tied_y_only) as f64)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }

    (((concordant - discordant) as f64) / denom).clamp(-1.0, 1.0)
}

/// Round to four decimal places; `NaN` stays `NaN`.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 1-based ranks, ties sharing the mean of the ranks they span.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold equal values: ranks start+1 ..= end.
        let rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

fn well_formed(x: &[f64], y: &[f64]) -> bool {
    x.len() == y.len() && x.len() >= 2 && !x.iter().chain(y).any(|v| v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textbook_example() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert_eq!(round4(spearman(&x, &y)), 0.8);
        assert_eq!(round4(kendall_tau(&x, &y)), 0.6);
        assert_eq!(round4(pearson(&x, &y)), 0.8);
    }

    #[test]
    fn test_ties_use_average_ranks_and_tau_b() {
        let x = [1.0, 2.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(average_ranks(&x), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(round4(spearman(&x, &y)), 0.9487);
        assert_eq!(round4(kendall_tau(&x, &y)), 0.9129);
    }

    #[test]
    fn test_perfect_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [30.0, 20.0, 10.0];
        assert_eq!(round4(spearman(&x, &y)), -1.0);
        assert_eq!(round4(kendall_tau(&x, &y)), -1.0);
        assert_eq!(round4(pearson(&x, &y)), -1.0);
    }

    #[test]
    fn test_pearson_linear_fit() {
        let x = [1.0, 2.0, 3.0];
        let y = [10.0, 20.0, 40.0];
        assert_eq!(round4(pearson(&x, &y)), 0.982);
        assert_eq!(round4(spearman(&x, &y)), 1.0);
    }

    #[test]
    fn test_constant_input_is_nan() {
        let x = [5.0, 5.0, 5.0];
        let y = [1.0, 2.0, 3.0];
        assert!(spearman(&x, &y).is_nan());
        assert!(kendall_tau(&x, &y).is_nan());
        assert!(pearson(&y, &x).is_nan());
    }

    #[test]
    fn test_short_or_mismatched_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(spearman(&[], &[]).is_nan());
        assert!(kendall_tau(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, f64::NAN], &[1.0, 2.0]).is_nan());
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(-0.98767), -0.9877);
        assert!(round4(f64::NAN).is_nan());
    }
}
