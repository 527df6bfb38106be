//! Small numeric helpers shared by the summary, association and correlation code

use std::cmp::Ordering;

/// Number of decimals kept in reported ratios
pub const REPORT_DECIMALS: i32 = 4;

/// Round a ratio for reporting. Never used on values that feed further computation.
pub fn round_ratio(value: f64) -> f64 {
    let factor = 10f64.powi(REPORT_DECIMALS);
    (value * factor).round() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), computed with Welford's method.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mut n = 0.0;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for &x in values {
        n += 1.0;
        let delta = x - mean;
        mean += delta / n;
        m2 += delta * (x - mean);
    }

    Some((m2 / (n - 1.0)).sqrt())
}

/// Linearly interpolated quantile of already sorted values.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Average ranks (1-based), ties share the mean of the ranks they span.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = avg_rank;
        }
        i = j + 1;
    }

    ranks
}

/// Pearson correlation of two equally long, null-free samples.
///
/// Returns `None` when either sample has zero variance or fewer than two
/// points, and when an infinite value leaves the coefficient undefined.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    // Single-pass Welford update for numerical stability
    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        count += 1.0;
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        mean_x += dx / count;
        mean_y += dy / count;
        var_x += dx * (xi - mean_x);
        var_y += dy * (yi - mean_y);
        cov_xy += dx * (yi - mean_y);
    }

    // NaN variance (an infinite input) fails this check too
    if !(var_x > 0.0 && var_y > 0.0) {
        return None;
    }

    let r = cov_xy / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
