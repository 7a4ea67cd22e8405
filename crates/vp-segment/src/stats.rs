//! Summary statistics over `f64` samples.
//!
//! Every function ignores `NaN` samples and returns `NaN` when the
//! statistic is undefined (no samples, or one sample for the standard
//! deviation).

fn finite(samples: &[f64]) -> Vec<f64> {
    samples.iter().copied().filter(|x| !x.is_nan()).collect()
}

pub fn mean(samples: &[f64]) -> f64 {
    let xs = finite(samples);
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

pub fn min(samples: &[f64]) -> f64 {
    finite(samples).into_iter().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(samples: &[f64]) -> f64 {
    finite(samples).into_iter().reduce(f64::max).unwrap_or(f64::NAN)
}

/// Quantile `q` in `[0, 1]` with linear interpolation between the two
/// nearest ranks.
pub fn quantile(samples: &[f64], q: f64) -> f64 {
    let mut xs = finite(samples);
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    xs[lo] + (xs[hi] - xs[lo]) * (pos - lo as f64)
}

/// Sample standard deviation (`n − 1` denominator).
pub fn std_dev(samples: &[f64]) -> f64 {
    let xs = finite(samples);
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = xs.iter().sum::<f64>() / xs.len() as f64;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

/// Round to `places` decimals.
pub fn round_to(x: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (x * scale).round() / scale
}
