//! Descriptive statistics over plain `f64` slices
//!
//! Undefined results (empty input, a single value for a sample statistic,
//! zero variance for a correlation) come back as `NaN` rather than panicking.

pub fn mean(values: &[f64]) -> f64 {
  if values.is_empty() {
    return f64::NAN;
  }
  values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> f64 {
  if values.len() < 2 {
    return f64::NAN;
  }
  let m = mean(values);
  let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
  (sum_sq / (values.len() - 1) as f64).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
  values.iter().copied().fold(f64::NAN, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
  values.iter().copied().fold(f64::NAN, f64::max)
}

/// Quantile with linear interpolation between closest ranks, `q` in `[0, 1]`
pub fn quantile(values: &[f64], q: f64) -> f64 {
  if values.is_empty() {
    return f64::NAN;
  }
  let mut sorted = values.to_vec();
  sorted.sort_by(|a, b| a.total_cmp(b));
  quantile_sorted(&sorted, q)
}

/// Same as [`quantile`] for input that is already sorted ascending
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
  if sorted.is_empty() {
    return f64::NAN;
  }
  let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
  let lower = position.floor() as usize;
  let upper = position.ceil() as usize;
  let fraction = position - lower as f64;
  sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Pearson correlation coefficient of two equally long series
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
  let n = xs.len().min(ys.len());
  if n < 2 {
    return f64::NAN;
  }
  let (xs, ys) = (&xs[..n], &ys[..n]);
  let (mx, my) = (mean(xs), mean(ys));

  let mut cov = 0.0;
  let mut var_x = 0.0;
  let mut var_y = 0.0;
  for (x, y) in xs.iter().zip(ys) {
    let (dx, dy) = (x - mx, y - my);
    cov += dx * dy;
    var_x += dx * dx;
    var_y += dy * dy;
  }

  if var_x == 0.0 || var_y == 0.0 {
    return f64::NAN;
  }
  (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}
