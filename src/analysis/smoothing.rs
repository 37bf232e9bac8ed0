use crate::breakpoints::BreakpointSeries;

/// EMA coefficient for a step of `dt` seconds under time constant `tau`.
pub fn ema_alpha(dt: f64, tau: f64) -> f64 {
    if tau > 0.0 && dt > 0.0 {
        1.0 - (-dt / tau).exp()
    } else {
        1.0
    }
}

/// Zero-phase exponential smoothing: a forward and a backward EMA pass,
/// averaged, so peaks are not shifted later in time.
pub fn smooth_values(values: &mut [f64], alpha: f64) {
    let n = values.len();
    if n < 2 || alpha >= 1.0 {
        return;
    }

    let mut forward = vec![0.0; n];
    forward[0] = values[0];
    for i in 1..n {
        forward[i] = alpha * values[i] + (1.0 - alpha) * forward[i - 1];
    }

    let mut backward = vec![0.0; n];
    backward[n - 1] = values[n - 1];
    for i in (0..n - 1).rev() {
        backward[i] = alpha * values[i] + (1.0 - alpha) * backward[i + 1];
    }

    for (i, v) in values.iter_mut().enumerate() {
        *v = (forward[i] + backward[i]) * 0.5;
    }
}

/// Smooths a series in place with time constant `tau` seconds, stepping by
/// the series' mean point spacing.
pub fn smooth_series(series: &mut BreakpointSeries, tau: f64) {
    let points = series.points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    if points.len() < 2 {
        return;
    }
    let dt = (last.time - first.time) / (points.len() - 1) as f64;
    let alpha = ema_alpha(dt, tau);

    let mut values: Vec<f64> = series.values().collect();
    smooth_values(&mut values, alpha);
    for (slot, v) in series.values_mut().zip(values) {
        *slot = v;
    }
}
