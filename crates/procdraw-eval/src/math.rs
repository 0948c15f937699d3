/// Linear interpolation: `v = 0` gives `start`, `v = 1` gives `stop`.
pub fn lerp(start: f64, stop: f64, v: f64) -> f64 {
    (1.0 - v) * start + v * stop
}

/// Inverse of [`lerp`]: where `v` sits in `[start, stop]`, as a fraction.
pub fn norm(start: f64, stop: f64, v: f64) -> f64 {
    (v - start) / (stop - start)
}

/// Map `v` from `[start1, stop1]` onto `[start2, stop2]`.
pub fn map_range(start1: f64, stop1: f64, start2: f64, stop2: f64, v: f64) -> f64 {
    start2 + ((v - start1) * (stop2 - start2)) / (stop1 - start1)
}

/// Wrap `v` into the half-open range `[start, stop)`.
pub fn wrap(start: f64, stop: f64, v: f64) -> f64 {
    v - ((v - start) / (stop - start)).floor() * (stop - start)
}
