//! Generators for synthetic band data.
//!
//! All grids are `Vec<f32>` in row-major order (row 0 first).

/// A band where every pixel holds `value`.
pub fn constant_band(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// A band ramping linearly from `lo` at the left edge to `hi` at the right
/// edge, identical on every row.
///
/// # Example
///
/// ```
/// use test_utils::ramp_band;
///
/// let band = ramp_band(5, 2, 0.0, 100.0);
/// assert_eq!(band[0], 0.0);
/// assert_eq!(band[4], 100.0);
/// assert_eq!(band[5], 0.0); // second row starts over
/// ```
pub fn ramp_band(width: usize, height: usize, lo: f32, hi: f32) -> Vec<f32> {
    let step = if width > 1 {
        (hi - lo) / (width - 1) as f32
    } else {
        0.0
    };
    let row: Vec<f32> = (0..width).map(|x| lo + step * x as f32).collect();
    row.iter().copied().cycle().take(width * height).collect()
}

/// Reflectance-like values (0..=3000) with a gentle diagonal gradient.
pub fn reflectance_band(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / width.max(1) as f32;
            let y = row as f32 / height.max(1) as f32;
            let wobble = ((col as u32 * 31 + row as u32 * 17 + seed) % 100) as f32;
            data.push((x * 1500.0 + y * 1400.0 + wobble).min(3000.0));
        }
    }
    data
}

/// Copy of `band` with the pixels at `indices` set to NaN (no-data).
pub fn with_nodata(mut band: Vec<f32>, indices: &[usize]) -> Vec<f32> {
    for &i in indices {
        if let Some(v) = band.get_mut(i) {
            *v = f32::NAN;
        }
    }
    band
}
