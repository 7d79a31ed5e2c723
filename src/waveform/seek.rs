use super::SurfaceGeometry;

/// Convert a pointer x coordinate on the surface into a playback time.
///
/// Returns `None` when nothing is loaded (`duration` is zero) or the surface has no
/// width. Coordinates outside the surface clamp to the start or end.
pub fn map_click_to_time(click_x: f32, geometry: SurfaceGeometry, duration: f64) -> Option<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    if geometry.width_px <= 0.0 || click_x.is_nan() {
        return None;
    }
    let fraction = (click_x as f64 / geometry.width_px as f64).clamp(0.0, 1.0);
    Some(fraction * duration)
}

/// Horizontal pixel position of `time` on the surface.
pub fn time_to_x(time: f64, geometry: SurfaceGeometry, duration: f64) -> f32 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    let fraction = (time / duration).clamp(0.0, 1.0);
    (fraction * geometry.width_px as f64) as f32
}
