/// Channel-wise linear interpolation between `low` and `high`.
///
/// The blend happens directly on the stored RGB values without any
/// color-space conversion, so mid-range colors come out darker than a
/// perceptual blend would produce.
pub fn color_at(t: f32, low: [f32; 3], high: [f32; 3]) -> [f32; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    [
        lerp(low[0], high[0], t),
        lerp(low[1], high[1], t),
        lerp(low[2], high[2], t),
    ]
}

/// Parses `#rrggbb`, `r,g,b` or `r g b` (0..1 floats, or 0..255 when any
/// channel exceeds 1.5).
pub fn parse_color(value: &str) -> Option<[f32; 3]> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(hex) = trimmed.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()? as f32 / 255.0;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()? as f32 / 255.0;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()? as f32 / 255.0;
        return Some([r, g, b]);
    }
    let parts = trimmed
        .split([',', ' '])
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>();
    if parts.len() != 3 {
        return None;
    }
    let mut values = [0.0f32; 3];
    for (idx, part) in parts.iter().enumerate() {
        values[idx] = part.parse::<f32>().ok()?;
    }
    if values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    if values.iter().any(|v| *v > 1.5) {
        values = [values[0] / 255.0, values[1] / 255.0, values[2] / 255.0];
    }
    Some(clamp_color(values))
}

fn clamp_color(color: [f32; 3]) -> [f32; 3] {
    [
        color[0].clamp(0.0, 1.0),
        color[1].clamp(0.0, 1.0),
        color[2].clamp(0.0, 1.0),
    ]
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
