/// Linearly map `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied: inputs outside the source range extrapolate past
/// the target range, and callers clamp where they need to. A degenerate source
/// range (`in_min == in_max`) yields a non-finite result instead of panicking.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}
