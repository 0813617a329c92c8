/// Rounds a client-supplied coordinate to the integral grid stored in the
/// table.
///
/// Halves round toward positive infinity (`-2.5` becomes `-2`), matching the
/// browser client. Out-of-range values saturate at the `i16` bounds and NaN
/// maps to the origin.
pub fn round_position(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    let rounded = (value + 0.5).floor();
    rounded.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
