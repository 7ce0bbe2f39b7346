//! Distance-based gain attenuation.

/// Exponential decay curve mapping listener-to-emitter distance to a target
/// gain.
///
/// Deliberately not an inverse-square law: the near field rolls off steeply
/// while the far field stays gentle, so the voice remains usable across a
/// believable interaction radius (roughly 1-5 scene units).
///
/// The curve is pure and stateless; master volume is multiplied in by the
/// caller at the point the gain is computed.
#[derive(Debug, Clone, Copy)]
pub struct AttenuationCurve {
    /// Distance at which the gain saturates at `min_volume`.
    pub max_distance: f32,
    pub min_volume: f32,
    pub max_volume: f32,
    /// Steepness constant of the exponential decay.
    pub decay_factor: f32,
}

impl Default for AttenuationCurve {
    fn default() -> Self {
        Self {
            max_distance: 5.0,
            min_volume: 0.05,
            max_volume: 1.0,
            decay_factor: 4.0,
        }
    }
}

impl AttenuationCurve {
    /// Gain in `[min_volume, max_volume]` for a listener at `distance`.
    ///
    /// Negative distance clamps to 0 and NaN is treated as 0, so the model
    /// never emits an invalid gain.
    pub fn gain_for_distance(&self, distance: f32) -> f32 {
        let distance = if distance.is_nan() { 0.0 } else { distance.max(0.0) };
        let normalized = (distance / self.max_distance).min(1.0);
        let decay = (-self.decay_factor * normalized).exp();
        (self.min_volume + (self.max_volume - self.min_volume) * decay).max(self.min_volume)
    }
}
