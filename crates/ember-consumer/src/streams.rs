use std::collections::HashMap;

use ember_glow::GlowValue;

/// Per-`streamIdentifier` scale factor, applied to raw stream samples before
/// delivery to the host. Default factor (no factor captured yet) is 1.
#[derive(Debug, Default)]
pub struct StreamFactorCache {
    factors: HashMap<i32, f64>,
}

impl StreamFactorCache {
    pub fn new() -> Self {
        StreamFactorCache::default()
    }

    pub fn record_factor(&mut self, stream_identifier: i32, factor: f64) {
        self.factors.insert(stream_identifier, factor);
    }

    /// `value = rawValue / factor`. Integer samples are divided exactly
    /// (promoted to floating point for the division, same as a real sample).
    pub fn deliver(&self, stream_identifier: i32, raw: &GlowValue) -> GlowValue {
        let factor = self.factors.get(&stream_identifier).copied().unwrap_or(1.0);
        match raw {
            GlowValue::Integer(v) => GlowValue::Real(*v as f64 / factor),
            GlowValue::Real(v) => GlowValue::Real(v / factor),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factor_is_one() {
        let cache = StreamFactorCache::new();
        assert_eq!(cache.deliver(1, &GlowValue::Integer(42)), GlowValue::Real(42.0));
    }

    #[test]
    fn recorded_factor_divides_integer_and_real_samples() {
        let mut cache = StreamFactorCache::new();
        cache.record_factor(7, 100.0);
        assert_eq!(cache.deliver(7, &GlowValue::Integer(250)), GlowValue::Real(2.5));
        assert_eq!(cache.deliver(7, &GlowValue::Real(50.0)), GlowValue::Real(0.5));
    }

    #[test]
    fn non_numeric_values_pass_through_unchanged() {
        let cache = StreamFactorCache::new();
        let value = GlowValue::Boolean(true);
        assert_eq!(cache.deliver(1, &value), value);
    }
}
