//! Latest-entropy gauge shared between the filter loop and the window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Latest entropy, shared between the filter loop and the visualizer.
#[derive(Debug, Clone, Default)]
pub struct EntropyGauge(Arc<AtomicU64>);

impl EntropyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, entropy: f64) {
        let value = if entropy.is_nan() { 0.0 } else { entropy.clamp(0.0, 1.0) };
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn read(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_is_shared() {
        let gauge = EntropyGauge::new();
        assert_eq!(gauge.read(), 0.0);

        let reader = gauge.clone();
        gauge.publish(0.42);
        assert_eq!(reader.read(), 0.42);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let gauge = EntropyGauge::new();
        gauge.publish(3.0);
        assert_eq!(gauge.read(), 1.0);
        gauge.publish(f64::NAN);
        assert_eq!(gauge.read(), 0.0);
    }
}
