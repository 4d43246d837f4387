//! Frame timing

/// Turns `requestAnimationFrame` timestamps (ms) into frame deltas (s)
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call. The first call after a reset is 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms.is_finite() => ((now_ms - last) / 1000.0).max(0.0) as f32,
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        dt
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), 0.0);
        assert!((clock.advance(1016.0) - 0.016).abs() < 1e-6);
        // Timestamps going backwards never yield negative time
        assert_eq!(clock.advance(900.0), 0.0);

        clock.reset();
        assert_eq!(clock.advance(5000.0), 0.0);
    }
}
