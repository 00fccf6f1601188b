//! Fixed-rate tick clock driven by frame timestamps.

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// One emitted tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Wall time covered by this tick, in seconds.
    pub delta_seconds: f64,
    /// Whole target intervals covered, including carried overflow.
    pub multiplier: u32,
    /// Remainder carried to later ticks, in milliseconds.
    pub overflow_ms: f64,
}

/// Accumulates frame time and emits a [`Tick`] once a target interval has
/// passed. Partial intervals are carried as overflow so that the sum of
/// multipliers tracks elapsed time.
#[derive(Debug, Clone)]
pub struct TickClock {
    target_ms: f64,
    last: Option<Instant>,
    accumulated_ms: f64,
    overflow_ms: f64,
}

impl TickClock {
    /// Create a clock ticking `rate` times per second.
    pub fn new(rate: u32) -> Self {
        Self {
            target_ms: 1000.0 / f64::from(rate.max(1)),
            last: None,
            accumulated_ms: 0.0,
            overflow_ms: 0.0,
        }
    }

    /// Length of one tick interval in milliseconds.
    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }

    /// Feed a frame timestamp. The first call only starts the clock.
    pub fn advance(&mut self, now: Instant) -> Option<Tick> {
        let last = self.last.replace(now)?;
        let elapsed = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
        self.advance_ms(elapsed)
    }

    /// Feed elapsed milliseconds directly.
    pub fn advance_ms(&mut self, elapsed_ms: f64) -> Option<Tick> {
        self.accumulated_ms += elapsed_ms;
        if self.accumulated_ms <= self.target_ms {
            return None;
        }
        let delta = self.accumulated_ms;
        let whole = (delta / self.target_ms).floor();
        self.overflow_ms += delta % self.target_ms;
        let carried = (self.overflow_ms / self.target_ms).floor();
        self.overflow_ms %= self.target_ms;
        self.accumulated_ms = 0.0;

        Some(Tick {
            delta_seconds: delta / 1000.0,
            multiplier: (whole + carried) as u32,
            overflow_ms: self.overflow_ms,
        })
    }

    /// Forget the last timestamp, so the next frame restarts the clock.
    /// Used when the viewport stops running (minimized or hidden).
    pub fn pause(&mut self) {
        self.last = None;
        self.accumulated_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_frame_starts_clock() {
        let mut clock = TickClock::new(60);
        assert!(clock.advance(Instant::now()).is_none());
    }

    #[test]
    fn test_multiplier_and_overflow() {
        let mut clock = TickClock::new(50);
        assert!((clock.target_ms() - 20.0).abs() < f64::EPSILON);

        assert!(clock.advance_ms(15.0).is_none());

        let tick = clock.advance_ms(30.0).unwrap();
        assert_eq!(tick.multiplier, 2);
        assert!((tick.overflow_ms - 5.0).abs() < 1e-9);
        assert!((tick.delta_seconds - 0.045).abs() < 1e-9);

        assert!(clock.advance_ms(18.0).is_none());

        // 35ms: one whole interval plus 15ms, which joins the carried 5ms.
        let tick = clock.advance_ms(17.0).unwrap();
        assert_eq!(tick.multiplier, 2);
        assert!(tick.overflow_ms.abs() < 1e-9);
    }

    #[test]
    fn test_exact_interval_does_not_tick() {
        let mut clock = TickClock::new(50);
        assert!(clock.advance_ms(20.0).is_none());
        assert!(clock.advance_ms(0.5).is_some());
    }

    #[test]
    fn test_advance_with_instants() {
        let mut clock = TickClock::new(100);
        let start = Instant::now();
        clock.advance(start);
        let tick = clock.advance(start + Duration::from_millis(25)).unwrap();
        assert_eq!(tick.multiplier, 2);
        assert!((tick.overflow_ms - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_pause_restarts() {
        let mut clock = TickClock::new(100);
        let start = Instant::now();
        clock.advance(start);
        clock.pause();
        assert!(clock.advance(start + Duration::from_secs(5)).is_none());
    }
}
