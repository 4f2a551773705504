use std::time::Instant;

/// Animation clock - captures a start instant once, then reports elapsed time
///
/// Elapsed time is always recomputed from the captured origin rather than
/// accumulated, so a slow or delayed tick still yields the correct total.
#[derive(Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
}

impl FrameClock {
    /// Create a clock that has not started yet
    pub fn new() -> Self {
        Self { start: None }
    }

    /// Whether the start instant has been captured
    pub fn started(&self) -> bool {
        self.start.is_some()
    }

    /// Get seconds elapsed since the first tick
    /// The first call captures the origin and returns ~0
    pub fn tick(&mut self) -> f32 {
        let start = *self.start.get_or_insert_with(Instant::now);
        start.elapsed().as_secs_f32()
    }

    /// The captured origin, if any tick has occurred
    pub fn start_instant(&self) -> Option<Instant> {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn first_tick_is_near_zero() {
        let mut clock = FrameClock::new();
        assert!(!clock.started());

        let elapsed = clock.tick();
        assert!(clock.started());
        assert!(elapsed < 0.005);
    }

    #[test]
    fn elapsed_grows_from_single_origin() {
        let mut clock = FrameClock::new();
        clock.tick();
        let origin = clock.start_instant().unwrap();

        thread::sleep(Duration::from_millis(20));
        let elapsed = clock.tick();

        // Should be roughly 20ms = 0.02s, measured from the same origin
        assert!(elapsed >= 0.019 && elapsed <= 0.200);
        assert_eq!(clock.start_instant(), Some(origin));
    }

    #[test]
    fn elapsed_is_recomputed_not_accumulated() {
        let mut clock = FrameClock::new();
        clock.tick();

        // Many rapid ticks must not inflate the total
        for _ in 0..100 {
            clock.tick();
        }

        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.tick();
        assert!(elapsed >= 0.009 && elapsed <= 0.200);
    }
}
