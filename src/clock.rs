use std::time::Instant;

/// Source of per-frame time steps
pub trait FrameClock {
    /// Seconds since the previous call (or since the clock was armed)
    fn delta(&mut self) -> f64;

    /// Seconds accumulated across every `delta` so far
    fn elapsed(&self) -> f64;

    /// Forgets the time since the last delta, so the next one starts from now
    fn rearm(&mut self);
}

/// Wall-clock frame timer
pub struct Clock {
    last: Instant,
    elapsed: f64,
}

impl Clock {
    pub fn new() -> Self {
        Clock {
            last: Instant::now(),
            elapsed: 0.0,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for Clock {
    fn delta(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.elapsed += delta;
        delta
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn rearm(&mut self) {
        self.last = Instant::now();
    }
}

/// Clock that advances by the same step on every frame
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct FixedClock {
    step: f64,
    elapsed: f64,
}

#[cfg(test)]
impl FixedClock {
    pub fn new(step: f64) -> Self {
        FixedClock { step, elapsed: 0.0 }
    }
}

#[cfg(test)]
impl FrameClock for FixedClock {
    fn delta(&mut self) -> f64 {
        self.elapsed += self.step;
        self.step
    }

    fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn rearm(&mut self) {}
}
