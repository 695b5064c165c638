// Exponential parameter ramp, the same curve as an exponentialRampToValueAtTime:
// v(n) = from * (to / from)^(n / len), then holds `to`.
// Both ends must be strictly positive.
#[derive(Clone, Copy, Debug)]
pub struct ExpRamp {
    value: f32,
    target: f32,
    factor: f32,
    remaining: u32,
}

impl ExpRamp {
    pub fn new(from: f32, to: f32, seconds: f32, sample_rate: f32) -> Self {
        debug_assert!(from > 0.0 && to > 0.0, "exponential ramp ends must be > 0");
        let len = (seconds * sample_rate).round().max(1.0) as u32;
        Self {
            value: from,
            target: to,
            factor: (to / from).powf(1.0 / len as f32),
            remaining: len,
        }
    }

    #[cfg(test)]
    fn value(&self) -> f32 {
        self.value
    }

    // returns the current value and steps one sample forward
    pub fn next(&mut self) -> f32 {
        let out = self.value;
        if self.remaining > 0 {
            self.remaining -= 1;
            self.value = if self.remaining == 0 {
                self.target // snap, no float drift at the end
            } else {
                self.value * self.factor
            };
        }
        out
    }
}
