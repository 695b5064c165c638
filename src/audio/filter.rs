use std::f32::consts::TAU;

// Butterworth Q, the flattest passband for a 2nd order section
const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

// 2nd order high-pass (RBJ cookbook coefficients, direct form II transposed)
#[derive(Clone, Copy, Debug)]
pub struct HighPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl HighPass {
    pub fn new(cutoff: f32, sample_rate: f32) -> Self {
        // keep the cutoff under nyquist, low output rates would blow up the hi-hat
        let cutoff = cutoff.clamp(10.0, sample_rate * 0.45);
        let w0 = TAU * cutoff / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * DEFAULT_Q);

        let a0 = 1.0 + alpha;
        let b0 = (1.0 + cos_w0) / 2.0;
        Self {
            b0: b0 / a0,
            b1: -(1.0 + cos_w0) / a0,
            b2: b0 / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}
