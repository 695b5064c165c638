use std::f32::consts::TAU;

use super::filter::HighPass;
use super::ramp::ExpRamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

#[derive(Clone, Debug)]
pub enum Source {
    // pitched oscillator with a swept frequency
    Tone {
        waveform: Waveform,
        phase: f32, // 0..1
        freq: ExpRamp,
    },
    // white noise burst drawn sample by sample, silence once it runs out
    Noise {
        rng: fastrand::Rng,
        left: usize,
    },
}

impl Source {
    pub fn tone(waveform: Waveform, freq: ExpRamp) -> Self {
        Source::Tone { waveform, phase: 0.0, freq }
    }

    pub fn white_noise(seconds: f32, sample_rate: f32) -> Self {
        Source::Noise {
            rng: fastrand::Rng::new(),
            left: (seconds * sample_rate).round() as usize,
        }
    }

    fn next(&mut self, sample_rate: f32) -> f32 {
        match self {
            Source::Tone { waveform, phase, freq } => {
                let out = match waveform {
                    Waveform::Sine => (TAU * *phase).sin(),
                    Waveform::Triangle => 4.0 * (*phase - 0.5).abs() - 1.0,
                };
                *phase += freq.next() / sample_rate;
                *phase -= phase.floor();
                out
            }
            Source::Noise { rng, left } => {
                if *left == 0 {
                    return 0.0;
                }
                *left -= 1;
                rng.f32() * 2.0 - 1.0
            }
        }
    }
}

// One self-contained signal chain: source -> (high-pass) -> gain envelope.
// Built fresh for every hit and dropped by the engine once `remaining` hits 0.
#[derive(Clone, Debug)]
pub struct Voice {
    source: Source,
    filter: Option<HighPass>,
    gain: ExpRamp,
    remaining: usize,
    sample_rate: f32,
}

impl Voice {
    pub fn new(
        source: Source,
        filter: Option<HighPass>,
        gain: ExpRamp,
        seconds: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            source,
            filter,
            gain,
            remaining: (seconds * sample_rate).round() as usize,
            sample_rate,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn len_remaining(&self) -> usize {
        self.remaining
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.remaining == 0 {
            return 0.0;
        }
        self.remaining -= 1;
        let mut s = self.source.next(self.sample_rate);
        if let Some(f) = self.filter.as_mut() {
            s = f.process(s);
        }
        s * self.gain.next()
    }

    // mixes this voice on top of whatever is already in `out`
    pub fn render_into(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            if self.is_finished() {
                break;
            }
            *sample += self.next_sample();
        }
    }
}
