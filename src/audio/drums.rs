use log::trace;

use super::AudioContext;
use super::filter::HighPass;
use super::ramp::ExpRamp;
use super::voice::{Source, Voice, Waveform};
use crate::audio_api::AudioCommand;
use crate::shared::Instrument;

// every envelope decays toward this instead of zero (exponential curves can't reach 0)
const FLOOR: f32 = 0.01;

pub fn kick(sample_rate: f32) -> Voice {
    let len = 0.4;
    Voice::new(
        Source::tone(Waveform::Sine, ExpRamp::new(150.0, FLOOR, len, sample_rate)),
        None,
        ExpRamp::new(1.0, FLOOR, len, sample_rate),
        len,
        sample_rate,
    )
}

pub fn snare(sample_rate: f32) -> Voice {
    let len = 0.12;
    Voice::new(
        Source::white_noise(0.1, sample_rate),
        Some(HighPass::new(1200.0, sample_rate)),
        ExpRamp::new(0.6, FLOOR, len, sample_rate),
        len,
        sample_rate,
    )
}

pub fn hihat(sample_rate: f32) -> Voice {
    let len = 0.05;
    Voice::new(
        Source::white_noise(len, sample_rate),
        Some(HighPass::new(8500.0, sample_rate)),
        ExpRamp::new(0.3, FLOOR, len, sample_rate),
        len,
        sample_rate,
    )
}

pub fn perc(sample_rate: f32) -> Voice {
    let len = 0.1;
    Voice::new(
        Source::tone(Waveform::Triangle, ExpRamp::new(700.0, 300.0, len, sample_rate)),
        None,
        ExpRamp::new(0.4, FLOOR, len, sample_rate),
        len,
        sample_rate,
    )
}

pub fn voice_for(instrument: Instrument, sample_rate: f32) -> Voice {
    match instrument {
        Instrument::Kick => kick(sample_rate),
        Instrument::Snare => snare(sample_rate),
        Instrument::HiHat => hihat(sample_rate),
        Instrument::Perc => perc(sample_rate),
    }
}

// The percussion synth. Owns the one audio context of the process and makes
// sure it is up before every sound; if the platform has no output for us every
// call quietly does nothing.
pub struct DrumSynth {
    ctx: AudioContext,
}

impl DrumSynth {
    pub fn new() -> Self {
        Self { ctx: AudioContext::default() }
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    pub fn ensure_engine(&mut self) -> bool {
        self.ctx.ensure().is_some()
    }

    pub fn suspend(&mut self) {
        self.ctx.suspend();
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Wake => {
                self.ensure_engine();
            }
            AudioCommand::Suspend => self.suspend(),
            AudioCommand::Trigger(instrument) => self.play(instrument),
        }
    }

    pub fn play(&mut self, instrument: Instrument) {
        trace!("trigger {}", instrument.key());
        match instrument {
            Instrument::Kick => self.play_kick(),
            Instrument::Snare => self.play_snare(),
            Instrument::HiHat => self.play_hihat(),
            Instrument::Perc => self.play_perc(),
        }
    }

    pub fn play_kick(&mut self) {
        self.play_voice(kick);
    }

    pub fn play_snare(&mut self) {
        self.play_voice(snare);
    }

    pub fn play_hihat(&mut self) {
        self.play_voice(hihat);
    }

    pub fn play_perc(&mut self) {
        self.play_voice(perc);
    }

    // fresh chain per hit, built at the output's rate
    fn play_voice(&mut self, build: fn(f32) -> Voice) {
        if let Some(out) = self.ctx.ensure() {
            out.send(build(out.sample_rate()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    fn render(mut v: Voice) -> Vec<f32> {
        let mut out = vec![0.0; v.len_remaining()];
        v.render_into(&mut out);
        out
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn synth_without_output_ignores_every_command() {
        let mut synth = DrumSynth { ctx: AudioContext::Unavailable };
        assert!(!synth.ensure_engine());
        for cmd in [
            AudioCommand::Wake,
            AudioCommand::Trigger(Instrument::Kick),
            AudioCommand::Trigger(Instrument::HiHat),
            AudioCommand::Suspend,
            AudioCommand::Trigger(Instrument::Perc),
        ] {
            synth.handle_cmd(cmd);
        }
        synth.play_snare();
        assert!(matches!(synth.context(), AudioContext::Unavailable));
    }

    #[test]
    fn durations_match_recipes() {
        assert_eq!(kick(SR).len_remaining(), 17640);
        assert_eq!(snare(SR).len_remaining(), 5292);
        assert_eq!(hihat(SR).len_remaining(), 2205);
        assert_eq!(perc(SR).len_remaining(), 4410);
    }

    #[test]
    fn kick_is_loud_then_decays() {
        let out = render(kick(SR));
        let head = peak(&out[..2000]);
        let tail = peak(&out[out.len() - 2000..]);
        assert!(head > 0.5, "kick head too quiet: {head}");
        assert!(tail < 0.05, "kick tail too loud: {tail}");
    }

    #[test]
    fn snare_noise_stops_before_envelope_ends() {
        let out = render(snare(SR));
        // 0.1s of noise in a 0.12s voice; whatever is left is filter ring-out
        let tail = peak(&out[4500..]);
        assert!(tail < 0.05, "snare tail: {tail}");
        assert!(peak(&out[..500]) > 0.1);
    }

    #[test]
    fn hihat_stays_soft() {
        let hat = peak(&render(hihat(SR)));
        assert!(hat <= 1.0, "hi-hat peak: {hat}");
        assert!(hat > 0.0);
    }

    #[test]
    fn perc_peak_bounded_by_gain() {
        let p = peak(&render(perc(SR)));
        assert!(p <= 0.4 + 1e-4, "perc peak: {p}");
        assert!(p > 0.2);
    }
}
