// The step sequencer: a pattern plus a transport, answering every action with
// the audio commands it implies.

use std::time::Duration;

use log::{debug, info, warn};

use super::pattern::{Pattern, PatternError};
use super::transport::{BpmError, Transport};
use crate::audio_api::AudioCommand;
use crate::shared::Instrument;

#[derive(Clone, Debug)]
pub struct Sequencer {
    pattern: Pattern,
    transport: Transport,
}

impl Sequencer {
    pub fn new(bpm: f32) -> Self {
        Self {
            pattern: Pattern::default(),
            transport: Transport::new(bpm),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn current_step(&self) -> u8 {
        self.transport.current_step()
    }

    pub fn bpm(&self) -> f32 {
        self.transport.bpm()
    }

    // Wakes the engine before anything else, then sounds the step under the
    // cursor right away; the clock takes it from there.
    pub fn play(&mut self) -> Vec<AudioCommand> {
        if !self.transport.play() {
            return Vec::new();
        }
        info!("play from step {} at {} bpm", self.current_step() + 1, self.bpm());
        let mut cmds = vec![AudioCommand::Wake];
        cmds.extend(self.triggers_at(self.current_step()));
        cmds
    }

    pub fn pause(&mut self) {
        if self.transport.pause() {
            info!("paused at step {}", self.current_step() + 1);
        }
    }

    pub fn toggle_play(&mut self) -> Vec<AudioCommand> {
        if self.is_playing() {
            self.pause();
            Vec::new()
        } else {
            self.play()
        }
    }

    // stop + rewind; the engine can rest until the next sound
    pub fn reset(&mut self) -> Vec<AudioCommand> {
        self.transport.reset();
        info!("stopped, cursor back to step 1");
        vec![AudioCommand::Suspend]
    }

    pub fn set_bpm(&mut self, bpm: f32) -> Result<f32, BpmError> {
        let bpm = self.transport.set_bpm(bpm)?;
        debug!("tempo {bpm} bpm");
        Ok(bpm)
    }

    pub fn nudge_bpm(&mut self, delta: f32) -> Result<f32, BpmError> {
        self.set_bpm((self.bpm() + delta).round())
    }

    pub fn tick(&mut self, dt: Duration) -> Vec<AudioCommand> {
        match self.transport.tick(dt) {
            Some(step) => self.triggers_at(step),
            None => Vec::new(),
        }
    }

    // A cell switched on is heard immediately, playing or not.
    pub fn toggle_step(&mut self, instrument: Instrument, step: usize) -> Vec<AudioCommand> {
        if self.pattern.toggle(instrument, step) {
            vec![AudioCommand::Trigger(instrument)]
        } else {
            Vec::new()
        }
    }

    pub fn clear_pattern(&mut self) {
        self.pattern = Pattern::default();
    }

    pub fn replace_pattern(&mut self, pattern: Pattern) {
        self.pattern = pattern;
    }

    // Generator output goes through here: either the whole pattern is swapped
    // or nothing changes at all.
    pub fn apply_generated(&mut self, raw: &str) -> Result<(), PatternError> {
        match Pattern::from_json(raw) {
            Ok(pattern) => {
                info!("generated pattern accepted ({} hits)", pattern.hit_count());
                debug!("{}", pattern.to_json());
                self.replace_pattern(pattern);
                Ok(())
            }
            Err(e) => {
                warn!("generated pattern rejected, keeping the old one: {e}");
                Err(e)
            }
        }
    }

    fn triggers_at(&self, step: u8) -> Vec<AudioCommand> {
        self.pattern
            .hits_at(step as usize)
            .map(AudioCommand::Trigger)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::NUM_STEPS;

    fn full_row(instrument: &str, hits: &[usize]) -> String {
        let cells: Vec<String> = (0..16).map(|i| hits.contains(&i).to_string()).collect();
        format!(r#""{instrument}":[{}]"#, cells.join(","))
    }

    #[test]
    fn toggling_on_triggers_exactly_once() {
        let mut seq = Sequencer::new(120.0);
        assert_eq!(
            seq.toggle_step(Instrument::HiHat, 3),
            vec![AudioCommand::Trigger(Instrument::HiHat)]
        );
        assert!(seq.toggle_step(Instrument::HiHat, 3).is_empty());

        seq.play();
        assert_eq!(
            seq.toggle_step(Instrument::Kick, 9),
            vec![AudioCommand::Trigger(Instrument::Kick)]
        );
    }

    #[test]
    fn play_wakes_engine_and_fires_current_step() {
        let mut seq = Sequencer::new(120.0);
        seq.toggle_step(Instrument::Snare, 0);
        seq.toggle_step(Instrument::Kick, 0);
        let cmds = seq.play();
        assert_eq!(
            cmds,
            vec![
                AudioCommand::Wake,
                AudioCommand::Trigger(Instrument::Kick),
                AudioCommand::Trigger(Instrument::Snare),
            ]
        );
        assert!(seq.play().is_empty());
    }

    #[test]
    fn ticks_fire_hits_in_instrument_order() {
        let mut seq = Sequencer::new(120.0);
        for inst in [Instrument::Perc, Instrument::HiHat, Instrument::Kick] {
            seq.toggle_step(inst, 1);
        }
        seq.play();
        let cmds = seq.tick(Duration::from_millis(125));
        assert_eq!(
            cmds,
            vec![
                AudioCommand::Trigger(Instrument::Kick),
                AudioCommand::Trigger(Instrument::HiHat),
                AudioCommand::Trigger(Instrument::Perc),
            ]
        );
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn a_long_frame_sounds_one_step() {
        let mut seq = Sequencer::new(120.0);
        for step in 0..NUM_STEPS {
            seq.toggle_step(Instrument::Kick, step);
        }
        seq.play();
        let cmds = seq.tick(Duration::from_secs(10));
        assert_eq!(cmds, vec![AudioCommand::Trigger(Instrument::Kick)]);
        assert_eq!(seq.current_step(), 1);
    }

    #[test]
    fn pause_then_reset() {
        let mut seq = Sequencer::new(120.0);
        seq.play();
        for _ in 0..7 {
            seq.tick(Duration::from_millis(125));
        }
        seq.toggle_play();
        assert!(!seq.is_playing());
        assert_eq!(seq.current_step(), 7);
        assert!(seq.tick(Duration::from_secs(2)).is_empty());
        assert_eq!(seq.reset(), vec![AudioCommand::Suspend]);
        assert_eq!(seq.current_step(), 0);
    }

    #[test]
    fn generated_pattern_replaces_everything_or_nothing() {
        let mut seq = Sequencer::new(100.0);
        seq.toggle_step(Instrument::Perc, 5);
        seq.play();
        for _ in 0..3 {
            seq.tick(Duration::from_millis(150));
        }
        let step_before = seq.current_step();

        let good = format!(
            "{{{},{},{},{}}}",
            full_row("kick", &[0, 8]),
            full_row("snare", &[4, 12]),
            full_row("hihat", &[]),
            full_row("perc", &[]),
        );
        seq.apply_generated(&good).unwrap();
        assert!(seq.pattern().is_hit(Instrument::Kick, 8));
        assert!(!seq.pattern().is_hit(Instrument::Perc, 5));
        assert!(seq.is_playing());
        assert_eq!(seq.current_step(), step_before);
        assert_eq!(seq.bpm(), 100.0);

        let before = *seq.pattern();
        let short = r#"{"kick":[true,false,true,false,true,false,true,false],"snare":[],"hihat":[],"perc":[]}"#;
        assert!(seq.apply_generated(short).is_err());
        assert_eq!(*seq.pattern(), before);
    }

    #[test]
    fn nudge_rounds_and_clamps() {
        let mut seq = Sequencer::new(90.0);
        assert_eq!(seq.nudge_bpm(5.0), Ok(95.0));
        assert_eq!(seq.nudge_bpm(-500.0), Ok(20.0));
    }
}
