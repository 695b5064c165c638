// Middle layer: owns the sequencer and the lyric analysis, turns input events
// into audio commands and builds the DisplayState the TUI draws every frame.

use std::time::Duration;

use log::{info, warn};

use crate::audio_api::AudioCommand;
use crate::lyrics::{is_lyric_line, LyricStats};
use crate::pipeline::generator::PatternRequest;
use crate::pipeline::pattern::Pattern;
use crate::pipeline::sequencer::Sequencer;
use crate::shared::{DisplayState, InputEvent, Instrument, LyricLine, RhymeSpan};

pub struct Middle {
    sequencer: Sequencer,
    selected: Instrument,
    style: String,
    lyrics: String,
    stats: LyricStats,
    show_rhymes: bool,
    generating: bool,
    status_text: String,
    audio_state: &'static str,
}

impl Middle {
    pub fn new(bpm: f32, style: String, lyrics: String) -> Self {
        let sequencer = Sequencer::new(bpm);
        let stats = LyricStats::compute(&lyrics, sequencer.bpm());
        Self {
            sequencer,
            selected: Instrument::Kick,
            style,
            lyrics,
            stats,
            show_rhymes: true,
            generating: false,
            status_text: String::new(),
            audio_state: "idle",
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        match event {
            InputEvent::ToggleStep(step) => self.sequencer.toggle_step(self.selected, step as usize),
            InputEvent::NextInstrument => {
                self.selected = self.selected.next();
                Vec::new()
            }
            InputEvent::PrevInstrument => {
                self.selected = self.selected.prev();
                Vec::new()
            }
            InputEvent::PlayPress => self.sequencer.toggle_play(),
            InputEvent::StopReset => self.sequencer.reset(),
            InputEvent::AdjustBpm(delta) => {
                match self.sequencer.nudge_bpm(delta) {
                    // intensity depends on tempo
                    Ok(_) => self.refresh_stats(),
                    Err(e) => self.set_status(format!("tempo unchanged: {e}")),
                }
                Vec::new()
            }
            InputEvent::ClearPattern => {
                self.sequencer.clear_pattern();
                self.set_status("pattern cleared");
                Vec::new()
            }
            InputEvent::CheckAudio => vec![AudioCommand::Trigger(Instrument::Kick)],
            InputEvent::ToggleRhymes => {
                self.show_rhymes = !self.show_rhymes;
                Vec::new()
            }
            // file, worker and quit handling live in main
            InputEvent::GeneratePattern
            | InputEvent::ReloadLyrics
            | InputEvent::Bake
            | InputEvent::Quit => Vec::new(),
        }
    }

    pub fn tick(&mut self, elapsed: f64) -> Vec<AudioCommand> {
        self.sequencer.tick(Duration::from_secs_f64(elapsed.max(0.0)))
    }

    pub fn pattern(&self) -> &Pattern {
        self.sequencer.pattern()
    }

    pub fn bpm(&self) -> f32 {
        self.sequencer.bpm()
    }

    pub fn set_lyrics(&mut self, text: String) {
        self.lyrics = text;
        self.refresh_stats();
    }

    pub fn set_audio_state(&mut self, label: &'static str) {
        self.audio_state = label;
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    // None while a request is already out
    pub fn begin_generation(&mut self) -> Option<PatternRequest> {
        if self.generating {
            return None;
        }
        self.generating = true;
        self.set_status("asking for a pattern...");
        Some(PatternRequest {
            lyrics: self.lyrics.clone(),
            bpm: self.bpm(),
            style: self.style.clone(),
        })
    }

    // Either the whole grid is swapped or the old one stays; no retries here.
    pub fn on_pattern_generated(&mut self, result: anyhow::Result<String>) {
        self.generating = false;
        match result {
            Ok(raw) => match self.sequencer.apply_generated(&raw) {
                Ok(()) => self.set_status("AI fill applied"),
                Err(e) => self.set_status(format!("AI fill rejected: {e}")),
            },
            Err(e) => {
                warn!("pattern generator failed: {e:#}");
                self.set_status(format!("AI fill failed: {e}"));
            }
        }
    }

    fn refresh_stats(&mut self) {
        self.stats = LyricStats::compute(&self.lyrics, self.sequencer.bpm());
        info!(
            "lyrics analyzed: {} rhymes, intensity {}%",
            self.stats.rhyme_count(),
            self.stats.intensity
        );
    }

    fn lyric_lines(&self) -> Vec<LyricLine> {
        let mut lyric_index = 0;
        self.lyrics
            .lines()
            .map(|line| {
                if line.starts_with('[') {
                    return LyricLine::Section(line.trim().to_string());
                }
                if !is_lyric_line(line) {
                    return LyricLine::Blank;
                }
                let spans = line
                    .split_whitespace()
                    .enumerate()
                    .map(|(word_index, word)| RhymeSpan {
                        text: word.to_string(),
                        color: self
                            .show_rhymes
                            .then(|| self.stats.match_at(lyric_index, word_index))
                            .flatten()
                            .map(|m| m.color),
                    })
                    .collect();
                lyric_index += 1;
                LyricLine::Words(spans)
            })
            .collect()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            grid: self.sequencer.pattern().grid(),
            current_step: self.sequencer.current_step(),
            playing: self.sequencer.is_playing(),
            selected_instrument: self.selected,
            bpm: self.sequencer.bpm(),
            style: self.style.clone(),
            generating: self.generating,
            status_text: self.status_text.clone(),
            audio_state: self.audio_state,
            show_rhymes: self.show_rhymes,
            lyric_lines: self.lyric_lines(),
            rhyme_count: self.stats.rhyme_count(),
            intensity: self.stats.intensity,
            word_count: self.stats.word_count,
        }
    }
}
