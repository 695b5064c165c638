use super::rhyme::{analyze, RhymeMatch};
use super::lyric_lines;

const SYLLABLES_PER_WORD: f64 = 1.5;

// Rough "flow intensity" 0..=100: average estimated syllables per line scaled
// by tempo. Presentational only.
pub fn intensity(text: &str, bpm: f32) -> u32 {
    let per_line: Vec<f64> = lyric_lines(text)
        .map(|l| l.split_whitespace().count() as f64 * SYLLABLES_PER_WORD)
        .collect();
    if per_line.is_empty() {
        return 0;
    }
    let avg = per_line.iter().sum::<f64>() / per_line.len() as f64;
    // operand order matters for the floor: x / 1000 * 5 is not bitwise x * 5 / 1000
    let score = (avg * bpm.max(0.0) as f64 / 1000.0 * 5.0).floor();
    score.min(100.0) as u32
}

// every whitespace separated token of the whole text, markers included
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// Everything the lyric pane shows, recomputed from scratch on every change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LyricStats {
    pub rhymes: Vec<RhymeMatch>,
    pub intensity: u32,
    pub word_count: usize,
}

impl LyricStats {
    pub fn compute(text: &str, bpm: f32) -> Self {
        Self {
            rhymes: analyze(text),
            intensity: intensity(text, bpm),
            word_count: word_count(text),
        }
    }

    // "rhyme density" in the analytics line
    pub fn rhyme_count(&self) -> usize {
        self.rhymes.len()
    }

    pub fn match_at(&self, line_index: usize, word_index: usize) -> Option<&RhymeMatch> {
        self.rhymes
            .iter()
            .find(|m| m.line_index == line_index && m.word_index == word_index)
    }
}
