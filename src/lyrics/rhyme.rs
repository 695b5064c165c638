use std::collections::HashMap;

use super::lyric_lines;
use crate::shared::Rgb;

// stripped before looking at a word's ending
const PUNCTUATION: &[char] = &['،', '.', '؟', '!', ';', ':', '«', '»', '(', ')', '[', ']'];
const STEM_CHARS: usize = 2;

pub const PALETTE: [Rgb; 8] = [
    Rgb(0x00, 0xff, 0xff),
    Rgb(0xff, 0x00, 0xff),
    Rgb(0x39, 0xff, 0x14),
    Rgb(0xff, 0xff, 0x00),
    Rgb(0x8b, 0x5c, 0xf6),
    Rgb(0xec, 0x48, 0x99),
    Rgb(0x06, 0xb6, 0xd4),
    Rgb(0x84, 0xcc, 0x16),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RhymeMatch {
    pub word: String,
    pub line_index: usize,
    pub word_index: usize,
    pub color: Rgb,
    pub is_internal: bool, // reserved, never set
}

// Last two characters of the word once punctuation is gone; None for
// anything shorter.
pub fn stem(word: &str) -> Option<String> {
    let clean: String = word.chars().filter(|c| !PUNCTUATION.contains(c)).collect();
    let chars: Vec<char> = clean.trim().chars().collect();
    if chars.len() < STEM_CHARS {
        return None;
    }
    Some(chars[chars.len() - STEM_CHARS..].iter().collect())
}

// A word rhymes when its stem shows up at any other position in the text,
// the same word repeated elsewhere included. Counting stem occurrences up
// front gives exactly the pairwise answer: "another position shares my stem"
// is "my stem occurs at least twice".
pub fn analyze(text: &str) -> Vec<RhymeMatch> {
    let words: Vec<Vec<(&str, Option<String>)>> = lyric_lines(text)
        .map(|line| line.split_whitespace().map(|w| (w, stem(w))).collect())
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for s in words.iter().flatten().filter_map(|(_, s)| s.as_deref()) {
        *occurrences.entry(s).or_default() += 1;
    }

    let mut colors: HashMap<&str, Rgb> = HashMap::new();
    let mut matches = Vec::new();
    for (line_index, line) in words.iter().enumerate() {
        for (word_index, (word, stem)) in line.iter().enumerate() {
            let Some(stem) = stem.as_deref() else {
                continue;
            };
            if occurrences.get(stem).copied().unwrap_or(0) < 2 {
                continue;
            }
            let next = colors.len();
            let color = *colors.entry(stem).or_insert(PALETTE[next % PALETTE.len()]);
            matches.push(RhymeMatch {
                word: word.to_string(),
                line_index,
                word_index,
                color,
                is_internal: false,
            });
        }
    }
    matches
}
