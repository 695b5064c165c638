mod rhyme;
mod stats;

pub use stats::LyricStats;

// Lines that take part in rhyme analysis: not blank, not a "[Verse 1]" marker.
// Everything indexed by `line_index` counts only these lines.
pub fn is_lyric_line(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with('[')
}

pub fn lyric_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|l| is_lyric_line(l))
}
