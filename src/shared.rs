// The current input plan:
//
// Step buttons (the 16 cells of the selected instrument row):
//   1 2 3 4       //  ToggleStep(0 or ... or 3)
//   q w e r       //  ToggleStep(4 or ... or 7)
//   a s d f       //  ToggleStep(8 or ... or 11)
//   z x c v       //  ToggleStep(12 or ... or 15)
//
// Instrument rows:
//   Up / Down     //  PrevInstrument / NextInstrument
//
// Transport:
//   Space         //  PlayPress (play/pause, cursor is kept)
//   Backspace     //  StopReset (stop and rewind to step 0)
//   [ / ]         //  AdjustBpm(-1 / +1)
//   - / =         //  AdjustBpm(-5 / +5)
//
// Everything else:
//   i             //  GeneratePattern (asks the external generator for a fill)
//   0             //  ClearPattern
//   k             //  CheckAudio (plays a kick)
//   m             //  ToggleRhymes
//   l             //  ReloadLyrics
//   b             //  Bake (renders one cycle to a wav)
//   Esc           //  Quit
//
// The middle layer owns the sequencer and lyric state, the TUI only draws
// whatever `DisplayState` says on every frame.

pub const NUM_STEPS: usize = 16;
pub const NUM_INSTRUMENTS: usize = 4;

pub const DEFAULT_BPM: f32 = 90.0;
pub const MIN_BPM: f32 = 20.0;
pub const MAX_BPM: f32 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

// Enumeration order matters: hits on the same step always fire in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instrument {
    Kick,
    Snare,
    HiHat,
    Perc,
}

impl Instrument {
    pub const ALL: [Instrument; NUM_INSTRUMENTS] = [
        Instrument::Kick,
        Instrument::Snare,
        Instrument::HiHat,
        Instrument::Perc,
    ];

    pub fn index(self) -> usize {
        match self {
            Instrument::Kick => 0,
            Instrument::Snare => 1,
            Instrument::HiHat => 2,
            Instrument::Perc => 3,
        }
    }

    // key used by the pattern generator's json
    pub fn key(self) -> &'static str {
        match self {
            Instrument::Kick => "kick",
            Instrument::Snare => "snare",
            Instrument::HiHat => "hihat",
            Instrument::Perc => "perc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Instrument::Kick => "KICK",
            Instrument::Snare => "SNARE",
            Instrument::HiHat => "HI-HAT",
            Instrument::Perc => "PERC",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Instrument::Kick => Rgb(0x00, 0xff, 0xff),
            Instrument::Snare => Rgb(0xff, 0x00, 0xff),
            Instrument::HiHat => Rgb(0x39, 0xff, 0x14),
            Instrument::Perc => Rgb(0xff, 0xff, 0x00),
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % NUM_INSTRUMENTS]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + NUM_INSTRUMENTS - 1) % NUM_INSTRUMENTS]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // step grid
    ToggleStep(u8), // index 0-15 on the selected row
    NextInstrument,
    PrevInstrument,

    // transport
    PlayPress,
    StopReset,
    AdjustBpm(f32),

    // pattern
    GeneratePattern,
    ClearPattern,
    CheckAudio,
    Bake,

    // lyrics
    ToggleRhymes,
    ReloadLyrics,

    Quit,
}

#[derive(Clone, Debug)]
pub struct RhymeSpan {
    pub text: String,
    pub color: Option<Rgb>,
}

#[derive(Clone, Debug)]
pub enum LyricLine {
    Section(String),
    Blank,
    Words(Vec<RhymeSpan>),
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub grid: [[bool; NUM_STEPS]; NUM_INSTRUMENTS],
    pub current_step: u8,
    pub playing: bool,
    pub selected_instrument: Instrument,
    pub bpm: f32,
    pub style: String,
    pub generating: bool,
    pub status_text: String, // last thing worth telling the user
    pub audio_state: &'static str, // "idle", "running", "suspended", "no audio"
    pub show_rhymes: bool,
    pub lyric_lines: Vec<LyricLine>,
    pub rhyme_count: usize,
    pub intensity: u32,
    pub word_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_order_is_fixed() {
        let idx: Vec<usize> = Instrument::ALL.iter().map(|i| i.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(Instrument::Perc.next(), Instrument::Kick);
        assert_eq!(Instrument::Kick.prev(), Instrument::Perc);
    }

    #[test]
    fn instrument_colors() {
        assert_eq!(Instrument::Kick.color(), Rgb(0x00, 0xff, 0xff));
        assert_eq!(Instrument::HiHat.color(), Rgb(0x39, 0xff, 0x14));
    }
}
