// The drum grid and the json shape the pattern generator hands back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::{Instrument, NUM_INSTRUMENTS, NUM_STEPS};

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{instrument} has {len} steps, expected 16")]
    WrongLength { instrument: &'static str, len: usize },
}

// One row of 16 hits per instrument. Fixed-size arrays, so every row is always
// exactly 16 long no matter how it was edited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    rows: [[bool; NUM_STEPS]; NUM_INSTRUMENTS],
}

// What the generator returns: { "kick": [..], "snare": [..], "hihat": [..], "perc": [..] }
#[derive(Debug, Serialize, Deserialize)]
struct PatternJson {
    kick: Vec<bool>,
    snare: Vec<bool>,
    hihat: Vec<bool>,
    perc: Vec<bool>,
}

impl Pattern {
    pub fn is_hit(&self, instrument: Instrument, step: usize) -> bool {
        self.rows[instrument.index()].get(step).copied().unwrap_or(false)
    }

    pub fn set(&mut self, instrument: Instrument, step: usize, on: bool) {
        if let Some(cell) = self.rows[instrument.index()].get_mut(step) {
            *cell = on;
        }
    }

    // flips a cell, returns its new value (false for out of range steps)
    pub fn toggle(&mut self, instrument: Instrument, step: usize) -> bool {
        let on = step < NUM_STEPS && !self.is_hit(instrument, step);
        self.set(instrument, step, on);
        on
    }

    pub fn row(&self, instrument: Instrument) -> &[bool; NUM_STEPS] {
        &self.rows[instrument.index()]
    }

    pub fn grid(&self) -> [[bool; NUM_STEPS]; NUM_INSTRUMENTS] {
        self.rows
    }

    // instruments with a hit on `step`, in firing order
    pub fn hits_at(&self, step: usize) -> impl Iterator<Item = Instrument> + '_ {
        Instrument::ALL
            .into_iter()
            .filter(move |&i| self.is_hit(i, step))
    }

    pub fn hit_count(&self) -> usize {
        self.rows.iter().flatten().filter(|&&on| on).count()
    }

    // Strict parse: all four instruments present, each exactly 16 booleans.
    pub fn from_json(text: &str) -> Result<Self, PatternError> {
        let raw: PatternJson = serde_json::from_str(text)?;
        let mut pattern = Pattern::default();
        for (instrument, row) in [
            (Instrument::Kick, raw.kick),
            (Instrument::Snare, raw.snare),
            (Instrument::HiHat, raw.hihat),
            (Instrument::Perc, raw.perc),
        ] {
            let steps: [bool; NUM_STEPS] = row.try_into().map_err(|row: Vec<bool>| {
                PatternError::WrongLength { instrument: instrument.key(), len: row.len() }
            })?;
            pattern.rows[instrument.index()] = steps;
        }
        Ok(pattern)
    }

    pub fn to_json(&self) -> String {
        let raw = PatternJson {
            kick: self.row(Instrument::Kick).to_vec(),
            snare: self.row(Instrument::Snare).to_vec(),
            hihat: self.row(Instrument::HiHat).to_vec(),
            perc: self.row(Instrument::Perc).to_vec(),
        };
        // a struct of bool vecs always serializes
        serde_json::to_string(&raw).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_json(hits: &[usize], len: usize) -> String {
        let cells: Vec<String> = (0..len).map(|i| hits.contains(&i).to_string()).collect();
        format!("[{}]", cells.join(","))
    }

    #[test]
    fn toggle_flips_and_reports() {
        let mut p = Pattern::default();
        assert!(p.toggle(Instrument::Snare, 4));
        assert!(p.is_hit(Instrument::Snare, 4));
        assert!(!p.toggle(Instrument::Snare, 4));
        assert_eq!(p.hit_count(), 0);
        // out of range does nothing
        assert!(!p.toggle(Instrument::Snare, 16));
        assert_eq!(p.row(Instrument::Snare).len(), 16);
    }

    #[test]
    fn parses_well_formed_generator_output() {
        let text = format!(
            r#"{{"kick":{},"snare":{},"hihat":{},"perc":{}}}"#,
            row_json(&[0, 8], 16),
            row_json(&[4, 12], 16),
            row_json(&[0, 2, 4, 6, 8, 10, 12, 14], 16),
            row_json(&[], 16),
        );
        let p = Pattern::from_json(&text).unwrap();
        assert!(p.is_hit(Instrument::Kick, 8));
        assert!(p.is_hit(Instrument::Snare, 12));
        assert_eq!(p.hit_count(), 12);
        assert_eq!(p.hits_at(0).collect::<Vec<_>>(), vec![Instrument::Kick, Instrument::HiHat]);
    }

    #[test]
    fn rejects_short_rows() {
        let text = format!(
            r#"{{"kick":{},"snare":{},"hihat":{},"perc":{}}}"#,
            row_json(&[0], 8),
            row_json(&[], 16),
            row_json(&[], 16),
            row_json(&[], 16),
        );
        match Pattern::from_json(&text) {
            Err(PatternError::WrongLength { instrument, len }) => {
                assert_eq!(instrument, "kick");
                assert_eq!(len, 8);
            }
            other => panic!("expected WrongLength, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_instrument_and_garbage() {
        let text = format!(r#"{{"kick":{}}}"#, row_json(&[], 16));
        assert!(matches!(Pattern::from_json(&text), Err(PatternError::Json(_))));
        assert!(matches!(Pattern::from_json("not json"), Err(PatternError::Json(_))));
        let wrong_type = r#"{"kick":[1,0],"snare":[],"hihat":[],"perc":[]}"#;
        assert!(Pattern::from_json(wrong_type).is_err());
    }

    #[test]
    fn json_survives_a_trip_through_the_generator_format() {
        let mut p = Pattern::default();
        p.set(Instrument::Perc, 15, true);
        assert_eq!(Pattern::from_json(&p.to_json()).unwrap(), p);
    }
}
