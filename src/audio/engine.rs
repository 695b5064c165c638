use super::voice::Voice;

// hard cap, the pool is allocated once and never grows inside the callback
const VOICE_CAPACITY: usize = 64;

// Lives inside the output callback. Voices come in finished, the engine only
// sums them and forgets the ones that ran out. Voices own no heap memory, so
// dropping them here frees nothing.
pub struct Engine {
    voices: Vec<Voice>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            voices: Vec::with_capacity(VOICE_CAPACITY),
        }
    }

    // A full pool gives up the voice closest to its end.
    pub fn start_voice(&mut self, voice: Voice) {
        if self.voices.len() < VOICE_CAPACITY {
            self.voices.push(voice);
        } else if let Some(slot) = self.voices.iter_mut().min_by_key(|v| v.len_remaining()) {
            *slot = voice;
        }
    }

    #[cfg(test)]
    fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn next_sample(&mut self) -> f32 {
        self.voices.iter_mut().map(|v| v.next_sample()).sum()
    }

    // interleaved output, every channel gets the same mono mix
    pub fn render_block(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in data.chunks_exact_mut(channels) {
            let s = self.next_sample();
            frame.fill(s);
        }
        self.voices.retain(|v| !v.is_finished());
    }

    // mono rendering for offline use (bake)
    pub fn render_mono(&mut self, out: &mut [f32]) {
        for v in self.voices.iter_mut() {
            v.render_into(out);
        }
        self.voices.retain(|v| !v.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::drums;
    use crate::shared::Instrument;

    const SR: f32 = 8000.0;

    #[test]
    fn overlapping_voices_mix_and_expire() {
        let mut engine = Engine::new();
        engine.start_voice(drums::voice_for(Instrument::Kick, SR));
        engine.start_voice(drums::voice_for(Instrument::Snare, SR));
        assert_eq!(engine.active_voices(), 2);

        // snare is gone after 0.12s, kick after 0.4s
        let mut block = vec![0.0; 2 * 1000];
        engine.render_block(&mut block, 2);
        assert_eq!(engine.active_voices(), 1);
        engine.render_block(&mut block, 2);
        engine.render_block(&mut block, 2);
        engine.render_block(&mut block, 2);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn channels_carry_the_same_signal() {
        let mut engine = Engine::new();
        engine.start_voice(drums::voice_for(Instrument::Perc, SR));
        let mut block = vec![0.0; 2 * 64];
        engine.render_block(&mut block, 2);
        for frame in block.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn pool_never_grows_past_capacity() {
        let mut engine = Engine::new();
        let capacity = engine.voices.capacity();
        for _ in 0..VOICE_CAPACITY {
            engine.start_voice(drums::voice_for(Instrument::HiHat, SR));
        }
        // one render so the hats are shorter than a fresh kick
        let mut block = vec![0.0; 8];
        engine.render_block(&mut block, 1);

        engine.start_voice(drums::voice_for(Instrument::Kick, SR));
        assert_eq!(engine.active_voices(), VOICE_CAPACITY);
        assert_eq!(engine.voices.capacity(), capacity);
        let kick_len = drums::voice_for(Instrument::Kick, SR).len_remaining();
        assert!(engine.voices.iter().any(|v| v.len_remaining() == kick_len));
    }

    #[test]
    fn silent_without_voices() {
        let mut engine = Engine::new();
        let mut out = vec![1.0; 32];
        engine.render_block(&mut out, 1);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
