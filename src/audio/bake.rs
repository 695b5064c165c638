use std::path::Path;

use anyhow::Context;

use super::drums;
use super::engine::Engine;
use crate::pipeline::pattern::Pattern;
use crate::pipeline::transport::step_interval;
use crate::shared::{Instrument, NUM_STEPS};

// Offline render of one full 16-step cycle, starting at step 0, at the
// given tempo. Tails of late hits are cut at the end of the cycle.
pub fn render_cycle(pattern: &Pattern, bpm: f32, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let step_len = (step_interval(bpm).as_secs_f64() * sample_rate as f64).round() as usize;
    let mut out = vec![0.0f32; step_len * NUM_STEPS];
    let mut engine = Engine::new();

    for (step, chunk) in out.chunks_exact_mut(step_len.max(1)).enumerate() {
        for instrument in Instrument::ALL {
            if pattern.is_hit(instrument, step) {
                engine.start_voice(drums::voice_for(instrument, sr));
            }
        }
        engine.render_mono(chunk);
    }
    out
}

pub fn bake_to_wav(path: &Path, pattern: &Pattern, bpm: f32, sample_rate: u32) -> anyhow::Result<()> {
    let samples = render_cycle(pattern, bpm, sample_rate);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("could not create {}", path.display()))?;
    for s in samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
