use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};

mod bake;
mod drums;
mod engine;
mod filter;
mod ramp;
mod voice;

pub use bake::bake_to_wav;
pub use drums::DrumSynth;
pub use voice::Voice;

use engine::Engine;

// The single output context of the process. Created on the first sound,
// resumable after a suspend. `Unavailable` is terminal: the device refused
// once, we stay silent instead of retrying on every step.
#[derive(Default)]
pub enum AudioContext {
    #[default]
    Uninitialized,
    Running(OutputStream),
    Suspended(OutputStream),
    Unavailable,
}

impl AudioContext {
    pub fn state_label(&self) -> &'static str {
        match self {
            AudioContext::Uninitialized => "idle",
            AudioContext::Running(_) => "running",
            AudioContext::Suspended(_) => "suspended",
            AudioContext::Unavailable => "no audio",
        }
    }

    // create-or-resume; idempotent, never fails loudly
    pub fn ensure(&mut self) -> Option<&OutputStream> {
        let next = match std::mem::replace(self, AudioContext::Unavailable) {
            AudioContext::Uninitialized => match OutputStream::open() {
                Ok(out) => {
                    info!("audio output running at {} Hz", out.sample_rate());
                    AudioContext::Running(out)
                }
                Err(e) => {
                    warn!("audio output unavailable, drums are muted: {e:#}");
                    AudioContext::Unavailable
                }
            },
            AudioContext::Suspended(out) => match out.stream.play() {
                Ok(()) => {
                    info!("audio output resumed");
                    AudioContext::Running(out)
                }
                Err(e) => {
                    warn!("could not resume audio output: {e}");
                    AudioContext::Suspended(out)
                }
            },
            other => other,
        };
        *self = next;

        match self {
            AudioContext::Running(out) => Some(out),
            _ => None,
        }
    }

    pub fn suspend(&mut self) {
        let next = match std::mem::replace(self, AudioContext::Unavailable) {
            AudioContext::Running(out) => match out.stream.pause() {
                Ok(()) => {
                    info!("audio output suspended");
                    AudioContext::Suspended(out)
                }
                Err(e) => {
                    // some backends can't pause; keep running rather than lose the stream
                    warn!("could not suspend audio output: {e}");
                    AudioContext::Running(out)
                }
            },
            other => other,
        };
        *self = next;
    }
}

pub struct OutputStream {
    tx: Sender<Voice>,
    sample_rate: f32,
    stream: cpal::Stream,
}

impl OutputStream {
    pub fn open() -> anyhow::Result<Self> {
        // voices are small, but the callback drains them every block anyway
        let (tx, rx) = crossbeam_channel::bounded::<Voice>(256);

        let host = cpal::default_host();
        let device = host.default_output_device().context("no default output device")?;
        let config = device.default_output_config().context("no default output config")?;

        let sample_rate = config.sample_rate() as f32;
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_output_stream_f32(&device, &config.into(), rx, channels)?,
            other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
        };
        stream.play().context("failed to play output stream")?;

        Ok(Self { tx, sample_rate, stream })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn send(&self, voice: Voice) {
        if self.tx.try_send(voice).is_err() {
            warn!("voice queue full, dropping a hit");
        }
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<Voice>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(voice) = rx.try_recv() {
                engine.start_voice(voice);
            }
            engine.render_block(data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_context_stays_silent() {
        let mut ctx = AudioContext::Unavailable;
        assert!(ctx.ensure().is_none());
        ctx.suspend();
        assert!(matches!(ctx, AudioContext::Unavailable));
        assert_eq!(ctx.state_label(), "no audio");
    }

    #[test]
    fn suspending_before_first_sound_does_nothing() {
        let mut ctx = AudioContext::default();
        ctx.suspend();
        assert!(matches!(ctx, AudioContext::Uninitialized));
        assert_eq!(ctx.state_label(), "idle");
    }
}
