mod audio;
mod audio_api;
mod cli;
mod loader;
mod lyrics;
mod middle;
mod pipeline;
mod shared;
mod tui;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use log::{info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::DrumSynth;
use loader::lyrics_loader;
use middle::Middle;
use pipeline::config;
use pipeline::generator::{CommandPatternSource, GeneratorWorker};
use shared::InputEvent;

const BAKE_SAMPLE_RATE: u32 = 44100;
const BAKE_FILE: &str = "bake.wav";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let project_dir = args.project_dir();

    let loaded = config::load_config(&project_dir);
    let file_config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&file_config.log_path(&project_dir))?;
    if let Err(e) = &loaded {
        warn!("ignoring config: {e:#}");
    }
    let config = args.apply(file_config);
    info!("project dir {}", project_dir.display());

    let lyrics = match &args.lyrics {
        Some(path) => lyrics_loader::load(path)?,
        None => String::new(),
    };

    let mut middle = Middle::new(config.bpm, config.style.clone(), lyrics);
    // nothing is opened until the first sound
    let mut synth = DrumSynth::new();
    let mut generator = CommandPatternSource::new(config.pattern_command.clone())
        .map(|source| GeneratorWorker::new(Arc::new(source)));
    if generator.is_none() {
        info!("no pattern_command configured, AI fill disabled");
    }

    terminal::enable_raw_mode()?;
    // Enable keyboard enhancement for real press/release detection.
    // Falls back gracefully if the terminal doesn't support it.
    let _ = crossterm::execute!(
        std::io::stdout(),
        terminal::EnterAlternateScreen,
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let blink_start = Instant::now();

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;
        middle.set_audio_state(synth.context().state_label());
        let ds = middle.display_state();

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, blink_on);
        })?;

        let events = tui::input::poll_input(tick_rate)?;
        for event in events {
            match event {
                InputEvent::Quit => {
                    info!("quit");
                    return Ok(());
                }
                InputEvent::GeneratePattern => request_pattern(&mut middle, generator.as_mut()),
                InputEvent::ReloadLyrics => reload_lyrics(&mut middle, args.lyrics.as_deref()),
                InputEvent::Bake => bake(&mut middle, &project_dir),
                other => {
                    for cmd in middle.handle_input(other) {
                        synth.handle_cmd(cmd);
                    }
                }
            }
        }

        // a finished generation lands here; warm the engine up for what follows
        if let Some(result) = generator.as_mut().and_then(|g| g.poll()) {
            middle.on_pattern_generated(result);
            synth.ensure_engine();
        }

        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        for cmd in middle.tick(elapsed) {
            synth.handle_cmd(cmd);
        }
    }
}

fn request_pattern(middle: &mut Middle, generator: Option<&mut GeneratorWorker>) {
    let Some(worker) = generator else {
        middle.set_status("no pattern_command in .rapbeat/config.json");
        return;
    };
    if worker.is_busy() || middle.is_generating() {
        return;
    }
    if let Some(request) = middle.begin_generation() {
        worker.request(request);
    }
}

fn reload_lyrics(middle: &mut Middle, path: Option<&Path>) {
    let Some(path) = path else {
        middle.set_status("no lyrics file given");
        return;
    };
    match lyrics_loader::load(path) {
        Ok(text) => {
            middle.set_lyrics(text);
            middle.set_status("lyrics reloaded");
        }
        Err(e) => {
            warn!("{e:#}");
            middle.set_status(format!("reload failed: {e}"));
        }
    }
}

fn bake(middle: &mut Middle, project_dir: &Path) {
    let path = config::rapbeat_dir(project_dir).join(BAKE_FILE);
    let result = std::fs::create_dir_all(config::rapbeat_dir(project_dir))
        .context("could not create .rapbeat/")
        .and_then(|()| audio::bake_to_wav(&path, middle.pattern(), middle.bpm(), BAKE_SAMPLE_RATE));
    match result {
        Ok(()) => {
            info!("baked one cycle to {}", path.display());
            middle.set_status(format!("baked to {}", path.display()));
        }
        Err(e) => {
            warn!("bake failed: {e:#}");
            middle.set_status(format!("bake failed: {e}"));
        }
    }
}

// The terminal belongs to the TUI, so log lines go to a file.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
