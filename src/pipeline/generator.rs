// The external pattern generator. We only know how to ask (a prompt) and what
// comes back (json text); whatever model sits behind the command is not our
// business. Runs off the UI thread, one request at a time.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

const LYRICS_EXCERPT_CHARS: usize = 200;

// a failed run is retried this many times, waiting 2s, 4s, 8s in between
const RETRIES: u32 = 3;
const FIRST_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
pub struct PatternRequest {
    pub lyrics: String,
    pub bpm: f32,
    pub style: String,
}

impl PatternRequest {
    pub fn prompt(&self) -> String {
        let excerpt: String = self.lyrics.chars().take(LYRICS_EXCERPT_CHARS).collect();
        format!(
            "Based on these lyrics: \"{excerpt}...\"\n\
             Style: {}, BPM: {}.\n\
             Generate a 16-step rhythmic drum sequence for Kick, Snare, Hihat, and Perc.\n\
             The pattern should match the vibe of the lyrics.\n\
             Answer with JSON only: an object with the keys \"kick\", \"snare\", \"hihat\" \
             and \"perc\", each an array of exactly 16 booleans.",
            self.style, self.bpm
        )
    }
}

pub trait PatternSource: Send + Sync {
    // raw json text, validated by the caller
    fn generate(&self, request: &PatternRequest) -> anyhow::Result<String>;
}

impl<F> PatternSource for F
where
    F: Fn(&PatternRequest) -> anyhow::Result<String> + Send + Sync,
{
    fn generate(&self, request: &PatternRequest) -> anyhow::Result<String> {
        self(request)
    }
}

// Pipes the prompt into a user configured command and reads json from stdout.
// Flaky commands (rate limits, network) get a few more tries with a doubling
// pause in between.
pub struct CommandPatternSource {
    argv: Vec<String>,
    retries: u32,
    backoff: Duration,
}

impl CommandPatternSource {
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.first().is_none_or(|p| p.trim().is_empty()) {
            return None;
        }
        Some(Self {
            argv,
            retries: RETRIES,
            backoff: FIRST_BACKOFF,
        })
    }

    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    fn run_once(&self, prompt: &str) -> anyhow::Result<String> {
        let (program, args) = self.argv.split_first().context("empty generator command")?;
        debug!("running pattern generator {program:?}");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("could not start {program}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(prompt.as_bytes()) {
                // commands like `cat fill.json` never read the prompt
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("{program} closed stdin without reading the prompt");
                }
                other => other.context("could not send the prompt")?,
            }
        } // stdin dropped here so the command sees eof

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }
        let stdout = String::from_utf8(output.stdout).context("generator output is not utf-8")?;
        Ok(strip_code_fences(&stdout).to_string())
    }
}

impl PatternSource for CommandPatternSource {
    fn generate(&self, request: &PatternRequest) -> anyhow::Result<String> {
        let prompt = request.prompt();
        let mut delay = self.backoff;
        let mut retry = 0;
        loop {
            match self.run_once(&prompt) {
                Ok(text) => return Ok(text),
                Err(e) if retry < self.retries => {
                    retry += 1;
                    warn!("pattern generator failed ({e:#}), retry {retry}/{} in {delay:?}", self.retries);
                    std::thread::sleep(delay);
                    delay *= 2;
                }
                Err(e) => return Err(e.context(format!("gave up after {} attempts", retry + 1))),
            }
        }
    }
}

// Models love wrapping json in ```json fences; take what's inside.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

// One request in flight at most; results come back over a channel the UI
// loop polls every frame.
pub struct GeneratorWorker {
    source: Arc<dyn PatternSource>,
    done_tx: Sender<anyhow::Result<String>>,
    done_rx: Receiver<anyhow::Result<String>>,
    busy: bool,
}

impl GeneratorWorker {
    pub fn new(source: Arc<dyn PatternSource>) -> Self {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        Self { source, done_tx, done_rx, busy: false }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    // false if a request is already running
    pub fn request(&mut self, request: PatternRequest) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        info!("asking for a {} pattern at {} bpm", request.style, request.bpm);
        let source = Arc::clone(&self.source);
        let tx = self.done_tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(source.generate(&request));
        });
        true
    }

    pub fn poll(&mut self) -> Option<anyhow::Result<String>> {
        let result = self.done_rx.try_recv().ok()?;
        self.busy = false;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PatternRequest {
        PatternRequest {
            lyrics: "سلام دنیا".repeat(50),
            bpm: 95.0,
            style: String::from("Boom Bap"),
        }
    }

    #[test]
    fn prompt_truncates_lyrics_by_chars() {
        let prompt = request().prompt();
        assert!(prompt.contains("Style: Boom Bap, BPM: 95."));
        assert!(prompt.contains("16-step"));
        let quoted = prompt.split('"').nth(1).unwrap();
        assert_eq!(quoted.chars().count(), 200 + 3);
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn empty_command_is_no_generator() {
        assert!(CommandPatternSource::new(vec![]).is_none());
        assert!(CommandPatternSource::new(vec![String::from(" ")]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_source_reads_stdout() {
        let source = CommandPatternSource::new(vec![
            String::from("sh"),
            String::from("-c"),
            String::from("cat > /dev/null; printf '```json\\n{\"ok\":true}\\n```\\n'"),
        ])
        .unwrap();
        assert_eq!(source.generate(&request()).unwrap(), "{\"ok\":true}");
    }

    #[cfg(unix)]
    fn sh(script: &str, extra: &[&str]) -> CommandPatternSource {
        let mut argv = vec![String::from("sh"), String::from("-c"), script.to_string(), String::from("sh")];
        argv.extend(extra.iter().map(|a| a.to_string()));
        CommandPatternSource::new(argv).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_an_error() {
        let source = sh("cat > /dev/null; echo nope >&2; exit 3", &[]).with_retries(0, Duration::ZERO);
        let err = source.generate(&request()).unwrap_err();
        assert!(format!("{err:#}").contains("nope"));
        assert!(format!("{err:#}").contains("after 1 attempts"));
    }

    #[cfg(unix)]
    #[test]
    fn command_that_ignores_stdin_still_answers() {
        // closes stdin before the prompt may have been written
        let source = sh("exec 0<&-; sleep 0.05; printf '{}'", &[]).with_retries(0, Duration::ZERO);
        for _ in 0..10 {
            assert_eq!(source.generate(&request()).unwrap(), "{}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn retries_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("runs");
        let log = log.to_str().unwrap();
        let source = sh("cat > /dev/null; echo run >> \"$1\"; exit 1", &[log])
            .with_retries(2, Duration::ZERO);

        let err = source.generate(&request()).unwrap_err();
        assert!(format!("{err:#}").contains("after 3 attempts"));
        let runs = std::fs::read_to_string(log).unwrap();
        assert_eq!(runs.lines().count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn a_retry_can_recover() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("tried");
        let marker = marker.to_str().unwrap();
        let source = sh(
            "cat > /dev/null; if [ -e \"$1\" ]; then printf '{}'; else touch \"$1\"; exit 1; fi",
            &[marker],
        )
        .with_retries(3, Duration::from_millis(1));
        assert_eq!(source.generate(&request()).unwrap(), "{}");
    }

    #[test]
    fn worker_runs_one_request_at_a_time() {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let source = move |req: &PatternRequest| -> anyhow::Result<String> {
            let _ = gate_rx.recv();
            Ok(format!("{}", req.bpm))
        };
        let mut worker = GeneratorWorker::new(Arc::new(source));
        assert!(worker.request(request()));
        assert!(!worker.request(request()));
        assert!(worker.poll().is_none());

        gate_tx.send(()).unwrap();
        let mut result = None;
        for _ in 0..200 {
            if let Some(r) = worker.poll() {
                result = Some(r);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result.unwrap().unwrap(), "95");
        assert!(!worker.is_busy());
    }
}
