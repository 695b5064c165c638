//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::pipeline::config::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "rapbeat")]
#[command(about = "Terminal drum machine and rhyme highlighter for rap lyrics", long_about = None)]
pub struct Args {
    /// Lyric sheet to analyze (UTF-8 text, "[Verse]" style section lines allowed)
    #[arg(value_name = "LYRICS")]
    pub lyrics: Option<PathBuf>,

    /// Directory holding .rapbeat/ (config, log, baked audio); defaults to the current directory
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Starting tempo, overrides the config file
    #[arg(long, value_name = "BPM")]
    pub bpm: Option<f32>,

    /// Style hint for the pattern generator, overrides the config file
    #[arg(long, value_name = "STYLE")]
    pub style: Option<String>,
}

impl Args {
    pub fn project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }

    /// Command line flags win over the config file
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(bpm) = self.bpm {
            config.bpm = bpm;
        }
        if let Some(style) = &self.style {
            config.style = style.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from(["rapbeat", "verse.txt", "--bpm", "140", "--style", "Trap"]).unwrap();
        assert_eq!(args.lyrics, Some(PathBuf::from("verse.txt")));
        let config = args.apply(Config::default());
        assert_eq!(config.bpm, 140.0);
        assert_eq!(config.style, "Trap");
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::try_parse_from(["rapbeat"]).unwrap();
        assert!(args.lyrics.is_none());
        assert_eq!(args.apply(Config::default()), Config::default());
    }
}
