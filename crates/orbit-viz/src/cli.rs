//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::utils::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "orbit-viz")]
#[command(about = "Audio-reactive orbiting particle field", long_about = None)]
pub struct Args {
    /// Capture device name, "default", or a .wav file to play
    #[arg(long, short, value_name = "SOURCE")]
    pub source: Option<String>,

    /// Number of frequency bands
    #[arg(long, value_name = "COUNT")]
    pub bands: Option<usize>,

    /// Time smoothing between analysis frames (0.0 - 1.0)
    #[arg(long, value_name = "FACTOR")]
    pub smoothing: Option<f32>,

    /// Analyse media without sending it to the speakers
    #[arg(long)]
    pub muted: bool,

    /// Open a window instead of going fullscreen
    #[arg(long, short)]
    pub windowed: bool,

    /// Show the signal readout overlay
    #[arg(long)]
    pub hud: bool,

    /// Print capture devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Config file (default: ~/.orbit-viz.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::default_path)
    }

    /// Command line flags take precedence over the config file
    pub fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.source = Some(source.clone());
        }
        if let Some(bands) = self.bands {
            config.band_count = Some(bands);
        }
        if let Some(smoothing) = self.smoothing {
            config.smoothing = Some(smoothing);
        }
        if self.muted {
            config.muted = Some(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "orbit-viz",
            "--source",
            "song.wav",
            "--bands",
            "128",
            "--muted",
        ])
        .unwrap();

        let mut config = Config::parse("source = \"mic\"\nsmoothing = 0.5\n").unwrap();
        args.apply(&mut config);

        assert_eq!(config.source(), "song.wav");
        assert_eq!(config.analyzer().band_count, 128);
        assert_eq!(config.analyzer().smoothing, 0.5);
        assert!(config.analyzer().muted);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::try_parse_from(["orbit-viz", "-w"]).unwrap();
        assert!(args.windowed);

        let mut config = Config::parse("muted = true\n").unwrap();
        args.apply(&mut config);
        assert!(config.analyzer().muted);
        assert_eq!(config.source(), "default");
    }
}
