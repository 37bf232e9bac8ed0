use clap::Parser;
use std::path::PathBuf;

use deconstruct::{AnalysisSettings, Feature};

#[derive(Parser, Debug)]
#[command(name = "deconstruct", about = "Extract automation curves from an audio file")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Features to extract (comma-separated); defaults to all
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<Feature>,

    /// Channel to analyse for single-channel features
    #[arg(short, long)]
    pub channel: Option<usize>,

    /// Directory for the breakpoint files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Analysis window in milliseconds (Amplitude, Panning)
    #[arg(long)]
    pub window_ms: Option<f32>,

    /// Hop size as a percentage of the window (Amplitude, Panning)
    #[arg(long)]
    pub hop_pct: Option<f32>,

    /// Keep raw levels instead of scaling each curve to its peak
    #[arg(long)]
    pub no_normalize: bool,

    /// Smooth every output curve
    #[arg(long)]
    pub smooth: bool,

    /// Smoothing time constant in milliseconds
    #[arg(long)]
    pub smooth_ms: Option<f32>,

    /// Config file (defaults to ./deconstruct.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// List available features and exit
    #[arg(long)]
    pub list_features: bool,

    /// Print the feature list as JSON
    #[arg(long, requires = "list_features")]
    pub json: bool,

    /// Breakpoint file to load over an extracted feature before export
    #[arg(long, requires = "import_into")]
    pub import: Option<PathBuf>,

    /// Feature the imported file belongs to
    #[arg(long)]
    pub import_into: Option<Feature>,

    /// Import the whole file into this output instead of matching blocks by name
    #[arg(long)]
    pub import_output: Option<usize>,
}

impl Cli {
    /// Overrides config values with whatever was given on the command line.
    pub fn apply(&self, settings: &mut AnalysisSettings) {
        if let Some(ms) = self.window_ms {
            settings.window_size_ms = ms;
        }
        if let Some(pct) = self.hop_pct {
            settings.hop_size_pct = pct;
        }
        if self.no_normalize {
            settings.normalize_output = false;
        }
        if self.smooth {
            settings.smooth_output = true;
        }
        if let Some(ms) = self.smooth_ms {
            settings.smooth_time_ms = ms;
        }
    }
}
