//! The loaded signal together with everything extracted from it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analysis::{AnalysisSettings, ExtractorRegistry, Feature};
use crate::audio::AudioSignal;
use crate::breakpoints::io::{self, ExportHeader};
use crate::breakpoints::{Breakpoint, BreakpointStore, FeatureResult};
use crate::error::{SessionError, StoreError};

/// Progress of the most recent extraction request.
///
/// Purely informational; it does not guard against concurrent calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnalysisState {
    #[default]
    Idle,
    Running(Feature),
    Done(Feature),
    Failed(Feature),
}

#[derive(Default)]
pub struct Session {
    signal: Option<AudioSignal>,
    source_name: String,
    registry: ExtractorRegistry,
    store: BreakpointStore,
    state: AnalysisState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the signal; previous results are dropped.
    pub fn load(&mut self, signal: AudioSignal, source_name: impl Into<String>) {
        self.signal = Some(signal);
        self.source_name = source_name.into();
        self.store.clear();
        self.state = AnalysisState::Idle;
    }

    pub fn clear(&mut self) {
        self.signal = None;
        self.source_name.clear();
        self.store.clear();
        self.state = AnalysisState::Idle;
    }

    pub fn has_signal(&self) -> bool {
        self.signal.is_some()
    }

    pub fn signal(&self) -> Option<&AudioSignal> {
        self.signal.as_ref()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Runs one extractor and stores its result in place of any previous one.
    pub fn extract(
        &mut self,
        feature: Feature,
        channel: usize,
        settings: &AnalysisSettings,
    ) -> Result<&FeatureResult, SessionError> {
        if let Err(err) = settings.validate() {
            self.state = AnalysisState::Failed(feature);
            return Err(err.into());
        }
        let Some(signal) = self.signal.as_ref() else {
            self.state = AnalysisState::Failed(feature);
            return Err(SessionError::NoSignal);
        };

        self.state = AnalysisState::Running(feature);
        let result = self.registry.run(feature, signal, channel, settings);
        log::info!(
            "Extracted {} (channel {}): {} points over {} output(s)",
            feature,
            signal.clamp_channel(channel),
            result.total_points(),
            result.num_outputs()
        );
        self.state = AnalysisState::Done(feature);
        Ok(self.store.insert(feature, result))
    }

    /// Every feature on channel 0.
    pub fn extract_all(&mut self, settings: &AnalysisSettings) -> Result<(), SessionError> {
        for feature in Feature::ALL {
            self.extract(feature, 0, settings)?;
        }
        Ok(())
    }

    pub fn is_extracted(&self, feature: Feature) -> bool {
        self.store.contains(feature)
    }

    pub fn extracted_features(&self) -> Vec<Feature> {
        self.store.features().collect()
    }

    pub fn result(&self, feature: Feature) -> Option<&FeatureResult> {
        self.store.get(feature)
    }

    /// Points of one output, empty when nothing is stored there.
    pub fn breakpoints(&self, feature: Feature, output: usize) -> &[Breakpoint] {
        self.store
            .series(feature, output)
            .map(|series| series.points())
            .unwrap_or_default()
    }

    pub fn add_breakpoint(&mut self, feature: Feature, output: usize, time: f64, value: f64) -> Result<(), StoreError> {
        self.store.add(feature, output, time, value)
    }

    pub fn update_breakpoint(
        &mut self,
        feature: Feature,
        output: usize,
        index: usize,
        time: f64,
        value: f64,
    ) -> Result<(), StoreError> {
        self.store.update(feature, output, index, time, value)
    }

    pub fn remove_breakpoint(&mut self, feature: Feature, output: usize, index: usize) -> Result<Breakpoint, StoreError> {
        self.store.remove(feature, output, index)
    }

    fn header(&self, feature: Feature) -> ExportHeader<'_> {
        let sample_rate = self.signal.as_ref().map_or(0.0, AudioSignal::sample_rate);
        ExportHeader::now(feature, &self.source_name, sample_rate)
    }

    pub fn export<W: Write>(&self, feature: Feature, out: &mut W) -> Result<()> {
        let result = self.store.get(feature).ok_or(StoreError::FeatureNotExtracted(feature))?;
        io::write_feature(out, &self.header(feature), result)
            .with_context(|| format!("Failed to export {}", feature))
    }

    pub fn export_file(&self, feature: Feature, path: &Path) -> Result<()> {
        let result = self.store.get(feature).ok_or(StoreError::FeatureNotExtracted(feature))?;
        io::write_feature_file(path, &self.header(feature), result)?;
        log::info!("Wrote {} breakpoints to {}", feature, path.display());
        Ok(())
    }

    /// File name used by [`Session::export_all`].
    pub fn export_file_name(&self, feature: Feature) -> String {
        let stem = if self.source_name.is_empty() { "untitled" } else { &self.source_name };
        format!("{}_{}.txt", stem, feature)
    }

    /// Writes `<source>_<Feature>.txt` into `dir` for each extracted feature.
    pub fn export_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let mut written = Vec::new();
        for feature in self.store.features() {
            let path = dir.join(self.export_file_name(feature));
            self.export_file(feature, &path)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Loads every point of `path` into one output, replacing it.
    pub fn import(&mut self, feature: Feature, output: usize, path: &Path) -> Result<usize> {
        let points = io::read_points(path)?;
        let count = points.len();
        self.store.replace(feature, output, points)?;
        log::info!("Imported {} points into {} output {}", count, feature, output);
        Ok(count)
    }

    /// Restores each output whose `# <name>` block appears in `path`.
    ///
    /// Returns how many outputs were replaced.
    pub fn import_feature(&mut self, feature: Feature, path: &Path) -> Result<usize> {
        let blocks = io::read_blocks(path)?;
        let mut restored = 0;
        for output in 0..feature.output_count() {
            let label = io::output_label(feature, output);
            let Some(block) = blocks.iter().find(|b| b.name.as_deref() == Some(label.as_str())) else {
                continue;
            };
            self.store.replace(feature, output, block.points.clone())?;
            restored += 1;
        }
        if restored == 0 {
            log::warn!("{} contains no {} output blocks", path.display(), feature);
        }
        Ok(restored)
    }
}
