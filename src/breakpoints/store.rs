use super::{Breakpoint, BreakpointSeries, FeatureResult};
use crate::analysis::Feature;
use crate::error::StoreError;

/// Extraction results, one slot per [`Feature`].
///
/// Single-writer: every edit takes `&mut self`.
#[derive(Debug, Default)]
pub struct BreakpointStore {
    results: [Option<FeatureResult>; Feature::COUNT],
}

impl BreakpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was stored for `feature`.
    pub fn insert(&mut self, feature: Feature, result: FeatureResult) -> &FeatureResult {
        self.results[feature.index()].insert(result)
    }

    pub fn clear(&mut self) {
        self.results = Default::default();
    }

    pub fn get(&self, feature: Feature) -> Option<&FeatureResult> {
        self.results[feature.index()].as_ref()
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.get(feature).is_some()
    }

    /// Features with a stored result, in [`Feature::ALL`] order.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(move |&f| self.contains(f))
    }

    pub fn series(&self, feature: Feature, output: usize) -> Result<&BreakpointSeries, StoreError> {
        let result = self.get(feature).ok_or(StoreError::FeatureNotExtracted(feature))?;
        result.output(output).ok_or(StoreError::OutputOutOfRange {
            feature,
            index: output,
            count: result.num_outputs(),
        })
    }

    fn series_mut(&mut self, feature: Feature, output: usize) -> Result<&mut BreakpointSeries, StoreError> {
        let result = self.results[feature.index()]
            .as_mut()
            .ok_or(StoreError::FeatureNotExtracted(feature))?;
        let count = result.num_outputs();
        result.output_mut(output).ok_or(StoreError::OutputOutOfRange {
            feature,
            index: output,
            count,
        })
    }

    pub fn add(&mut self, feature: Feature, output: usize, time: f64, value: f64) -> Result<(), StoreError> {
        self.series_mut(feature, output)?.add(time, value);
        Ok(())
    }

    pub fn update(
        &mut self,
        feature: Feature,
        output: usize,
        index: usize,
        time: f64,
        value: f64,
    ) -> Result<(), StoreError> {
        let series = self.series_mut(feature, output)?;
        let count = series.len();
        if series.update(index, time, value) {
            Ok(())
        } else {
            Err(StoreError::PointOutOfRange { feature, output, index, count })
        }
    }

    pub fn remove(&mut self, feature: Feature, output: usize, index: usize) -> Result<Breakpoint, StoreError> {
        let series = self.series_mut(feature, output)?;
        let count = series.len();
        series
            .remove(index)
            .ok_or(StoreError::PointOutOfRange { feature, output, index, count })
    }

    /// Swaps in a whole output, creating an empty result for a feature that
    /// was never extracted.
    pub fn replace(&mut self, feature: Feature, output: usize, points: Vec<Breakpoint>) -> Result<(), StoreError> {
        let count = feature.output_count();
        if output >= count {
            return Err(StoreError::OutputOutOfRange { feature, index: output, count });
        }
        self.results[feature.index()]
            .get_or_insert_with(|| FeatureResult::empty(count))
            .output_mut(output)
            .ok_or(StoreError::OutputOutOfRange { feature, index: output, count })?
            .replace(points);
        Ok(())
    }
}
