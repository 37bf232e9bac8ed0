pub mod io;
pub mod store;

pub use store::BreakpointStore;

/// One `(time, value)` sample of a feature curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint {
    /// Seconds from the start of the signal, never negative.
    pub time: f64,
    pub value: f64,
}

impl Breakpoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// A time-ordered feature curve.
///
/// Every mutating method leaves the points sorted ascending by time, and
/// times are clamped to zero on the way in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BreakpointSeries {
    points: Vec<Breakpoint>,
}

impl BreakpointSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from arbitrary points, sorting them.
    pub fn from_points(points: Vec<Breakpoint>) -> Self {
        let mut series = Self { points };
        for p in &mut series.points {
            p.time = p.time.max(0.0);
        }
        series.sort();
        series
    }

    /// Appends a point the caller already knows is in order.
    ///
    /// Used by extractors, whose frame timestamps are monotonic.
    pub(crate) fn push_ordered(&mut self, time: f64, value: f64) {
        debug_assert!(self.points.last().map_or(true, |p| p.time <= time));
        self.points.push(Breakpoint::new(time, value));
    }

    pub fn add(&mut self, time: f64, value: f64) {
        self.points.push(Breakpoint::new(time.max(0.0), value));
        self.sort();
    }

    /// Replaces the point at `index`. Returns `false` when out of bounds.
    pub fn update(&mut self, index: usize, time: f64, value: f64) -> bool {
        match self.points.get_mut(index) {
            Some(p) => {
                *p = Breakpoint::new(time.max(0.0), value);
                self.sort();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Breakpoint> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    pub fn replace(&mut self, points: Vec<Breakpoint>) {
        *self = Self::from_points(points);
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.points.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.points.iter_mut().map(|p| &mut p.value)
    }

    /// Divides every value by the series maximum; a zero maximum is left alone.
    pub fn normalize_to_peak(&mut self) {
        if let Some(max) = self.max_value() {
            if max > 0.0 {
                for v in self.values_mut() {
                    *v /= max;
                }
            }
        }
    }

    fn sort(&mut self) {
        // Stable, so points sharing a timestamp keep their insertion order.
        self.points.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

impl<'a> IntoIterator for &'a BreakpointSeries {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Everything one extraction pass produced: one series per declared output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureResult {
    outputs: Vec<BreakpointSeries>,
}

impl FeatureResult {
    /// A result with `count` empty outputs.
    pub fn empty(count: usize) -> Self {
        Self {
            outputs: vec![BreakpointSeries::new(); count],
        }
    }

    pub fn from_outputs(outputs: Vec<BreakpointSeries>) -> Self {
        Self { outputs }
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn output(&self, index: usize) -> Option<&BreakpointSeries> {
        self.outputs.get(index)
    }

    pub fn output_mut(&mut self, index: usize) -> Option<&mut BreakpointSeries> {
        self.outputs.get_mut(index)
    }

    pub fn outputs(&self) -> &[BreakpointSeries] {
        &self.outputs
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [BreakpointSeries] {
        &mut self.outputs
    }

    /// Total number of points across all outputs.
    pub fn total_points(&self) -> usize {
        self.outputs.iter().map(BreakpointSeries::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_sorted(series: &BreakpointSeries) -> bool {
        series.points().windows(2).all(|w| w[0].time <= w[1].time)
    }

    #[test]
    fn add_keeps_order() {
        let mut s = BreakpointSeries::new();
        s.add(2.0, 0.2);
        s.add(0.5, 0.05);
        s.add(1.0, 0.1);
        assert!(is_sorted(&s));
        assert_eq!(s.points()[0], Breakpoint::new(0.5, 0.05));
    }

    #[test]
    fn update_clamps_negative_time_and_resorts() {
        let mut s = BreakpointSeries::from_points(vec![
            Breakpoint::new(0.0, 1.0),
            Breakpoint::new(1.0, 2.0),
            Breakpoint::new(2.0, 3.0),
        ]);
        assert!(s.update(2, -4.0, 9.0));
        assert!(is_sorted(&s));
        assert_eq!(s.points()[0].time, 0.0);
        assert!(s.points().iter().any(|p| p.value == 9.0));
        assert!(!s.update(3, 1.0, 1.0));
    }

    #[test]
    fn update_moving_point_past_neighbours() {
        let mut s = BreakpointSeries::from_points(vec![
            Breakpoint::new(0.0, 0.0),
            Breakpoint::new(1.0, 1.0),
            Breakpoint::new(2.0, 2.0),
        ]);
        s.update(0, 5.0, 0.0);
        assert!(is_sorted(&s));
        assert_eq!(s.points()[2], Breakpoint::new(5.0, 0.0));
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut s = BreakpointSeries::from_points(vec![Breakpoint::new(0.0, 1.0)]);
        assert!(s.remove(1).is_none());
        assert_eq!(s.remove(0), Some(Breakpoint::new(0.0, 1.0)));
        assert!(s.is_empty());
    }

    #[test]
    fn normalize_skips_all_zero_series() {
        let mut s = BreakpointSeries::from_points(vec![
            Breakpoint::new(0.0, 0.0),
            Breakpoint::new(1.0, 0.0),
        ]);
        s.normalize_to_peak();
        assert!(s.values().all(|v| v == 0.0));

        let mut s = BreakpointSeries::from_points(vec![
            Breakpoint::new(0.0, 0.5),
            Breakpoint::new(1.0, 2.0),
        ]);
        s.normalize_to_peak();
        assert_eq!(s.max_value(), Some(1.0));
        assert_eq!(s.points()[0].value, 0.25);
    }
}
