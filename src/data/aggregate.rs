//! Group-by and summary statistics shared by the KPI tiles and charts.
//!
//! Every aggregate returns `Option<f64>` where an empty input has no
//! meaningful answer; callers render `None` as "N/A".

use std::collections::BTreeMap;

use super::model::NumericRange;

// ---------------------------------------------------------------------------
// Accumulators
// ---------------------------------------------------------------------------

pub trait Accumulator: Default {
    fn push(&mut self, value: f64);
    fn finish(&self) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Accumulator for Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finish(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// The sum of nothing is zero, not "no data".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sum(f64);

impl Accumulator for Sum {
    fn push(&mut self, value: f64) {
        self.0 += value;
    }

    fn finish(&self) -> Option<f64> {
        Some(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Count(usize);

impl Accumulator for Count {
    fn push(&mut self, _value: f64) {
        self.0 += 1;
    }

    fn finish(&self) -> Option<f64> {
        Some(self.0 as f64)
    }
}

impl Count {
    pub fn get(&self) -> usize {
        self.0
    }
}

pub fn aggregate<A: Accumulator>(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut acc = A::default();
    values.into_iter().for_each(|v| acc.push(v));
    acc.finish()
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    aggregate::<Mean>(values)
}

/// `Some(0.0)` for an empty input.
pub fn sum(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    aggregate::<Sum>(values)
}

// ---------------------------------------------------------------------------
// Group-by
// ---------------------------------------------------------------------------

/// Fold `value(row)` into one accumulator per `key(row)`.
pub fn group_by<R, K, A>(
    rows: &[R],
    key: impl Fn(&R) -> K,
    value: impl Fn(&R) -> f64,
) -> BTreeMap<K, A>
where
    K: Ord,
    A: Accumulator,
{
    let mut groups: BTreeMap<K, A> = BTreeMap::new();
    for row in rows {
        groups.entry(key(row)).or_default().push(value(row));
    }
    groups
}

pub fn group_mean<R, K>(
    rows: &[R],
    key: impl Fn(&R) -> K,
    value: impl Fn(&R) -> f64,
) -> BTreeMap<K, Option<f64>>
where
    K: Ord,
{
    let groups: BTreeMap<K, Mean> = group_by(rows, key, value);
    groups
        .into_iter()
        .map(|(k, acc)| (k, acc.finish()))
        .collect()
}

pub fn group_count<R, K>(
    rows: &[R],
    key: impl Fn(&R) -> K,
) -> BTreeMap<K, usize>
where
    K: Ord,
{
    let groups: BTreeMap<K, Count> = group_by(rows, key, |_| 0.0);
    groups
        .into_iter()
        .map(|(k, acc)| (k, acc.get()))
        .collect()
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// Quantile of sorted data with linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Box-plot statistics. Whiskers reach the furthest observations within
/// 1.5 IQR of the quartiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub count: usize,
}

impl FiveNumberSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let lower_whisker = sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            count: sorted.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Empty bins over `range`. A degenerate range is widened by 0.5 on
    /// each side so its single value still lands in a bin.
    pub fn with_range(range: NumericRange, bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = if range.max > range.min {
            (range.min, range.max)
        } else {
            (range.min - 0.5, range.max + 0.5)
        };
        let width = (max - min) / bins as f64;
        let edges = (0..=bins).map(|i| min + width * i as f64).collect();
        Self {
            edges,
            counts: vec![0; bins],
        }
    }

    /// Count `value`; values outside the edges are ignored.
    pub fn add(&mut self, value: f64) {
        if let Some(bin) = self.bin_of(value) {
            self.counts[bin] += 1;
        }
    }

    pub fn bin_of(&self, value: f64) -> Option<usize> {
        let (min, max) = (*self.edges.first()?, *self.edges.last()?);
        if !(value >= min && value <= max) {
            return None;
        }
        let width = self.bin_width();
        let bin = ((value - min) / width).floor() as usize;
        Some(bin.min(self.counts.len() - 1))
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(min), Some(max)) if !self.counts.is_empty() => {
                (max - min) / self.counts.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Bin midpoints, the x position of each bar.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::applicant;

    #[test]
    fn mean_target_by_gender() {
        let rows = [
            applicant(1, 0, "M", 1.0),
            applicant(2, 1, "F", 1.0),
            applicant(3, 0, "M", 1.0),
            applicant(4, 1, "F", 1.0),
        ];
        let by_gender = group_mean(&rows, |r| r.gender.clone(), |r| r.target as f64);
        assert_eq!(by_gender.len(), 2);
        assert_eq!(by_gender["M"], Some(0.0));
        assert_eq!(by_gender["F"], Some(1.0));
    }

    #[test]
    fn empty_input_has_no_mean_but_a_zero_sum() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(sum(Vec::<f64>::new()), Some(0.0));
        assert_eq!(aggregate::<Count>([4.0, 5.0]), Some(2.0));
        assert_eq!(mean([1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn group_count_counts_rows() {
        let words = ["a", "b", "a", "c", "a"];
        let counts = group_count(&words, |w| w.to_string());
        assert_eq!(counts["a"], 3);
        assert_eq!(counts["b"], 1);
        assert_eq!(counts.keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn whiskers_exclude_outliers() {
        let summary =
            FiveNumberSummary::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0]).unwrap();
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 8.0);
        assert_eq!(summary.count, 9);
        assert!(FiveNumberSummary::from_values(Vec::new()).is_none());
    }

    #[test]
    fn histogram_places_every_value() {
        let values = [0.0, 0.5, 1.0, 2.5, 9.9, 10.0];
        let mut hist = Histogram::with_range(NumericRange::new(0.0, 10.0), 10);
        values.iter().for_each(|&v| hist.add(v));
        assert_eq!(hist.counts.len(), 10);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.counts[0], 2);
        assert_eq!(hist.counts[9], 2);
        assert_eq!(hist.bin_width(), 1.0);
        assert_eq!(hist.centers()[0], 0.5);
        assert_eq!(hist.bin_of(-1.0), None);
    }

    #[test]
    fn degenerate_histogram_range_still_counts() {
        let mut hist = Histogram::with_range(NumericRange::new(3.0, 3.0), 4);
        hist.add(3.0);
        hist.add(3.0);
        assert_eq!(hist.total(), 2);
        assert_eq!(hist.edges, vec![2.5, 2.75, 3.0, 3.25, 3.5]);
    }
}
