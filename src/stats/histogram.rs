//! Equi-width histogram over a bounded integer domain.

use crate::error::{DbError, DbResult};
use crate::predicate::Op;
use std::fmt;

/// Fixed-width histogram over the inclusive domain `[min, max]`.
///
/// Space is constant in the number of values seen: only the bucket counts are
/// kept. Estimates assume values are spread uniformly within each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct IntHistogram {
    buckets: Vec<u64>,
    min: i32,
    max: i32,
    width: i64,
    total: u64,
}

impl IntHistogram {
    pub fn new(buckets: usize, min: i32, max: i32) -> DbResult<Self> {
        if buckets == 0 {
            return Err(DbError::InvalidArgument(
                "histogram needs at least one bucket".to_string(),
            ));
        }
        if min > max {
            return Err(DbError::InvalidArgument(format!(
                "histogram domain [{}, {}] is empty",
                min, max
            )));
        }

        let span = max as i64 - min as i64 + 1;
        let width = (span + buckets as i64 - 1) / buckets as i64;

        Ok(Self {
            buckets: vec![0; buckets],
            min,
            max,
            width: width.max(1),
            total: 0,
        })
    }

    /// Record one value. Values outside the domain count towards the nearest
    /// edge bucket.
    pub fn add_value(&mut self, v: i32) {
        let idx = self.bucket_index(v);
        self.buckets[idx] += 1;
        self.total += 1;
    }

    /// Estimated fraction of recorded values satisfying `value op v`.
    pub fn estimate_selectivity(&self, op: Op, v: i32) -> f64 {
        let selectivity = match op {
            Op::Equals | Op::Like => self.equals(v),
            Op::GreaterThan => self.greater_than(v),
            Op::LessThan => self.less_than(v),
            Op::LessThanOrEq => (self.equals(v) + self.less_than(v)).min(1.0),
            Op::GreaterThanOrEq => (self.equals(v) + self.greater_than(v)).min(1.0),
            Op::NotEquals => 1.0 - self.equals(v),
        };
        selectivity.clamp(0.0, 1.0)
    }

    /// Selectivity of a self-join on this field: the probability that two
    /// recorded values fall in the same bucket.
    pub fn avg_selectivity(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let squares: f64 = self.buckets.iter().map(|&h| (h as f64) * (h as f64)).sum();
        squares / (self.total as f64 * self.total as f64)
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    /// Number of values recorded so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn bucket_counts(&self) -> &[u64] {
        &self.buckets
    }

    fn bucket_index(&self, v: i32) -> usize {
        let offset = (v as i64 - self.min as i64).max(0);
        ((offset / self.width) as usize).min(self.buckets.len() - 1)
    }

    /// Inclusive value range covered by bucket `idx`.
    fn bucket_bounds(&self, idx: usize) -> (i64, i64) {
        let left = self.min as i64 + idx as i64 * self.width;
        (left, left + self.width - 1)
    }

    fn equals(&self, v: i32) -> f64 {
        if v < self.min || v > self.max || self.total == 0 {
            return 0.0;
        }
        let h = self.buckets[self.bucket_index(v)] as f64;
        (h / self.width as f64) / self.total as f64
    }

    fn greater_than(&self, v: i32) -> f64 {
        if v < self.min {
            return 1.0;
        }
        if v > self.max || self.total == 0 {
            return 0.0;
        }

        let idx = self.bucket_index(v);
        let (_, right) = self.bucket_bounds(idx);
        let h = self.buckets[idx] as f64;
        let beyond: u64 = self.buckets[idx + 1..].iter().sum();
        let partial = ((right - v as i64) as f64 / self.width as f64) * h;
        (beyond as f64 + partial) / self.total as f64
    }

    fn less_than(&self, v: i32) -> f64 {
        if v > self.max {
            return 1.0;
        }
        if v < self.min || self.total == 0 {
            return 0.0;
        }

        let idx = self.bucket_index(v);
        let (left, _) = self.bucket_bounds(idx);
        let h = self.buckets[idx] as f64;
        let before: u64 = self.buckets[..idx].iter().sum();
        let partial = ((v as i64 - left) as f64 / self.width as f64) * h;
        (before as f64 + partial) / self.total as f64
    }
}

impl fmt::Display for IntHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const BAR: u64 = 40;

        writeln!(
            f,
            "IntHistogram [{}, {}] width={} total={}",
            self.min, self.max, self.width, self.total
        )?;
        let tallest = self.buckets.iter().copied().max().unwrap_or(0).max(1);
        for (idx, &h) in self.buckets.iter().enumerate() {
            let (left, right) = self.bucket_bounds(idx);
            let bar = "#".repeat((h * BAR / tallest) as usize);
            writeln!(f, "{:>12} .. {:<12} | {:<40} {}", left, right, bar, h)?;
        }
        Ok(())
    }
}
