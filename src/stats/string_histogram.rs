use crate::error::DbResult;
use crate::predicate::Op;
use crate::stats::histogram::IntHistogram;
use byteorder::{BigEndian, ByteOrder};
use std::fmt;

/// Histogram over string values, bucketed by the integer image of each string.
///
/// The image only looks at the first four bytes, so strings sharing a prefix
/// are indistinguishable. The domain covers every possible prefix, from `""`
/// to four `0xFF` bytes, so UTF-8 text of any script falls inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct StringHistogram {
    inner: IntHistogram,
}

impl StringHistogram {
    pub fn new(buckets: usize) -> DbResult<Self> {
        Ok(Self {
            inner: IntHistogram::new(buckets, min_image(), max_image())?,
        })
    }

    pub fn add_value(&mut self, s: &str) {
        self.inner.add_value(string_image(s));
    }

    pub fn estimate_selectivity(&self, op: Op, s: &str) -> f64 {
        self.inner.estimate_selectivity(op, string_image(s))
    }

    pub fn avg_selectivity(&self) -> f64 {
        self.inner.avg_selectivity()
    }

    pub fn total(&self) -> u64 {
        self.inner.total()
    }

    /// The underlying integer histogram.
    pub fn as_int_histogram(&self) -> &IntHistogram {
        &self.inner
    }
}

impl fmt::Display for StringHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringHistogram over {}", self.inner)
    }
}

/// Integer image of `s`: its first four bytes, zero padded, read as an
/// unsigned big-endian number and shifted into the `i32` range. Byte-wise
/// string order is preserved.
pub fn string_image(s: &str) -> i32 {
    let mut prefix = [0u8; 4];
    let bytes = s.as_bytes();
    let n = bytes.len().min(4);
    prefix[..n].copy_from_slice(&bytes[..n]);
    prefix_image(&prefix)
}

fn prefix_image(prefix: &[u8; 4]) -> i32 {
    (BigEndian::read_u32(prefix) ^ 0x8000_0000) as i32
}

fn min_image() -> i32 {
    prefix_image(&[0x00; 4])
}

fn max_image() -> i32 {
    prefix_image(&[0xFF; 4])
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_string_image() {
        assert_eq!(string_image(""), i32::MIN);
        assert_eq!(min_image(), i32::MIN);
        assert_eq!(max_image(), i32::MAX);
        assert_eq!(string_image("abcdef"), string_image("abcd"));
        assert!(string_image("") < string_image("a"));
        assert!(string_image("apple") < string_image("banana"));
        assert!(string_image("zzzz") < string_image("émile"));
        assert!(string_image("émile") < string_image("日本"));
    }

    #[test]
    fn test_non_ascii_values_sort_above_ascii() -> Result<()> {
        let mut hist = StringHistogram::new(10)?;
        for _ in 0..10 {
            hist.add_value("émile");
        }

        assert_eq!(hist.estimate_selectivity(Op::GreaterThan, "zebra"), 1.0);
        assert_eq!(hist.estimate_selectivity(Op::LessThan, "apple"), 0.0);
        assert_eq!(hist.estimate_selectivity(Op::LessThan, "zebra"), 0.0);
        assert!(hist.estimate_selectivity(Op::Equals, "émile") > 0.0);
        Ok(())
    }

    #[test]
    fn test_estimates_follow_string_order() -> Result<()> {
        let mut hist = StringHistogram::new(100)?;
        for word in ["apple", "banana", "cherry", "date", "elder", "fig", "grape"] {
            hist.add_value(word);
        }
        assert_eq!(hist.total(), 7);

        assert_eq!(hist.estimate_selectivity(Op::LessThan, ""), 0.0);
        assert!(hist.estimate_selectivity(Op::GreaterThan, "a") > 0.9);
        assert!(hist.estimate_selectivity(Op::LessThan, "d") > 0.3);
        assert!(hist.estimate_selectivity(Op::LessThan, "d") < 0.7);
        assert!(hist.estimate_selectivity(Op::GreaterThan, "zzzz") == 0.0);
        Ok(())
    }

    #[test]
    fn test_equality_and_avg() -> Result<()> {
        let mut hist = StringHistogram::new(10)?;
        for _ in 0..4 {
            hist.add_value("same");
        }
        assert!(hist.estimate_selectivity(Op::Equals, "same") > 0.0);
        assert_eq!(hist.estimate_selectivity(Op::Equals, "a"), 0.0);
        assert!((hist.avg_selectivity() - 1.0).abs() < 1e-9);
        Ok(())
    }
}
