//! Fuzz target: range intersection and compromise statistics
//!
//! Interprets the input as pairs of f64 bounds and verifies:
//! - Only finite, ordered pairs construct an `Interval`
//! - The intersection, when present, is enclosed by every input
//! - The median of mins never exceeds the median of maxs
//!
//! cargo fuzz run fuzz_intersect

#![no_main]

use aquacore::interval::{Interval, intersect, median};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let ranges: Vec<Interval> = data
        .chunks_exact(16)
        .filter_map(|c| {
            let mut lo = [0u8; 8];
            let mut hi = [0u8; 8];
            lo.copy_from_slice(&c[..8]);
            hi.copy_from_slice(&c[8..]);
            Interval::new(f64::from_le_bytes(lo), f64::from_le_bytes(hi)).ok()
        })
        .collect();

    for r in &ranges {
        assert!(r.min().is_finite() && r.max().is_finite() && r.min() <= r.max());
    }

    if let Some(i) = intersect(&ranges) {
        assert!(ranges.iter().all(|r| r.encloses(&i)));
    }

    let mins: Vec<f64> = ranges.iter().map(Interval::min).collect();
    let maxs: Vec<f64> = ranges.iter().map(Interval::max).collect();
    if let (Some(a), Some(b)) = (median(&mins), median(&maxs)) {
        assert!(a <= b);
    }
});
