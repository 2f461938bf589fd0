// Range operations on FixedBitSet that clip to the set instead of panicking.
// Used for claimed query bases and for occupied pixels on a level.
use fixedbitset::FixedBitSet;
use std::ops::Range;

/// `start..start + count`, clipped to the length of `bits`
fn clipped(bits: &FixedBitSet, start: usize, count: usize) -> Range<usize> {
    let end = start.saturating_add(count).min(bits.len());
    start.min(end)..end
}

pub(crate) fn set_range(bits: &mut FixedBitSet, start: usize, count: usize) {
    let range = clipped(bits, start, count);
    bits.insert_range(range);
}

pub(crate) fn count_range(bits: &FixedBitSet, start: usize, count: usize) -> usize {
    bits.count_ones(clipped(bits, start, count))
}

pub(crate) fn any_in_range(bits: &FixedBitSet, start: usize, count: usize) -> bool {
    count_range(bits, start, count) > 0
}
