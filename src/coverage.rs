// Single coverage: every query base is shown at most once. A snake is the
// query projected onto the reference, so when several blocks claim the same
// query bases only the best scoring one is kept.
use crate::bits::{any_in_range, set_range};
use crate::block::{by_score_desc, AlignmentBlock, SortOrder};
use crate::error::LayoutError;
use fixedbitset::FixedBitSet;

#[derive(Debug, Clone, Default)]
pub struct CoverageOutcome {
    /// Surviving blocks, in the requested order
    pub kept: Vec<AlignmentBlock>,
    /// Blocks dropped because their coordinates were unusable
    pub rejected: Vec<LayoutError>,
}

/// Check the coordinates of one block against its query sequence
pub fn check_block(query: &str, query_len: u64, block: &AlignmentBlock) -> Result<(), LayoutError> {
    for (start, end) in [
        (block.query_start, block.query_end),
        (block.ref_start, block.ref_end),
    ] {
        if start >= end {
            return Err(LayoutError::InvalidRange {
                query: query.to_string(),
                start,
                end,
            });
        }
    }
    if block.query_end > query_len {
        return Err(LayoutError::RangeOutOfBounds {
            query: query.to_string(),
            start: block.query_start,
            end: block.query_end,
            len: query_len,
        });
    }
    Ok(())
}

/// Keep the highest scoring blocks whose query ranges do not overlap any
/// better block, then sort the survivors into `order`.
pub fn single_coverage(
    query: &str,
    query_len: u64,
    blocks: &[AlignmentBlock],
    order: SortOrder,
) -> CoverageOutcome {
    let mut outcome = CoverageOutcome::default();
    let mut candidates = Vec::with_capacity(blocks.len());
    for block in blocks {
        match check_block(query, query_len, block) {
            Ok(()) => candidates.push(block.clone()),
            Err(err) => {
                log::warn!("skipping block: {err}");
                outcome.rejected.push(err);
            }
        }
    }

    candidates.sort_by(by_score_desc);
    let mut claimed = FixedBitSet::with_capacity(query_len as usize);
    for block in candidates {
        let start = block.query_start as usize;
        let len = block.query_len() as usize;
        if any_in_range(&claimed, start, len) {
            continue;
        }
        set_range(&mut claimed, start, len);
        outcome.kept.push(block);
    }
    order.sort(&mut outcome.kept);

    log::debug!(
        "{query}: {} of {} blocks kept for single coverage",
        outcome.kept.len(),
        blocks.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Strand;

    fn block(r: (u64, u64), q: (u64, u64), score: f64) -> AlignmentBlock {
        AlignmentBlock::new(r.0, r.1, q.0, q.1, Strand::Forward).with_score(score)
    }

    #[test]
    fn test_keeps_higher_scoring_overlap() {
        let blocks = vec![block((0, 100), (0, 100), 10.0), block((5000, 5100), (20, 120), 50.0)];
        let out = single_coverage("chr1", 1000, &blocks, SortOrder::Reference);
        assert!(out.rejected.is_empty());
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].score, 50.0);
    }

    #[test]
    fn test_touching_ranges_both_survive() {
        let blocks = vec![block((300, 400), (100, 200), 1.0), block((100, 200), (0, 100), 2.0)];
        let out = single_coverage("chr1", 200, &blocks, SortOrder::Reference);
        let starts: Vec<_> = out.kept.iter().map(|b| b.ref_start).collect();
        assert_eq!(starts, vec![100, 300]);

        let out = single_coverage("chr1", 200, &blocks, SortOrder::Query);
        let starts: Vec<_> = out.kept.iter().map(|b| b.query_start).collect();
        assert_eq!(starts, vec![0, 100]);
    }

    #[test]
    fn test_bad_blocks_are_reported_and_skipped() {
        let blocks = vec![
            block((0, 100), (50, 50), 9.0),
            block((100, 90), (0, 10), 9.0),
            block((0, 100), (950, 1050), 9.0),
            block((200, 300), (0, 100), 1.0),
        ];
        let out = single_coverage("chr7", 1000, &blocks, SortOrder::Query);
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.rejected.len(), 3);
        assert!(matches!(out.rejected[0], LayoutError::InvalidRange { start: 50, end: 50, .. }));
        assert!(matches!(out.rejected[1], LayoutError::InvalidRange { start: 100, end: 90, .. }));
        assert!(matches!(out.rejected[2], LayoutError::RangeOutOfBounds { len: 1000, .. }));
    }

    #[test]
    fn test_idempotent() {
        let blocks = vec![
            block((0, 100), (0, 100), 3.0),
            block((150, 250), (80, 180), 7.0),
            block((400, 500), (170, 300), 5.0),
            block((600, 650), (300, 350), 1.0),
        ];
        let once = single_coverage("q", 400, &blocks, SortOrder::Query);
        let twice = single_coverage("q", 400, &once.kept, SortOrder::Query);
        assert_eq!(once.kept, twice.kept);
        let scores: Vec<_> = once.kept.iter().map(|b| b.score).collect();
        assert_eq!(scores, vec![7.0, 1.0]);
    }
}
