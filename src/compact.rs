// Level compaction for full snakes.
//
// The greedy assigner opens a new level for every insertion, which leaves
// many levels mostly empty. A level can be pushed down onto a lower one when
// none of its blocks would land on pixels already in use there and no
// transition line joins the two levels. Merged levels keep a single strand
// and never overlap on the reference.
use crate::bits::{any_in_range, set_range};
use crate::block::{AlignmentBlock, SortOrder};
use crate::viewport::Viewport;
use fixedbitset::FixedBitSet;

/// Per-level scratch state, local to one compaction
struct Level {
    pixels: FixedBitSet,
    /// `connects[j]` is set when a transition runs between this level and `j`
    connects: Vec<bool>,
    /// Indices into the block list
    members: Vec<usize>,
}

/// Merge levels that fit on a lower, unconnected level, then renumber the
/// levels densely and sort the blocks into `order`.
///
/// `blocks` must be in chain order, i.e. consecutive blocks are joined by a
/// transition when they sit on different levels.
pub fn compact_levels(
    mut blocks: Vec<AlignmentBlock>,
    viewport: &Viewport,
    margin: usize,
    order: SortOrder,
) -> Vec<AlignmentBlock> {
    let Some(top) = blocks.iter().map(|b| b.level).max() else {
        return blocks;
    };
    let count = top + 1;
    let spans: Vec<(usize, usize)> = blocks.iter().map(|b| viewport.pixel_span(b)).collect();

    let mut levels: Vec<Level> = (0..count)
        .map(|_| Level {
            pixels: FixedBitSet::with_capacity(viewport.width),
            connects: vec![false; count],
            members: Vec::new(),
        })
        .collect();

    for (i, block) in blocks.iter().enumerate() {
        let level = &mut levels[block.level];
        let (x1, x2) = spans[i];
        set_range(&mut level.pixels, x1, x2 - x1);
        level.members.push(i);
        if let Some(prev) = i.checked_sub(1) {
            level.connects[blocks[prev].level] = true;
        }
        if let Some(next) = blocks.get(i + 1) {
            level.connects[next.level] = true;
        }
    }

    // the two lowest levels stay where they are
    for upper in 2..count {
        let Some(floor) = lowest_candidate(&levels[upper].connects, upper) else {
            continue;
        };
        let target =
            (floor..upper).find(|&lower| fits_onto(&levels[upper], &levels[lower], &blocks, &spans, margin));
        if let Some(lower) = target {
            log::debug!("compacting level {upper} onto level {lower}");
            merge(&mut levels, &mut blocks, &spans, upper, lower);
        }
    }

    renumber_dense(&mut blocks);
    order.sort(&mut blocks);
    blocks
}

/// Lowest level `level` could move to: one above the highest lower level it
/// connects to. `None` when it connects to nothing below or sits directly on
/// its highest connection.
fn lowest_candidate(connects: &[bool], level: usize) -> Option<usize> {
    let highest = (0..level).rev().find(|&j| connects[j])?;
    (highest + 1 < level).then_some(highest + 1)
}

/// Whether every block of `moving` can join `onto`: no used pixel within
/// `margin` of it, same strand and no reference overlap with the blocks
/// already there.
fn fits_onto(
    moving: &Level,
    onto: &Level,
    blocks: &[AlignmentBlock],
    spans: &[(usize, usize)],
    margin: usize,
) -> bool {
    moving.members.iter().all(|&i| {
        let block = &blocks[i];
        is_clear(&onto.pixels, spans[i], margin)
            && onto.members.iter().all(|&j| {
                let other = &blocks[j];
                other.strand == block.strand && !other.intersects(block.ref_start, block.ref_end)
            })
    })
}

/// No used pixel within `margin` of the span
fn is_clear(pixels: &FixedBitSet, (x1, x2): (usize, usize), margin: usize) -> bool {
    let start = x1.saturating_sub(margin);
    let end = x2.saturating_add(margin);
    !any_in_range(pixels, start, end - start)
}

fn merge(levels: &mut [Level], blocks: &mut [AlignmentBlock], spans: &[(usize, usize)], from: usize, to: usize) {
    let members = std::mem::take(&mut levels[from].members);
    for &i in &members {
        blocks[i].level = to;
        let (x1, x2) = spans[i];
        set_range(&mut levels[to].pixels, x1, x2 - x1);
    }
    levels[to].members.extend(members);
    levels[from].pixels.clear();

    // every transition that touched `from` now touches `to`
    for level in levels.iter_mut() {
        if level.connects[from] {
            level.connects[from] = false;
            level.connects[to] = true;
        }
    }
    let moved = std::mem::take(&mut levels[from].connects);
    for (j, linked) in moved.into_iter().enumerate() {
        if linked {
            levels[to].connects[j] = true;
        }
    }
    levels[from].connects = vec![false; levels.len()];
}

/// Close gaps in the level numbering. Returns the highest level in use.
pub fn renumber_dense(blocks: &mut [AlignmentBlock]) -> Option<usize> {
    let top = blocks.iter().map(|b| b.level).max()?;
    let mut used = vec![false; top + 1];
    for block in blocks.iter() {
        used[block.level] = true;
    }
    let mut remap = vec![0; top + 1];
    let mut next = 0;
    for (level, &in_use) in used.iter().enumerate() {
        if in_use {
            remap[level] = next;
            next += 1;
        }
    }
    for block in blocks.iter_mut() {
        block.level = remap[block.level];
    }
    next.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Strand;

    fn placed(r: (u64, u64), q: u64, strand: Strand, level: usize) -> AlignmentBlock {
        let mut b = AlignmentBlock::new(r.0, r.1, q, q + (r.1 - r.0), strand);
        b.level = level;
        b
    }

    fn levels_of(blocks: &[AlignmentBlock]) -> Vec<(u64, usize)> {
        blocks.iter().map(|b| (b.ref_start, b.level)).collect()
    }

    #[test]
    fn test_renumber_dense() {
        let mut blocks = vec![
            placed((0, 10), 0, Strand::Forward, 4),
            placed((20, 30), 10, Strand::Forward, 1),
            placed((40, 50), 20, Strand::Forward, 4),
        ];
        assert_eq!(renumber_dense(&mut blocks), Some(1));
        assert_eq!(levels_of(&blocks), vec![(0, 1), (20, 0), (40, 1)]);
        assert_eq!(renumber_dense(&mut []), None);
    }

    #[test]
    fn test_lowest_candidate() {
        let mut connects = vec![false; 5];
        assert_eq!(lowest_candidate(&connects, 4), None);
        connects[3] = true;
        assert_eq!(lowest_candidate(&connects, 4), None);
        connects[3] = false;
        connects[1] = true;
        assert_eq!(lowest_candidate(&connects, 4), Some(2));
    }

    #[test]
    fn test_isolated_level_moves_down() {
        // chain: L0 -> L1 -> L0 -> L2 -> L0, with L2 far to the right of L1
        let view = Viewport::new(0, 1000, 1000);
        let blocks = vec![
            placed((0, 100), 0, Strand::Forward, 0),
            placed((150, 200), 100, Strand::Reverse, 1),
            placed((300, 400), 200, Strand::Forward, 0),
            placed((700, 750), 300, Strand::Reverse, 2),
            placed((800, 900), 400, Strand::Forward, 0),
        ];
        let out = compact_levels(blocks, &view, 10, SortOrder::Query);
        assert_eq!(
            levels_of(&out),
            vec![(0, 0), (150, 1), (300, 0), (700, 1), (800, 0)]
        );
    }

    #[test]
    fn test_margin_blocks_merge() {
        let view = Viewport::new(0, 1000, 1000);
        let blocks = vec![
            placed((0, 100), 0, Strand::Forward, 0),
            placed((150, 200), 100, Strand::Reverse, 1),
            placed((300, 400), 200, Strand::Forward, 0),
            placed((205, 260), 300, Strand::Reverse, 2),
            placed((800, 900), 400, Strand::Forward, 0),
        ];
        // 205 is within 10 px of 200 on level 1
        let out = compact_levels(blocks.clone(), &view, 10, SortOrder::Query);
        assert_eq!(out.iter().map(|b| b.level).max(), Some(2));

        let out = compact_levels(blocks, &view, 2, SortOrder::Query);
        assert_eq!(out.iter().map(|b| b.level).max(), Some(1));
    }

    #[test]
    fn test_connected_levels_stay_apart() {
        let view = Viewport::new(0, 1000, 1000);
        // L2 is chained directly to L1, so it may not move onto it
        let blocks = vec![
            placed((0, 100), 0, Strand::Forward, 0),
            placed((150, 200), 100, Strand::Reverse, 1),
            placed((600, 650), 200, Strand::Forward, 2),
            placed((800, 900), 300, Strand::Reverse, 1),
        ];
        let out = compact_levels(blocks.clone(), &view, 10, SortOrder::Query);
        assert_eq!(levels_of(&out), levels_of(&blocks));
    }

    #[test]
    fn test_opposite_strand_level_stays() {
        let view = Viewport::new(0, 1000, 1000);
        let blocks = vec![
            placed((0, 100), 0, Strand::Forward, 0),
            placed((150, 200), 100, Strand::Forward, 1),
            placed((300, 400), 200, Strand::Forward, 0),
            placed((700, 750), 300, Strand::Reverse, 2),
            placed((800, 900), 400, Strand::Forward, 0),
        ];
        let out = compact_levels(blocks.clone(), &view, 10, SortOrder::Query);
        assert_eq!(levels_of(&out), levels_of(&blocks));
    }

    #[test]
    fn test_off_screen_blocks_keep_reference_apart() {
        // both upper levels lie right of the window and take no pixels
        let view = Viewport::new(0, 1000, 1000);
        let chain = |far: (u64, u64)| {
            vec![
                placed((0, 100), 0, Strand::Forward, 0),
                placed((2000, 2500), 100, Strand::Reverse, 1),
                placed((300, 400), 600, Strand::Forward, 0),
                placed(far, 700, Strand::Reverse, 2),
                placed((800, 900), 800, Strand::Forward, 0),
            ]
        };

        let out = compact_levels(chain((2200, 2300)), &view, 10, SortOrder::Query);
        assert_eq!(out.iter().map(|b| b.level).max(), Some(2));

        let out = compact_levels(chain((3000, 3100)), &view, 10, SortOrder::Query);
        assert_eq!(out.iter().map(|b| b.level).max(), Some(1));
    }

    #[test]
    fn test_compaction_is_idempotent() {
        let view = Viewport::new(0, 1000, 1000);
        let blocks = vec![
            placed((0, 100), 0, Strand::Forward, 0),
            placed((150, 200), 100, Strand::Reverse, 1),
            placed((300, 400), 200, Strand::Forward, 0),
            placed((500, 550), 300, Strand::Reverse, 3),
            placed((600, 650), 400, Strand::Forward, 0),
            placed((700, 750), 500, Strand::Reverse, 5),
            placed((800, 900), 600, Strand::Forward, 0),
        ];
        let once = compact_levels(blocks, &view, 10, SortOrder::Query);
        assert_eq!(once.iter().map(|b| b.level).max(), Some(1));
        let twice = compact_levels(once.clone(), &view, 10, SortOrder::Query);
        assert_eq!(once, twice);
    }
}
