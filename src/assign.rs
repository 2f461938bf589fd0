//! Greedy level assignment.
//!
//! Blocks are offered, in order, to level 0. A block joins the level when it
//! continues the level past its leading edge; anything else is deferred and
//! offered, still in order, to the next level. Every pass places at least its
//! first block (the level is fresh), so `n` blocks never need more than `n`
//! levels.
//!
//! In [`LayoutMode::Full`] a level is committed to the strand of its first
//! block. Forward levels grow towards higher reference coordinates and their
//! edge is the end of the last block; reverse levels grow towards lower
//! coordinates and their edge is the start of the last block.
//! [`LayoutMode::Pack`] ignores strand and always grows to the right.

use crate::block::{AlignmentBlock, SortOrder, Strand};
use crate::error::LayoutError;
use crate::layout::LayoutConfig;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Strand-aware layout that follows the query through the chain
    #[default]
    Full,
    /// Denser layout that packs blocks by reference position only
    Pack,
}

impl LayoutMode {
    /// Order the blocks must be in when they reach the assigner
    pub fn sort_order(self) -> SortOrder {
        match self {
            LayoutMode::Full => SortOrder::Query,
            LayoutMode::Pack => SortOrder::Reference,
        }
    }
}

/// State of one level while blocks are being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelState {
    /// `None` for levels that accept either strand
    pub orientation: Option<Strand>,
    pub edge: u64,
}

impl LevelState {
    /// Fresh level, committed to the strand of `first` when strand matters
    pub fn open(mode: LayoutMode, first: &AlignmentBlock) -> Self {
        match (mode, first.strand) {
            (LayoutMode::Pack, _) => Self { orientation: None, edge: 0 },
            (LayoutMode::Full, Strand::Forward) => Self {
                orientation: Some(Strand::Forward),
                edge: 0,
            },
            (LayoutMode::Full, Strand::Reverse) => Self {
                orientation: Some(Strand::Reverse),
                edge: u64::MAX,
            },
        }
    }

    pub fn fits(&self, block: &AlignmentBlock) -> bool {
        match self.orientation {
            None => self.edge <= block.ref_start,
            Some(strand) if strand != block.strand => false,
            Some(Strand::Forward) => self.edge <= block.ref_start,
            Some(Strand::Reverse) => self.edge >= block.ref_end,
        }
    }

    pub fn extend(&mut self, block: &AlignmentBlock) {
        self.edge = match self.orientation {
            Some(Strand::Reverse) => block.ref_start,
            _ => block.ref_end,
        };
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assignment {
    /// Surviving blocks with `level` set, in the mode's sort order
    pub blocks: Vec<AlignmentBlock>,
    /// One entry per level index opened, pruned or not
    pub levels: Vec<LevelState>,
    /// Blocks dropped because their level's run was too small to see
    pub pruned: usize,
}

/// Place `blocks` on levels. The input order is the order the levels are
/// filled in and should follow `config.mode.sort_order()`.
pub fn assign_levels(
    query: &str,
    blocks: Vec<AlignmentBlock>,
    config: &LayoutConfig,
) -> Result<Assignment, LayoutError> {
    let mut out = Assignment {
        blocks: Vec::with_capacity(blocks.len()),
        ..Assignment::default()
    };
    let mut pending = blocks;

    while let Some(first) = pending.first() {
        let level = out.levels.len();
        if level >= config.max_levels {
            return Err(LayoutError::TooManyLevels {
                query: query.to_string(),
                limit: config.max_levels,
            });
        }

        let mut state = LevelState::open(config.mode, first);
        let mut run = Vec::new();
        let mut deferred = Vec::new();
        for mut block in pending {
            if state.fits(&block) {
                state.extend(&block);
                block.level = level;
                run.push(block);
            } else {
                deferred.push(block);
            }
        }

        if is_visible(&run, &config.viewport, config.min_pixels) {
            out.blocks.append(&mut run);
        } else {
            log::debug!("{query}: level {level} pruned ({} blocks below {} px)", run.len(), config.min_pixels);
            out.pruned += run.len();
        }
        out.levels.push(state);
        pending = deferred;
    }

    config.mode.sort_order().sort(&mut out.blocks);
    log::debug!(
        "{query}: {} blocks on {} levels, {} pruned",
        out.blocks.len(),
        out.levels.len(),
        out.pruned
    );
    Ok(out)
}

/// Whether the reference extent of a run is at least `min_pixels` wide
fn is_visible(run: &[AlignmentBlock], viewport: &Viewport, min_pixels: f64) -> bool {
    let start = run.iter().map(|b| b.ref_start).min();
    let end = run.iter().map(|b| b.ref_end).max();
    match start.zip(end) {
        Some((start, end)) => viewport.apparent_size(start, end) >= min_pixels,
        None => false,
    }
}

/// Re-check a full-mode layout in chain order: every level holds a single
/// strand and its blocks advance past the level's edge.
pub fn verify_levels(query: &str, blocks: &[AlignmentBlock]) -> Result<(), LayoutError> {
    let mut states: Vec<Option<LevelState>> = Vec::new();
    for block in blocks {
        if block.level >= states.len() {
            states.resize(block.level + 1, None);
        }
        let state = states[block.level].get_or_insert_with(|| LevelState::open(LayoutMode::Full, block));
        if !state.fits(block) {
            return Err(LayoutError::InconsistentOrientation {
                query: query.to_string(),
                level: block.level,
                start: block.ref_start,
                end: block.ref_end,
            });
        }
        state.extend(block);
    }
    Ok(())
}

/// Keep only levels that show something in the window: a block inside it,
/// or a block chained to one inside it (its transition line is drawn).
/// Surviving levels are renumbered from zero. `blocks` must be in chain order.
pub fn keep_visible_levels(blocks: Vec<AlignmentBlock>, viewport: &Viewport) -> Vec<AlignmentBlock> {
    let Some(top) = blocks.iter().map(|b| b.level).max() else {
        return blocks;
    };
    let mut shown = vec![false; top + 1];
    for (i, block) in blocks.iter().enumerate() {
        if !block.intersects(viewport.start, viewport.end) {
            continue;
        }
        shown[block.level] = true;
        if let Some(prev) = i.checked_sub(1).and_then(|p| blocks.get(p)) {
            shown[prev.level] = true;
        }
        if let Some(next) = blocks.get(i + 1) {
            shown[next.level] = true;
        }
    }

    let mut remap = vec![0; top + 1];
    let mut count = 0;
    for (level, &visible) in shown.iter().enumerate() {
        remap[level] = count;
        if visible {
            count += 1;
        }
    }

    let before = blocks.len();
    let kept: Vec<_> = blocks
        .into_iter()
        .filter(|b| shown[b.level])
        .map(|mut b| {
            b.level = remap[b.level];
            b
        })
        .collect();
    if kept.len() < before {
        log::debug!("dropped {} blocks on levels outside the window", before - kept.len());
    }
    kept
}
