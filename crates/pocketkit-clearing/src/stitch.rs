//! Path stitching: depth-first emission of the finished tree.
//!
//! Children are already ordered short-first, so the walk cuts small side
//! pockets before committing to long corridors. Every emission is gated
//! by the configured [`EmitOptions`].

use crate::connect::{smooth_chord, switch_branch, SliceStore};
use crate::params::{ClearingParams, EmitOptions};
use crate::path::{PathItem, PathItemKind};
use crate::spiral::archimedean;
use crate::tree::MedialTree;
use pocketkit_core::ArcOrLine;

/// Emits the ordered toolpath for a rolled tree.
pub fn stitch(tree: &MedialTree, store: &SliceStore, params: &ClearingParams) -> Vec<PathItem> {
    let mut items = Vec::new();
    let emit = params.emit;
    let Some(&root_slice) = tree.branches[tree.root].slices.first() else {
        return items;
    };

    if emit.contains(EmitOptions::SPIRAL) {
        let root = &store.slices[root_slice];
        if let Some(start) = root.start() {
            let pts = archimedean(
                root.ball.center,
                start,
                params.max_engagement,
                params.mill_direction.rotation(),
                params.general_tolerance,
            );
            items.push(PathItem::from_points(PathItemKind::Spiral, &pts));
        }
    }

    for branch_id in tree.traversal_order() {
        let branch = &tree.branches[branch_id];

        if emit.contains(EmitOptions::DEBUG_MAT) {
            items.push(PathItem::from_points(PathItemKind::DebugMat, &branch.curve));
        }
        if emit.contains(EmitOptions::BRANCH_ENTRY) {
            if let Some(entry) = &branch.entry {
                items.push(entry.clone());
            }
        }

        for (k, &sid) in branch.slices.iter().enumerate() {
            let slice = &store.slices[sid];
            if k > 0 {
                let prev = &store.slices[branch.slices[k - 1]];
                if let (Some(from), Some(to)) = (prev.end(), slice.start()) {
                    if emit.contains(EmitOptions::SMOOTH_CHORD) {
                        items.push(PathItem::new(
                            PathItemKind::SmoothChord,
                            smooth_chord(prev, from, slice, to),
                        ));
                    } else if emit.contains(EmitOptions::CHORD) {
                        items.push(PathItem::from_points(PathItemKind::Chord, &[from, to]));
                    }
                }
            }
            for (a, arc) in slice.segments.iter().enumerate() {
                if a > 0 && emit.contains(EmitOptions::SEGMENT_CHORD) {
                    let gap_from = slice.segments[a - 1].end_point();
                    items.push(PathItem::from_points(
                        PathItemKind::SegmentChord,
                        &[gap_from, arc.start_point()],
                    ));
                }
                if emit.contains(EmitOptions::SEGMENT) {
                    items.push(PathItem::new(
                        PathItemKind::Segment,
                        vec![ArcOrLine::Arc(*arc)],
                    ));
                }
            }
        }
    }

    if emit.contains(EmitOptions::RETURN_TO_BASE) && !store.is_empty() {
        let last = store.len() - 1;
        let root = store.slices[root_slice].clone();
        let segments = switch_branch(
            store,
            last,
            &root,
            Some(root_slice),
            Some(root_slice),
            None,
            Some(root.ball.center),
            params.general_tolerance,
        );
        if !segments.is_empty() {
            items.push(PathItem::new(PathItemKind::ReturnToBase, segments));
        }
    }

    items
}
