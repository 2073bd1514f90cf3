//! Slice placement along the medial tree.
//!
//! Walks branches in cut order and binary-searches the curve parameter
//! of every next slice so its refined engagement lands inside the target
//! band. Failures grade per severity: branches with no attachable
//! ancestor are skipped, engagement overshoot terminates the branch with
//! an error log, undershoot terminates it silently.

use crate::connect::{switch_branch, SliceStore};
use crate::error::{ClearingError, Result};
use crate::params::ClearingParams;
use crate::path::{PathItem, PathItemKind};
use crate::region::Region;
use crate::slice::Slice;
use crate::tree::MedialTree;
use tracing::{debug, error, warn};

/// Places slices over the whole tree; returns the finished slice store.
pub fn roll_tree(
    tree: &mut MedialTree,
    region: &Region,
    params: &ClearingParams,
) -> Result<SliceStore> {
    let mut store = SliceStore::new(region.bounds().expanded(params.cutter_radius()));
    let dir = params.mill_direction.rotation();
    let mut last_slice: Option<usize> = None;

    for branch_id in tree.traversal_order() {
        if tree.branches[branch_id].curve.is_empty() {
            return Err(ClearingError::EmptyBranchCurve { branch: branch_id });
        }
        let entry_point = tree.branches[branch_id].point_at(0.0);

        let parent_slice = if tree.branches[branch_id].parent.is_none() {
            // Root branch opens with a full circle at the deepest point.
            let r0 = region.mic_radius(entry_point);
            if r0 < params.min_passable_mic() {
                warn!("root point is too narrow to enter the pocket");
                return Ok(store);
            }
            let id = store.insert(Slice::root(entry_point, r0, dir));
            tree.branches[branch_id].slices.push(id);
            last_slice = Some(id);
            id
        } else {
            match nearest_ancestor_slice(tree, &store, branch_id, entry_point) {
                Some(id) => id,
                None => {
                    warn!("branch {} has no ancestor slice to attach to; skipped", branch_id);
                    continue;
                }
            }
        };

        roll_branch(
            tree,
            branch_id,
            parent_slice,
            &mut last_slice,
            &mut store,
            region,
            params,
        );
    }
    Ok(store)
}

/// Closest slice to `at` over the union of upstream slices on ancestors.
fn nearest_ancestor_slice(
    tree: &MedialTree,
    store: &SliceStore,
    branch_id: usize,
    at: pocketkit_core::Point,
) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    let mut cur = tree.branches[branch_id].parent;
    while let Some(b) = cur {
        for &sid in &tree.branches[b].slices {
            let d = store.slices[sid].ball.center.distance_to(&at);
            let better = match best {
                None => true,
                Some((bd, bid)) => d < bd || (d == bd && sid < bid),
            };
            if better {
                best = Some((d, sid));
            }
        }
        cur = tree.branches[b].parent;
    }
    best.map(|(_, id)| id)
}

/// Rolls slices along one branch until its tip is reached or the
/// engagement band cannot be met any more.
fn roll_branch(
    tree: &mut MedialTree,
    branch_id: usize,
    mut parent_slice: usize,
    last_slice: &mut Option<usize>,
    store: &mut SliceStore,
    region: &Region,
    params: &ClearingParams,
) {
    if tree.branches[branch_id].length() <= params.general_tolerance {
        return;
    }
    let tol = params.general_tolerance;
    let max_eng = params.max_engagement;
    let eps_eng = params.engagement_tolerance;
    let dir = params.mill_direction.rotation();
    let mut left = 0.0;

    loop {
        let mut right = 1.0;
        let mut candidate: Option<(Slice, f64)> = None;

        loop {
            let mid = (left + right) / 2.0;
            let p = tree.branches[branch_id].point_at(mid);
            let r = region.mic_radius(p);
            if r < params.min_passable_mic() {
                // Channel narrows past this point; pull back.
                right = mid;
            } else {
                let parent_ball = store.slices[parent_slice].ball;
                let mut s = Slice::tentative(parent_slice, &parent_ball, p, r, dir);
                if s.max_engagement == 0.0 {
                    if s.dist <= 0.0 {
                        left = mid; // overlapping, push further out
                    } else {
                        right = mid; // disjoint, pull back
                    }
                } else {
                    let colliders = store.colliders_near(&s.ball, parent_slice);
                    s.refine(&parent_ball, &colliders, params.segment_derating_k);
                    if s.max_engagement == 0.0 {
                        // Everything here was cut before; push further out.
                        left = mid;
                    } else {
                        let eng = s.max_engagement;
                        candidate = Some((s, mid));
                        if eng > max_eng {
                            right = mid;
                        } else if (max_eng - eng) / max_eng > eps_eng {
                            left = mid;
                        } else {
                            left = mid;
                            break;
                        }
                    }
                }
            }
            let span = tree.branches[branch_id]
                .point_at(left)
                .distance_to(&tree.branches[branch_id].point_at(right));
            if span < tol {
                break;
            }
        }

        let Some((cand, cand_u)) = candidate else {
            break; // nothing fits between here and the tip
        };
        let eng = cand.max_engagement;
        if (eng - max_eng) / max_eng > 10.0 * eps_eng {
            error!(
                "branch {}: engagement {:.4} exceeds relaxed limit {:.4}; terminating branch",
                branch_id,
                eng,
                max_eng * (1.0 + 10.0 * eps_eng)
            );
            break;
        }
        if eng < params.min_engagement {
            // Remaining tip is too light a cut to emit.
            break;
        }

        if tree.branches[branch_id].slices.is_empty() {
            if let Some(last) = *last_slice {
                let segments = switch_branch(
                    store,
                    last,
                    &cand,
                    cand.parent,
                    None,
                    None,
                    None,
                    tol,
                );
                tree.branches[branch_id].entry =
                    Some(PathItem::new(PathItemKind::BranchEntry, segments));
            }
        }

        let id = store.insert(cand);
        tree.branches[branch_id].slices.push(id);
        debug!(
            "branch {}: slice {} at u={:.4}, engagement {:.4}",
            branch_id, id, cand_u, eng
        );
        parent_slice = id;
        *last_slice = Some(id);
        // Every candidate parameter lies past the search window's start,
        // so the cursor strictly advances.
        left = cand_u.max(left);
        if 1.0 - left < 1e-9 {
            break;
        }
    }
}
