//! Merger: orchestrates ancestor walking and LCA search, folds multiple
//! LCAs, dispatches to fast-forward or true three-way merge.

use futures::future::BoxFuture;

use perspectivedb_proto::{Header, Item, Version};

use crate::body_merge::three_way_merge;
use crate::error::ReconcileError;
use crate::lca::find_lcas;
use crate::traits::{Store, Tree};

/// States a single `merge` call passes through, linearly, with no
/// backtracking. Not returned from `merge` -- the error variant already
/// pins down which state a failed merge reached (see the doc comment on
/// each [`ReconcileError`] variant) -- but named here so the stages are
/// legible in `tracing` output and in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Init,
    StreamsOpened,
    LcasCollected,
    LcaFolded,
    Merged,
}

/// Orchestrates the ancestor walker and LCA finder to reconcile two
/// versions of the same logical item, dispatching to a fast-forward or a
/// true three-way merge.
pub struct Merger;

impl Merger {
    /// Reconcile `item_x` (as known to `tree_x`) with `item_y` (as known to
    /// `tree_y`), returning one merged item per side. `tree_x`/`tree_y` may
    /// be the same tree (reconciling two heads of one perspective) or two
    /// different perspectives of the same logical object.
    pub async fn merge<SX, SY>(
        item_x: &Item,
        item_y: &Item,
        tree_x: &Tree<SX>,
        tree_y: &Tree<SY>,
    ) -> Result<(Item, Item), ReconcileError>
    where
        SX: Store + 'static,
        SY: Store + 'static,
    {
        if item_x.h.id != item_y.h.id {
            return Err(ReconcileError::IdMismatch { x: item_x.h.id.clone(), y: item_y.h.id.clone() });
        }
        item_x.h.v.ok_or_else(|| ReconcileError::MissingVersion(item_x.h.id.clone()))?;
        item_y.h.v.ok_or_else(|| ReconcileError::MissingVersion(item_y.h.id.clone()))?;

        Self::merge_boxed(item_x.clone(), item_y.clone(), tree_x, tree_y).await
    }

    /// Core recursion, shared by the public entry point and by
    /// [`Self::fold_lcas`]'s multi-LCA reduction. Unlike [`Self::merge`] this
    /// does not require either side to carry a version: the accumulator
    /// side of a fold is exactly the "item with joined `h.pa` but no `h.v`"
    /// virtual head the design calls out, and C2/C3 both already treat a
    /// versionless root as valid (its parents seed the frontier directly).
    fn merge_boxed<'a, SX, SY>(
        item_x: Item,
        item_y: Item,
        tree_x: &'a Tree<SX>,
        tree_y: &'a Tree<SY>,
    ) -> BoxFuture<'a, Result<(Item, Item), ReconcileError>>
    where
        SX: Store + 'static,
        SY: Store + 'static,
    {
        Box::pin(async move {
            tracing::debug!(state = ?MergeState::Init, id = %item_x.h.id, "starting merge");

            if item_x.h.id != item_y.h.id {
                return Err(ReconcileError::IdMismatch { x: item_x.h.id.clone(), y: item_y.h.id.clone() });
            }

            let mut stream_x = tree_x.walk(&item_x);
            let mut stream_y = tree_y.walk(&item_y);
            tracing::debug!(state = ?MergeState::StreamsOpened, "opened ancestor streams");

            let outcome = find_lcas(&item_x, &mut stream_x, &item_y, &mut stream_y).await?;
            if outcome.lcas.is_empty() {
                return Err(ReconcileError::NoLcaFound);
            }
            tracing::debug!(state = ?MergeState::LcasCollected, count = outcome.lcas.len(), "collected lcas");

            let mut candidates = Vec::with_capacity(outcome.lcas.len());
            for v in &outcome.lcas {
                let lx = Self::resolve_lca_item(tree_x, &outcome.lca_items_x, *v).await?;
                let ly = Self::resolve_lca_item(tree_y, &outcome.lca_items_y, *v).await?;
                candidates.push((lx, ly));
            }

            let (lca_x, lca_y) = Self::fold_lcas(candidates, tree_x, tree_y).await?;
            tracing::debug!(state = ?MergeState::LcaFolded, "folded to a single lca pair");

            let result = Self::do_merge(&item_x, &item_y, &lca_x, &lca_y)?;
            tracing::debug!(state = ?MergeState::Merged, id = %item_x.h.id, "merge complete");
            Ok(result)
        })
    }

    async fn resolve_lca_item<S: Store>(
        tree: &Tree<S>,
        observed: &std::collections::BTreeMap<Version, Item>,
        v: Version,
    ) -> Result<Item, ReconcileError> {
        if let Some(item) = observed.get(&v) {
            return Ok(item.clone());
        }
        tree.get_by_version(&v).await?.ok_or(ReconcileError::LcaUnresolvable(v))
    }

    /// Reduce more than one LCA candidate to a single pair by recursively
    /// merging within each side's own tree, folding left to right. A single
    /// candidate is returned unchanged.
    async fn fold_lcas<SX, SY>(
        mut candidates: Vec<(Item, Item)>,
        tree_x: &Tree<SX>,
        tree_y: &Tree<SY>,
    ) -> Result<(Item, Item), ReconcileError>
    where
        SX: Store + 'static,
        SY: Store + 'static,
    {
        let mut acc = candidates.remove(0);
        for (next_x, next_y) in candidates {
            // `acc` may already be a virtual head from a previous fold (a
            // true merge with no `h.v`); go through `merge_boxed` directly
            // rather than the public `merge`, which would reject it as
            // missing a version. `merge_boxed` and the streams it opens
            // already treat a versionless root correctly: its `h.pa` seeds
            // the walker's frontier in place of re-yielding itself.
            let (folded_x, _) = Self::merge_boxed(acc.0, next_x, tree_x, tree_x).await?;
            let (folded_y, _) = Self::merge_boxed(acc.1, next_y, tree_y, tree_y).await?;
            acc = (folded_x, folded_y);
        }
        Ok(acc)
    }

    /// An item's contribution to a new merge header's `h.pa`: its own
    /// version if it has one, or its parents if it is itself a virtual head
    /// produced by a previous fold.
    fn merge_parents(item: &Item) -> Vec<Version> {
        match item.h.v {
            Some(v) => vec![v],
            None => item.h.pa.clone(),
        }
    }

    fn do_merge(item_x: &Item, item_y: &Item, lca_x: &Item, lca_y: &Item) -> Result<(Item, Item), ReconcileError> {
        match (lca_x.h.v, lca_y.h.v) {
            (Some(a), Some(b)) if a != b => return Err(ReconcileError::LcaVersionMismatch { x: a, y: b }),
            _ => {}
        }

        if item_x.h.v == item_y.h.v {
            return Ok((item_x.clone(), item_y.clone()));
        }

        if lca_x.h.v == item_x.h.v {
            // Y is ahead: fast-forward X over Y.
            return Self::fast_forward(item_y, item_x, lca_y, lca_x).map(|(y, x)| (x, y));
        }
        if lca_y.h.v == item_y.h.v {
            // X is ahead: fast-forward Y over X.
            return Self::fast_forward(item_x, item_y, lca_x, lca_y);
        }

        Self::true_merge(item_x, item_y, lca_x, lca_y)
    }

    /// `ahead` is already a descendant of `behind` (the LCA equals
    /// `behind`'s version); produce `(mergedAhead, mergedBehind)`. The ahead
    /// side is returned unchanged; the behind side is recomputed so its
    /// perspective-private fields and any concurrent edits survive.
    fn fast_forward(ahead: &Item, behind: &Item, lca_ahead: &Item, lca_behind: &Item) -> Result<(Item, Item), ReconcileError> {
        let merged_behind_body = three_way_merge(&behind.body_or_empty(), &ahead.body_or_empty(), &lca_behind.body_or_empty(), &lca_ahead.body_or_empty())
            .map_err(|conflict| ReconcileError::MergeConflict { conflict })?;

        let behind_header = Header {
            id: behind.h.id.clone(),
            v: ahead.h.v,
            pa: ahead.h.pa.clone(),
            pe: behind.h.pe.clone(),
            i: None,
            d: ahead.h.d,
        };
        let merged_behind = Item::new(behind_header, Some(merged_behind_body));

        Ok((ahead.clone(), merged_behind))
    }

    fn true_merge(item_x: &Item, item_y: &Item, lca_x: &Item, lca_y: &Item) -> Result<(Item, Item), ReconcileError> {
        let merged_body = three_way_merge(&item_x.body_or_empty(), &item_y.body_or_empty(), &lca_x.body_or_empty(), &lca_y.body_or_empty())
            .map_err(|conflict| ReconcileError::MergeConflict { conflict })?;

        let tombstone = item_x.h.d && item_y.h.d;
        // Ordinarily the new header's parents are simply [x's version, y's
        // version]. During multi-LCA folding one side can itself be an
        // already-folded virtual head (no `h.v`) -- there the joined
        // parents are its own `h.pa` instead, so the chain of virtual folds
        // still bottoms out at real, persisted versions.
        let pa = Self::merge_parents(item_x).into_iter().chain(Self::merge_parents(item_y)).collect::<Vec<_>>();

        let header_x = Header { id: item_x.h.id.clone(), v: None, pa: pa.clone(), pe: item_x.h.pe.clone(), i: None, d: tombstone };
        let header_y = Header { id: item_y.h.id.clone(), v: None, pa, pe: item_y.h.pe.clone(), i: None, d: tombstone };

        let merged_x = Item::new(header_x, Some(merged_body.clone()));
        let merged_y = Item::new(header_y, Some(merged_body));
        Ok((merged_x, merged_y))
    }
}
