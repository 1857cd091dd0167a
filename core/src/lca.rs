//! LCA Finder: the heart of the reconciliation engine.

use std::collections::{BTreeMap, BTreeSet};

use perspectivedb_proto::{Item, Version};

use crate::error::ReconcileError;
use crate::traits::ItemStream;

/// The minimum a version-comparison needs from an item. Lets callers who
/// carry their own business types plug them in without copying, by
/// implementing this instead of depending on [`Item`] directly (see design
/// notes on duck-typed items).
pub trait HasVersion {
    fn v(&self) -> Option<Version>;
    fn pa(&self) -> &[Version];
}

impl HasVersion for Item {
    fn v(&self) -> Option<Version> { self.h.v }
    fn pa(&self) -> &[Version] { &self.h.pa }
}

/// Result of a successful LCA search: the LCA versions plus, for each one,
/// the item as observed on each side -- so the caller can three-way-merge
/// perspective-specific fields.
#[derive(Debug, Clone)]
pub struct LcaOutcome {
    pub lcas: Vec<Version>,
    pub lca_items_x: BTreeMap<Version, Item>,
    pub lca_items_y: BTreeMap<Version, Item>,
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum Side {
    X,
    Y,
}

/// One side's traversal bookkeeping.
struct SideState {
    open_heads: BTreeSet<Version>,
    seen: BTreeSet<Version>,
    items: BTreeMap<Version, Item>,
    ended: bool,
}

impl SideState {
    fn new(root: &Item) -> Self {
        let mut seen = BTreeSet::new();
        // A non-virtual root is trivially part of its own side's lineage;
        // a virtual root contributes nothing (its parents seed the
        // frontier directly).
        if let Some(v) = root.v() {
            seen.insert(v);
        }
        Self { open_heads: root.pa().iter().copied().collect(), seen, items: BTreeMap::new(), ended: false }
    }

    fn pullable(&self) -> bool { !self.ended && !self.open_heads.is_empty() }
}

/// Consume two reverse-topological ancestor streams and find the lowest
/// common ancestors of `root_x` and `root_y`.
///
/// `stream_x`/`stream_y` must yield *proper* ancestors only (not the root
/// itself) -- this is what [`crate::traits::Tree::walk`] and
/// [`crate::traits::Tree::walk_from_versions`] produce, and is the
/// typed equivalent of prepending a virtual head in band as a stream item.
pub async fn find_lcas(
    root_x: &Item,
    stream_x: &mut dyn ItemStream,
    root_y: &Item,
    stream_y: &mut dyn ItemStream,
) -> Result<LcaOutcome, ReconcileError> {
    if root_x.h.id != root_y.h.id {
        return Err(ReconcileError::ArgumentError(format!("roots must share the same item id ({} != {})", root_x.h.id, root_y.h.id)));
    }

    let mut x = SideState::new(root_x);
    let mut y = SideState::new(root_y);
    let mut common_ancestors: BTreeSet<Version> = BTreeSet::new();
    let mut lcas: Vec<Version> = Vec::new();

    // Both roots' own versions can be common ancestors of each other
    // (e.g. a fast-forward, where root_x is itself an ancestor of root_y).
    if let (Some(vx), Some(vy)) = (root_x.v(), root_y.v()) {
        if vx == vy {
            common_ancestors.insert(vx);
            lcas.push(vx);
        }
    }

    let mut prefer_x = true;
    loop {
        let open = x.open_heads.union(&y.open_heads).cloned().collect::<BTreeSet<_>>();
        if open.is_subset(&common_ancestors) {
            break;
        }
        if x.ended && y.ended {
            break;
        }

        let pull_x = prefer_x && x.pullable() || (!prefer_x && !y.pullable() && x.pullable());
        let side = if pull_x { Side::X } else if y.pullable() { Side::Y } else { break };
        prefer_x = !prefer_x;

        let (state, stream) = match side {
            Side::X => (&mut x, &mut *stream_x),
            Side::Y => (&mut y, &mut *stream_y),
        };

        let Some(item) = stream.next().await? else {
            state.ended = true;
            continue;
        };

        let Some(v) = item.v() else {
            tracing::trace!("ancestor stream yielded an item with no version, ignoring");
            continue;
        };

        if !state.open_heads.remove(&v) {
            // Not a head we were waiting on; walker invariants should
            // prevent this, but ignore defensively rather than error.
            continue;
        }
        state.open_heads.extend(item.pa().iter().copied());
        state.seen.insert(v);
        state.items.insert(v, item.clone());

        if x.seen.contains(&v) && y.seen.contains(&v) {
            if common_ancestors.insert(v) {
                lcas.push(v);
            }
            // Shadow `v`'s parents regardless of whether `v` was a fresh
            // common ancestor or had already been pre-marked by a
            // sibling LCA's own parent-propagation step -- `v` is
            // confirmed mutual either way, so its parents are no longer
            // eligible LCAs even several generations down the chain.
            for parent in item.pa() {
                common_ancestors.insert(*parent);
                lcas.retain(|existing| existing != parent);
            }
        }
    }

    let lca_items_x = lcas.iter().filter_map(|v| x.items.get(v).map(|item| (*v, item.clone()))).collect();
    let lca_items_y = lcas.iter().filter_map(|v| y.items.get(v).map(|item| (*v, item.clone()))).collect();

    Ok(LcaOutcome { lcas, lca_items_x, lca_items_y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{item, MemStore};
    use crate::traits::{Selector, Store, Tree};
    use perspectivedb_proto::{ItemId, PerspectiveId};
    use std::sync::Arc;

    fn tree(store: Arc<MemStore>, id: ItemId, pe: PerspectiveId) -> Tree<MemStore> { Tree::new(store, Selector::for_id(id), pe) }

    #[tokio::test]
    async fn linear_fast_forward_has_one_lca_equal_to_the_elder() {
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let a = Version::hash(b"a");
        let b = Version::hash(b"b");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), a, vec![], pe.clone(), Some(0)),
            item(id.clone(), b, vec![a], pe.clone(), Some(1)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_a = store.get_by_version(&id, &pe, &a).await.unwrap().unwrap();
        let item_b = store.get_by_version(&id, &pe, &b).await.unwrap().unwrap();

        let mut sx = t.walk(&item_a);
        let mut sy = t.walk(&item_b);
        let outcome = find_lcas(&item_a, &mut sx, &item_b, &mut sy).await.unwrap();

        assert_eq!(outcome.lcas, vec![a]);
    }

    #[tokio::test]
    async fn diverged_siblings_have_one_lca() {
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let a = Version::hash(b"a");
        let b = Version::hash(b"b");
        let c = Version::hash(b"c");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), a, vec![], pe.clone(), Some(0)),
            item(id.clone(), b, vec![a], pe.clone(), Some(1)),
            item(id.clone(), c, vec![a], pe.clone(), Some(2)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_b = store.get_by_version(&id, &pe, &b).await.unwrap().unwrap();
        let item_c = store.get_by_version(&id, &pe, &c).await.unwrap().unwrap();

        let mut sx = t.walk(&item_b);
        let mut sy = t.walk(&item_c);
        let outcome = find_lcas(&item_b, &mut sx, &item_c, &mut sy).await.unwrap();

        assert_eq!(outcome.lcas, vec![a]);
        assert!(outcome.lca_items_x.contains_key(&a));
        assert!(outcome.lca_items_y.contains_key(&a));
    }

    #[tokio::test]
    async fn disconnected_dags_yield_no_lcas() {
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let a = Version::hash(b"a");
        let z = Version::hash(b"z");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), a, vec![], pe.clone(), Some(0)),
            item(id.clone(), z, vec![], pe.clone(), Some(1)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_a = store.get_by_version(&id, &pe, &a).await.unwrap().unwrap();
        let item_z = store.get_by_version(&id, &pe, &z).await.unwrap().unwrap();

        let mut sx = t.walk(&item_a);
        let mut sy = t.walk(&item_z);
        let outcome = find_lcas(&item_a, &mut sx, &item_z, &mut sy).await.unwrap();

        assert!(outcome.lcas.is_empty());
    }

    #[tokio::test]
    async fn criss_cross_yields_two_lcas() {
        // A <- B, A <- C; B <- D, C <- D, B <- E, C <- E (D and E both merges of B,C)
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let a = Version::hash(b"a");
        let b = Version::hash(b"b");
        let c = Version::hash(b"c");
        let d = Version::hash(b"d");
        let e = Version::hash(b"e");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), a, vec![], pe.clone(), Some(0)),
            item(id.clone(), b, vec![a], pe.clone(), Some(1)),
            item(id.clone(), c, vec![a], pe.clone(), Some(2)),
            item(id.clone(), d, vec![b, c], pe.clone(), Some(3)),
            item(id.clone(), e, vec![b, c], pe.clone(), Some(4)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_d = store.get_by_version(&id, &pe, &d).await.unwrap().unwrap();
        let item_e = store.get_by_version(&id, &pe, &e).await.unwrap().unwrap();

        let mut sx = t.walk(&item_d);
        let mut sy = t.walk(&item_e);
        let mut outcome = find_lcas(&item_d, &mut sx, &item_e, &mut sy).await.unwrap();
        outcome.lcas.sort();

        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(outcome.lcas, expected);
    }

    #[tokio::test]
    async fn a_pre_marked_common_ancestor_still_shadows_its_own_parents_on_reconfirmation() {
        // U <- V <- W is a linear chain; W is the one true LCA. Each root
        // also carries a private sibling branch (P, Q) that keeps the
        // traversal's open-heads frontier non-empty past the point where W
        // is first confirmed, so V (already pre-marked common via W's own
        // shadow step) is later independently dequeued and re-confirmed as
        // mutual from both streams. That re-confirmation must still shadow
        // V's own parent U -- otherwise U can surface as a spurious LCA
        // once it is independently confirmed mutual in turn.
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let u = Version::hash(b"u");
        let v = Version::hash(b"v");
        let w = Version::hash(b"w");
        let p = Version::hash(b"p");
        let q = Version::hash(b"q");
        let x_head = Version::hash(b"x_head");
        let y_head = Version::hash(b"y_head");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), u, vec![], pe.clone(), Some(0)),
            item(id.clone(), v, vec![u], pe.clone(), Some(1)),
            item(id.clone(), w, vec![v], pe.clone(), Some(2)),
            item(id.clone(), p, vec![], pe.clone(), Some(3)),
            item(id.clone(), q, vec![], pe.clone(), Some(4)),
            item(id.clone(), x_head, vec![w, p], pe.clone(), Some(5)),
            item(id.clone(), y_head, vec![w, q], pe.clone(), Some(6)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_x = store.get_by_version(&id, &pe, &x_head).await.unwrap().unwrap();
        let item_y = store.get_by_version(&id, &pe, &y_head).await.unwrap().unwrap();

        let mut sx = t.walk(&item_x);
        let mut sy = t.walk(&item_y);
        let outcome = find_lcas(&item_x, &mut sx, &item_y, &mut sy).await.unwrap();

        assert_eq!(outcome.lcas, vec![w], "V and U are proper ancestors of the true LCA W and must not appear");
    }

    #[tokio::test]
    async fn find_lcas_is_symmetric_under_swapping_the_two_roots() {
        let id = ItemId::from("obj-1");
        let pe = PerspectiveId::from("local");
        let a = Version::hash(b"a");
        let b = Version::hash(b"b");
        let c = Version::hash(b"c");

        let store = Arc::new(MemStore::from_edges(vec![
            item(id.clone(), a, vec![], pe.clone(), Some(0)),
            item(id.clone(), b, vec![a], pe.clone(), Some(1)),
            item(id.clone(), c, vec![a], pe.clone(), Some(2)),
        ]));

        let t = tree(store.clone(), id.clone(), pe.clone());
        let item_b = store.get_by_version(&id, &pe, &b).await.unwrap().unwrap();
        let item_c = store.get_by_version(&id, &pe, &c).await.unwrap().unwrap();

        let mut sx = t.walk(&item_b);
        let mut sy = t.walk(&item_c);
        let forward = find_lcas(&item_b, &mut sx, &item_c, &mut sy).await.unwrap();

        let mut sx2 = t.walk(&item_c);
        let mut sy2 = t.walk(&item_b);
        let backward = find_lcas(&item_c, &mut sx2, &item_b, &mut sy2).await.unwrap();

        assert_eq!(forward.lcas, backward.lcas);
    }
}
