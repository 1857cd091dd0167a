//! Three-way body merge: reconcile two edited bodies against a common ancestor.

use std::collections::BTreeSet;

use perspectivedb_proto::Body;

/// Merge `body_x` and `body_y` against their (already-reconciled) common
/// ancestor bodies, attribute by attribute.
///
/// For each attribute `k`, with `v_lca = lca_body_x[k]` (equivalently
/// `lca_body_y[k]` -- the caller guarantees both have already been
/// reconciled or are equal):
/// - `v_x == v_y` → keep `v_x`
/// - `v_x == v_lca` → take `v_y` (including absence: Y deleted it)
/// - `v_y == v_lca` → take `v_x`
/// - otherwise → conflict
///
/// One case the "reconciled or equal" guarantee does not cover: a key
/// tracked in only one side's ancestor body at all (a field a perspective
/// hook strips from the other side entirely, e.g. a secret). There, a
/// missing key on the other side means "not visible to this perspective,"
/// not "deleted" -- so that key is carried through unconditionally from the
/// side that tracks it, bypassing the deletion/conflict logic below.
///
/// Symmetric: swapping X and Y (bodies and LCA bodies together) yields the
/// same conflict set and, absent conflicts, a structurally equal body.
pub fn three_way_merge(body_x: &Body, body_y: &Body, lca_body_x: &Body, lca_body_y: &Body) -> Result<Body, Vec<String>> {
    let mut keys = BTreeSet::new();
    keys.extend(body_x.keys().cloned());
    keys.extend(body_y.keys().cloned());
    keys.extend(lca_body_x.keys().cloned());
    keys.extend(lca_body_y.keys().cloned());

    let mut merged = Body::new();
    let mut conflicts = Vec::new();

    for k in keys {
        let in_lca_x = lca_body_x.contains_key(&k);
        let in_lca_y = lca_body_y.contains_key(&k);
        let v_x = body_x.get(&k);
        let v_y = body_y.get(&k);

        if in_lca_x != in_lca_y {
            if let Some(v) = if in_lca_x { v_x } else { v_y } {
                merged.insert(k, v.clone());
            }
            continue;
        }

        let v_lca = lca_body_x.get(&k).or_else(|| lca_body_y.get(&k));

        if v_x == v_y {
            if let Some(v) = v_x {
                merged.insert(k, v.clone());
            }
        } else if v_x == v_lca {
            if let Some(v) = v_y {
                merged.insert(k, v.clone());
            }
        } else if v_y == v_lca {
            if let Some(v) = v_x {
                merged.insert(k, v.clone());
            }
        } else {
            conflicts.push(k);
        }
    }

    if conflicts.is_empty() {
        Ok(merged)
    } else {
        Err(conflicts)
    }
}
