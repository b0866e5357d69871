use crate::CollisionPolicy;
use crate::HashRing;
use crate::NodeMeta;

/// Places `A`, `B`, `C` at 10, 50, 90; any decimal string hashes to its value.
pub(crate) fn fixed_hash(bytes: &[u8]) -> u32 {
    match bytes {
        b"A" => 10,
        b"B" => 50,
        b"C" => 90,
        other => std::str::from_utf8(other).ok().and_then(|s| s.parse().ok()).unwrap_or(0),
    }
}

/// Ring holding `A@10`, `B@50`, `C@90` under [`fixed_hash`].
pub(crate) fn abc_ring(policy: CollisionPolicy) -> HashRing {
    let mut ring = HashRing::with_hash_fn(policy, fixed_hash);
    for id in ["A", "B", "C"] {
        ring.add_node(id).unwrap();
    }
    ring
}

pub(crate) fn node_meta(id: &str) -> NodeMeta {
    NodeMeta {
        id: id.to_string(),
        address: format!("{}.test:8080", id.to_lowercase()),
    }
}
