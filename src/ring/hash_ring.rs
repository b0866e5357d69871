use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::RingError;

/// Hash function placing node ids and keys on the ring
pub type HashFn = fn(&[u8]) -> u32;

/// CRC-32 (IEEE polynomial), the default placement hash.
pub fn crc32_ieee(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// What to do when a joining node hashes onto an occupied position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Refuse the join with `RingError::HashCollision`
    #[default]
    Reject,
    /// Take the next free position clockwise. Positions depend only on the
    /// member set, so a join or leave may shift other members of the same
    /// probe chain.
    Probe,
}

/// Ring of node positions.
///
/// `sorted` always equals the sorted key set of `nodes`; every mutation
/// restores that before returning.
#[derive(Clone)]
pub struct HashRing {
    /// position -> node id
    nodes: HashMap<u32, String>,
    /// node id -> position; differs from the node's hash only after probing
    positions: HashMap<String, u32>,
    sorted: Vec<u32>,
    policy: CollisionPolicy,
    hash_fn: HashFn,
}

impl fmt::Debug for HashRing {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("nodes", &self.nodes().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    pub fn new() -> Self {
        Self::with_hash_fn(CollisionPolicy::default(), crc32_ieee)
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self::with_hash_fn(policy, crc32_ieee)
    }

    pub fn with_hash_fn(
        policy: CollisionPolicy,
        hash_fn: HashFn,
    ) -> Self {
        Self {
            nodes: HashMap::new(),
            positions: HashMap::new(),
            sorted: Vec::new(),
            policy,
            hash_fn,
        }
    }

    /// The hash shared by node placement and key lookup.
    pub fn hash_key(
        &self,
        key: impl AsRef<[u8]>,
    ) -> u32 {
        (self.hash_fn)(key.as_ref())
    }

    /// Places `node_id` on the ring and returns its position.
    ///
    /// Adding a node that is already on the ring is a no-op. Under
    /// [`CollisionPolicy::Probe`] a colliding join re-places the members
    /// sharing that probe chain; see [`place_probed`](Self::place_probed).
    pub fn add_node(
        &mut self,
        node_id: &str,
    ) -> Result<u32> {
        if let Some(&position) = self.positions.get(node_id) {
            debug!("node {} already on ring at position {}", node_id, position);
            return Ok(position);
        }

        let hash = self.hash_key(node_id);
        if let Some(existing) = self.nodes.get(&hash) {
            match self.policy {
                CollisionPolicy::Reject => {
                    warn!(
                        "rejecting node {}: position {} already held by {}",
                        node_id, hash, existing
                    );
                    return Err(RingError::HashCollision {
                        position: hash,
                        existing: existing.clone(),
                        incoming: node_id.to_string(),
                    }
                    .into());
                }
                CollisionPolicy::Probe => {
                    warn!("node {} collides with {} at {}, probing", node_id, existing, hash);
                }
            }
        }

        let position = match self.policy {
            CollisionPolicy::Reject => {
                self.nodes.insert(hash, node_id.to_string());
                self.positions.insert(node_id.to_string(), hash);
                let index = self.sorted.partition_point(|&p| p < hash);
                self.sorted.insert(index, hash);
                hash
            }
            CollisionPolicy::Probe => {
                self.positions.insert(node_id.to_string(), hash);
                self.place_probed();
                self.positions[node_id]
            }
        };

        info!("node {} joined ring at position {}", node_id, position);
        Ok(position)
    }

    /// Takes `node_id` off the ring and returns the position it held.
    ///
    /// Under [`CollisionPolicy::Probe`] members that were probed past the
    /// freed position move back toward their hash.
    pub fn remove_node(
        &mut self,
        node_id: &str,
    ) -> Result<u32> {
        let position = self.positions.remove(node_id).ok_or_else(|| RingError::NodeNotFound {
            node_id: node_id.to_string(),
        })?;
        self.nodes.remove(&position);
        match self.policy {
            CollisionPolicy::Reject => self.rebuild_sorted_positions(),
            CollisionPolicy::Probe => self.place_probed(),
        }

        info!("node {} left ring position {}", node_id, position);
        Ok(position)
    }

    /// Owner of `key`: the node at the smallest position `>= hash(key)`,
    /// wrapping to the lowest position.
    pub fn get_node(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<&str> {
        self.node_for_hash(self.hash_key(key))
    }

    pub fn node_for_hash(
        &self,
        hash: u32,
    ) -> Result<&str> {
        let index = self.successor_index(hash)?;
        Ok(&self.nodes[&self.sorted[index]])
    }

    /// Index into [`positions`](Self::positions) of the owner of `hash`.
    pub fn successor_index(
        &self,
        hash: u32,
    ) -> Result<usize> {
        if self.sorted.is_empty() {
            return Err(RingError::EmptyRing.into());
        }
        let index = self.sorted.partition_point(|&p| p < hash);
        Ok(if index == self.sorted.len() { 0 } else { index })
    }

    /// Index of `node_id`'s position in the sorted position sequence.
    pub fn index_of(
        &self,
        node_id: &str,
    ) -> Option<usize> {
        let position = self.positions.get(node_id)?;
        self.sorted.binary_search(position).ok()
    }

    pub fn position_of(
        &self,
        node_id: &str,
    ) -> Option<u32> {
        self.positions.get(node_id).copied()
    }

    pub fn node_at(
        &self,
        position: u32,
    ) -> Option<&str> {
        self.nodes.get(&position).map(String::as_str)
    }

    pub fn node_at_index(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.sorted.get(index).and_then(|position| self.node_at(*position))
    }

    /// Occupied positions in ascending order.
    pub fn positions(&self) -> &[u32] {
        &self.sorted
    }

    /// `(position, node id)` pairs in ring order.
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.sorted.iter().map(move |p| (*p, self.nodes[p].as_str()))
    }

    pub fn contains(
        &self,
        node_id: &str,
    ) -> bool {
        self.positions.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    fn probe_from(
        &self,
        start: u32,
    ) -> u32 {
        // Terminates: fewer than 2^32 positions are ever occupied
        let mut candidate = start.wrapping_add(1);
        while self.nodes.contains_key(&candidate) {
            candidate = candidate.wrapping_add(1);
        }
        candidate
    }

    /// Recomputes every position from the member set alone.
    ///
    /// Members are placed in `(hash, id)` order, each at its hash or the next
    /// free position clockwise. Two rings with the same members therefore
    /// agree on every position, whatever order the joins and leaves came in.
    fn place_probed(&mut self) {
        let mut members: Vec<(u32, String)> = self
            .positions
            .keys()
            .map(|id| (self.hash_key(id), id.clone()))
            .collect();
        members.sort_unstable();

        self.nodes.clear();
        self.positions.clear();
        for (hash, id) in members {
            let position = if self.nodes.contains_key(&hash) {
                self.probe_from(hash)
            } else {
                hash
            };
            if position != hash {
                debug!("node {} probed from {} to {}", id, hash, position);
            }
            self.nodes.insert(position, id.clone());
            self.positions.insert(id, position);
        }
        self.rebuild_sorted_positions();
    }

    fn rebuild_sorted_positions(&mut self) {
        self.sorted = self.nodes.keys().copied().collect();
        self.sorted.sort_unstable();
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let mut keys: Vec<u32> = self.nodes.keys().copied().collect();
        keys.sort_unstable();
        keys == self.sorted
            && self.positions.len() == self.nodes.len()
            && self.positions.iter().all(|(id, p)| self.nodes.get(p) == Some(id))
    }
}
