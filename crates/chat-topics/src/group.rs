//! Message groups and the disjoint-set used to merge them.
//!
//! Groups hold positions into the run's timestamp-sorted message list rather
//! than the messages themselves, so merging is index bookkeeping only.

use tracing::trace;

/// An intermediate cluster of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Positions into the sorted message list, ascending
    members: Vec<usize>,
    /// Earliest member timestamp
    start_time: i64,
    /// Latest member timestamp
    end_time: i64,
}

impl Group {
    /// Create a group holding one message.
    pub fn new(position: usize, timestamp: i64) -> Self {
        Self {
            members: vec![position],
            start_time: timestamp,
            end_time: timestamp,
        }
    }

    /// Append a message. Positions must arrive in ascending order.
    pub fn push(&mut self, position: usize, timestamp: i64) {
        debug_assert!(self.members.last().map_or(true, |&last| last < position));
        self.members.push(position);
        self.start_time = self.start_time.min(timestamp);
        self.end_time = self.end_time.max(timestamp);
    }

    /// Take over all members of `other`.
    pub fn absorb(&mut self, other: Group) {
        self.members.extend(other.members);
        self.members.sort_unstable();
        self.start_time = self.start_time.min(other.start_time);
        self.end_time = self.end_time.max(other.end_time);
    }

    /// Member positions, ascending.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    /// Position of the earliest member.
    pub fn first_position(&self) -> usize {
        self.members[0]
    }
}

/// Union-find over group indices.
///
/// Union by rank with path halving. Ties in rank attach the higher index
/// under the lower one so roots depend only on the order of `union` calls.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `len` singleton sets.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Join the sets containing `a` and `b`. Returns false if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }

        let (root, child) = match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Equal => {
                let (root, child) = (ra.min(rb), ra.max(rb));
                self.rank[root] += 1;
                (root, child)
            }
        };
        self.parent[child] = root;
        trace!(root, child, "Joined sets");
        true
    }
}

/// Collapse `groups` along the sets in `sets`.
///
/// Output groups appear in order of their lowest input index, so the result
/// depends only on input order and the recorded unions.
pub fn merge_components(groups: Vec<Group>, sets: &mut DisjointSet) -> Vec<Group> {
    assert_eq!(groups.len(), sets.len(), "Set size must match group count");

    let mut slot_of_root: Vec<Option<usize>> = vec![None; groups.len()];
    let mut merged: Vec<Group> = Vec::new();

    for (index, group) in groups.into_iter().enumerate() {
        let root = sets.find(index);
        match slot_of_root[root] {
            Some(slot) => merged[slot].absorb(group),
            None => {
                slot_of_root[root] = Some(merged.len());
                merged.push(group);
            }
        }
    }

    merged
}
