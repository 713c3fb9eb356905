#![expect(
    clippy::indexing_slicing,
    reason = "level indices are bounded by `max_level`, tower indices by each node's height",
)]

use oorandom::Rand64;

use crate::{
    arena::{Link, NodeArena, NodeId},
    node_heights::{random_node_height, ProbabilityTable},
};


// ================================
//  Nodes and fingers
// ================================

/// One stored element: a key, an opaque value, and one forward link per level of the
/// element's tower.
#[derive(Debug)]
pub(crate) struct Node<V> {
    key:   f64,
    value: V,
    /// Length is the node's tower height, in `1..=max_level`. By the level-subsequence
    /// invariant, any node linked from `next[level]` also has `next.len() > level`.
    next:  Box<[Link]>,
}

impl<V> Node<V> {
    /// The element's key. Never changes after insertion.
    #[inline]
    #[must_use]
    pub(crate) fn key(&self) -> f64 {
        self.key
    }

    #[inline]
    #[must_use]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    #[must_use]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    #[must_use]
    fn height(&self) -> usize {
        self.next.len()
    }
}

/// A predecessor position at one level: the head sentinel, or the last node at that level
/// whose key sorts strictly before some search target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finger {
    Head,
    At(NodeId),
}


// ================================
//  Inner list
// ================================

/// The entire jumplist state: head sentinel links, the node arena, the finger scratch
/// buffer, the probability table, and the height PRNG.
///
/// One `InnerList` sits behind one mutex; every method here runs under that exclusive
/// lock for its whole duration.
#[derive(Debug)]
pub(crate) struct InnerList<V> {
    /// The head sentinel: one forward link per level, no key or value of its own.
    /// Length is `max_level`.
    head:    Box<[Link]>,
    arena:   NodeArena<Node<V>>,
    /// Scratch predecessors written by [`move_fingers`], indexed by level. Only meaningful
    /// within the single call that wrote them; the next search overwrites every slot.
    ///
    /// [`move_fingers`]: InnerList::move_fingers
    fingers: Box<[Finger]>,
    table:   ProbabilityTable,
    prng:    Rand64,
}

impl<V> InnerList<V> {
    #[must_use]
    pub(crate) fn new(table: ProbabilityTable, seed: u64) -> Self {
        let max_level = table.max_level();

        Self {
            head:    vec![None; max_level].into_boxed_slice(),
            arena:   NodeArena::new(),
            fingers: vec![Finger::Head; max_level].into_boxed_slice(),
            table,
            prng:    Rand64::new(u128::from(seed)),
        }
    }

    /// The number of stored elements.
    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    #[must_use]
    pub(crate) fn max_level(&self) -> usize {
        self.head.len()
    }

    #[inline]
    #[must_use]
    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        self.arena.node(id)
    }

    #[inline]
    #[must_use]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.arena.node_mut(id)
    }

    /// The forward link at `level` out of `finger`'s position.
    #[inline]
    fn next_of(&self, finger: Finger, level: usize) -> Link {
        match finger {
            Finger::Head   => self.head[level],
            Finger::At(id) => self.arena.node(id).next[level],
        }
    }

    /// Rewrite the forward link at `level` out of `finger`'s position.
    #[inline]
    fn set_next(&mut self, finger: Finger, level: usize, link: Link) {
        match finger {
            Finger::Head   => self.head[level] = link,
            Finger::At(id) => self.arena.node_mut(id).next[level] = link,
        }
    }

    /// Return `Some(id)` if the provided `link` refers to a node whose key sorts strictly
    /// before `key`. Since `None` links sort after every key, in such a scenario the link
    /// is guaranteed to refer to a node.
    fn node_before_key(&self, link: Link, key: f64) -> Option<NodeId> {
        let id = link?;

        if self.arena.node(id).key.total_cmp(&key).is_lt() {
            Some(id)
        } else {
            None
        }
    }

    // ================================
    //  Searching
    // ================================

    /// One top-down finger sweep: for every level, record in the scratch buffer the last
    /// position (head or node) whose key sorts strictly before `key`.
    ///
    /// The sweep starts at the head sentinel's top level, moves right while the next node
    /// sorts before the target, and drops a level without moving right when it cannot.
    /// The position carries over between levels, so the whole sweep is a single
    /// `O(max_level + path)` pass.
    ///
    /// Afterwards, `fingers[0]`'s level-0 successor is the only candidate for an exact
    /// match; see [`match_at`](InnerList::match_at).
    fn move_fingers(&mut self, key: f64) {
        let mut finger = Finger::Head;

        for level in (0..self.max_level()).rev() {
            while let Some(id) = self.node_before_key(self.next_of(finger, level), key) {
                finger = Finger::At(id);
            }
            self.fingers[level] = finger;
        }
    }

    /// The candidate for an exact match of `key`: the level-0 successor of `finger`.
    ///
    /// A search only stops at a successor whose key sorts not-before the target, so a
    /// not-after check here means the keys are exactly equal — bit-level `total_cmp`
    /// equality, with no tolerance.
    fn match_at(&self, finger: Finger, key: f64) -> Option<NodeId> {
        let id = self.next_of(finger, 0)?;

        if self.arena.node(id).key.total_cmp(&key).is_le() {
            Some(id)
        } else {
            None
        }
    }

    /// Find the element whose key exactly equals `key`.
    ///
    /// This is the same top-down sweep as [`move_fingers`], with private position
    /// tracking: lookups have no further use for the per-level predecessors, so the
    /// shared scratch buffer is left alone.
    ///
    /// [`move_fingers`]: InnerList::move_fingers
    pub(crate) fn locate(&self, key: f64) -> Option<NodeId> {
        let mut finger = Finger::Head;

        for level in (0..self.max_level()).rev() {
            while let Some(id) = self.node_before_key(self.next_of(finger, level), key) {
                finger = Finger::At(id);
            }
        }

        self.match_at(finger, key)
    }

    // ================================
    //  Mutations
    // ================================

    /// Insert `value` under `key`, or overwrite the value of an existing element whose key
    /// exactly equals `key`. Returns the id of the stored element.
    ///
    /// An overwrite leaves the list's shape untouched: no new node, no relinking, and the
    /// element keeps its tower.
    pub(crate) fn insert(&mut self, key: f64, value: V) -> NodeId {
        self.move_fingers(key);

        if let Some(id) = self.match_at(self.fingers[0], key) {
            self.arena.node_mut(id).value = value;
            return id;
        }

        let height = random_node_height(&mut self.prng, &self.table);
        let id = self.arena.alloc(Node {
            key,
            value,
            next: vec![None; height].into_boxed_slice(),
        });

        // Each level's linkage is independent of the others: splice the node in right
        // after its recorded predecessor on every level of its tower.
        for level in 0..height {
            let finger = self.fingers[level];
            let successor = self.next_of(finger, level);

            self.arena.node_mut(id).next[level] = successor;
            self.set_next(finger, level, Some(id));
        }

        id
    }

    /// Unlink and free the element whose key exactly equals `key`, returning its key and
    /// value. Absent keys leave the list untouched.
    pub(crate) fn remove(&mut self, key: f64) -> Option<(f64, V)> {
        self.move_fingers(key);

        let id = self.match_at(self.fingers[0], key)?;

        // The element was never linked above its own height; those levels stay as-is.
        for level in 0..self.arena.node(id).height() {
            let successor = self.arena.node(id).next[level];
            self.set_next(self.fingers[level], level, successor);
        }

        let node = self.arena.free(id);
        Some((node.key, node.value))
    }
}


#[cfg(test)]
impl<V> InnerList<V> {
    /// The keys reachable at `level`, in chain order from the head sentinel.
    fn keys_at_level(&self, level: usize) -> Vec<f64> {
        let mut keys = Vec::new();
        let mut link = self.head[level];

        while let Some(id) = link {
            let node = self.arena.node(id);
            keys.push(node.key);
            link = node.next[level];
        }

        keys
    }

    /// Walk every level and assert the two structural invariants: strictly ascending keys
    /// per level, and each level being a subsequence of the level below.
    fn assert_invariants(&self) {
        use std::collections::HashSet;

        let mut keys_below: Option<HashSet<u64>> = None;

        for level in 0..self.max_level() {
            let keys = self.keys_at_level(level);

            for pair in keys.windows(2) {
                assert!(
                    pair[0].total_cmp(&pair[1]).is_lt(),
                    "keys at level {level} are not strictly ascending: {pair:?}",
                );
            }

            let keys: HashSet<u64> = keys.iter().map(|key| key.to_bits()).collect();
            if let Some(keys_below) = &keys_below {
                assert!(
                    keys.is_subset(keys_below),
                    "level {level} is not a subsequence of the level below",
                );
            } else {
                assert_eq!(keys.len(), self.len(), "level 0 must reach every element");
            }

            keys_below = Some(keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::E;

    use oorandom::Rand64;

    use crate::node_heights::ProbabilityTable;
    use super::InnerList;


    fn test_list(seed: u64) -> InnerList<u64> {
        InnerList::new(ProbabilityTable::new(18, 1.0 / E), seed)
    }

    #[test]
    fn empty_list_has_no_links() {
        let list = test_list(1);

        assert_eq!(list.len(), 0);
        assert_eq!(list.max_level(), 18);
        assert!(list.locate(0.0).is_none());
        list.assert_invariants();
    }

    #[test]
    fn inserted_keys_are_located_in_any_order() {
        let mut list = test_list(2);

        for key in [8.0, 1.0, -3.5, 13.25, 0.0, 55.0, -20.0] {
            list.insert(key, key.to_bits());
        }

        list.assert_invariants();
        assert_eq!(list.len(), 7);

        for key in [8.0, 1.0, -3.5, 13.25, 0.0, 55.0, -20.0] {
            let id = list.locate(key).unwrap();
            assert_eq!(*list.node(id).value(), key.to_bits());
        }
        assert!(list.locate(2.0).is_none());

        assert_eq!(
            list.keys_at_level(0),
            vec![-20.0, -3.5, 0.0, 1.0, 8.0, 13.25, 55.0],
        );
    }

    #[test]
    fn duplicate_insert_updates_without_a_new_node() {
        let mut list = test_list(3);

        let first = list.insert(4.0, 1);
        let second = list.insert(4.0, 2);

        assert_eq!(first, second);
        assert_eq!(list.len(), 1);
        assert_eq!(*list.node(second).value(), 2);
        list.assert_invariants();
    }

    #[test]
    fn remove_unlinks_every_level_of_the_tower() {
        let mut list = test_list(4);

        // Enough insertions that some towers reach above level 0.
        for key in 0..512_u32 {
            list.insert(f64::from(key), u64::from(key));
        }
        list.assert_invariants();

        for key in (0..512_u32).step_by(2) {
            let (removed_key, removed_value) = list.remove(f64::from(key)).unwrap();
            assert_eq!(removed_key, f64::from(key));
            assert_eq!(removed_value, u64::from(key));
        }

        list.assert_invariants();
        assert_eq!(list.len(), 256);

        for key in 0..512_u32 {
            assert_eq!(list.locate(f64::from(key)).is_some(), key % 2 == 1);
        }
    }

    #[test]
    fn removing_an_absent_key_is_a_no_op() {
        let mut list = test_list(5);

        list.insert(1.0, 10);
        list.insert(3.0, 30);

        assert!(list.remove(2.0).is_none());
        assert_eq!(list.len(), 2);
        assert!(list.locate(1.0).is_some());
        assert!(list.locate(3.0).is_some());
        list.assert_invariants();
    }

    /// Random interleaved churn over a small key universe, so updates, removals of tall
    /// nodes, and re-insertions into freed arena slots all actually happen.
    #[test]
    fn invariants_hold_under_churn() {
        let mut list = test_list(6);
        let mut prng = Rand64::new(99);
        let mut live = std::collections::BTreeMap::new();

        for step in 0..4096_u64 {
            let key = f64::from(u32::try_from(prng.rand_range(0..256)).unwrap());

            if prng.rand_range(0..4) == 0 {
                assert_eq!(list.remove(key).map(|(_, value)| value), live.remove(&key.to_bits()));
            } else {
                list.insert(key, step);
                live.insert(key.to_bits(), step);
            }

            if step % 256 == 0 {
                list.assert_invariants();
            }
        }

        list.assert_invariants();
        assert_eq!(list.len(), live.len());

        for (key_bits, value) in live {
            let id = list.locate(f64::from_bits(key_bits)).unwrap();
            assert_eq!(*list.node(id).value(), value);
        }
    }
}
