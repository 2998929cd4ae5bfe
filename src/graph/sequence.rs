//! Global element sequences.
//!
//! Vertices and edges each carry one graph-wide total order, kept as an
//! intrusive doubly-linked list indexed by id. Membership doubles as the
//! liveness check: an id with no links entry is not in the graph.

use crate::error::GraphError;
use crate::Result;

#[derive(Copy, Clone, Debug, Default)]
struct SeqLinks {
    prev: Option<u32>,
    next: Option<u32>,
}

/// Doubly-linked total order over live ids, appended at creation and
/// freely reorderable afterwards.
#[derive(Debug, Default)]
pub(crate) struct Sequence {
    first: Option<u32>,
    last: Option<u32>,
    count: u64,
    /// Indexed by id; `links[0]` is unused padding so ids index directly.
    links: Vec<Option<SeqLinks>>,
}

impl Sequence {
    pub(crate) fn with_capacity(capacity: u32) -> Self {
        Self {
            first: None,
            last: None,
            count: 0,
            links: vec![None; capacity as usize + 1],
        }
    }

    pub(crate) fn ensure_capacity(&mut self, capacity: u32) {
        if self.links.len() <= capacity as usize {
            self.links.resize(capacity as usize + 1, None);
        }
    }

    pub(crate) fn contains(&self, id: u32) -> bool {
        self.links.get(id as usize).is_some_and(Option::is_some)
    }

    pub(crate) fn len(&self) -> u64 {
        self.count
    }

    pub(crate) fn first(&self) -> Option<u32> {
        self.first
    }

    pub(crate) fn last(&self) -> Option<u32> {
        self.last
    }

    pub(crate) fn next(&self, id: u32) -> Option<u32> {
        self.links.get(id as usize)?.as_ref()?.next
    }

    pub(crate) fn prev(&self, id: u32) -> Option<u32> {
        self.links.get(id as usize)?.as_ref()?.prev
    }

    /// Appends `id` at the end of the order. The id must not be present.
    pub(crate) fn append(&mut self, id: u32) {
        debug_assert!(!self.contains(id), "id {id} already in sequence");
        self.ensure_capacity(id);
        let links = SeqLinks {
            prev: self.last,
            next: None,
        };
        match self.last {
            Some(tail) => self.set_next(tail, Some(id)),
            None => self.first = Some(id),
        }
        self.last = Some(id);
        self.links[id as usize] = Some(links);
        self.count += 1;
    }

    /// Unlinks `id` from the order.
    pub(crate) fn remove(&mut self, id: u32) {
        let links = match self.links.get_mut(id as usize).and_then(Option::take) {
            Some(links) => links,
            None => return,
        };
        match links.prev {
            Some(prev) => self.set_next(prev, links.next),
            None => self.first = links.next,
        }
        match links.next {
            Some(next) => self.set_prev(next, links.prev),
            None => self.last = links.prev,
        }
        self.count -= 1;
    }

    /// Moves `target` immediately before `anchor`.
    ///
    /// Returns `Ok(true)` if the order changed, `Ok(false)` if `target`
    /// was already in place. Moving an element relative to itself is an
    /// invalid operation rather than a no-op.
    pub(crate) fn put_before(&mut self, target: u32, anchor: u32) -> Result<bool> {
        self.check_movable(target, anchor)?;
        if self.prev(anchor) == Some(target) {
            return Ok(false);
        }
        self.remove_links_only(target);
        let anchor_prev = self.prev(anchor);
        self.links[target as usize] = Some(SeqLinks {
            prev: anchor_prev,
            next: Some(anchor),
        });
        match anchor_prev {
            Some(prev) => self.set_next(prev, Some(target)),
            None => self.first = Some(target),
        }
        self.set_prev(anchor, Some(target));
        Ok(true)
    }

    /// Moves `target` immediately after `anchor`. Same contract as
    /// [`Sequence::put_before`].
    pub(crate) fn put_after(&mut self, target: u32, anchor: u32) -> Result<bool> {
        self.check_movable(target, anchor)?;
        if self.next(anchor) == Some(target) {
            return Ok(false);
        }
        self.remove_links_only(target);
        let anchor_next = self.next(anchor);
        self.links[target as usize] = Some(SeqLinks {
            prev: Some(anchor),
            next: anchor_next,
        });
        match anchor_next {
            Some(next) => self.set_prev(next, Some(target)),
            None => self.last = Some(target),
        }
        self.set_next(anchor, Some(target));
        Ok(true)
    }

    /// True if `a` precedes `b` in the order. Walks forward from `a`.
    pub(crate) fn is_before(&self, a: u32, b: u32) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let mut cur = self.next(a);
        while let Some(id) = cur {
            if id == b {
                return true;
            }
            cur = self.next(id);
        }
        false
    }

    pub(crate) fn iter(&self) -> SequenceIter<'_> {
        SequenceIter {
            seq: self,
            cur: self.first,
        }
    }

    fn check_movable(&self, target: u32, anchor: u32) -> Result<()> {
        if target == anchor {
            return Err(GraphError::InvalidOperation(
                "cannot move an element relative to itself".into(),
            ));
        }
        if !self.contains(target) || !self.contains(anchor) {
            return Err(GraphError::NotFound("sequence element"));
        }
        Ok(())
    }

    /// Unlinks without clearing the slot or touching the count; the
    /// caller relinks immediately.
    fn remove_links_only(&mut self, id: u32) {
        let links = match self.links[id as usize] {
            Some(links) => links,
            None => return,
        };
        match links.prev {
            Some(prev) => self.set_next(prev, links.next),
            None => self.first = links.next,
        }
        match links.next {
            Some(next) => self.set_prev(next, links.prev),
            None => self.last = links.prev,
        }
    }

    fn set_next(&mut self, id: u32, next: Option<u32>) {
        if let Some(links) = self.links[id as usize].as_mut() {
            links.next = next;
        }
    }

    fn set_prev(&mut self, id: u32, prev: Option<u32>) {
        if let Some(links) = self.links[id as usize].as_mut() {
            links.prev = prev;
        }
    }
}

pub(crate) struct SequenceIter<'a> {
    seq: &'a Sequence,
    cur: Option<u32>,
}

impl Iterator for SequenceIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let id = self.cur?;
        self.cur = self.seq.next(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_of(ids: &[u32]) -> Sequence {
        let mut s = Sequence::with_capacity(32);
        for &id in ids {
            s.append(id);
        }
        s
    }

    fn collect(s: &Sequence) -> Vec<u32> {
        s.iter().collect()
    }

    #[test]
    fn append_preserves_creation_order() {
        let s = seq_of(&[3, 1, 7]);
        assert_eq!(collect(&s), vec![3, 1, 7]);
        assert_eq!(s.first(), Some(3));
        assert_eq!(s.last(), Some(7));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut s = seq_of(&[1, 2, 3]);
        s.remove(2);
        assert_eq!(collect(&s), vec![1, 3]);
        assert_eq!(s.next(1), Some(3));
        assert_eq!(s.prev(3), Some(1));
        s.remove(1);
        s.remove(3);
        assert_eq!(s.len(), 0);
        assert_eq!(s.first(), None);
        assert_eq!(s.last(), None);
    }

    #[test]
    fn put_before_moves_and_reports_change() {
        let mut s = seq_of(&[1, 2, 3, 4]);
        assert!(s.put_before(4, 2).unwrap());
        assert_eq!(collect(&s), vec![1, 4, 2, 3]);
        // Already in position: no structural change.
        assert!(!s.put_before(4, 2).unwrap());
        assert!(s.put_before(3, 1).unwrap());
        assert_eq!(collect(&s), vec![3, 1, 4, 2]);
        assert_eq!(s.first(), Some(3));
        assert_eq!(s.last(), Some(2));
    }

    #[test]
    fn put_after_moves_to_tail() {
        let mut s = seq_of(&[1, 2, 3]);
        assert!(s.put_after(1, 3).unwrap());
        assert_eq!(collect(&s), vec![2, 3, 1]);
        assert_eq!(s.last(), Some(1));
        assert!(!s.put_after(1, 3).unwrap());
    }

    #[test]
    fn self_move_is_invalid() {
        let mut s = seq_of(&[1, 2]);
        assert!(matches!(
            s.put_before(1, 1),
            Err(GraphError::InvalidOperation(_))
        ));
        assert!(matches!(
            s.put_after(2, 2),
            Err(GraphError::InvalidOperation(_))
        ));
    }

    #[test]
    fn moving_missing_elements_fails() {
        let mut s = seq_of(&[1, 2]);
        assert!(matches!(s.put_before(9, 1), Err(GraphError::NotFound(_))));
        assert!(matches!(s.put_after(1, 9), Err(GraphError::NotFound(_))));
    }

    #[test]
    fn is_before_follows_sequence_order_not_ids() {
        let mut s = seq_of(&[1, 2, 3]);
        s.put_before(3, 1).unwrap();
        assert!(s.is_before(3, 2));
        assert!(!s.is_before(2, 3));
        assert!(!s.is_before(2, 2));
    }
}
