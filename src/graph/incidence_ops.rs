//! Per-vertex incidence chains.
//!
//! Each vertex owns an ordered chain of the edge proxies attached to it:
//! an edge's normal proxy sits in its alpha's chain, the reversed proxy
//! in its omega's. A loop edge contributes both proxies to one chain.
//! Reordering a chain is a structural change to the graph but not to
//! either element set, so it bumps only the graph version.

use crate::error::GraphError;
use crate::types::{Direction, EdgeClassId, EdgeRef, VertexId};
use crate::Result;

use super::{Graph, IncLinks};

impl Graph {
    pub(crate) fn inc_links(&self, inc: EdgeRef) -> Result<IncLinks> {
        let slot = self.edge_slot(inc.id)?;
        Ok(if inc.reversed {
            slot.omega_links
        } else {
            slot.alpha_links
        })
    }

    fn inc_links_mut(&mut self, inc: EdgeRef) -> Result<&mut IncLinks> {
        let slot = self.edge_slot_mut(inc.id)?;
        Ok(if inc.reversed {
            &mut slot.omega_links
        } else {
            &mut slot.alpha_links
        })
    }

    /// The vertex whose chain holds this proxy.
    pub fn incidence_vertex(&self, inc: EdgeRef) -> Result<VertexId> {
        let slot = self.edge_slot(inc.id)?;
        Ok(if inc.reversed { slot.omega } else { slot.alpha })
    }

    /// Appends `inc` at the tail of `v`'s incidence chain. The edge slot
    /// must already exist with cleared links.
    pub(crate) fn append_incidence(&mut self, v: VertexId, inc: EdgeRef) {
        let tail = self
            .vertices[v.0 as usize]
            .as_ref()
            .and_then(|slot| slot.last_inc);
        if let Ok(links) = self.inc_links_mut(inc) {
            links.prev = tail;
            links.next = None;
        }
        match tail {
            Some(prev) => {
                if let Ok(links) = self.inc_links_mut(prev) {
                    links.next = Some(inc);
                }
            }
            None => {
                if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
                    slot.first_inc = Some(inc);
                }
            }
        }
        if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
            slot.last_inc = Some(inc);
        }
    }

    /// Unlinks `inc` from `v`'s incidence chain.
    pub(crate) fn remove_incidence(&mut self, v: VertexId, inc: EdgeRef) -> Result<()> {
        let links = self.inc_links(inc)?;
        match links.prev {
            Some(prev) => self.inc_links_mut(prev)?.next = links.next,
            None => {
                if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
                    slot.first_inc = links.next;
                }
            }
        }
        match links.next {
            Some(next) => self.inc_links_mut(next)?.prev = links.prev,
            None => {
                if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
                    slot.last_inc = links.prev;
                }
            }
        }
        *self.inc_links_mut(inc)? = IncLinks::default();
        Ok(())
    }

    /// First proxy in `v`'s incidence chain.
    pub fn first_incidence(&self, v: VertexId) -> Result<Option<EdgeRef>> {
        Ok(self.vertex_slot(v)?.first_inc)
    }

    /// Last proxy in `v`'s incidence chain.
    pub fn last_incidence(&self, v: VertexId) -> Result<Option<EdgeRef>> {
        Ok(self.vertex_slot(v)?.last_inc)
    }

    /// Successor of `inc` in its vertex's chain.
    pub fn next_incidence(&self, inc: EdgeRef) -> Result<Option<EdgeRef>> {
        Ok(self.inc_links(inc)?.next)
    }

    /// Predecessor of `inc` in its vertex's chain.
    pub fn prev_incidence(&self, inc: EdgeRef) -> Result<Option<EdgeRef>> {
        Ok(self.inc_links(inc)?.prev)
    }

    /// First proxy in `v`'s chain pointing in `dir`.
    pub fn first_incidence_dir(&self, v: VertexId, dir: Direction) -> Result<Option<EdgeRef>> {
        let mut cur = self.first_incidence(v)?;
        while let Some(inc) = cur {
            if inc.direction() == dir {
                return Ok(Some(inc));
            }
            cur = self.next_incidence(inc)?;
        }
        Ok(None)
    }

    /// Successor of `inc` pointing in `dir`.
    pub fn next_incidence_dir(&self, inc: EdgeRef, dir: Direction) -> Result<Option<EdgeRef>> {
        let mut cur = self.next_incidence(inc)?;
        while let Some(candidate) = cur {
            if candidate.direction() == dir {
                return Ok(Some(candidate));
            }
            cur = self.next_incidence(candidate)?;
        }
        Ok(None)
    }

    /// Iterates `v`'s incidence chain in order.
    pub fn incidences(&self, v: VertexId) -> impl Iterator<Item = EdgeRef> + '_ {
        let first = self.vertex_slot(v).ok().and_then(|slot| slot.first_inc);
        IncidenceIter { graph: self, cur: first }
    }

    /// Iterates `v`'s chain filtered by direction.
    pub fn incidences_dir(
        &self,
        v: VertexId,
        dir: Direction,
    ) -> impl Iterator<Item = EdgeRef> + '_ {
        self.incidences(v).filter(move |inc| inc.direction() == dir)
    }

    /// Iterates `v`'s chain filtered by edge class.
    pub fn incidences_of_class(
        &self,
        v: VertexId,
        class: EdgeClassId,
        include_subclasses: bool,
    ) -> impl Iterator<Item = EdgeRef> + '_ {
        self.incidences(v)
            .filter(move |&inc| self.edge_matches_class(inc, class, include_subclasses))
    }

    /// Number of proxies in `v`'s chain. A loop edge counts twice.
    pub fn degree(&self, v: VertexId) -> Result<u64> {
        self.vertex_slot(v)?;
        Ok(self.incidences(v).count() as u64)
    }

    /// Number of proxies in `v`'s chain pointing in `dir`.
    pub fn degree_dir(&self, v: VertexId, dir: Direction) -> Result<u64> {
        self.vertex_slot(v)?;
        Ok(self.incidences_dir(v, dir).count() as u64)
    }

    /// Number of proxies in `v`'s chain of the given edge class,
    /// optionally restricted to one direction.
    pub fn degree_of_class(
        &self,
        v: VertexId,
        class: EdgeClassId,
        include_subclasses: bool,
        dir: Option<Direction>,
    ) -> Result<u64> {
        self.vertex_slot(v)?;
        Ok(self
            .incidences_of_class(v, class, include_subclasses)
            .filter(|inc| dir.map_or(true, |d| inc.direction() == d))
            .count() as u64)
    }

    /// Moves `target` directly before `anchor` within their shared
    /// vertex's chain. Bumps the graph version only when the chain
    /// actually changed.
    pub fn put_incidence_before(&mut self, target: EdgeRef, anchor: EdgeRef) -> Result<()> {
        self.reorder_incidence(target, anchor, true)
    }

    /// Mirror of [`Graph::put_incidence_before`].
    pub fn put_incidence_after(&mut self, target: EdgeRef, anchor: EdgeRef) -> Result<()> {
        self.reorder_incidence(target, anchor, false)
    }

    fn reorder_incidence(&mut self, target: EdgeRef, anchor: EdgeRef, before: bool) -> Result<()> {
        self.ensure_writable()?;
        if target == anchor {
            return Err(GraphError::InvalidOperation(
                "cannot move an incidence relative to itself".into(),
            ));
        }
        let v = self.incidence_vertex(target)?;
        if self.incidence_vertex(anchor)? != v {
            return Err(GraphError::InvalidOperation(
                "incidences belong to different vertices".into(),
            ));
        }
        let already_placed = if before {
            self.inc_links(anchor)?.prev == Some(target)
        } else {
            self.inc_links(anchor)?.next == Some(target)
        };
        if already_placed {
            return Ok(());
        }
        self.remove_incidence(v, target)?;
        if before {
            let anchor_prev = self.inc_links(anchor)?.prev;
            *self.inc_links_mut(target)? = IncLinks {
                prev: anchor_prev,
                next: Some(anchor),
            };
            match anchor_prev {
                Some(prev) => self.inc_links_mut(prev)?.next = Some(target),
                None => {
                    if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
                        slot.first_inc = Some(target);
                    }
                }
            }
            self.inc_links_mut(anchor)?.prev = Some(target);
        } else {
            let anchor_next = self.inc_links(anchor)?.next;
            *self.inc_links_mut(target)? = IncLinks {
                prev: Some(anchor),
                next: anchor_next,
            };
            match anchor_next {
                Some(next) => self.inc_links_mut(next)?.prev = Some(target),
                None => {
                    if let Some(slot) = self.vertices[v.0 as usize].as_mut() {
                        slot.last_inc = Some(target);
                    }
                }
            }
            self.inc_links_mut(anchor)?.next = Some(target);
        }
        self.bump_graph();
        Ok(())
    }
}

struct IncidenceIter<'a> {
    graph: &'a Graph,
    cur: Option<EdgeRef>,
}

impl Iterator for IncidenceIter<'_> {
    type Item = EdgeRef;

    fn next(&mut self) -> Option<EdgeRef> {
        let inc = self.cur?;
        self.cur = self.graph.inc_links(inc).ok().and_then(|links| links.next);
        Some(inc)
    }
}
