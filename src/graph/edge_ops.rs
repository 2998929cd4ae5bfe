//! Edge lifecycle, ordering and traversal.
//!
//! Every edge exists as two proxies sharing one id: the normal proxy
//! read from alpha to omega and the reversed proxy read the other way.
//! Both are created by [`Graph::create_edge`] and die together. Edge
//! ordering and counting work on edges, so proxies normalize to their
//! id first.

use std::sync::Arc;

use tracing::trace;

use crate::error::GraphError;
use crate::types::{EdgeClassId, EdgeId, EdgeRef, VertexId};
use crate::Result;

use super::{EdgeSlot, GenericAttributes, Graph, IncLinks};

impl Graph {
    /// Creates an edge of `class` from `alpha` to `omega`, appending its
    /// normal proxy to `alpha`'s incidence chain and its reversed proxy
    /// to `omega`'s, and the edge to the global edge order.
    pub fn create_edge(
        &mut self,
        class: EdgeClassId,
        alpha: VertexId,
        omega: VertexId,
    ) -> Result<EdgeRef> {
        self.ensure_writable()?;
        let ec = self
            .schema()
            .edge_class(class)
            .ok_or(GraphError::NotFound("edge class"))?;
        if ec.is_abstract() {
            return Err(GraphError::InvalidOperation(format!(
                "edge class `{}` is abstract",
                ec.name()
            )));
        }
        let from_class = ec.from_spec().vertex_class;
        let to_class = ec.to_spec().vertex_class;
        let attrs_table = Arc::clone(ec.attributes());
        let ec_name = ec.name().to_owned();

        let alpha_class = self.vertex_slot(alpha)?.class;
        let omega_class = self.vertex_slot(omega)?.class;
        if !self.schema().is_vertex_subclass(alpha_class, from_class) {
            return Err(GraphError::InvalidOperation(format!(
                "vertex {alpha} cannot be the alpha of `{ec_name}`"
            )));
        }
        if !self.schema().is_vertex_subclass(omega_class, to_class) {
            return Err(GraphError::InvalidOperation(format!(
                "vertex {omega} cannot be the omega of `{ec_name}`"
            )));
        }

        let id = self.e_alloc.allocate()?;
        if self.edges.len() <= id as usize {
            self.edges.resize_with(self.e_alloc.capacity() as usize + 1, || None);
        }
        self.edges[id as usize] = Some(EdgeSlot {
            class,
            alpha,
            omega,
            alpha_links: IncLinks::default(),
            omega_links: IncLinks::default(),
            attrs: GenericAttributes::new(attrs_table),
        });
        let e = EdgeRef::normal(EdgeId(id));
        self.append_incidence(alpha, e);
        self.append_incidence(omega, e.reverse());
        self.e_seq.append(id);
        self.bump_edge_list();
        trace!(%e, class = class.0, %alpha, %omega, "edge.create");
        Ok(e)
    }

    /// Deletes an edge; either proxy names it.
    pub fn delete_edge(&mut self, e: EdgeRef) -> Result<()> {
        self.ensure_writable()?;
        let slot = self.edge_slot(e.id)?;
        let (alpha, omega) = (slot.alpha, slot.omega);
        let normal = EdgeRef::normal(e.id);
        self.remove_incidence(alpha, normal)?;
        self.remove_incidence(omega, normal.reverse())?;
        self.edges[e.id.0 as usize] = None;
        self.e_seq.remove(e.id.0);
        self.e_alloc.free(e.id.0);
        self.bump_edge_list();
        trace!(e = %normal, "edge.delete");
        Ok(())
    }

    /// True if `e` names a live edge.
    pub fn contains_edge(&self, e: EdgeRef) -> bool {
        self.e_seq.contains(e.id.0)
    }

    /// The normal proxy of a live edge id.
    pub fn edge(&self, id: EdgeId) -> Option<EdgeRef> {
        self.e_seq.contains(id.0).then(|| EdgeRef::normal(id))
    }

    /// Resolves a signed proxy number: positive for the normal proxy,
    /// negative for the reversed one.
    pub fn edge_by_signed(&self, signed: i64) -> Option<EdgeRef> {
        let id = u32::try_from(signed.unsigned_abs()).ok()?;
        if id == 0 || !self.e_seq.contains(id) {
            return None;
        }
        let e = EdgeRef::normal(EdgeId(id));
        Some(if signed < 0 { e.reverse() } else { e })
    }

    /// Start vertex of the proxy: the edge's alpha for the normal proxy,
    /// its omega for the reversed one.
    pub fn alpha(&self, e: EdgeRef) -> Result<VertexId> {
        let slot = self.edge_slot(e.id)?;
        Ok(if e.reversed { slot.omega } else { slot.alpha })
    }

    /// End vertex of the proxy; mirror of [`Graph::alpha`].
    pub fn omega(&self, e: EdgeRef) -> Result<VertexId> {
        let slot = self.edge_slot(e.id)?;
        Ok(if e.reversed { slot.alpha } else { slot.omega })
    }

    /// The class of a live edge.
    pub fn edge_class_of(&self, e: EdgeRef) -> Result<EdgeClassId> {
        Ok(self.edge_slot(e.id)?.class)
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> u64 {
        self.e_seq.len()
    }

    /// First edge in the global order, as its normal proxy.
    pub fn first_edge(&self) -> Option<EdgeRef> {
        self.e_seq.first().map(|id| EdgeRef::normal(EdgeId(id)))
    }

    /// Last edge in the global order, as its normal proxy.
    pub fn last_edge(&self) -> Option<EdgeRef> {
        self.e_seq.last().map(|id| EdgeRef::normal(EdgeId(id)))
    }

    /// Successor edge in the global order.
    pub fn next_edge(&self, e: EdgeRef) -> Option<EdgeRef> {
        self.e_seq.next(e.id.0).map(|id| EdgeRef::normal(EdgeId(id)))
    }

    /// Predecessor edge in the global order.
    pub fn prev_edge(&self, e: EdgeRef) -> Option<EdgeRef> {
        self.e_seq.prev(e.id.0).map(|id| EdgeRef::normal(EdgeId(id)))
    }

    /// First edge of `class` in the global order.
    pub fn first_edge_of_class(
        &self,
        class: EdgeClassId,
        include_subclasses: bool,
    ) -> Option<EdgeRef> {
        self.edges()
            .find(|&e| self.edge_matches_class(e, class, include_subclasses))
    }

    /// Next edge of `class` after `e` in the global order.
    pub fn next_edge_of_class(
        &self,
        e: EdgeRef,
        class: EdgeClassId,
        include_subclasses: bool,
    ) -> Option<EdgeRef> {
        let mut cur = self.next_edge(e);
        while let Some(candidate) = cur {
            if self.edge_matches_class(candidate, class, include_subclasses) {
                return Some(candidate);
            }
            cur = self.next_edge(candidate);
        }
        None
    }

    /// Moves `target`'s edge directly before `anchor`'s edge in the
    /// global edge order, bumping the edge list version exactly once
    /// when the order changed. Proxies normalize to their edge; passing
    /// the two proxies of one edge is an invalid operation.
    pub fn put_edge_before(&mut self, target: EdgeRef, anchor: EdgeRef) -> Result<()> {
        self.ensure_writable()?;
        if target.id == anchor.id {
            return Err(GraphError::InvalidOperation(
                "cannot move an edge relative to itself".into(),
            ));
        }
        if self.e_seq.put_before(target.id.0, anchor.id.0)? {
            self.bump_edge_list();
        }
        Ok(())
    }

    /// Mirror of [`Graph::put_edge_before`].
    pub fn put_edge_after(&mut self, target: EdgeRef, anchor: EdgeRef) -> Result<()> {
        self.ensure_writable()?;
        if target.id == anchor.id {
            return Err(GraphError::InvalidOperation(
                "cannot move an edge relative to itself".into(),
            ));
        }
        if self.e_seq.put_after(target.id.0, anchor.id.0)? {
            self.bump_edge_list();
        }
        Ok(())
    }

    /// True if `a`'s edge precedes `b`'s edge in the global edge order.
    pub fn is_before_edge(&self, a: EdgeRef, b: EdgeRef) -> bool {
        self.e_seq.is_before(a.id.0, b.id.0)
    }

    /// Iterates all edges in global order, as normal proxies.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.e_seq.iter().map(|id| EdgeRef::normal(EdgeId(id)))
    }

    /// Iterates edges of `class` in global order.
    pub fn edges_of_class(
        &self,
        class: EdgeClassId,
        include_subclasses: bool,
    ) -> impl Iterator<Item = EdgeRef> + '_ {
        self.edges()
            .filter(move |&e| self.edge_matches_class(e, class, include_subclasses))
    }

    pub(crate) fn edge_matches_class(
        &self,
        e: EdgeRef,
        class: EdgeClassId,
        include_subclasses: bool,
    ) -> bool {
        match self.edge_slot(e.id) {
            Ok(slot) if include_subclasses => self.schema().is_edge_subclass(slot.class, class),
            Ok(slot) => slot.class == class,
            Err(_) => false,
        }
    }
}
