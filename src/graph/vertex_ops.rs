//! Vertex lifecycle, ordering and traversal.

use std::sync::Arc;

use tracing::trace;

use crate::error::GraphError;
use crate::types::{VertexClassId, VertexId};
use crate::Result;

use super::{GenericAttributes, Graph, VertexSlot};

impl Graph {
    /// Creates a vertex of `class`, appends it to the global vertex
    /// order and seeds its attributes with the class defaults.
    pub fn create_vertex(&mut self, class: VertexClassId) -> Result<VertexId> {
        self.ensure_writable()?;
        let vc = self
            .schema()
            .vertex_class(class)
            .ok_or(GraphError::NotFound("vertex class"))?;
        if vc.is_abstract() {
            return Err(GraphError::InvalidOperation(format!(
                "vertex class `{}` is abstract",
                vc.name()
            )));
        }
        let attrs = GenericAttributes::new(Arc::clone(vc.attributes()));
        let id = self.v_alloc.allocate()?;
        if self.vertices.len() <= id as usize {
            self.vertices.resize_with(self.v_alloc.capacity() as usize + 1, || None);
        }
        self.vertices[id as usize] = Some(VertexSlot {
            class,
            first_inc: None,
            last_inc: None,
            attrs,
        });
        self.v_seq.append(id);
        self.bump_vertex_list();
        let v = VertexId(id);
        trace!(%v, class = class.0, "vertex.create");
        Ok(v)
    }

    /// Deletes a vertex and, first, every edge incident to it.
    pub fn delete_vertex(&mut self, v: VertexId) -> Result<()> {
        self.ensure_writable()?;
        self.vertex_slot(v)?;
        // Collect ids before unlinking; a loop edge appears twice in the
        // chain but must be deleted once.
        let mut incident: Vec<u32> = Vec::new();
        let mut cur = self.vertex_slot(v)?.first_inc;
        while let Some(inc) = cur {
            incident.push(inc.id.0);
            cur = self.inc_links(inc)?.next;
        }
        incident.sort_unstable();
        incident.dedup();
        for id in incident {
            self.delete_edge(crate::types::EdgeRef::normal(crate::types::EdgeId(id)))?;
        }
        self.vertices[v.0 as usize] = None;
        self.v_seq.remove(v.0);
        self.v_alloc.free(v.0);
        self.bump_vertex_list();
        trace!(%v, "vertex.delete");
        Ok(())
    }

    /// True if `v` names a live vertex.
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.v_seq.contains(v.0)
    }

    /// The class of a live vertex.
    pub fn vertex_class_of(&self, v: VertexId) -> Result<VertexClassId> {
        Ok(self.vertex_slot(v)?.class)
    }

    /// Number of live vertices.
    pub fn vertex_count(&self) -> u64 {
        self.v_seq.len()
    }

    /// First vertex in the global order.
    pub fn first_vertex(&self) -> Option<VertexId> {
        self.v_seq.first().map(VertexId)
    }

    /// Last vertex in the global order.
    pub fn last_vertex(&self) -> Option<VertexId> {
        self.v_seq.last().map(VertexId)
    }

    /// Successor of `v` in the global order.
    pub fn next_vertex(&self, v: VertexId) -> Option<VertexId> {
        self.v_seq.next(v.0).map(VertexId)
    }

    /// Predecessor of `v` in the global order.
    pub fn prev_vertex(&self, v: VertexId) -> Option<VertexId> {
        self.v_seq.prev(v.0).map(VertexId)
    }

    /// First vertex of `class` in the global order.
    pub fn first_vertex_of_class(
        &self,
        class: VertexClassId,
        include_subclasses: bool,
    ) -> Option<VertexId> {
        self.vertices()
            .find(|&v| self.vertex_matches_class(v, class, include_subclasses))
    }

    /// Next vertex of `class` after `v` in the global order.
    pub fn next_vertex_of_class(
        &self,
        v: VertexId,
        class: VertexClassId,
        include_subclasses: bool,
    ) -> Option<VertexId> {
        let mut cur = self.next_vertex(v);
        while let Some(candidate) = cur {
            if self.vertex_matches_class(candidate, class, include_subclasses) {
                return Some(candidate);
            }
            cur = self.next_vertex(candidate);
        }
        None
    }

    /// Moves `target` directly before `anchor` in the global vertex
    /// order. Bumps the vertex list version exactly once when the order
    /// changed, never for an in-place no-op.
    pub fn put_vertex_before(&mut self, target: VertexId, anchor: VertexId) -> Result<()> {
        self.ensure_writable()?;
        if self.v_seq.put_before(target.0, anchor.0)? {
            self.bump_vertex_list();
        }
        Ok(())
    }

    /// Moves `target` directly after `anchor` in the global vertex
    /// order. Same counter contract as [`Graph::put_vertex_before`].
    pub fn put_vertex_after(&mut self, target: VertexId, anchor: VertexId) -> Result<()> {
        self.ensure_writable()?;
        if self.v_seq.put_after(target.0, anchor.0)? {
            self.bump_vertex_list();
        }
        Ok(())
    }

    /// True if `a` precedes `b` in the global vertex order.
    pub fn is_before_vertex(&self, a: VertexId, b: VertexId) -> bool {
        self.v_seq.is_before(a.0, b.0)
    }

    /// Iterates all vertices in global order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.v_seq.iter().map(VertexId)
    }

    /// Iterates vertices of `class` in global order.
    pub fn vertices_of_class(
        &self,
        class: VertexClassId,
        include_subclasses: bool,
    ) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices()
            .filter(move |&v| self.vertex_matches_class(v, class, include_subclasses))
    }

    pub(crate) fn vertex_matches_class(
        &self,
        v: VertexId,
        class: VertexClassId,
        include_subclasses: bool,
    ) -> bool {
        match self.vertex_slot(v) {
            Ok(slot) if include_subclasses => self.schema().is_vertex_subclass(slot.class, class),
            Ok(slot) => slot.class == class,
            Err(_) => false,
        }
    }
}
