//! The mutable in-memory graph instance.
//!
//! A [`Graph`] is created against a frozen [`Schema`] and owns all
//! element state: id allocation, the global vertex and edge orders, the
//! per-vertex incidence chains and every attribute value. Operations are
//! split by concern into the `*_ops` submodules; this module holds the
//! shared representation.

mod alloc;
mod attr_ops;
mod edge_ops;
mod incidence_ops;
mod options;
mod sequence;
mod vertex_ops;


use std::sync::Arc;

use tracing::debug;

use crate::error::GraphError;
use crate::schema::Schema;
use crate::types::{EdgeClassId, EdgeRef, VertexClassId, VertexId};
use crate::Result;

use alloc::IdAllocator;
use sequence::Sequence;

pub use attr_ops::AttributeContainer;
pub use options::{GraphOptions, GrowthPolicy};

use attr_ops::GenericAttributes;

/// Incidence-chain links carried by one end of an edge.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct IncLinks {
    pub(crate) prev: Option<EdgeRef>,
    pub(crate) next: Option<EdgeRef>,
}

#[derive(Debug)]
pub(crate) struct VertexSlot {
    pub(crate) class: VertexClassId,
    pub(crate) first_inc: Option<EdgeRef>,
    pub(crate) last_inc: Option<EdgeRef>,
    pub(crate) attrs: GenericAttributes,
}

#[derive(Debug)]
pub(crate) struct EdgeSlot {
    pub(crate) class: EdgeClassId,
    pub(crate) alpha: VertexId,
    pub(crate) omega: VertexId,
    pub(crate) alpha_links: IncLinks,
    pub(crate) omega_links: IncLinks,
    pub(crate) attrs: GenericAttributes,
}

/// Point-in-time size snapshot of a graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GraphStats {
    /// Live vertices.
    pub vertex_count: u64,
    /// Live edges.
    pub edge_count: u64,
    /// Allocated vertex id space.
    pub vertex_capacity: u32,
    /// Allocated edge id space.
    pub edge_capacity: u32,
    /// Structural version counter at snapshot time.
    pub graph_version: u64,
}

/// A schema-conformant, attributed, ordered graph.
pub struct Graph {
    schema: Arc<Schema>,
    read_only: bool,
    pub(crate) vertices: Vec<Option<VertexSlot>>,
    pub(crate) edges: Vec<Option<EdgeSlot>>,
    pub(crate) v_alloc: IdAllocator,
    pub(crate) e_alloc: IdAllocator,
    pub(crate) v_seq: Sequence,
    pub(crate) e_seq: Sequence,
    graph_version: u64,
    vertex_list_version: u64,
    edge_list_version: u64,
    graph_attrs: GenericAttributes,
}

impl Graph {
    /// Creates an empty graph over `schema` with default options.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_options(schema, GraphOptions::default())
    }

    /// Creates an empty graph over `schema`.
    pub fn with_options(schema: Arc<Schema>, options: GraphOptions) -> Self {
        let v_cap = options.initial_vertex_capacity.clamp(1, options.max_capacity);
        let e_cap = options.initial_edge_capacity.clamp(1, options.max_capacity);
        let graph_attrs = GenericAttributes::new(Arc::clone(schema.graph_class().attributes()));
        debug!(
            schema = schema.name(),
            vertex_capacity = v_cap,
            edge_capacity = e_cap,
            "graph.create"
        );
        Self {
            schema,
            read_only: false,
            vertices: new_slot_table(v_cap),
            edges: new_slot_table(e_cap),
            v_alloc: IdAllocator::new(v_cap, options.max_capacity, options.growth),
            e_alloc: IdAllocator::new(e_cap, options.max_capacity, options.growth),
            v_seq: Sequence::with_capacity(v_cap),
            e_seq: Sequence::with_capacity(e_cap),
            graph_version: 0,
            vertex_list_version: 0,
            edge_list_version: 0,
            graph_attrs,
        }
    }

    /// The schema this graph conforms to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Whether mutating operations are rejected.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Toggles the read-only gate. While set, every structural or
    /// attribute write fails with [`GraphError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Structural version, bumped by every structural change including
    /// reorderings.
    pub fn graph_version(&self) -> u64 {
        self.graph_version
    }

    /// Bumped when the vertex set changes.
    pub fn vertex_list_version(&self) -> u64 {
        self.vertex_list_version
    }

    /// Bumped when the edge set changes.
    pub fn edge_list_version(&self) -> u64 {
        self.edge_list_version
    }

    /// True if any structural change happened since `version` was
    /// captured from [`Graph::graph_version`].
    pub fn is_modified_since(&self, version: u64) -> bool {
        self.graph_version != version
    }

    /// True if the vertex set changed since `version` was captured.
    pub fn is_vertex_list_modified_since(&self, version: u64) -> bool {
        self.vertex_list_version != version
    }

    /// True if the edge set changed since `version` was captured.
    pub fn is_edge_list_modified_since(&self, version: u64) -> bool {
        self.edge_list_version != version
    }

    /// Current size snapshot.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_count: self.v_seq.len(),
            edge_count: self.e_seq.len(),
            vertex_capacity: self.v_alloc.capacity(),
            edge_capacity: self.e_alloc.capacity(),
            graph_version: self.graph_version,
        }
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            Err(GraphError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Structural change confined to one vertex's incidence chain;
    /// sequence mutations go through the list-specific bumps below.
    pub(crate) fn bump_graph(&mut self) {
        self.graph_version += 1;
    }

    pub(crate) fn bump_vertex_list(&mut self) {
        self.vertex_list_version += 1;
        self.graph_version += 1;
    }

    pub(crate) fn bump_edge_list(&mut self) {
        self.edge_list_version += 1;
        self.graph_version += 1;
    }

    pub(crate) fn vertex_slot(&self, v: VertexId) -> Result<&VertexSlot> {
        self.vertices
            .get(v.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::NotFound("vertex"))
    }

    pub(crate) fn vertex_slot_mut(&mut self, v: VertexId) -> Result<&mut VertexSlot> {
        self.vertices
            .get_mut(v.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NotFound("vertex"))
    }

    pub(crate) fn edge_slot(&self, e: crate::types::EdgeId) -> Result<&EdgeSlot> {
        self.edges
            .get(e.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::NotFound("edge"))
    }

    pub(crate) fn edge_slot_mut(&mut self, e: crate::types::EdgeId) -> Result<&mut EdgeSlot> {
        self.edges
            .get_mut(e.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::NotFound("edge"))
    }

    /// Graph-level attribute access is provided through
    /// [`AttributeContainer`]; the store lives here.
    pub(crate) fn graph_attrs(&self) -> &GenericAttributes {
        &self.graph_attrs
    }

    pub(crate) fn graph_attrs_mut(&mut self) -> &mut GenericAttributes {
        &mut self.graph_attrs
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("schema", &self.schema.name())
            .field("vertices", &self.v_seq.len())
            .field("edges", &self.e_seq.len())
            .field("graph_version", &self.graph_version)
            .field("read_only", &self.read_only)
            .finish()
    }
}

fn new_slot_table<T>(capacity: u32) -> Vec<Option<T>> {
    let mut table = Vec::new();
    // Index 0 stays unused so ids address slots directly.
    table.resize_with(capacity as usize + 1, || None);
    table
}
