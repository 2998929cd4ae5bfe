//! tgraph — a typed, attributed, ordered in-memory graph kernel.
//!
//! Graphs conform to a [`Schema`](schema::Schema): a frozen catalogue of
//! vertex and edge classes with inheritance, attributes over recursive
//! value domains, and incidence multiplicities. Instances keep three
//! global orders (vertices, edges, and a per-vertex incidence chain),
//! reuse freed ids in ascending order, and track structural changes
//! through version counters.
//!
//! ```
//! use std::sync::Arc;
//! use tgraph::{Graph, SchemaBuilder};
//!
//! let mut b = SchemaBuilder::new("Tiny", "TinyGraph");
//! let node = b.vertex_class("Node")?;
//! let link = b.edge_class("Link", node, (0, u32::MAX), node, (0, u32::MAX))?;
//! let schema = Arc::new(b.finalize()?);
//!
//! let mut g = Graph::new(schema);
//! let a = g.create_vertex(node)?;
//! let b_ = g.create_vertex(node)?;
//! let e = g.create_edge(link, a, b_)?;
//! assert_eq!(g.omega(e)?, b_);
//! assert_eq!(g.alpha(e.reverse())?, b_);
//! # Ok::<(), tgraph::GraphError>(())
//! ```

pub mod check;
pub mod error;
pub mod graph;
pub mod schema;
pub mod types;

pub use check::{check_multiplicities, ConstraintReport, ConstraintViolation};
pub use error::{GraphError, Result};
pub use graph::{AttributeContainer, Graph, GraphOptions, GraphStats, GrowthPolicy};
pub use schema::{
    AttrValue, Attribute, Domain, EdgeClass, EnumDomain, GraphClass, IncidenceEnd, IncidenceSpec,
    RecordDomain, Schema, SchemaBuilder, SchemaRegistry, VertexClass,
};
pub use types::{Direction, EdgeClassId, EdgeId, EdgeRef, VertexClassId, VertexId};
