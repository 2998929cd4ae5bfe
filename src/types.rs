//! Identifier newtypes and handle types shared across the crate.

use std::fmt;

/// Identifier of a vertex within one graph's vertex id space.
///
/// Vertex ids are positive; `VertexId(0)` never occurs in a live graph.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VertexId(pub u32);

/// Identifier of an edge within one graph's edge id space.
///
/// Edge ids are positive and shared by both directional proxies of the
/// edge; see [`EdgeRef`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EdgeId(pub u32);

/// Identifier of a vertex class declared in a [`crate::schema::Schema`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct VertexClassId(pub u32);

/// Identifier of an edge class declared in a [`crate::schema::Schema`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EdgeClassId(pub u32);

/// Direction of an incidence relative to the vertex it is attached to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Direction {
    /// The vertex is the alpha (source) end of the edge.
    Out,
    /// The vertex is the omega (target) end of the edge.
    In,
}

/// One of the two directional proxies of an edge.
///
/// Every edge has exactly two proxies sharing one [`EdgeId`]: the normal
/// proxy running alpha→omega and the reversed proxy running omega→alpha.
/// Both denote the same edge identity for validity and deletion; they are
/// distinct entries in the two endpoints' incidence chains.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EdgeRef {
    /// The underlying edge identity.
    pub id: EdgeId,
    /// Whether this handle is the reversed (omega→alpha) proxy.
    pub reversed: bool,
}

impl EdgeRef {
    /// Returns the normal (alpha→omega) proxy for `id`.
    pub fn normal(id: EdgeId) -> Self {
        Self {
            id,
            reversed: false,
        }
    }

    /// Returns the other directional proxy of the same edge.
    ///
    /// Reversing twice yields the original handle.
    pub fn reverse(self) -> Self {
        Self {
            id: self.id,
            reversed: !self.reversed,
        }
    }

    /// Direction of this proxy at the vertex it is incident to.
    pub fn direction(self) -> Direction {
        if self.reversed {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// Sign-encoded id: positive for the normal proxy, negative for the
    /// reversed one. Compatibility surface for callers that address
    /// proxies by signed magnitude.
    pub fn signed(self) -> i64 {
        if self.reversed {
            -i64::from(self.id.0)
        } else {
            i64::from(self.id.0)
        }
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reversed {
            write!(f, "e-{}", self.id.0)
        } else {
            write!(f, "e{}", self.id.0)
        }
    }
}

impl fmt::Display for VertexClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VertexClassId {
    fn from(value: u32) -> Self {
        VertexClassId(value)
    }
}

impl From<VertexClassId> for u32 {
    fn from(value: VertexClassId) -> Self {
        value.0
    }
}

impl From<u32> for EdgeClassId {
    fn from(value: u32) -> Self {
        EdgeClassId(value)
    }
}

impl From<EdgeClassId> for u32 {
    fn from(value: EdgeClassId) -> Self {
        value.0
    }
}
