//! Attributed element classes: the schema-declared types of graphs,
//! vertices and edges.
//!
//! Classes form a multiple-supertype DAG. At finalization the builder
//! resolves inherited attributes into one flat table per class and
//! precomputes a transitive-closure bitset so subtype checks are O(1)
//! word lookups instead of hierarchy walks.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::types::{EdgeClassId, VertexClassId};

use super::domain::Domain;
use super::value::AttrValue;

/// One declared attribute: name, domain and the value new elements start
/// with.
#[derive(Clone, Debug)]
pub struct Attribute {
    /// Attribute name, unique within the class including inherited ones.
    pub name: String,
    /// Declared value domain.
    pub domain: Domain,
    /// Seed value for newly created elements.
    pub default: AttrValue,
}

/// Which end of an edge class an incidence specification describes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IncidenceEnd {
    /// The alpha (source) end.
    From,
    /// The omega (target) end.
    To,
}

/// Declared incidence constraints for one end of an edge class.
#[derive(Clone, Debug)]
pub struct IncidenceSpec {
    /// Vertex class the end must attach to (or a subclass of it).
    pub vertex_class: VertexClassId,
    /// Minimum number of incident edges of this class per vertex.
    pub min: u32,
    /// Maximum number of incident edges of this class per vertex;
    /// `u32::MAX` means unbounded.
    pub max: u32,
    /// Optional role name for this end.
    pub role: Option<String>,
    /// Role names of superclass ends this end redefines. Edges of this
    /// class no longer count toward the redefined roles.
    pub redefines: Vec<String>,
}

/// Fixed-size bitset sized to the number of classes of one kind.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClassBitSet {
    words: Vec<u64>,
}

impl ClassBitSet {
    pub(crate) fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(64)],
        }
    }

    pub(crate) fn insert(&mut self, bit: u32) {
        let idx = bit as usize;
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    pub(crate) fn contains(&self, bit: u32) -> bool {
        let idx = bit as usize;
        self.words
            .get(idx / 64)
            .is_some_and(|w| w & (1 << (idx % 64)) != 0)
    }

    pub(crate) fn union_with(&mut self, other: &ClassBitSet) {
        for (dst, src) in self.words.iter_mut().zip(&other.words) {
            *dst |= src;
        }
    }
}

/// Data shared by all class kinds. Resolved fields are populated by
/// [`super::SchemaBuilder::finalize`].
#[derive(Clone, Debug)]
pub(crate) struct ClassCore {
    pub(crate) name: String,
    pub(crate) is_abstract: bool,
    pub(crate) own_attributes: Vec<Attribute>,
    pub(crate) direct_supers: Vec<u32>,
    /// Own + inherited attributes, inherited first, stable order.
    pub(crate) attributes: Arc<Vec<Attribute>>,
    pub(crate) attr_index: FxHashMap<String, usize>,
    /// Transitive supertype closure including the class itself.
    pub(crate) supers: ClassBitSet,
}

impl ClassCore {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            is_abstract: false,
            own_attributes: Vec::new(),
            direct_supers: Vec::new(),
            attributes: Arc::new(Vec::new()),
            attr_index: FxHashMap::default(),
            supers: ClassBitSet::default(),
        }
    }
}

/// A schema-declared vertex type.
#[derive(Clone, Debug)]
pub struct VertexClass {
    pub(crate) core: ClassCore,
}

/// A schema-declared edge type with its two incidence specifications.
#[derive(Clone, Debug)]
pub struct EdgeClass {
    pub(crate) core: ClassCore,
    pub(crate) from: IncidenceSpec,
    pub(crate) to: IncidenceSpec,
}

/// The type of the graph itself; carries graph-level attributes.
#[derive(Clone, Debug)]
pub struct GraphClass {
    pub(crate) core: ClassCore,
}

macro_rules! class_accessors {
    () => {
        /// Class name, unique within its schema.
        pub fn name(&self) -> &str {
            &self.core.name
        }

        /// Whether the class can be instantiated.
        pub fn is_abstract(&self) -> bool {
            self.core.is_abstract
        }

        /// Own and inherited attributes in resolved table order.
        pub fn attributes(&self) -> &Arc<Vec<Attribute>> {
            &self.core.attributes
        }

        /// Looks up a declared attribute by name.
        pub fn attribute(&self, name: &str) -> Option<&Attribute> {
            self.core
                .attr_index
                .get(name)
                .map(|&i| &self.core.attributes[i])
        }

        /// Index of `name` in the resolved attribute table.
        pub fn attribute_index(&self, name: &str) -> Option<usize> {
            self.core.attr_index.get(name).copied()
        }
    };
}

impl VertexClass {
    class_accessors!();

    /// Direct declared supertypes.
    pub fn direct_supertypes(&self) -> impl Iterator<Item = VertexClassId> + '_ {
        self.core.direct_supers.iter().map(|&i| VertexClassId(i))
    }

    /// True if this class is `other` or a transitive subclass of it.
    pub fn is_subclass_of(&self, other: VertexClassId) -> bool {
        self.core.supers.contains(other.0)
    }
}

impl EdgeClass {
    class_accessors!();

    /// Direct declared supertypes.
    pub fn direct_supertypes(&self) -> impl Iterator<Item = EdgeClassId> + '_ {
        self.core.direct_supers.iter().map(|&i| EdgeClassId(i))
    }

    /// True if this class is `other` or a transitive subclass of it.
    pub fn is_subclass_of(&self, other: EdgeClassId) -> bool {
        self.core.supers.contains(other.0)
    }

    /// Incidence specification of one end.
    pub fn incidence(&self, end: IncidenceEnd) -> &IncidenceSpec {
        match end {
            IncidenceEnd::From => &self.from,
            IncidenceEnd::To => &self.to,
        }
    }

    /// The alpha-end specification.
    pub fn from_spec(&self) -> &IncidenceSpec {
        &self.from
    }

    /// The omega-end specification.
    pub fn to_spec(&self) -> &IncidenceSpec {
        &self.to
    }
}

impl GraphClass {
    class_accessors!();
}
