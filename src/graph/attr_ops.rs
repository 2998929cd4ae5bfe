//! Generic, schema-driven attribute storage and access.
//!
//! Every element kind shares one representation: a positional value row
//! aligned with its class's resolved attribute table. Values are checked
//! against the declared domain on every write; attribute writes never
//! touch the structural version counters.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use crate::error::GraphError;
use crate::schema::{AttrValue, Attribute};
use crate::types::{EdgeRef, VertexId};
use crate::Result;

use super::Graph;

/// Uniform attribute access for anything that carries schema-declared
/// attributes. The graph itself implements this for its graph-level
/// attributes; vertex and edge access goes through the `Graph` methods
/// that name the element.
pub trait AttributeContainer {
    /// Reads an attribute by name.
    fn attribute(&self, name: &str) -> Result<&AttrValue>;

    /// Writes an attribute, checking domain conformance.
    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<()>;

    /// Serializes an attribute into its canonical text form.
    fn attribute_to_string(&self, name: &str) -> Result<String>;

    /// Parses the canonical text form and writes the attribute.
    fn set_attribute_from_string(&mut self, name: &str, text: &str) -> Result<()>;
}

/// One element's attribute row, aligned with its class's attribute
/// table. Most classes declare only a handful of attributes, so the row
/// stays inline.
#[derive(Debug)]
pub(crate) struct GenericAttributes {
    table: Arc<Vec<Attribute>>,
    values: SmallVec<[AttrValue; 4]>,
}

impl GenericAttributes {
    /// Creates a row seeded with each attribute's declared default.
    pub(crate) fn new(table: Arc<Vec<Attribute>>) -> Self {
        let values = table.iter().map(|a| a.default.clone()).collect();
        Self { table, values }
    }

    fn slot(&self, owner: &str, name: &str) -> Result<usize> {
        self.table
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| GraphError::NoSuchAttribute {
                class: owner.to_owned(),
                name: name.to_owned(),
            })
    }

    pub(crate) fn get(&self, owner: &str, name: &str) -> Result<&AttrValue> {
        let i = self.slot(owner, name)?;
        Ok(&self.values[i])
    }

    pub(crate) fn set(&mut self, owner: &str, name: &str, value: AttrValue) -> Result<()> {
        let i = self.slot(owner, name)?;
        let attr = &self.table[i];
        if !attr.domain.is_conformant(&value) {
            return Err(GraphError::NotConformant {
                domain: attr.domain.to_string(),
                value: value.to_string(),
            });
        }
        trace!(owner, name, %value, "attr.set");
        self.values[i] = value;
        Ok(())
    }

    pub(crate) fn get_as_text(&self, owner: &str, name: &str) -> Result<String> {
        let i = self.slot(owner, name)?;
        self.table[i].domain.serialize(&self.values[i])
    }

    pub(crate) fn set_from_text(&mut self, owner: &str, name: &str, text: &str) -> Result<()> {
        let i = self.slot(owner, name)?;
        let value = self.table[i].domain.parse(text)?;
        trace!(owner, name, %value, "attr.set_from_text");
        self.values[i] = value;
        Ok(())
    }
}

impl AttributeContainer for Graph {
    fn attribute(&self, name: &str) -> Result<&AttrValue> {
        let owner = self.schema().graph_class().name().to_owned();
        self.graph_attrs().get(&owner, name)
    }

    fn set_attribute(&mut self, name: &str, value: AttrValue) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.schema().graph_class().name().to_owned();
        self.graph_attrs_mut().set(&owner, name, value)
    }

    fn attribute_to_string(&self, name: &str) -> Result<String> {
        let owner = self.schema().graph_class().name().to_owned();
        self.graph_attrs().get_as_text(&owner, name)
    }

    fn set_attribute_from_string(&mut self, name: &str, text: &str) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.schema().graph_class().name().to_owned();
        self.graph_attrs_mut().set_from_text(&owner, name, text)
    }
}

impl Graph {
    fn vertex_class_name(&self, v: VertexId) -> Result<String> {
        let class = self.vertex_slot(v)?.class;
        Ok(self
            .schema()
            .vertex_class(class)
            .map(|c| c.name().to_owned())
            .unwrap_or_default())
    }

    fn edge_class_name(&self, e: EdgeRef) -> Result<String> {
        let class = self.edge_slot(e.id)?.class;
        Ok(self
            .schema()
            .edge_class(class)
            .map(|c| c.name().to_owned())
            .unwrap_or_default())
    }

    /// Reads a vertex attribute.
    pub fn vertex_attribute(&self, v: VertexId, name: &str) -> Result<&AttrValue> {
        let owner = self.vertex_class_name(v)?;
        self.vertex_slot(v)?.attrs.get(&owner, name)
    }

    /// Writes a vertex attribute. Does not bump any version counter.
    pub fn set_vertex_attribute(
        &mut self,
        v: VertexId,
        name: &str,
        value: AttrValue,
    ) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.vertex_class_name(v)?;
        self.vertex_slot_mut(v)?.attrs.set(&owner, name, value)
    }

    /// Serializes a vertex attribute into canonical text.
    pub fn vertex_attribute_to_string(&self, v: VertexId, name: &str) -> Result<String> {
        let owner = self.vertex_class_name(v)?;
        self.vertex_slot(v)?.attrs.get_as_text(&owner, name)
    }

    /// Parses canonical text and writes a vertex attribute.
    pub fn set_vertex_attribute_from_string(
        &mut self,
        v: VertexId,
        name: &str,
        text: &str,
    ) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.vertex_class_name(v)?;
        self.vertex_slot_mut(v)?.attrs.set_from_text(&owner, name, text)
    }

    /// Reads an edge attribute. Both proxies of an edge share one
    /// attribute row.
    pub fn edge_attribute(&self, e: EdgeRef, name: &str) -> Result<&AttrValue> {
        let owner = self.edge_class_name(e)?;
        self.edge_slot(e.id)?.attrs.get(&owner, name)
    }

    /// Writes an edge attribute. Does not bump any version counter.
    pub fn set_edge_attribute(&mut self, e: EdgeRef, name: &str, value: AttrValue) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.edge_class_name(e)?;
        self.edge_slot_mut(e.id)?.attrs.set(&owner, name, value)
    }

    /// Serializes an edge attribute into canonical text.
    pub fn edge_attribute_to_string(&self, e: EdgeRef, name: &str) -> Result<String> {
        let owner = self.edge_class_name(e)?;
        self.edge_slot(e.id)?.attrs.get_as_text(&owner, name)
    }

    /// Parses canonical text and writes an edge attribute.
    pub fn set_edge_attribute_from_string(
        &mut self,
        e: EdgeRef,
        name: &str,
        text: &str,
    ) -> Result<()> {
        self.ensure_writable()?;
        let owner = self.edge_class_name(e)?;
        self.edge_slot_mut(e.id)?.attrs.set_from_text(&owner, name, text)
    }
}
