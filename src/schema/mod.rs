//! Schema: the closed catalogue of element classes and domains for one
//! graph family.
//!
//! A schema is assembled through [`SchemaBuilder`] and frozen by
//! [`SchemaBuilder::finalize`]; afterwards it is immutable and shared by
//! every graph instance built from it. Schemas are looked up through an
//! explicit [`SchemaRegistry`] value owned by the caller, never through
//! process-wide state.

mod class;
mod codec;
mod domain;
mod value;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::GraphError;
use crate::types::{EdgeClassId, VertexClassId};
use crate::Result;

pub use class::{
    Attribute, EdgeClass, GraphClass, IncidenceEnd, IncidenceSpec, VertexClass,
};
pub use codec::{NULL_LITERAL, OLD_NULL_LITERAL};
pub use domain::{Domain, EnumDomain, RecordDomain};
pub use value::AttrValue;

use class::{ClassBitSet, ClassCore};

/// Immutable catalogue of classes and domains for one graph family.
#[derive(Debug)]
pub struct Schema {
    name: String,
    graph_class: GraphClass,
    vertex_classes: Vec<VertexClass>,
    edge_classes: Vec<EdgeClass>,
    vertex_names: FxHashMap<String, VertexClassId>,
    edge_names: FxHashMap<String, EdgeClassId>,
    domains: FxHashMap<String, Domain>,
}

impl Schema {
    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class of the graph itself.
    pub fn graph_class(&self) -> &GraphClass {
        &self.graph_class
    }

    /// Resolves a vertex class id.
    pub fn vertex_class(&self, id: VertexClassId) -> Option<&VertexClass> {
        self.vertex_classes.get(id.0 as usize)
    }

    /// Resolves an edge class id.
    pub fn edge_class(&self, id: EdgeClassId) -> Option<&EdgeClass> {
        self.edge_classes.get(id.0 as usize)
    }

    /// Looks up a vertex class by name.
    pub fn vertex_class_by_name(&self, name: &str) -> Option<VertexClassId> {
        self.vertex_names.get(name).copied()
    }

    /// Looks up an edge class by name.
    pub fn edge_class_by_name(&self, name: &str) -> Option<EdgeClassId> {
        self.edge_names.get(name).copied()
    }

    /// Iterates all vertex classes with their ids.
    pub fn vertex_classes(&self) -> impl Iterator<Item = (VertexClassId, &VertexClass)> {
        self.vertex_classes
            .iter()
            .enumerate()
            .map(|(i, c)| (VertexClassId(i as u32), c))
    }

    /// Iterates all edge classes with their ids.
    pub fn edge_classes(&self) -> impl Iterator<Item = (EdgeClassId, &EdgeClass)> {
        self.edge_classes
            .iter()
            .enumerate()
            .map(|(i, c)| (EdgeClassId(i as u32), c))
    }

    /// Looks up a named (enumeration or record) domain.
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// True if `sub` equals `sup` or is a transitive subclass of it.
    pub fn is_vertex_subclass(&self, sub: VertexClassId, sup: VertexClassId) -> bool {
        self.vertex_class(sub)
            .is_some_and(|c| c.is_subclass_of(sup))
    }

    /// True if `sub` equals `sup` or is a transitive subclass of it.
    pub fn is_edge_subclass(&self, sub: EdgeClassId, sup: EdgeClassId) -> bool {
        self.edge_class(sub).is_some_and(|c| c.is_subclass_of(sup))
    }
}

/// Explicit, caller-owned schema lookup table.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: FxHashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a finalized schema under its own name.
    pub fn register(&mut self, schema: Schema) -> Result<Arc<Schema>> {
        if self.schemas.contains_key(schema.name()) {
            return Err(GraphError::Schema(format!(
                "schema `{}` already registered",
                schema.name()
            )));
        }
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_owned(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }
}

struct EdgeClassDraft {
    core: ClassCore,
    from: IncidenceSpec,
    to: IncidenceSpec,
}

/// Mutable schema under construction.
pub struct SchemaBuilder {
    name: String,
    graph_class: ClassCore,
    vertex_classes: Vec<ClassCore>,
    edge_classes: Vec<EdgeClassDraft>,
    vertex_names: FxHashMap<String, VertexClassId>,
    edge_names: FxHashMap<String, EdgeClassId>,
    domains: FxHashMap<String, Domain>,
}

impl SchemaBuilder {
    /// Starts a schema with the given schema and graph-class names.
    pub fn new(schema_name: &str, graph_class_name: &str) -> Self {
        Self {
            name: schema_name.to_owned(),
            graph_class: ClassCore::new(graph_class_name.to_owned()),
            vertex_classes: Vec::new(),
            edge_classes: Vec::new(),
            vertex_names: FxHashMap::default(),
            edge_names: FxHashMap::default(),
            domains: FxHashMap::default(),
        }
    }

    /// Declares a named enumeration domain.
    pub fn enum_domain(&mut self, name: &str, constants: &[&str]) -> Result<Domain> {
        if constants.is_empty() {
            return Err(GraphError::Schema(format!(
                "enumeration `{name}` needs at least one constant"
            )));
        }
        for (i, c) in constants.iter().enumerate() {
            if constants[..i].contains(c) {
                return Err(GraphError::Schema(format!(
                    "enumeration `{name}` declares constant `{c}` twice"
                )));
            }
        }
        let domain = Domain::Enumeration(Arc::new(EnumDomain {
            name: name.to_owned(),
            constants: constants.iter().map(|c| (*c).to_owned()).collect(),
        }));
        self.insert_domain(name, domain)
    }

    /// Declares a named record domain.
    pub fn record_domain(&mut self, name: &str, fields: Vec<(String, Domain)>) -> Result<Domain> {
        for (i, (field, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(f, _)| f == field) {
                return Err(GraphError::Schema(format!(
                    "record `{name}` declares field `{field}` twice"
                )));
            }
        }
        let domain = Domain::Record(Arc::new(RecordDomain {
            name: name.to_owned(),
            fields,
        }));
        self.insert_domain(name, domain)
    }

    fn insert_domain(&mut self, name: &str, domain: Domain) -> Result<Domain> {
        if self.domains.contains_key(name) {
            return Err(GraphError::Schema(format!(
                "domain `{name}` already declared"
            )));
        }
        self.domains.insert(name.to_owned(), domain.clone());
        Ok(domain)
    }

    /// Declares a concrete vertex class.
    pub fn vertex_class(&mut self, name: &str) -> Result<VertexClassId> {
        if self.vertex_names.contains_key(name) {
            return Err(GraphError::Schema(format!(
                "vertex class `{name}` already declared"
            )));
        }
        let id = VertexClassId(self.vertex_classes.len() as u32);
        self.vertex_classes.push(ClassCore::new(name.to_owned()));
        self.vertex_names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Declares a concrete edge class with its endpoint classes and
    /// (min, max) multiplicities. `u32::MAX` means unbounded.
    pub fn edge_class(
        &mut self,
        name: &str,
        from: VertexClassId,
        from_multiplicity: (u32, u32),
        to: VertexClassId,
        to_multiplicity: (u32, u32),
    ) -> Result<EdgeClassId> {
        if self.edge_names.contains_key(name) {
            return Err(GraphError::Schema(format!(
                "edge class `{name}` already declared"
            )));
        }
        self.check_vertex_class(from)?;
        self.check_vertex_class(to)?;
        for (end, (min, max)) in [("from", from_multiplicity), ("to", to_multiplicity)] {
            if min > max {
                return Err(GraphError::Schema(format!(
                    "edge class `{name}` {end}-end multiplicity ({min},{max}) has min > max"
                )));
            }
        }
        let id = EdgeClassId(self.edge_classes.len() as u32);
        self.edge_classes.push(EdgeClassDraft {
            core: ClassCore::new(name.to_owned()),
            from: IncidenceSpec {
                vertex_class: from,
                min: from_multiplicity.0,
                max: from_multiplicity.1,
                role: None,
                redefines: Vec::new(),
            },
            to: IncidenceSpec {
                vertex_class: to,
                min: to_multiplicity.0,
                max: to_multiplicity.1,
                role: None,
                redefines: Vec::new(),
            },
        });
        self.edge_names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Marks a vertex class abstract (not instantiable).
    pub fn set_vertex_class_abstract(&mut self, class: VertexClassId) -> Result<()> {
        self.vertex_core_mut(class)?.is_abstract = true;
        Ok(())
    }

    /// Marks an edge class abstract (not instantiable).
    pub fn set_edge_class_abstract(&mut self, class: EdgeClassId) -> Result<()> {
        self.edge_draft_mut(class)?.core.is_abstract = true;
        Ok(())
    }

    /// Adds a direct supertype to a vertex class.
    pub fn add_vertex_supertype(&mut self, sub: VertexClassId, sup: VertexClassId) -> Result<()> {
        self.check_vertex_class(sup)?;
        let core = self.vertex_core_mut(sub)?;
        if core.direct_supers.contains(&sup.0) {
            return Ok(());
        }
        core.direct_supers.push(sup.0);
        Ok(())
    }

    /// Adds a direct supertype to an edge class.
    pub fn add_edge_supertype(&mut self, sub: EdgeClassId, sup: EdgeClassId) -> Result<()> {
        self.check_edge_class(sup)?;
        let draft = self.edge_draft_mut(sub)?;
        if draft.core.direct_supers.contains(&sup.0) {
            return Ok(());
        }
        draft.core.direct_supers.push(sup.0);
        Ok(())
    }

    /// Names the role of one end of an edge class.
    pub fn set_role(&mut self, class: EdgeClassId, end: IncidenceEnd, role: &str) -> Result<()> {
        let draft = self.edge_draft_mut(class)?;
        let spec = match end {
            IncidenceEnd::From => &mut draft.from,
            IncidenceEnd::To => &mut draft.to,
        };
        spec.role = Some(role.to_owned());
        Ok(())
    }

    /// Declares that one end of an edge class redefines an inherited role:
    /// edges of this class stop counting toward the redefined role's
    /// multiplicity.
    pub fn redefine_role(
        &mut self,
        class: EdgeClassId,
        end: IncidenceEnd,
        role: &str,
    ) -> Result<()> {
        let draft = self.edge_draft_mut(class)?;
        let spec = match end {
            IncidenceEnd::From => &mut draft.from,
            IncidenceEnd::To => &mut draft.to,
        };
        if !spec.redefines.iter().any(|r| r == role) {
            spec.redefines.push(role.to_owned());
        }
        Ok(())
    }

    /// Declares a graph-level attribute. `default` of `None` uses the
    /// domain's default value.
    pub fn add_graph_attribute(
        &mut self,
        name: &str,
        domain: Domain,
        default: Option<AttrValue>,
    ) -> Result<()> {
        Self::push_attribute(&mut self.graph_class, name, domain, default)
    }

    /// Declares an attribute on a vertex class.
    pub fn add_vertex_attribute(
        &mut self,
        class: VertexClassId,
        name: &str,
        domain: Domain,
        default: Option<AttrValue>,
    ) -> Result<()> {
        let core = self.vertex_core_mut(class)?;
        Self::push_attribute(core, name, domain, default)
    }

    /// Declares an attribute on an edge class.
    pub fn add_edge_attribute(
        &mut self,
        class: EdgeClassId,
        name: &str,
        domain: Domain,
        default: Option<AttrValue>,
    ) -> Result<()> {
        let draft = self.edge_draft_mut(class)?;
        Self::push_attribute(&mut draft.core, name, domain, default)
    }

    fn push_attribute(
        core: &mut ClassCore,
        name: &str,
        domain: Domain,
        default: Option<AttrValue>,
    ) -> Result<()> {
        if core.own_attributes.iter().any(|a| a.name == name) {
            return Err(GraphError::Schema(format!(
                "class `{}` already declares attribute `{name}`",
                core.name
            )));
        }
        let default = default.unwrap_or_else(|| domain.default_value());
        if !domain.is_conformant(&default) {
            return Err(GraphError::Schema(format!(
                "default for attribute `{name}` does not conform to domain {domain}"
            )));
        }
        core.own_attributes.push(Attribute {
            name: name.to_owned(),
            domain,
            default,
        });
        Ok(())
    }

    /// Freezes the schema: resolves inherited attributes, computes
    /// subtype closures and validates endpoint narrowing.
    pub fn finalize(mut self) -> Result<Schema> {
        let vertex_order = topo_order(
            self.vertex_classes.len(),
            |i| self.vertex_classes[i].direct_supers.clone(),
            "vertex",
        )?;
        resolve_cores(&mut self.vertex_classes, &vertex_order)?;

        let edge_order = topo_order(
            self.edge_classes.len(),
            |i| self.edge_classes[i].core.direct_supers.clone(),
            "edge",
        )?;
        {
            let mut cores: Vec<ClassCore> = self
                .edge_classes
                .iter()
                .map(|d| d.core.clone())
                .collect();
            resolve_cores(&mut cores, &edge_order)?;
            for (draft, core) in self.edge_classes.iter_mut().zip(cores) {
                draft.core = core;
            }
        }
        resolve_cores(&mut self.graph_class, &[0])?;

        // Endpoint narrowing: a subclass end must attach to the same
        // vertex class as every superclass end, or a subclass of it.
        for draft in &self.edge_classes {
            for &sup in &draft.core.direct_supers {
                let sup_draft = &self.edge_classes[sup as usize];
                for (end, spec, sup_spec) in [
                    ("from", &draft.from, &sup_draft.from),
                    ("to", &draft.to, &sup_draft.to),
                ] {
                    let sub_vc = &self.vertex_classes[spec.vertex_class.0 as usize];
                    if !sub_vc.supers.contains(sup_spec.vertex_class.0) {
                        return Err(GraphError::Schema(format!(
                            "edge class `{}` {end}-end does not narrow `{}`",
                            draft.core.name, sup_draft.core.name
                        )));
                    }
                }
            }
        }

        let graph_class = GraphClass {
            core: self.graph_class,
        };
        Ok(Schema {
            name: self.name,
            graph_class,
            vertex_classes: self
                .vertex_classes
                .into_iter()
                .map(|core| VertexClass { core })
                .collect(),
            edge_classes: self
                .edge_classes
                .into_iter()
                .map(|d| EdgeClass {
                    core: d.core,
                    from: d.from,
                    to: d.to,
                })
                .collect(),
            vertex_names: self.vertex_names,
            edge_names: self.edge_names,
            domains: self.domains,
        })
    }

    fn check_vertex_class(&self, id: VertexClassId) -> Result<()> {
        if (id.0 as usize) < self.vertex_classes.len() {
            Ok(())
        } else {
            Err(GraphError::Schema(format!("unknown vertex class id {id}")))
        }
    }

    fn check_edge_class(&self, id: EdgeClassId) -> Result<()> {
        if (id.0 as usize) < self.edge_classes.len() {
            Ok(())
        } else {
            Err(GraphError::Schema(format!("unknown edge class id {id}")))
        }
    }

    fn vertex_core_mut(&mut self, id: VertexClassId) -> Result<&mut ClassCore> {
        self.vertex_classes
            .get_mut(id.0 as usize)
            .ok_or_else(|| GraphError::Schema(format!("unknown vertex class id {id}")))
    }

    fn edge_draft_mut(&mut self, id: EdgeClassId) -> Result<&mut EdgeClassDraft> {
        self.edge_classes
            .get_mut(id.0 as usize)
            .ok_or_else(|| GraphError::Schema(format!("unknown edge class id {id}")))
    }
}

/// Topologically orders classes so every supertype precedes its subtypes.
fn topo_order(
    count: usize,
    supers_of: impl Fn(usize) -> Vec<u32>,
    kind: &str,
) -> Result<Vec<usize>> {
    const UNVISITED: u8 = 0;
    const IN_PROGRESS: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNVISITED; count];
    let mut order = Vec::with_capacity(count);
    // Iterative DFS; the second stack entry flag marks post-order emission.
    for root in 0..count {
        if state[root] != UNVISITED {
            continue;
        }
        let mut stack = vec![(root, false)];
        while let Some((node, emit)) = stack.pop() {
            if emit {
                state[node] = DONE;
                order.push(node);
                continue;
            }
            match state[node] {
                DONE => continue,
                IN_PROGRESS => {
                    return Err(GraphError::Schema(format!(
                        "cycle in {kind} class hierarchy"
                    )));
                }
                _ => {}
            }
            state[node] = IN_PROGRESS;
            stack.push((node, true));
            for sup in supers_of(node) {
                let sup = sup as usize;
                if state[sup] == IN_PROGRESS {
                    return Err(GraphError::Schema(format!(
                        "cycle in {kind} class hierarchy"
                    )));
                }
                if state[sup] == UNVISITED {
                    stack.push((sup, false));
                }
            }
        }
    }
    Ok(order)
}

trait CoreSlice {
    fn core_count(&self) -> usize;
    fn core_at(&self, i: usize) -> &ClassCore;
    fn core_at_mut(&mut self, i: usize) -> &mut ClassCore;
}

impl CoreSlice for Vec<ClassCore> {
    fn core_count(&self) -> usize {
        self.len()
    }
    fn core_at(&self, i: usize) -> &ClassCore {
        &self[i]
    }
    fn core_at_mut(&mut self, i: usize) -> &mut ClassCore {
        &mut self[i]
    }
}

impl CoreSlice for ClassCore {
    fn core_count(&self) -> usize {
        1
    }
    fn core_at(&self, _i: usize) -> &ClassCore {
        self
    }
    fn core_at_mut(&mut self, _i: usize) -> &mut ClassCore {
        self
    }
}

/// Populates closures and resolved attribute tables in topological order.
fn resolve_cores(cores: &mut impl CoreSlice, order: &[usize]) -> Result<()> {
    let count = cores.core_count();
    for &idx in order {
        let mut supers = ClassBitSet::with_capacity(count);
        supers.insert(idx as u32);
        let mut attributes: Vec<Attribute> = Vec::new();
        for sup_pos in 0..cores.core_at(idx).direct_supers.len() {
            let sup = cores.core_at(idx).direct_supers[sup_pos] as usize;
            supers.union_with(&cores.core_at(sup).supers);
            let inherited: Vec<Attribute> = cores.core_at(sup).attributes.to_vec();
            for attr in inherited {
                match attributes.iter().find(|a| a.name == attr.name) {
                    Some(existing) => {
                        // Same declaration reached via a diamond is fine;
                        // different declarations sharing a name are not.
                        if existing.domain != attr.domain {
                            return Err(GraphError::Schema(format!(
                                "class `{}` inherits conflicting attribute `{}`",
                                cores.core_at(idx).name,
                                attr.name
                            )));
                        }
                    }
                    None => attributes.push(attr),
                }
            }
        }
        let core = cores.core_at_mut(idx);
        for own in &core.own_attributes {
            if attributes.iter().any(|a| a.name == own.name) {
                return Err(GraphError::Schema(format!(
                    "class `{}` redeclares inherited attribute `{}`",
                    core.name, own.name
                )));
            }
            attributes.push(own.clone());
        }
        core.attr_index = attributes
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name.clone(), i))
            .collect();
        core.attributes = Arc::new(attributes);
        core.supers = supers;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_builder() -> SchemaBuilder {
        SchemaBuilder::new("SampleSchema", "SampleGraph")
    }

    #[test]
    fn builds_and_resolves_inherited_attributes() {
        let mut b = sample_builder();
        let named = b.vertex_class("Named").unwrap();
        b.set_vertex_class_abstract(named).unwrap();
        b.add_vertex_attribute(named, "name", Domain::String, None)
            .unwrap();
        let person = b.vertex_class("Person").unwrap();
        b.add_vertex_supertype(person, named).unwrap();
        b.add_vertex_attribute(person, "age", Domain::Integer, None)
            .unwrap();
        let schema = b.finalize().unwrap();

        let pc = schema.vertex_class(person).unwrap();
        assert_eq!(pc.attributes().len(), 2);
        assert!(pc.attribute("name").is_some());
        assert_eq!(pc.attribute_index("age"), Some(1));
        assert!(schema.is_vertex_subclass(person, named));
        assert!(!schema.is_vertex_subclass(named, person));
        assert!(schema.vertex_class(named).unwrap().is_abstract());
    }

    #[test]
    fn diamond_inheritance_dedups_shared_attribute() {
        let mut b = sample_builder();
        let top = b.vertex_class("Top").unwrap();
        b.add_vertex_attribute(top, "id", Domain::Long, None).unwrap();
        let left = b.vertex_class("Left").unwrap();
        let right = b.vertex_class("Right").unwrap();
        b.add_vertex_supertype(left, top).unwrap();
        b.add_vertex_supertype(right, top).unwrap();
        let bottom = b.vertex_class("Bottom").unwrap();
        b.add_vertex_supertype(bottom, left).unwrap();
        b.add_vertex_supertype(bottom, right).unwrap();
        let schema = b.finalize().unwrap();
        let bc = schema.vertex_class(bottom).unwrap();
        assert_eq!(bc.attributes().len(), 1);
        assert!(schema.is_vertex_subclass(bottom, top));
    }

    #[test]
    fn redeclaring_inherited_attribute_fails() {
        let mut b = sample_builder();
        let top = b.vertex_class("Top").unwrap();
        b.add_vertex_attribute(top, "name", Domain::String, None)
            .unwrap();
        let sub = b.vertex_class("Sub").unwrap();
        b.add_vertex_supertype(sub, top).unwrap();
        b.add_vertex_attribute(sub, "name", Domain::String, None)
            .unwrap();
        let err = b.finalize().unwrap_err();
        assert!(err.to_string().contains("redeclares"), "{err}");
    }

    #[test]
    fn hierarchy_cycle_is_rejected() {
        let mut b = sample_builder();
        let a = b.vertex_class("A").unwrap();
        let c = b.vertex_class("C").unwrap();
        b.add_vertex_supertype(a, c).unwrap();
        b.add_vertex_supertype(c, a).unwrap();
        let err = b.finalize().unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn edge_endpoint_narrowing_enforced() {
        let mut b = sample_builder();
        let person = b.vertex_class("Person").unwrap();
        let city = b.vertex_class("City").unwrap();
        let link = b
            .edge_class("Link", person, (0, u32::MAX), person, (0, u32::MAX))
            .unwrap();
        let bad = b
            .edge_class("BadLink", city, (0, u32::MAX), person, (0, u32::MAX))
            .unwrap();
        b.add_edge_supertype(bad, link).unwrap();
        let err = b.finalize().unwrap_err();
        assert!(err.to_string().contains("narrow"), "{err}");
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut reg = SchemaRegistry::new();
        reg.register(sample_builder().finalize().unwrap()).unwrap();
        let err = reg.register(sample_builder().finalize().unwrap()).unwrap_err();
        assert!(err.to_string().contains("already registered"), "{err}");
        assert!(reg.get("SampleSchema").is_some());
        assert!(reg.get("Other").is_none());
    }

    #[test]
    fn default_values_must_conform() {
        let mut b = sample_builder();
        let v = b.vertex_class("V").unwrap();
        let err = b
            .add_vertex_attribute(v, "count", Domain::Integer, Some(AttrValue::Str("x".into())))
            .unwrap_err();
        assert!(err.to_string().contains("conform"), "{err}");
    }
}
