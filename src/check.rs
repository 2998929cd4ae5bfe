//! Multiplicity validation.
//!
//! Multiplicities are declarative: graphs may pass through states that
//! violate them while being edited. [`check_multiplicities`] inspects a
//! whole graph and collects every violation into a report instead of
//! failing on the first one.

use std::fmt;

use tracing::debug;

use crate::graph::Graph;
use crate::schema::{IncidenceEnd, IncidenceSpec};
use crate::types::{Direction, EdgeClassId, VertexId};

/// One vertex breaking one edge-class end's multiplicity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstraintViolation {
    /// The edge class whose bounds are broken.
    pub edge_class: EdgeClassId,
    /// The vertex carrying too few or too many incidences.
    pub vertex: VertexId,
    /// Which end of the edge class the bounds belong to.
    pub end: IncidenceEnd,
    /// Incidences of this class actually found at the vertex.
    pub found: u64,
    /// Declared minimum.
    pub min: u32,
    /// Declared maximum (`u32::MAX` means unbounded).
    pub max: u32,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = match self.end {
            IncidenceEnd::From => "from",
            IncidenceEnd::To => "to",
        };
        write!(
            f,
            "vertex {} has {} incidences at the {end}-end of edge class {}, allowed {}..={}",
            self.vertex, self.found, self.edge_class.0, self.min, self.max
        )
    }
}

/// Outcome of a whole-graph multiplicity check.
#[derive(Clone, Debug, Default)]
pub struct ConstraintReport {
    violations: Vec<ConstraintViolation>,
}

impl ConstraintReport {
    /// True if no violation was found.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations, in schema then vertex order.
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }
}

/// Checks every edge-class multiplicity against the current graph state.
pub fn check_multiplicities(graph: &Graph) -> ConstraintReport {
    let mut report = ConstraintReport::default();
    let schema = graph.schema();
    for (ec_id, ec) in schema.edge_classes() {
        for (end, dir) in [
            (IncidenceEnd::From, Direction::Out),
            (IncidenceEnd::To, Direction::In),
        ] {
            let spec = ec.incidence(end);
            if spec.min == 0 && spec.max == u32::MAX {
                continue;
            }
            for vertex in graph.vertices_of_class(spec.vertex_class, true) {
                let found = count_incidences(graph, vertex, ec_id, end, spec, dir);
                if found < u64::from(spec.min) || found > u64::from(spec.max) {
                    report.violations.push(ConstraintViolation {
                        edge_class: ec_id,
                        vertex,
                        end,
                        found,
                        min: spec.min,
                        max: spec.max,
                    });
                }
            }
        }
    }
    debug!(violations = report.violations.len(), "check.multiplicities");
    report
}

/// Counts proxies at `vertex` that belong to `ec_id` (or a subclass) and
/// point in `dir`. Subclass edges whose matching end redefines this
/// end's role stop counting toward it.
fn count_incidences(
    graph: &Graph,
    vertex: VertexId,
    ec_id: EdgeClassId,
    end: IncidenceEnd,
    spec: &IncidenceSpec,
    dir: Direction,
) -> u64 {
    let schema = graph.schema();
    graph
        .incidences_dir(vertex, dir)
        .filter(|&inc| {
            let class = match graph.edge_class_of(inc) {
                Ok(class) => class,
                Err(_) => return false,
            };
            if !schema.is_edge_subclass(class, ec_id) {
                return false;
            }
            if class != ec_id {
                if let (Some(role), Some(sub)) = (&spec.role, schema.edge_class(class)) {
                    if sub.incidence(end).redefines.iter().any(|r| r == role) {
                        return false;
                    }
                }
            }
            true
        })
        .count() as u64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::SchemaBuilder;

    #[test]
    fn report_collects_min_and_max_violations() {
        let mut b = SchemaBuilder::new("S", "G");
        let person = b.vertex_class("Person").unwrap();
        let team = b.vertex_class("Team").unwrap();
        // Every person belongs to exactly one team.
        let member = b.edge_class("IsMemberOf", person, (1, 1), team, (0, u32::MAX)).unwrap();
        let schema = Arc::new(b.finalize().unwrap());
        let mut g = Graph::new(schema);
        let t = g.create_vertex(team).unwrap();
        let lonely = g.create_vertex(person).unwrap();
        let eager = g.create_vertex(person).unwrap();
        g.create_edge(member, eager, t).unwrap();
        g.create_edge(member, eager, t).unwrap();

        let report = check_multiplicities(&g);
        assert!(!report.is_ok());
        assert_eq!(report.violations().len(), 2);
        let by_vertex =
            |v| report.violations().iter().find(|c| c.vertex == v).unwrap();
        assert_eq!(by_vertex(lonely).found, 0);
        assert_eq!(by_vertex(eager).found, 2);
        assert_eq!(by_vertex(eager).max, 1);
    }

    #[test]
    fn conforming_graph_reports_clean() {
        let mut b = SchemaBuilder::new("S", "G");
        let person = b.vertex_class("Person").unwrap();
        let team = b.vertex_class("Team").unwrap();
        let member = b.edge_class("IsMemberOf", person, (1, 1), team, (0, u32::MAX)).unwrap();
        let schema = Arc::new(b.finalize().unwrap());
        let mut g = Graph::new(schema);
        let t = g.create_vertex(team).unwrap();
        let p = g.create_vertex(person).unwrap();
        g.create_edge(member, p, t).unwrap();
        assert!(check_multiplicities(&g).is_ok());
    }

    #[test]
    fn redefined_roles_stop_counting_toward_the_super_end() {
        let mut b = SchemaBuilder::new("S", "G");
        let person = b.vertex_class("Person").unwrap();
        let team = b.vertex_class("Team").unwrap();
        let member = b
            .edge_class("IsMemberOf", person, (0, 1), team, (0, u32::MAX))
            .unwrap();
        b.set_role(member, IncidenceEnd::From, "member").unwrap();
        let leader = b
            .edge_class("Leads", person, (0, 1), team, (0, u32::MAX))
            .unwrap();
        b.add_edge_supertype(leader, member).unwrap();
        b.redefine_role(leader, IncidenceEnd::From, "member").unwrap();
        let schema = Arc::new(b.finalize().unwrap());
        let mut g = Graph::new(schema);
        let t = g.create_vertex(team).unwrap();
        let p = g.create_vertex(person).unwrap();
        // One plain membership plus one leadership; without the
        // redefinition this would break IsMemberOf's max of 1.
        g.create_edge(member, p, t).unwrap();
        g.create_edge(leader, p, t).unwrap();
        let report = check_multiplicities(&g);
        assert!(
            report
                .violations()
                .iter()
                .all(|c| !(c.edge_class == member && c.vertex == p && c.found > 1)),
            "{report:?}"
        );
    }
}
