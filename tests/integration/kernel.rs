//! End-to-end exercise of the kernel: schema construction, element
//! lifecycle, ordering, attributes and multiplicity checking together.

use std::sync::Arc;

use tgraph::{
    check_multiplicities, AttrValue, AttributeContainer, Direction, Domain, EdgeRef, Graph,
    GraphError, GraphOptions, GrowthPolicy, IncidenceEnd, Schema, SchemaBuilder, SchemaRegistry,
    VertexId,
};

/// A small road-network schema with inheritance, named domains,
/// attributes and a constrained edge class.
fn road_schema() -> Schema {
    let mut b = SchemaBuilder::new("RoadSchema", "RoadMap");
    let surface = b
        .enum_domain("Surface", &["ASPHALT", "GRAVEL", "DIRT"])
        .unwrap();
    let position = b
        .record_domain(
            "Position",
            vec![("lat".into(), Domain::Double), ("lon".into(), Domain::Double)],
        )
        .unwrap();

    b.add_graph_attribute("region", Domain::String, None).unwrap();

    let place = b.vertex_class("Place").unwrap();
    b.set_vertex_class_abstract(place).unwrap();
    b.add_vertex_attribute(place, "name", Domain::String, None)
        .unwrap();
    b.add_vertex_attribute(place, "position", position, None)
        .unwrap();

    let town = b.vertex_class("Town").unwrap();
    b.add_vertex_supertype(town, place).unwrap();
    b.add_vertex_attribute(town, "population", Domain::Long, None)
        .unwrap();

    let junction = b.vertex_class("Junction").unwrap();
    b.add_vertex_supertype(junction, place).unwrap();

    let road = b
        .edge_class("Road", place, (0, u32::MAX), place, (0, u32::MAX))
        .unwrap();
    b.add_edge_attribute(road, "surface", surface, None).unwrap();
    b.add_edge_attribute(
        road,
        "lanes",
        Domain::Integer,
        Some(AttrValue::Int(2)),
    )
    .unwrap();

    // A town administers at most three junctions.
    let admin = b
        .edge_class("AdministeredBy", junction, (0, u32::MAX), town, (0, 3))
        .unwrap();
    b.set_role(admin, IncidenceEnd::To, "administrator").unwrap();

    b.finalize().unwrap()
}

#[test]
fn registry_round_trip() {
    let mut registry = SchemaRegistry::new();
    let schema = registry.register(road_schema()).unwrap();
    assert_eq!(schema.name(), "RoadSchema");
    let again = registry.get("RoadSchema").unwrap();
    assert!(Arc::ptr_eq(&schema, &again));
}

#[test]
fn build_network_and_validate() {
    let schema = Arc::new(road_schema());
    let town = schema.vertex_class_by_name("Town").unwrap();
    let junction = schema.vertex_class_by_name("Junction").unwrap();
    let road = schema.edge_class_by_name("Road").unwrap();
    let admin = schema.edge_class_by_name("AdministeredBy").unwrap();

    let mut g = Graph::new(Arc::clone(&schema));
    g.set_attribute("region", AttrValue::Str("Northern".into()))
        .unwrap();

    let capital = g.create_vertex(town).unwrap();
    let village = g.create_vertex(town).unwrap();
    let fork = g.create_vertex(junction).unwrap();

    g.set_vertex_attribute(capital, "name", AttrValue::Str("Capital".into()))
        .unwrap();
    g.set_vertex_attribute(capital, "population", AttrValue::Long(120_000))
        .unwrap();
    g.set_vertex_attribute_from_string(capital, "position", "( 49.2 7.4 )")
        .unwrap();
    assert_eq!(
        g.vertex_attribute(capital, "position").unwrap(),
        &AttrValue::Record(vec![AttrValue::Double(49.2), AttrValue::Double(7.4)])
    );

    // Roads connect any places, including subclass endpoints.
    let r1 = g.create_edge(road, capital, fork).unwrap();
    let r2 = g.create_edge(road, fork, village).unwrap();
    g.set_edge_attribute_from_string(r1, "surface", "ASPHALT")
        .unwrap();
    assert_eq!(
        g.edge_attribute(r1, "surface").unwrap(),
        &AttrValue::Enum("ASPHALT".into())
    );
    // Declared default applies until overwritten.
    assert_eq!(g.edge_attribute(r2, "lanes").unwrap(), &AttrValue::Int(2));

    // The junction is administered by the capital.
    g.create_edge(admin, fork, capital).unwrap();
    assert!(check_multiplicities(&g).is_ok());

    // Administering four junctions exceeds the maximum of three.
    for _ in 0..4 {
        g.create_edge(admin, fork, village).unwrap();
    }
    let report = check_multiplicities(&g);
    assert!(!report.is_ok());
    assert!(report
        .violations()
        .iter()
        .any(|c| c.vertex == village && c.found == 4 && c.max == 3));
}

#[test]
fn abstract_place_cannot_be_created() {
    let schema = Arc::new(road_schema());
    let place = schema.vertex_class_by_name("Place").unwrap();
    let mut g = Graph::new(schema);
    assert!(matches!(
        g.create_vertex(place),
        Err(GraphError::InvalidOperation(_))
    ));
}

#[test]
fn traversal_over_mixed_classes() {
    let schema = Arc::new(road_schema());
    let place = schema.vertex_class_by_name("Place").unwrap();
    let town = schema.vertex_class_by_name("Town").unwrap();
    let junction = schema.vertex_class_by_name("Junction").unwrap();
    let road = schema.edge_class_by_name("Road").unwrap();

    let mut g = Graph::new(schema);
    let t1 = g.create_vertex(town).unwrap();
    let j1 = g.create_vertex(junction).unwrap();
    let t2 = g.create_vertex(town).unwrap();
    g.create_edge(road, t1, j1).unwrap();
    g.create_edge(road, j1, t2).unwrap();

    let towns: Vec<VertexId> = g.vertices_of_class(town, false).collect();
    assert_eq!(towns, vec![t1, t2]);
    let places: Vec<VertexId> = g.vertices_of_class(place, true).collect();
    assert_eq!(places, vec![t1, j1, t2]);

    assert_eq!(g.degree(j1).unwrap(), 2);
    assert_eq!(g.degree_dir(j1, Direction::In).unwrap(), 1);
    assert_eq!(g.degree_dir(j1, Direction::Out).unwrap(), 1);
    assert_eq!(
        g.degree_of_class(j1, road, true, Some(Direction::Out)).unwrap(),
        1
    );
}

#[test]
fn ordering_survives_deletion_and_reuse() {
    let schema = Arc::new(road_schema());
    let town = schema.vertex_class_by_name("Town").unwrap();
    let mut g = Graph::new(schema);
    let vs: Vec<VertexId> = (0..5).map(|_| g.create_vertex(town).unwrap()).collect();
    g.delete_vertex(vs[2]).unwrap();
    // The freed id comes back first, appended at the end of the order.
    let reborn = g.create_vertex(town).unwrap();
    assert_eq!(reborn, vs[2]);
    let order: Vec<VertexId> = g.vertices().collect();
    assert_eq!(order, vec![vs[0], vs[1], vs[3], vs[4], reborn]);
    assert!(g.is_before_vertex(vs[4], reborn));
}

#[test]
fn version_counters_and_read_only_interplay() {
    let schema = Arc::new(road_schema());
    let town = schema.vertex_class_by_name("Town").unwrap();
    let mut g = Graph::with_options(
        schema,
        GraphOptions::new()
            .initial_vertex_capacity(4)
            .growth(GrowthPolicy::Double),
    );
    let a = g.create_vertex(town).unwrap();
    let b = g.create_vertex(town).unwrap();
    let snapshot = g.graph_version();

    g.set_read_only(true);
    assert!(matches!(g.create_vertex(town), Err(GraphError::ReadOnly)));
    assert!(matches!(
        g.put_vertex_before(b, a),
        Err(GraphError::ReadOnly)
    ));
    // Nothing moved, nothing bumped.
    assert!(!g.is_modified_since(snapshot));

    g.set_read_only(false);
    let vlist = g.vertex_list_version();
    g.put_vertex_before(b, a).unwrap();
    assert!(g.is_modified_since(snapshot));
    // Reordering the vertex sequence is a vertex-list mutation.
    assert_eq!(g.vertex_list_version(), vlist + 1);
    assert!(g.is_vertex_list_modified_since(vlist));
    assert!(!g.is_edge_list_modified_since(g.edge_list_version()));
}

#[test]
fn incidence_reordering_for_navigation() {
    let schema = Arc::new(road_schema());
    let town = schema.vertex_class_by_name("Town").unwrap();
    let junction = schema.vertex_class_by_name("Junction").unwrap();
    let road = schema.edge_class_by_name("Road").unwrap();
    let mut g = Graph::new(schema);
    let hub = g.create_vertex(junction).unwrap();
    let t1 = g.create_vertex(town).unwrap();
    let t2 = g.create_vertex(town).unwrap();
    let t3 = g.create_vertex(town).unwrap();
    let e1 = g.create_edge(road, hub, t1).unwrap();
    let e2 = g.create_edge(road, hub, t2).unwrap();
    let e3 = g.create_edge(road, hub, t3).unwrap();

    g.put_incidence_after(e1, e3).unwrap();
    let chain: Vec<EdgeRef> = g.incidences(hub).collect();
    assert_eq!(chain, vec![e2, e3, e1]);
    assert_eq!(g.first_incidence(hub).unwrap(), Some(e2));
    assert_eq!(g.last_incidence(hub).unwrap(), Some(e1));
    assert_eq!(g.next_incidence(e3).unwrap(), Some(e1));
    assert_eq!(g.prev_incidence(e3).unwrap(), Some(e2));

    // Moving an incidence across vertices is rejected.
    let elsewhere = g.create_edge(road, t1, t2).unwrap();
    assert!(matches!(
        g.put_incidence_before(elsewhere, e2),
        Err(GraphError::InvalidOperation(_))
    ));
}

#[test]
fn stats_reflect_growth() {
    let schema = Arc::new(road_schema());
    let town = schema.vertex_class_by_name("Town").unwrap();
    let mut g = Graph::with_options(
        schema,
        GraphOptions::new()
            .initial_vertex_capacity(2)
            .growth(GrowthPolicy::Increment(2)),
    );
    for _ in 0..3 {
        g.create_vertex(town).unwrap();
    }
    let stats = g.stats();
    assert_eq!(stats.vertex_count, 3);
    assert_eq!(stats.vertex_capacity, 4);
}
