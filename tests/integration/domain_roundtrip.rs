//! Property tests for the attribute text codec: any conformant value
//! survives a serialize/parse round trip, for randomly composed domains.

use std::sync::Arc;

use proptest::prelude::*;

use tgraph::{AttrValue, Domain};

fn arb_domain() -> impl Strategy<Value = Domain> {
    let leaf = prop_oneof![
        Just(Domain::Boolean),
        Just(Domain::Integer),
        Just(Domain::Long),
        Just(Domain::Double),
        Just(Domain::String),
    ];
    leaf.prop_recursive(3, 12, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|d| Domain::List(Arc::new(d))),
            inner.clone().prop_map(|d| Domain::Set(Arc::new(d))),
            (inner.clone(), inner)
                .prop_map(|(k, v)| Domain::Map(Arc::new(k), Arc::new(v))),
        ]
    })
}

fn arb_value(domain: &Domain) -> BoxedStrategy<AttrValue> {
    let with_null = |s: BoxedStrategy<AttrValue>| {
        prop_oneof![9 => s, 1 => Just(AttrValue::Null)].boxed()
    };
    match domain {
        Domain::Boolean => with_null(any::<bool>().prop_map(AttrValue::Bool).boxed()),
        Domain::Integer => with_null(any::<i32>().prop_map(AttrValue::Int).boxed()),
        Domain::Long => with_null(any::<i64>().prop_map(AttrValue::Long).boxed()),
        // Finite values only: NaN never compares equal to itself.
        Domain::Double => with_null(
            (-1.0e12f64..1.0e12).prop_map(AttrValue::Double).boxed(),
        ),
        Domain::String => with_null(
            proptest::collection::vec(any::<char>(), 0..8)
                .prop_map(|chars| AttrValue::Str(chars.into_iter().collect()))
                .boxed(),
        ),
        Domain::List(elem) => {
            let elem = arb_value(elem);
            with_null(
                proptest::collection::vec(elem, 0..4)
                    .prop_map(AttrValue::List)
                    .boxed(),
            )
        }
        Domain::Set(elem) => {
            let elem = arb_value(elem);
            with_null(
                proptest::collection::vec(elem, 0..4)
                    .prop_map(AttrValue::Set)
                    .boxed(),
            )
        }
        Domain::Map(key, val) => {
            let pair = (arb_value(key), arb_value(val));
            with_null(
                proptest::collection::vec(pair, 0..4)
                    .prop_map(AttrValue::Map)
                    .boxed(),
            )
        }
        Domain::Enumeration(_) | Domain::Record(_) => Just(AttrValue::Null).boxed(),
    }
}

fn arb_domain_and_value() -> impl Strategy<Value = (Domain, AttrValue)> {
    arb_domain().prop_flat_map(|d| {
        let value = arb_value(&d);
        value.prop_map(move |v| (d.clone(), v))
    })
}

proptest! {
    #[test]
    fn conformant_values_round_trip((domain, value) in arb_domain_and_value()) {
        prop_assert!(domain.is_conformant(&value));
        let text = domain.serialize(&value).unwrap();
        let parsed = domain.parse(&text).unwrap();
        prop_assert_eq!(parsed, value, "text was `{}`", text);
    }

    #[test]
    fn trailing_garbage_is_rejected(domain in arb_domain()) {
        prop_assert!(domain.parse("n n").is_err());
    }

    #[test]
    fn null_parses_for_any_domain(domain in arb_domain()) {
        prop_assert_eq!(domain.parse("n").unwrap(), AttrValue::Null);
        prop_assert_eq!(domain.parse("\\null").unwrap(), AttrValue::Null);
    }
}
