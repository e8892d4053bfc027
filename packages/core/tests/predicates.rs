//! Parser and evaluation behaviour observed through property maps

use resq_core::prelude::*;
use resq_core::property::NestedDocumentFlattener;

fn record(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs
        .iter()
        .map(|(path, value)| (PropertyId::from_path(path), (*value).to_string()))
        .collect()
}

#[test]
fn test_or_and_precedence_by_evaluation() {
    let predicate = parse("a=1 OR b=2 AND c=3").unwrap();
    // a=1 alone satisfies a=1 OR (b=2 AND c=3) but not (a=1 OR b=2) AND c=3.
    assert!(predicate.evaluate(&record(&[("a", "1")])).unwrap());
    assert!(!predicate.evaluate(&record(&[("b", "2")])).unwrap());
    assert!(predicate.evaluate(&record(&[("b", "2"), ("c", "3")])).unwrap());
}

#[test]
fn test_parentheses_by_evaluation() {
    let predicate = parse("(a=1 OR b=2) AND c=3").unwrap();
    assert!(!predicate.evaluate(&record(&[("a", "1")])).unwrap());
    assert!(predicate.evaluate(&record(&[("a", "1"), ("c", "3")])).unwrap());
    assert!(predicate.evaluate(&record(&[("b", "2"), ("c", "3")])).unwrap());
    assert!(!predicate.evaluate(&record(&[("a", "9"), ("b", "9"), ("c", "3")])).unwrap());
}

#[test]
fn test_in_membership() {
    let predicate = parse("a IN (1,2,3)").unwrap();
    for value in ["1", "2", "3"] {
        assert!(predicate.evaluate(&record(&[("a", value)])).unwrap());
    }
    assert!(!predicate.evaluate(&record(&[("a", "4")])).unwrap());
    assert_eq!(parse("a IN (1)").unwrap(), parse("a=1").unwrap());
}

#[test]
fn test_composite_equality() {
    let p1 = parse("a=1").unwrap();
    let p2 = parse("b=2").unwrap();
    let p3 = parse("c=3").unwrap();
    assert_eq!(
        Predicate::and(vec![p1.clone(), p2.clone()]),
        Predicate::and(vec![p2, p1.clone()])
    );
    assert_ne!(
        Predicate::and(vec![p1.clone(), parse("b=2").unwrap()]),
        Predicate::and(vec![p1, p3])
    );
}

#[test]
fn test_missing_property_is_false_for_every_operator() {
    let empty = PropertyMap::new();
    for filter in ["x=1", "x!=1", "x<1", "x<=1", "x>1", "x>=1"] {
        assert!(!parse(filter).unwrap().evaluate(&empty).unwrap(), "{filter}");
    }
}

#[test]
fn test_state_and_version_scenario() {
    let predicate = parse("state=STARTED AND version IN (2.1,2.2)").unwrap();
    assert!(predicate.evaluate(&record(&[("state", "STARTED"), ("version", "2.1")])).unwrap());
    assert!(!predicate.evaluate(&record(&[("state", "INSTALLED"), ("version", "2.1")])).unwrap());
    assert!(!predicate.evaluate(&record(&[("state", "STARTED"), ("version", "3.0")])).unwrap());
}

#[test]
fn test_filters_over_flattened_documents() {
    let properties = flatten_str(
        r#"{
            "Hosts": {"host_name": "h1", "cpu_count": 16, "last_heartbeat": "2024-05-01T12:00:00Z"},
            "metrics": {"disk": {"free": 12.5}}
        }"#,
    )
    .unwrap();

    assert!(parse("Hosts/cpu_count>=8 AND metrics/disk/free<20").unwrap().evaluate(&properties).unwrap());
    assert!(parse("Hosts/last_heartbeat>2024-04-30").unwrap().evaluate(&properties).unwrap());
    assert!(parse("NOT Hosts/host_name=h2").unwrap().evaluate(&properties).unwrap());

    let err = parse("Hosts/host_name<5").unwrap().evaluate(&properties).unwrap_err();
    assert_eq!(err.kind, ErrorKind::EvaluationType);
}

#[test]
fn test_builder_and_parser_agree() {
    let built = PredicateBuilder::new()
        .property("Hosts/host_status").equals("HEALTHY")
        .and()
        .begin()
        .property("Hosts/cpu_count").greater_than_equal_to("4")
        .or()
        .property("Hosts/rack_info").in_list(["/r1", "/r2"])
        .end()
        .to_predicate()
        .unwrap();
    assert_eq!(
        built,
        parse("Hosts/host_status=HEALTHY AND (Hosts/cpu_count>=4 OR Hosts/rack_info IN (/r1,/r2))").unwrap()
    );
}

#[test]
fn test_concurrent_evaluation_of_one_predicate() {
    let predicate = parse("state=STARTED AND version IN (2.1,2.2)").unwrap();
    let records: Vec<PropertyMap> = (0..64)
        .map(|i| {
            let state = if i % 2 == 0 { "STARTED" } else { "INSTALLED" };
            record(&[("state", state), ("version", "2.1")])
        })
        .collect();

    let matches: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(16)
            .map(|chunk| {
                let predicate = &predicate;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .filter(|properties| predicate.evaluate(*properties).unwrap())
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    });
    assert_eq!(matches, 32);
}

#[test]
fn test_configured_limits() {
    let config = EngineConfig::from_json_str(r#"{"max_expression_depth": 1, "max_document_depth": 1}"#).unwrap();

    let err = PredicateParser::new(&config).parse("((a=1))").unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);

    let err = NestedDocumentFlattener::new(&config)
        .flatten_str(r#"{"a": {"b": 1}}"#)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DepthExceeded);
}
