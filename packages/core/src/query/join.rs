//! Sub-resource predicates
//!
//! A filter on a parent resource may reference properties of its
//! sub-resources by prefixing them with the sub-resource name, as in
//! `components/ServiceComponentInfo/state=STARTED`. The part of the filter
//! that only constrains one sub-resource also narrows that sub-resource's
//! results. A parent matches when the filter holds for the parent joined with
//! at least one row of its sub-resource results.

use super::result::{ResultEntry, ResultSet};
use crate::error::ResqResult;
use crate::predicate::{LogicalOp, Predicate, PropertySource};
use crate::property::{PropertyId, PropertyMap};
use crate::resource::Resource;

/// Property ids of every comparison leaf, in predicate order
pub(crate) fn leaf_ids(predicate: &Predicate) -> Vec<&PropertyId> {
    let mut ids = Vec::new();
    collect_leaf_ids(predicate, &mut ids);
    ids
}

fn collect_leaf_ids<'p>(predicate: &'p Predicate, out: &mut Vec<&'p PropertyId>) {
    match predicate {
        Predicate::Comparison(leaf) => out.push(&leaf.property_id),
        Predicate::Composite(composite) => {
            for child in composite.children() {
                collect_leaf_ids(child, out);
            }
        }
        Predicate::Not(child) => collect_leaf_ids(child, out),
    }
}

/// The part of `predicate` constraining sub-resource `name`, with the name
/// prefix removed.
///
/// The result never rejects a sub-resource row the full predicate could
/// still need: an OR with an unconstrained branch is unconstrained, and a
/// NOT is only kept when every leaf below it belongs to `name`.
pub(crate) fn sub_resource_predicate(predicate: &Predicate, name: &str) -> Option<Predicate> {
    match predicate {
        Predicate::Comparison(leaf) => {
            let id = leaf.property_id.strip_prefix(name)?;
            Some(Predicate::comparison(id, leaf.operator, leaf.operand.clone()))
        }
        Predicate::Composite(composite) => {
            let mut children = Vec::with_capacity(composite.children().len());
            for child in composite.children() {
                match sub_resource_predicate(child, name) {
                    Some(sub) => children.push(sub),
                    None if composite.operator() == LogicalOp::Or => return None,
                    None => {}
                }
            }
            if children.is_empty() {
                None
            } else {
                Some(Predicate::composite(composite.operator(), children))
            }
        }
        Predicate::Not(child) => {
            let owned = leaf_ids(child)
                .iter()
                .all(|id| id.strip_prefix(name).is_some());
            if owned {
                sub_resource_predicate(child, name).map(Predicate::not)
            } else {
                None
            }
        }
    }
}

/// Rows a parent's properties are joined with: the cross product, over the
/// sub-resources in `names`, of each one's result rows with property ids
/// prefixed by the sub-resource name. A sub-resource without results leaves
/// the rows unchanged, so there is always at least one row.
pub(crate) fn joined_rows(sub_results: &[(String, ResultSet)], names: &[String]) -> Vec<PropertyMap> {
    let mut rows = vec![PropertyMap::new()];
    for (name, results) in sub_results {
        if !names.contains(name) {
            continue;
        }
        let category_rows: Vec<PropertyMap> = results
            .entries()
            .iter()
            .flat_map(|entry| entry_rows(entry, results.joined_sub_resources()))
            .map(|row| -> PropertyMap {
                row.into_iter()
                    .map(|(id, value)| (id.with_prefix(name), value))
                    .collect()
            })
            .collect();
        if category_rows.is_empty() {
            continue;
        }

        let mut crossed = Vec::with_capacity(rows.len() * category_rows.len());
        for row in &rows {
            for category_row in &category_rows {
                let mut merged = row.clone();
                merged.extend(category_row.iter().map(|(id, value)| (id.clone(), value.clone())));
                crossed.push(merged);
            }
        }
        rows = crossed;
    }
    rows
}

fn entry_rows(entry: &ResultEntry, names: &[String]) -> Vec<PropertyMap> {
    joined_rows(&entry.sub_results, names)
        .into_iter()
        .map(|mut row| {
            row.extend(
                entry
                    .resource
                    .properties()
                    .iter()
                    .map(|(id, value)| (id.clone(), value.clone())),
            );
            row
        })
        .collect()
}

/// A resource seen through one joined row
struct JoinedResource<'a> {
    resource: &'a Resource,
    row: &'a PropertyMap,
}

impl PropertySource for JoinedResource<'_> {
    fn property(&self, id: &PropertyId) -> Option<&str> {
        self.resource
            .get_property(id)
            .or_else(|| self.row.get(id).map(String::as_str))
    }
}

/// Whether `predicate` holds for `resource` joined with any of `rows`.
pub(crate) fn matches_any_row(
    predicate: &Predicate,
    resource: &Resource,
    rows: &[PropertyMap],
) -> ResqResult<bool> {
    for row in rows {
        if predicate.evaluate(&JoinedResource { resource, row })? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::query::Projection;

    fn components(states: &[(&str, &str)]) -> ResultSet {
        let entries = states
            .iter()
            .map(|(name, state)| ResultEntry {
                resource: Resource::new("component")
                    .with("ServiceComponentInfo/component_name", *name)
                    .with("ServiceComponentInfo/state", *state),
                sub_results: Vec::new(),
            })
            .collect();
        ResultSet::new("component", true, Projection::default(), Vec::new(), entries)
    }

    #[test]
    fn test_sub_resource_predicate_extraction() {
        let predicate = parse(
            "ServiceInfo/state=STARTED AND components/ServiceComponentInfo/state=INSTALLED",
        )
        .unwrap();
        assert_eq!(
            sub_resource_predicate(&predicate, "components"),
            Some(parse("ServiceComponentInfo/state=INSTALLED").unwrap())
        );
        assert_eq!(sub_resource_predicate(&predicate, "alerts"), None);

        let predicate = parse("ServiceInfo/state=STARTED OR components/ServiceComponentInfo/state=INSTALLED").unwrap();
        assert_eq!(sub_resource_predicate(&predicate, "components"), None);

        let predicate = parse("NOT components/ServiceComponentInfo/state=STARTED").unwrap();
        assert_eq!(
            sub_resource_predicate(&predicate, "components"),
            Some(parse("NOT ServiceComponentInfo/state=STARTED").unwrap())
        );

        let predicate =
            parse("NOT (components/ServiceComponentInfo/state=STARTED AND ServiceInfo/state=STARTED)").unwrap();
        assert_eq!(sub_resource_predicate(&predicate, "components"), None);
    }

    #[test]
    fn test_parent_matches_any_joined_row() {
        let service = Resource::new("service").with("ServiceInfo/state", "STARTED");
        let sub_results = vec![(
            "components".to_string(),
            components(&[("NAMENODE", "STARTED"), ("DATANODE", "INSTALLED")]),
        )];
        let rows = joined_rows(&sub_results, &["components".to_string()]);
        assert_eq!(rows.len(), 2);

        let both = parse(
            "ServiceInfo/state=STARTED AND components/ServiceComponentInfo/state=INSTALLED",
        )
        .unwrap();
        assert!(matches_any_row(&both, &service, &rows).unwrap());

        // Both leaves must hold on the same row.
        let same_row = parse(
            "components/ServiceComponentInfo/component_name=NAMENODE AND components/ServiceComponentInfo/state=INSTALLED",
        )
        .unwrap();
        assert!(!matches_any_row(&same_row, &service, &rows).unwrap());
    }

    #[test]
    fn test_empty_sub_results_keep_one_row() {
        let sub_results = vec![("components".to_string(), components(&[]))];
        let rows = joined_rows(&sub_results, &["components".to_string()]);
        assert_eq!(rows, vec![PropertyMap::new()]);

        let service = Resource::new("service");
        let predicate = parse("NOT components/ServiceComponentInfo/state=STARTED").unwrap();
        assert!(matches_any_row(&predicate, &service, &rows).unwrap());
    }
}
