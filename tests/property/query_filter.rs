// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Query Filters

use cim_infrastructure_vcd::query::{QueryFilter, QueryRecord};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn field() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,11}"
}

/// Values never contain the filter delimiters
fn value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ._-]{0,16}"
}

fn filter() -> impl Strategy<Value = QueryFilter> {
    prop::collection::vec((field(), value()), 1..5).prop_map(|conditions| {
        let mut iter = conditions.into_iter();
        // vec strategy yields at least one condition
        let (first_field, first_value) = iter.next().unwrap_or_default();
        iter.fold(QueryFilter::eq(first_field, first_value), |f, (k, v)| {
            f.and(k, v)
        })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: rendering then parsing yields the same filter
    #[test]
    fn prop_render_parse_identity(filter in filter()) {
        let parsed: QueryFilter = filter.to_string().parse().unwrap();
        prop_assert_eq!(parsed, filter);
    }

    /// Property: rendered filters are parenthesized, one `==` per condition
    #[test]
    fn prop_rendered_shape(filter in filter()) {
        let rendered = filter.to_string();
        prop_assert!(rendered.starts_with('('));
        prop_assert!(rendered.ends_with(')'));
        prop_assert_eq!(rendered.matches("==").count(), filter.conditions().len());
    }

    /// Property: a name filter matches exactly the record with that name
    #[test]
    fn prop_name_filter_is_exact(name in value(), other in value()) {
        let record = QueryRecord::new(name.clone(), "https://vcd/api/admin/extension/externalnet/1");
        prop_assert!(QueryFilter::eq("name", name.clone()).matches(&record));
        prop_assert_eq!(QueryFilter::eq("name", other.clone()).matches(&record), other == name);
    }
}
