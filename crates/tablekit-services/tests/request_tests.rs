//! Tests for listing request derivation and the request key

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Map};
use tablekit_core::{
    FilterSet, FilterValue, Predicate, SortCriterion, ViewState, ViewStateController,
};
use tablekit_services::{build_listing_request, filter_value_to_wire, RequestKey, TableQueryConfig};

fn config() -> TableQueryConfig {
    TableQueryConfig::new("products").with_search_columns(["title", "sku"])
}

#[test]
fn request_carries_view_state() {
    let mut controller = ViewStateController::new(ViewState::default());
    controller.set_page_size(20).unwrap();
    controller.set_search("lamp");
    controller.set_page(3);

    let request = build_listing_request(&config(), controller.state());
    let body = serde_json::to_value(&request).unwrap();

    assert_eq!(
        body,
        json!({
            "table": "products",
            "pageSize": 20,
            "pageNumber": 3,
            "searchColumns": ["title", "sku"],
            "searchQuery": "lamp",
            "columnFilters": {},
            "additionalParams": {"showAll": "true"},
        })
    );
}

#[test]
fn single_sort_is_sent_as_order_by_only() {
    let mut view = ViewState::default();
    view.sort = vec![SortCriterion::desc("price")];

    let request = build_listing_request(&config(), &view);
    assert_eq!(
        request.order_by,
        Some(("price".to_string(), tablekit_core::SortDirection::Desc))
    );
    assert!(request.multi_sort.is_none());
}

#[test]
fn multi_sort_sends_primary_pair_and_full_list() {
    let mut view = ViewState::default();
    view.sort = vec![SortCriterion::asc("category"), SortCriterion::desc("price")];

    let body = serde_json::to_value(build_listing_request(&config(), &view)).unwrap();
    assert_eq!(body["orderBy"], json!(["category", "asc"]));
    assert_eq!(
        body["multiSort"],
        json!([
            {"column": "category", "direction": "asc"},
            {"column": "price", "direction": "desc"},
        ])
    );
}

#[test]
fn default_order_applies_without_sort() {
    let config = config().with_default_order(SortCriterion::desc("created_at"));

    let body = serde_json::to_value(build_listing_request(&config, &ViewState::default())).unwrap();
    assert_eq!(body["orderBy"], json!(["created_at", "desc"]));

    let mut view = ViewState::default();
    view.sort = vec![SortCriterion::asc("title")];
    let body = serde_json::to_value(build_listing_request(&config, &view)).unwrap();
    assert_eq!(body["orderBy"], json!(["title", "asc"]));
}

#[test]
fn caller_params_replace_default_params() {
    let mut params = Map::new();
    params.insert("archived".into(), json!(false));
    let config = config().with_additional_params(params);

    let request = build_listing_request(&config, &ViewState::default());
    assert_eq!(serde_json::to_value(&request.additional_params).unwrap(), json!({"archived": false}));
}

#[test]
fn date_range_has_distinct_wire_form() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(
        filter_value_to_wire(&FilterValue::single_day(day)),
        json!({
            "type": "dateRange",
            "from": "2024-06-01T00:00:00.000Z",
            "to": "2024-06-01T23:59:59.999Z",
        })
    );
    assert_eq!(filter_value_to_wire(&FilterValue::literal("2024-06-01")), json!("2024-06-01"));
}

#[test]
fn filter_wire_forms() {
    assert_eq!(filter_value_to_wire(&FilterValue::list(["IT", "HR"])), json!(["IT", "HR"]));
    assert_eq!(
        filter_value_to_wire(&FilterValue::range("18", "65")),
        json!({"$gte": "18", "$lte": "65"})
    );
    assert_eq!(
        filter_value_to_wire(&FilterValue::predicate(Predicate::NotEquals("x".into()))),
        json!({"$ne": "x"})
    );
    assert_eq!(
        filter_value_to_wire(&FilterValue::predicate(Predicate::StartsWith("ab".into()))),
        json!({"$regex": "^ab", "$options": "i"})
    );
    assert_eq!(
        filter_value_to_wire(&FilterValue::predicate(Predicate::NotContains("a.b".into()))),
        json!({"$not": {"$regex": "a\\.b", "$options": "i"}})
    );
    assert_eq!(
        filter_value_to_wire(&FilterValue::predicate(Predicate::IsEmpty)),
        json!({"$in": [null, ""]})
    );
    assert_eq!(
        filter_value_to_wire(&FilterValue::predicate(Predicate::NotIn(vec!["a".into()]))),
        json!({"$nin": ["a"]})
    );
}

#[test]
fn column_filters_use_wire_form() {
    let mut filters = FilterSet::new();
    filters.insert("status".into(), FilterValue::literal("active"));
    filters.insert("dept".into(), FilterValue::list(["IT"]));

    let mut controller = ViewStateController::new(ViewState::default());
    controller.apply_filter_set(filters);

    let body = serde_json::to_value(build_listing_request(&config(), controller.state())).unwrap();
    assert_eq!(body["columnFilters"], json!({"status": "active", "dept": ["IT"]}));
}

#[test]
fn request_key_tracks_every_query_input() {
    let base = ViewState::default();
    let key = RequestKey::from_view("products", &base);
    assert_eq!(key, RequestKey::from_view("products", &base.clone()));
    assert_ne!(key, RequestKey::from_view("orders", &base));

    let mut searched = base.clone();
    searched.search_query = "lamp".into();
    assert_ne!(key, RequestKey::from_view("products", &searched));

    let mut sorted = base.clone();
    sorted.sort = vec![SortCriterion::asc("title")];
    assert_ne!(key, RequestKey::from_view("products", &sorted));

    let mut resized = base.clone();
    resized.pagination.page_size = 50;
    assert_ne!(key, RequestKey::from_view("products", &resized));

    let mut hidden = base.clone();
    hidden.column_visibility.insert("sku".into(), false);
    assert_eq!(key, RequestKey::from_view("products", &hidden));
}

#[test]
fn request_key_ignores_filter_order() {
    let mut status_first = ViewStateController::new(ViewState::default());
    status_first.set_column_filter("status", Some(FilterValue::literal("active")));
    status_first.set_column_filter("dept", Some(FilterValue::literal("sales")));

    let mut dept_first = ViewStateController::new(ViewState::default());
    dept_first.set_column_filter("dept", Some(FilterValue::literal("sales")));
    dept_first.set_column_filter("status", Some(FilterValue::literal("active")));

    assert_eq!(
        RequestKey::from_view("users", status_first.state()),
        RequestKey::from_view("users", dept_first.state())
    );

    dept_first.set_column_filter("status", Some(FilterValue::literal("inactive")));
    assert_ne!(
        RequestKey::from_view("users", status_first.state()),
        RequestKey::from_view("users", dept_first.state())
    );
}
