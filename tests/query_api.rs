//! Query endpoint tests: pagination arithmetic, filter semantics, and the
//! `system_only` group rule, all through the real HTTP surface.

mod helpers;

use helpers::app::{store_envelope, TestApp};
use serde_json::json;
use std::collections::BTreeSet;

#[tokio::test]
async fn five_records_with_page_size_two_paginate_into_three_pages() {
    let app = TestApp::spawn().await;
    for i in 0..5 {
        let response = app.post_log(&store_envelope("pluginX", &format!("msg-{i}"))).await;
        assert_eq!(response.status(), 200);
    }

    let page = app
        .get_alerts(&[("page_size", "2".to_string()), ("page", "1".to_string())])
        .await;
    assert_eq!(page["total_logs"], 5);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["page_number"], 1);
    assert_eq!(page["page_size"], 2);
    assert_eq!(page["alerts"].as_array().unwrap().len(), 2);

    let last = app
        .get_alerts(&[("page_size", "2".to_string()), ("page", "3".to_string())])
        .await;
    assert_eq!(last["alerts"].as_array().unwrap().len(), 1);

    // Page number beyond the last page returns an empty list, not an error.
    let past_the_end = app
        .get_alerts(&[("page_size", "2".to_string()), ("page", "4".to_string())])
        .await;
    assert_eq!(past_the_end["result"], "success");
    assert_eq!(past_the_end["total_pages"], 3);
    assert!(past_the_end["alerts"].as_array().unwrap().is_empty());

    app.shutdown().await;
}

#[tokio::test]
async fn paging_reproduces_the_counted_set_without_duplicates() {
    let app = TestApp::spawn().await;
    for i in 0..9 {
        app.post_log(&store_envelope("pluginX", &format!("msg-{i}"))).await;
    }

    let mut seen: Vec<u64> = Vec::new();
    for page in 1..=3 {
        let body = app
            .get_alerts(&[
                ("page_size", "4".to_string()),
                ("page", page.to_string()),
            ])
            .await;
        for alert in body["alerts"].as_array().unwrap() {
            seen.push(alert["id"].as_u64().unwrap());
        }
    }

    assert_eq!(seen.len(), 9);
    let distinct: BTreeSet<u64> = seen.iter().copied().collect();
    assert_eq!(distinct.len(), 9, "no duplicates or omissions across pages");

    app.shutdown().await;
}

#[tokio::test]
async fn alerts_are_returned_newest_first() {
    let app = TestApp::spawn().await;
    app.post_log(&store_envelope("pluginX", "first")).await;
    app.post_log(&store_envelope("pluginX", "second")).await;

    let body = app.get_alerts(&[]).await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts[0]["message"], "second");
    assert_eq!(alerts[1]["message"], "first");

    app.shutdown().await;
}

#[tokio::test]
async fn system_only_forces_the_service_group_filter() {
    let app = TestApp::spawn().await;

    let mut service = store_envelope("backend", "service-level alert");
    service["log"]["group"] = json!("service");
    app.post_log(&service).await;

    let mut other = store_envelope("backend", "tenant alert");
    other["log"]["group"] = json!("tenantA");
    app.post_log(&other).await;
    app.post_log(&store_envelope("backend", "ungrouped alert")).await;

    // With no group and system_only truthy, only group=service records match
    // even though every other filter is empty.
    let body = app
        .get_alerts(&[("system_only", "true".to_string())])
        .await;
    assert_eq!(body["total_logs"], 1);
    assert_eq!(body["alerts"][0]["message"], "service-level alert");

    // An explicit group wins over system_only.
    let body = app
        .get_alerts(&[
            ("system_only", "true".to_string()),
            ("group", "tenantA".to_string()),
        ])
        .await;
    assert_eq!(body["total_logs"], 1);
    assert_eq!(body["alerts"][0]["message"], "tenant alert");

    // Non-truthy system_only leaves the group unfiltered.
    let body = app
        .get_alerts(&[("system_only", "0".to_string())])
        .await;
    assert_eq!(body["total_logs"], 3);

    app.shutdown().await;
}

#[tokio::test]
async fn filters_combine_with_and_semantics() {
    let app = TestApp::spawn().await;

    app.post_log(&store_envelope("pluginX", "bad password")).await;
    let mut other = store_envelope("pluginY", "disk almost full");
    other["log"]["category"] = json!("capacity");
    other["log"]["severity"] = json!("low");
    app.post_log(&other).await;

    let body = app
        .get_alerts(&[
            ("source", "pluginY".to_string()),
            ("severity", "low".to_string()),
        ])
        .await;
    assert_eq!(body["total_logs"], 1);
    assert_eq!(body["alerts"][0]["category"], "capacity");

    let body = app
        .get_alerts(&[
            ("source", "pluginY".to_string()),
            ("severity", "high".to_string()),
        ])
        .await;
    assert_eq!(body["total_logs"], 0);

    app.shutdown().await;
}

#[tokio::test]
async fn search_matches_substrings_case_insensitively() {
    let app = TestApp::spawn().await;
    app.post_log(&store_envelope("PluginX", "Bad Password")).await;
    app.post_log(&store_envelope("pluginY", "disk full")).await;

    let body = app
        .get_alerts(&[("search", "BAD PASS".to_string())])
        .await;
    assert_eq!(body["total_logs"], 1);
    assert_eq!(body["alerts"][0]["source"], "PluginX");

    // Search also covers the source and category fields.
    let body = app.get_alerts(&[("search", "pluginy".to_string())]).await;
    assert_eq!(body["total_logs"], 1);
    let body = app.get_alerts(&[("search", "auth".to_string())]).await;
    assert_eq!(body["total_logs"], 2);

    app.shutdown().await;
}

#[tokio::test]
async fn defaults_apply_when_pagination_params_are_omitted() {
    let app = TestApp::spawn().await;
    app.post_log(&store_envelope("pluginX", "one")).await;

    let body = app.get_alerts(&[]).await;
    assert_eq!(body["page_size"], 200);
    assert_eq!(body["page_number"], 1);
    assert_eq!(body["total_pages"], 1);

    app.shutdown().await;
}
