//! End-to-end tests for the collection merge.

use collection_merge::merge::merge_collections;
use collection_merge::prune::prune_removed;
use serde_json::{Value, json};

/// The original document: one folder, one request, full bookkeeping.
fn original_document() -> Value {
    json!({
        "_id": "C1",
        "colId": "C1",
        "colName": "Petstore",
        "created": "2023-01-01T00:00:00Z",
        "settings": {"auth": "none"},
        "folders": [
            {"_id": "F1", "name": "Pets", "sortNum": 1, "containerId": ""}
        ],
        "requests": [
            {
                "_id": "R1",
                "colId": "C1",
                "name": "List pets",
                "method": "GET",
                "url": "/pets",
                "containerId": "F1",
                "sortNum": 1
            }
        ]
    })
}

/// The edited copy: re-exported with fresh IDs, one changed body, one new
/// request.
fn modified_document() -> Value {
    json!({
        "_id": "C9",
        "colId": "C9",
        "colName": "Petstore (edited)",
        "created": "2024-06-01T00:00:00Z",
        "settings": {"auth": "basic"},
        "folders": [
            {"_id": "F9", "name": "Pets", "sortNum": 1}
        ],
        "requests": [
            {
                "name": "List pets",
                "method": "GET",
                "url": "/pets",
                "body": {"x": 1},
                "containerId": "F9",
                "sortNum": 1
            },
            {
                "name": "Create pet",
                "method": "POST",
                "url": "/pets",
                "containerId": "F9",
                "sortNum": 2
            }
        ]
    })
}

#[test]
fn end_to_end_merge_scenario() {
    let merged = merge_collections(&original_document(), &modified_document());

    // Root identity stays with the original.
    assert_eq!(merged["_id"], json!("C1"));
    assert_eq!(merged["colId"], json!("C1"));
    assert_eq!(merged["colName"], json!("Petstore"));
    assert_eq!(merged["created"], json!("2023-01-01T00:00:00Z"));
    assert_eq!(merged["settings"], json!({"auth": "none"}));

    // The folder matched by name keeps its original ID.
    let folders = merged["folders"].as_array().expect("folders array");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["_id"], json!("F1"));

    let requests = merged["requests"].as_array().expect("requests array");
    assert_eq!(requests.len(), 2);

    // The existing request keeps its identity and parent link but adopts the
    // edited body.
    let listing = &requests[0];
    assert_eq!(listing["_id"], json!("R1"));
    assert_eq!(listing["containerId"], json!("F1"));
    assert_eq!(listing["body"], json!({"x": 1}));
    assert_eq!(listing["colId"], json!("C1"));

    // The new request is appended with its parent link remapped into the
    // original ID space and ownership moved to the original collection.
    let created = &requests[1];
    assert_eq!(created["method"], json!("POST"));
    assert_eq!(created["containerId"], json!("F1"));
    assert_eq!(created["colId"], json!("C1"));
    assert_eq!(created["sortNum"], json!(2));
}

#[test]
fn merge_with_self_returns_same_document() {
    let document = original_document();

    assert_eq!(merge_collections(&document, &document), document);
}

#[test]
fn merge_result_is_stable_under_repetition() {
    let merged = merge_collections(&original_document(), &modified_document());
    let again = merge_collections(&merged, &modified_document());

    assert_eq!(again, merged);
}

#[test]
fn inputs_are_not_mutated() {
    let original = original_document();
    let modified = modified_document();
    let original_before = original.clone();
    let modified_before = modified.clone();

    let _ = merge_collections(&original, &modified);

    assert_eq!(original, original_before);
    assert_eq!(modified, modified_before);
}

#[test]
fn merge_then_prune_drops_deleted_request() {
    let original = json!({
        "_id": "C1",
        "requests": [
            {"_id": "R1", "name": "keep", "method": "GET", "url": "/pets", "sortNum": 1},
            {"_id": "R2", "name": "gone", "method": "DELETE", "url": "/pets/1", "sortNum": 2}
        ]
    });
    let modified = json!({
        "requests": [
            {"name": "keep", "method": "GET", "url": "/pets", "sortNum": 1}
        ]
    });

    let merged = merge_collections(&original, &modified);
    // The merge never removes anything on its own.
    assert_eq!(merged["requests"].as_array().unwrap().len(), 2);

    let pruned = prune_removed(&merged, &modified);
    let requests = pruned["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["_id"], json!("R1"));
}

#[test]
fn deep_folder_tree_is_reconciled_recursively() {
    let original = json!({
        "_id": "C1",
        "folders": [{
            "_id": "F1",
            "name": "Api",
            "folders": [{
                "_id": "F2",
                "name": "Pets",
                "requests": [
                    {"_id": "R1", "name": "List", "method": "GET", "url": "/pets"}
                ]
            }]
        }]
    });
    let modified = json!({
        "folders": [{
            "name": "Api",
            "folders": [{
                "name": "Pets",
                "requests": [
                    {"name": "List", "method": "GET", "url": "/pets", "body": {"page": 1}}
                ]
            }]
        }]
    });

    let merged = merge_collections(&original, &modified);
    let inner = &merged["folders"][0]["folders"][0];

    assert_eq!(inner["_id"], json!("F2"));
    assert_eq!(inner["requests"][0]["_id"], json!("R1"));
    assert_eq!(inner["requests"][0]["body"], json!({"page": 1}));
}

#[test]
fn empty_original_adopts_modified_content() {
    let merged = merge_collections(&json!({}), &modified_document());

    // Nothing to preserve, so the edit stream flows through, but the root
    // identity fields of the modified copy are still discarded.
    assert!(merged.get("_id").is_none());
    assert!(merged.get("colId").is_none());
    assert_eq!(merged["settings"], json!({}));
    assert_eq!(merged["requests"].as_array().unwrap().len(), 2);
}
