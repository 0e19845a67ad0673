//! Removal of items the modified document no longer contains.
//!
//! The merge itself only adds and updates; deletions made in the modified
//! copy would otherwise linger forever in the original. This pass filters a
//! document down to the items the modified copy still knows about, matching
//! requests by method plus normalized URL and everything else by name.
//!
//! Like the merge, it is total and non-mutating: malformed nodes are passed
//! through or dropped instead of failing.

use serde_json::{Map, Value};

/// Drop container items from `document` that are absent from `modified`.
///
/// Top-level folders are filtered against the modified folder list and
/// top-level requests against the modified request list. Nested folders are
/// walked recursively; their `requests` arrays are filtered against the
/// modified top-level request list as well.
pub fn prune_removed(document: &Value, modified: &Value) -> Value {
    let empty = Map::new();
    let document_root = document.as_object().unwrap_or(&empty);
    let modified_root = modified.as_object().unwrap_or(&empty);

    let surviving_folders = item_list(modified_root, "folders");
    let surviving_requests = item_list(modified_root, "requests");

    let mut result = document_root.clone();

    if let Some(folders) = document_root.get("folders").and_then(Value::as_array) {
        let kept: Vec<Value> = folders
            .iter()
            .filter(|folder| exists_in(folder, surviving_folders))
            .map(|folder| prune_folder(folder, surviving_requests))
            .collect();
        result.insert("folders".to_string(), Value::Array(kept));
    }

    if let Some(requests) = document_root.get("requests").and_then(Value::as_array) {
        let kept: Vec<Value> = requests
            .iter()
            .filter(|request| exists_in(request, surviving_requests))
            .cloned()
            .collect();
        result.insert("requests".to_string(), Value::Array(kept));
    }

    Value::Object(result)
}

/// Filter one folder's requests and recurse into its nested folders.
fn prune_folder(folder: &Value, surviving_requests: &[Value]) -> Value {
    let Some(node) = folder.as_object() else {
        return folder.clone();
    };

    let mut result = node.clone();

    if let Some(nested) = node.get("folders").and_then(Value::as_array) {
        let pruned: Vec<Value> = nested
            .iter()
            .map(|inner| prune_folder(inner, surviving_requests))
            .collect();
        result.insert("folders".to_string(), Value::Array(pruned));
    }

    if let Some(requests) = node.get("requests").and_then(Value::as_array) {
        let kept: Vec<Value> = requests
            .iter()
            .filter(|request| exists_in(request, surviving_requests))
            .cloned()
            .collect();
        result.insert("requests".to_string(), Value::Array(kept));
    }

    Value::Object(result)
}

/// Does the modified document still contain this item?
///
/// Requests (both `url` and `method` present) are compared by method and
/// normalized URL so that query-string or trailing-slash churn does not count
/// as a deletion. Everything else is compared by name; an item with no
/// identity at all is treated as deleted.
fn exists_in(item: &Value, survivors: &[Value]) -> bool {
    let Some(node) = item.as_object() else {
        return false;
    };

    match (node.get("url").and_then(Value::as_str), node.get("method")) {
        (Some(url), Some(method)) => survivors.iter().any(|survivor| {
            survivor.get("method") == Some(method)
                && survivor
                    .get("url")
                    .and_then(Value::as_str)
                    .is_some_and(|candidate| normalize_url(candidate) == normalize_url(url))
        }),
        _ => match node.get("name") {
            Some(name) => survivors
                .iter()
                .any(|survivor| survivor.get("name") == Some(name)),
            None => false,
        },
    }
}

/// Strip the query string and trailing slashes for comparison.
fn normalize_url(url: &str) -> &str {
    url.split('?').next().unwrap_or("").trim_end_matches('/')
}

/// A top-level array of the document, empty when absent or not an array.
fn item_list<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
