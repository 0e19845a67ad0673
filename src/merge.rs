//! Structural merge of two collection documents.
//!
//! Reconciles a "modified" copy of a collection against the "original" copy:
//! the original stays authoritative for IDs, ownership links, and bookkeeping
//! scalars, while the modified copy is authoritative for edited request
//! content and newly introduced items.
//!
//! The merge is total: absent or malformed parts of either document degrade
//! to defaults instead of failing. Inputs are never mutated; the merged
//! document is built fresh.

use serde_json::{Map, Value};

/// Array keys whose elements are reconciled by item identity instead of
/// concatenated.
const CONTAINER_KEYS: &[&str] = &["folders", "requests"];

/// Request fields where the modified document is always authoritative.
const REQUEST_CONTENT_KEYS: &[&str] = &["url", "body", "modified"];

/// Root fields carrying the original document's structural identity.
/// These are restored from the original after the keyed merge, whatever the
/// scalar rules decided.
const ROOT_IDENTITY_KEYS: &[&str] = &["_id", "colId", "containerId", "colName", "created"];

/// Merge a modified collection document into the original one.
///
/// Returns a new document that keeps the original's identity fields and
/// bookkeeping scalars, absorbs the modified copy's request edits and new
/// items, and remaps parent-folder links of new items into the original
/// document's ID space.
///
/// Both inputs are read-only; a non-object root is treated as an empty
/// document.
pub fn merge_collections(original: &Value, modified: &Value) -> Value {
    let empty = Map::new();
    let original_root = original.as_object().unwrap_or(&empty);
    let modified_root = modified.as_object().unwrap_or(&empty);

    let merger = DocumentMerger {
        root_id: original_root.get("_id"),
        original_folders: top_level_folders(original_root),
        modified_folders: top_level_folders(modified_root),
    };

    let mut merged = merger.merge_nodes(original_root, modified_root);

    // Root identity always comes from the original, even when the modified
    // document disagrees. A field the original lacks must not leak in from
    // the modified side either.
    for key in ROOT_IDENTITY_KEYS {
        match original_root.get(*key) {
            Some(value) => {
                merged.insert((*key).to_string(), value.clone());
            }
            None => {
                merged.remove(*key);
            }
        }
    }

    // Settings are a fresh copy of the original's alone.
    let settings = original_root
        .get("settings")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    merged.insert("settings".to_string(), Value::Object(settings));

    Value::Object(merged)
}

/// Shape of a mapping node, decided by which fields it carries directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeShape {
    /// Carries request content fields (`url`, `body`, or `modified`).
    Request,
    /// Folder, document root, or any other mapping.
    Generic,
}

impl NodeShape {
    fn classify(node: &Map<String, Value>) -> Self {
        if REQUEST_CONTENT_KEYS.iter().any(|key| node.contains_key(*key)) {
            NodeShape::Request
        } else {
            NodeShape::Generic
        }
    }
}

/// Identity of a container item, used to pair items across the two documents.
///
/// Requests are identified by their endpoint (they get renamed but keep the
/// same URL); everything else is identified by name. An item with neither is
/// anonymous and never matches anything.
#[derive(Debug)]
enum ItemIdentity<'a> {
    Endpoint { method: &'a Value, url: &'a Value },
    Named(&'a Value),
    Anonymous,
}

impl<'a> ItemIdentity<'a> {
    fn of(item: &'a Map<String, Value>) -> Self {
        match (item.get("url"), item.get("method")) {
            (Some(url), Some(method)) => ItemIdentity::Endpoint { method, url },
            _ => match item.get("name") {
                Some(name) => ItemIdentity::Named(name),
                None => ItemIdentity::Anonymous,
            },
        }
    }

    fn matches(&self, other: &Map<String, Value>) -> bool {
        match self {
            ItemIdentity::Endpoint { method, url } => {
                other.get("method") == Some(*method) && other.get("url") == Some(*url)
            }
            ItemIdentity::Named(name) => other.get("name") == Some(*name),
            ItemIdentity::Anonymous => false,
        }
    }
}

/// Document-level context threaded through the recursive merge.
///
/// The reconciler needs the root `_id` (to re-own merged requests) and both
/// documents' top-level folder lists (to translate parent links of new items
/// from the modified ID space into the original one).
struct DocumentMerger<'a> {
    root_id: Option<&'a Value>,
    original_folders: &'a [Value],
    modified_folders: &'a [Value],
}

impl DocumentMerger<'_> {
    /// Recursively merge two mapping nodes.
    ///
    /// Starts from a copy of the original node, then folds in every key of
    /// the modified node:
    /// - request content keys on a request-shaped node take the modified
    ///   value unconditionally;
    /// - `folders`/`requests` arrays are reconciled by item identity;
    /// - other arrays are concatenated with de-duplication;
    /// - nested mappings recurse;
    /// - scalars keep the original value when one exists.
    fn merge_nodes(
        &self,
        original: &Map<String, Value>,
        modified: &Map<String, Value>,
    ) -> Map<String, Value> {
        let mut result = original.clone();
        let shape = NodeShape::classify(modified);

        for (key, modified_value) in modified {
            let merged_value = if shape == NodeShape::Request
                && REQUEST_CONTENT_KEYS.contains(&key.as_str())
            {
                modified_value.clone()
            } else {
                match modified_value {
                    Value::Array(modified_items) => {
                        let original_items = original
                            .get(key)
                            .and_then(Value::as_array)
                            .map(Vec::as_slice)
                            .unwrap_or_default();
                        if CONTAINER_KEYS.contains(&key.as_str()) {
                            Value::Array(self.reconcile(original_items, modified_items))
                        } else {
                            Value::Array(concat_unique(original_items, modified_items))
                        }
                    }
                    Value::Object(modified_node) => {
                        let merged = match original.get(key).and_then(Value::as_object) {
                            Some(original_node) => self.merge_nodes(original_node, modified_node),
                            None => self.merge_nodes(&Map::new(), modified_node),
                        };
                        Value::Object(merged)
                    }
                    _ => original
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| modified_value.clone()),
                }
            };
            result.insert(key.clone(), merged_value);
        }

        result
    }

    /// Reconcile an ordered sequence of container items (folders or requests).
    ///
    /// Matched items are replaced with the recursive merge of both versions;
    /// unmatched items are appended as new, with their parent link translated
    /// into the original document's ID space where a same-named folder exists.
    /// The result is stably sorted by `sortNum` (missing values sort as 0).
    fn reconcile(&self, original_items: &[Value], modified_items: &[Value]) -> Vec<Value> {
        let mut result = original_items.to_vec();

        for modified_item in modified_items {
            let Some(modified_node) = modified_item.as_object() else {
                // No identity to match on; keep the item as introduced.
                result.push(modified_item.clone());
                continue;
            };

            match find_match(&result, modified_node) {
                Some(position) => {
                    let matched = result[position].as_object().cloned().unwrap_or_default();
                    let mut merged = self.merge_nodes(&matched, modified_node);
                    if is_request_item(modified_node) {
                        if let Some(root_id) = self.root_id {
                            merged.insert("colId".to_string(), root_id.clone());
                        }
                    }
                    result[position] = Value::Object(merged);
                }
                None => {
                    let mut inserted = modified_node.clone();
                    if let Some(container_id) =
                        modified_node.get("containerId").filter(|id| !id.is_null())
                    {
                        inserted.insert(
                            "containerId".to_string(),
                            self.remap_container_id(container_id),
                        );
                    }
                    if is_request_item(modified_node) {
                        if let Some(root_id) = self.root_id {
                            inserted.insert("colId".to_string(), root_id.clone());
                        }
                    }
                    result.push(Value::Object(inserted));
                }
            }
        }

        result.sort_by(|a, b| sort_num(a).total_cmp(&sort_num(b)));
        result
    }

    /// Translate a parent-folder link from the modified document's ID space
    /// into the original's, bridging over the shared folder name.
    ///
    /// Only pre-existing original folders are consulted: when the parent
    /// folder is itself new in this pass, the modified ID is kept verbatim so
    /// new parent and new children still link up among themselves.
    fn remap_container_id(&self, container_id: &Value) -> Value {
        let parent_name = self
            .modified_folders
            .iter()
            .find(|folder| folder.get("_id") == Some(container_id))
            .and_then(|folder| folder.get("name"));

        let original_id = parent_name.and_then(|name| {
            self.original_folders
                .iter()
                .find(|folder| folder.get("name") == Some(name))
                .and_then(|folder| folder.get("_id"))
        });

        original_id.cloned().unwrap_or_else(|| container_id.clone())
    }
}

/// The document's top-level folder list, empty when absent or not an array.
fn top_level_folders(root: &Map<String, Value>) -> &[Value] {
    root.get("folders")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Find the result item the candidate corresponds to, if any.
fn find_match(items: &[Value], candidate: &Map<String, Value>) -> Option<usize> {
    let identity = ItemIdentity::of(candidate);
    items
        .iter()
        .position(|item| item.as_object().is_some_and(|node| identity.matches(node)))
}

/// A container item counts as a request when it names an endpoint field.
/// Requests always belong to the original collection after the merge.
fn is_request_item(item: &Map<String, Value>) -> bool {
    item.contains_key("url") || item.contains_key("method")
}

/// Sort key for container ordering.
fn sort_num(item: &Value) -> f64 {
    item.get("sortNum").and_then(Value::as_f64).unwrap_or(0.0)
}

/// Merge a non-container array by uniqueness.
///
/// Keeps the original items and appends each modified item only when no
/// existing result item is structurally equal to it. Append order is stable;
/// nothing is reordered.
pub fn concat_unique(original_items: &[Value], modified_items: &[Value]) -> Vec<Value> {
    let mut result = original_items.to_vec();

    for modified_item in modified_items {
        let duplicate = result
            .iter()
            .any(|existing| items_equal(existing, modified_item));
        if !duplicate {
            result.push(modified_item.clone());
        }
    }

    result
}

/// Structural equality for plain array elements (parameters, headers).
///
/// Two items are equal when they share a non-empty `name` and, when the
/// domain is path-parameter-like, agree on `isPath`. Deep equality is never
/// consulted: same-named items collapse into one, keeping the original copy.
fn items_equal(a: &Value, b: &Value) -> bool {
    let (Some(a), Some(b)) = (a.as_object(), b.as_object()) else {
        return false;
    };

    let same_name = match (
        a.get("name").and_then(Value::as_str),
        b.get("name").and_then(Value::as_str),
    ) {
        (Some(name_a), Some(name_b)) => !name_a.is_empty() && name_a == name_b,
        _ => false,
    };
    if !same_name {
        return false;
    }

    match (a.get("isPath"), b.get("isPath")) {
        (None, None) => true,
        (Some(path_a), Some(path_b)) => path_a == path_b,
        _ => false,
    }
}
