//! Structural deep merge of facts documents
//!
//! Rules, applied per key of the overlay:
//! - both values are documents: merge recursively
//! - both values are lists and list merging is on: base items, then overlay items
//! - anything else: the overlay value replaces the base value
//!
//! Keys only present in the base are kept untouched.

use serde_json::Value;

use super::records::FactsDocument;

/// Merge `overlay` onto `base`, returning a new document
pub fn deep_merge(base: &FactsDocument, overlay: &FactsDocument, merge_lists: bool) -> FactsDocument {
    let mut merged = base.clone();
    deep_merge_into(&mut merged, overlay, merge_lists);
    merged
}

/// Merge `overlay` onto a caller-owned `target`.
///
/// `target` is the accumulator of a merge chain; `overlay` is only read.
pub fn deep_merge_into(target: &mut FactsDocument, overlay: &FactsDocument, merge_lists: bool) {
    for (key, incoming) in overlay {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                deep_merge_into(existing, nested, merge_lists);
            }
            (Some(Value::Array(existing)), Value::Array(items)) if merge_lists => {
                existing.extend(items.iter().cloned());
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}
