//! JSON Patch construction for pod labels

use std::collections::BTreeMap;

use json_patch::{AddOperation, PatchOperation, ReplaceOperation};
use jsonptr::PointerBuf;
use serde_json::Value;

use crate::labels::LabelSet;

/// Build the patch that merges `desired` into a pod's labels
///
/// `existing` is `None` when the pod has no `metadata.labels` at all, in which
/// case the labels object is created first. Keys already present are replaced,
/// the rest are added. Operations follow key order of `desired`. Path segments
/// are escaped per RFC 6901 by [`PointerBuf::from_tokens`].
pub fn build_label_patch(
    existing: Option<&BTreeMap<String, String>>,
    desired: &LabelSet,
) -> Vec<PatchOperation> {
    let mut ops = Vec::with_capacity(desired.len() + 1);

    if existing.is_none() {
        ops.push(PatchOperation::Add(AddOperation {
            path: PointerBuf::from_tokens(["metadata", "labels"]),
            value: Value::Object(Default::default()),
        }));
    }

    for (key, value) in desired {
        let path = PointerBuf::from_tokens(["metadata", "labels", key.as_str()]);
        let value = Value::String(value.clone());
        let op = if existing.is_some_and(|labels| labels.contains_key(key)) {
            PatchOperation::Replace(ReplaceOperation { path, value })
        } else {
            PatchOperation::Add(AddOperation { path, value })
        };
        ops.push(op);
    }

    ops
}
