//! Partial updates: JSON-Patch style operation lists applied to an entity's
//! transfer shape, then re-validated before touching the entity.
//!
//! The merge moves through typed stages:
//!
//! ```text
//! Received --apply--> Applied --validate--> Validated --accept--> entity updated
//!     \                  \
//!      `-- PatchError     `-- ValidationErrors        (rejected, entity untouched)
//! ```
//!
//! Nothing here persists anything; saving the accepted entity is the
//! caller's job.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A patch document that cannot be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    #[error("Malformed patch document: {0}")]
    Malformed(String),

    #[error("Invalid JSON pointer '{0}'")]
    InvalidPointer(String),

    #[error("Path '{0}' does not exist")]
    PathNotFound(String),

    #[error("Test operation failed at '{0}'")]
    TestFailed(String),

    #[error("Cannot move '{from}' into its own child '{path}'")]
    MoveIntoChild { from: String, path: String },

    #[error("Patched document does not fit the target shape: {0}")]
    ShapeMismatch(String),
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// A single RFC 6902 operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

/// An ordered list of patch operations, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    /// Build a document from a raw request body.
    pub fn from_value(value: Value) -> Result<Self, PatchError> {
        serde_json::from_value(value).map_err(|e| PatchError::Malformed(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply every operation to `target`.
    ///
    /// Operations run against a scratch copy; `target` is only replaced when
    /// all of them succeed.
    pub fn apply(&self, target: &mut Value) -> Result<(), PatchError> {
        let mut scratch = target.clone();
        for op in &self.0 {
            apply_operation(&mut scratch, op)?;
        }
        *target = scratch;
        Ok(())
    }
}

fn apply_operation(doc: &mut Value, op: &PatchOperation) -> Result<(), PatchError> {
    match op {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(drop),
        PatchOperation::Replace { path, value } => {
            let slot = lookup_mut(doc, path)?;
            *slot = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if path != from && path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = lookup_mut(doc, from)?.clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            if json_equal(lookup_mut(doc, path)?, value) {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

/// Structural equality where numbers compare by value, so `26` equals `26.0`.
fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_f64() == b.as_f64(),
            },
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

// ---------------------------------------------------------------------------
// JSON pointer helpers
// ---------------------------------------------------------------------------

/// Split a JSON pointer into unescaped reference tokens. `""` is the root.
fn parse_pointer(pointer: &str) -> Result<Vec<String>, PatchError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer(pointer.to_string()));
    };
    Ok(rest
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Parse an array index token. Leading zeros are not allowed.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn child_mut<'v>(value: &'v mut Value, token: &str) -> Option<&'v mut Value> {
    match value {
        Value::Object(map) => map.get_mut(token),
        Value::Array(items) => parse_index(token).and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn lookup_mut<'v>(doc: &'v mut Value, path: &str) -> Result<&'v mut Value, PatchError> {
    let tokens = parse_pointer(path)?;
    let mut current = doc;
    for token in &tokens {
        current =
            child_mut(current, token).ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
    }
    Ok(current)
}

/// Resolve the container holding the last token of `path`.
fn parent_mut<'v>(doc: &'v mut Value, path: &str) -> Result<(&'v mut Value, String), PatchError> {
    let mut tokens = parse_pointer(path)?;
    let Some(last) = tokens.pop() else {
        return Err(PatchError::InvalidPointer(path.to_string()));
    };
    let mut current = doc;
    for token in &tokens {
        current =
            child_mut(current, token).ok_or_else(|| PatchError::PathNotFound(path.to_string()))?;
    }
    Ok((current, last))
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, last) = parent_mut(doc, path)?;
    match parent {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            let index = if last == "-" {
                items.len()
            } else {
                parse_index(&last)
                    .filter(|i| *i <= items.len())
                    .ok_or_else(|| PatchError::PathNotFound(path.to_string()))?
            };
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<Value, PatchError> {
    let (parent, last) = parent_mut(doc, path)?;
    let removed = match parent {
        Value::Object(map) => map.remove(&last),
        Value::Array(items) => parse_index(&last)
            .filter(|i| *i < items.len())
            .map(|i| items.remove(i)),
        _ => None,
    };
    removed.ok_or_else(|| PatchError::PathNotFound(path.to_string()))
}

// ---------------------------------------------------------------------------
// Merge pipeline
// ---------------------------------------------------------------------------

/// An entity with an externally visible transfer shape.
pub trait TransferShape {
    type Transfer: Serialize + DeserializeOwned + Validate;

    /// Materialize the entity's current transfer shape.
    fn to_transfer(&self) -> Self::Transfer;

    /// Copy a (validated) transfer shape back onto the entity.
    fn apply_transfer(&mut self, transfer: Self::Transfer);
}

/// A transfer-shape snapshot waiting for a patch.
#[derive(Debug, Clone)]
pub struct Received<T> {
    snapshot: T,
}

/// A patched candidate that has not been validated yet.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    candidate: T,
}

/// A patched candidate that passed validation.
#[derive(Debug, Clone)]
pub struct Validated<T> {
    candidate: T,
}

impl<T> Received<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    pub fn new(snapshot: T) -> Self {
        Self { snapshot }
    }

    /// Apply `patch` to a copy of the snapshot.
    ///
    /// The patched document must still deserialize into `T`; unknown or
    /// missing members reject the whole patch.
    pub fn apply(self, patch: &PatchDocument) -> Result<Applied<T>, PatchError> {
        let mut doc = serde_json::to_value(&self.snapshot)
            .map_err(|e| PatchError::ShapeMismatch(e.to_string()))?;
        patch.apply(&mut doc)?;
        let candidate =
            serde_json::from_value(doc).map_err(|e| PatchError::ShapeMismatch(e.to_string()))?;
        Ok(Applied { candidate })
    }
}

impl<T: Validate> Applied<T> {
    pub fn candidate(&self) -> &T {
        &self.candidate
    }

    pub fn validate(self) -> Result<Validated<T>, ValidationErrors> {
        self.candidate.validate()?;
        Ok(Validated {
            candidate: self.candidate,
        })
    }
}

impl<T> Validated<T> {
    pub fn candidate(&self) -> &T {
        &self.candidate
    }

    /// Write the candidate onto the tracked entity. The entity is now ready
    /// for the caller to persist.
    pub fn accept<E>(self, entity: &mut E)
    where
        E: TransferShape<Transfer = T>,
    {
        entity.apply_transfer(self.candidate);
    }
}

/// Run the full pipeline against `entity`.
///
/// On any error the entity is left exactly as it was.
pub fn merge_patch<E: TransferShape>(entity: &mut E, patch: &PatchDocument) -> Result<(), CoreError> {
    let validated = Received::new(entity.to_transfer()).apply(patch)?.validate()?;
    validated.accept(entity);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Worker {
        id: u32,
        name: String,
        age: i32,
        position: String,
    }

    #[derive(Debug, Serialize, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct WorkerForm {
        #[validate(length(min = 1, max = 30))]
        name: String,
        #[validate(range(min = 18, max = 120))]
        age: i32,
        #[validate(length(min = 1, max = 20))]
        position: String,
    }

    impl TransferShape for Worker {
        type Transfer = WorkerForm;

        fn to_transfer(&self) -> WorkerForm {
            WorkerForm {
                name: self.name.clone(),
                age: self.age,
                position: self.position.clone(),
            }
        }

        fn apply_transfer(&mut self, form: WorkerForm) {
            self.name = form.name;
            self.age = form.age;
            self.position = form.position;
        }
    }

    fn worker() -> Worker {
        Worker {
            id: 1,
            name: "Jana McLeaf".to_string(),
            age: 30,
            position: "Administrator".to_string(),
        }
    }

    fn doc(ops: Value) -> PatchDocument {
        PatchDocument::from_value(ops).unwrap()
    }

    // -- document application -------------------------------------------------

    #[test]
    fn replace_and_add_on_object_members() {
        let mut target = json!({"name": "a", "tags": ["x"]});
        doc(json!([
            {"op": "replace", "path": "/name", "value": "b"},
            {"op": "add", "path": "/tags/-", "value": "y"},
            {"op": "add", "path": "/tags/0", "value": "w"},
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target, json!({"name": "b", "tags": ["w", "x", "y"]}));
    }

    #[test]
    fn move_copy_and_test() {
        let mut target = json!({"a": 1, "b": {"c": 2}});
        doc(json!([
            {"op": "test", "path": "/b/c", "value": 2},
            {"op": "copy", "from": "/a", "path": "/b/d"},
            {"op": "move", "from": "/b/c", "path": "/e"},
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target, json!({"a": 1, "b": {"d": 1}, "e": 2}));
    }

    #[test]
    fn escaped_pointer_tokens() {
        let mut target = json!({"a/b": 1, "m~n": 2});
        doc(json!([
            {"op": "replace", "path": "/a~1b", "value": 10},
            {"op": "remove", "path": "/m~0n"},
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target, json!({"a/b": 10}));
    }

    #[test]
    fn failing_operation_leaves_target_untouched() {
        let mut target = json!({"name": "a"});
        let err = doc(json!([
            {"op": "replace", "path": "/name", "value": "b"},
            {"op": "remove", "path": "/missing"},
        ]))
        .apply(&mut target)
        .unwrap_err();
        assert_eq!(err, PatchError::PathNotFound("/missing".to_string()));
        assert_eq!(target, json!({"name": "a"}));
    }

    #[test]
    fn pointer_without_leading_slash_is_rejected() {
        let mut target = json!({"name": "a"});
        let err = doc(json!([{"op": "replace", "path": "name", "value": "b"}]))
            .apply(&mut target)
            .unwrap_err();
        assert_matches!(err, PatchError::InvalidPointer(_));
    }

    #[test]
    fn test_operation_compares_numbers_by_value() {
        let mut target = json!({"age": 26, "scores": [1, {"x": 2}]});
        doc(json!([
            {"op": "test", "path": "/age", "value": 26.0},
            {"op": "test", "path": "/scores", "value": [1.0, {"x": 2}]},
        ]))
        .apply(&mut target)
        .unwrap();

        let err = doc(json!([{"op": "test", "path": "/age", "value": 26.5}]))
            .apply(&mut target)
            .unwrap_err();
        assert_matches!(err, PatchError::TestFailed(_));
    }

    #[test]
    fn test_operation_does_not_coerce_types() {
        let mut target = json!({"age": 26});
        let err = doc(json!([{"op": "test", "path": "/age", "value": "26"}]))
            .apply(&mut target)
            .unwrap_err();
        assert_matches!(err, PatchError::TestFailed(_));
    }

    #[test]
    fn failed_test_operation_rejects() {
        let mut target = json!({"age": 30});
        let err = doc(json!([{"op": "test", "path": "/age", "value": 31}]))
            .apply(&mut target)
            .unwrap_err();
        assert_matches!(err, PatchError::TestFailed(_));
    }

    #[test]
    fn move_into_own_child_is_rejected() {
        let mut target = json!({"a": {"b": 1}});
        let err = doc(json!([{"op": "move", "from": "/a", "path": "/a/b/c"}]))
            .apply(&mut target)
            .unwrap_err();
        assert_matches!(err, PatchError::MoveIntoChild { .. });
    }

    #[test]
    fn unknown_operation_is_malformed() {
        let err = PatchDocument::from_value(json!([{"op": "frobnicate", "path": "/a"}]))
            .unwrap_err();
        assert_matches!(err, PatchError::Malformed(_));
    }

    #[test]
    fn array_index_rules() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index(""), None);
    }

    // -- merge pipeline -------------------------------------------------------

    #[test]
    fn valid_patch_is_accepted_onto_entity() {
        let mut entity = worker();
        merge_patch(
            &mut entity,
            &doc(json!([{"op": "replace", "path": "/age", "value": 41}])),
        )
        .unwrap();
        assert_eq!(entity.age, 41);
        assert_eq!(entity.name, "Jana McLeaf");
        assert_eq!(entity.id, 1);
    }

    #[test]
    fn malformed_path_rejects_without_mutation() {
        let mut entity = worker();
        let before = entity.clone();
        let err = merge_patch(
            &mut entity,
            &doc(json!([
                {"op": "replace", "path": "/name", "value": "Changed"},
                {"op": "replace", "path": "/salary", "value": 1},
            ])),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Patch(PatchError::PathNotFound(_)));
        assert_eq!(entity, before);
    }

    #[test]
    fn adding_unknown_member_rejects_on_shape() {
        let mut entity = worker();
        let before = entity.clone();
        let err = merge_patch(
            &mut entity,
            &doc(json!([{"op": "add", "path": "/salary", "value": 1}])),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Patch(PatchError::ShapeMismatch(_)));
        assert_eq!(entity, before);
    }

    #[test]
    fn removing_required_member_rejects_on_shape() {
        let mut entity = worker();
        let err = merge_patch(&mut entity, &doc(json!([{"op": "remove", "path": "/name"}])))
            .unwrap_err();
        assert_matches!(err, CoreError::Patch(PatchError::ShapeMismatch(_)));
    }

    #[test]
    fn validation_failure_rejects_without_mutation() {
        let mut entity = worker();
        let before = entity.clone();
        let err = merge_patch(
            &mut entity,
            &doc(json!([
                {"op": "replace", "path": "/name", "value": ""},
                {"op": "replace", "path": "/age", "value": 7},
            ])),
        )
        .unwrap_err();
        match err {
            CoreError::InvalidFields(errors) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("name"));
                assert!(fields.contains_key("age"));
            }
            other => panic!("expected InvalidFields, got {other:?}"),
        }
        assert_eq!(entity, before);
    }

    #[test]
    fn stages_expose_candidate() {
        let applied = Received::new(worker().to_transfer())
            .apply(&doc(json!([{"op": "replace", "path": "/position", "value": "Lead"}])))
            .unwrap();
        assert_eq!(applied.candidate().position, "Lead");
        let validated = applied.validate().unwrap();
        assert_eq!(validated.candidate().position, "Lead");
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut entity = worker();
        merge_patch(&mut entity, &PatchDocument::default()).unwrap();
        assert_eq!(entity, worker());
    }
}
