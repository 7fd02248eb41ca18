//! Data shaping: projecting typed records onto a client-chosen subset of
//! their fields.
//!
//! Each shapeable type exposes a static accessor table (built once per type
//! by the [`shapeable!`](crate::shapeable) macro) mapping field names to
//! getter functions. A [`DataShaper`] resolves a [`FieldSelection`] against
//! that table once and then projects any number of records with it.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::field_selection::FieldSelection;

/// A named getter for one field of `T`.
pub struct FieldAccessor<T> {
    pub name: &'static str,
    pub read: fn(&T) -> Value,
}

/// A record type that can be projected field by field.
pub trait Shapeable: Sized + 'static {
    /// All shapeable fields in canonical declaration order.
    ///
    /// Must return the same static table on every call.
    fn field_table() -> &'static [FieldAccessor<Self>];
}

/// Convert a field value into JSON without any coercion beyond serde's own.
///
/// The field types used by shapeable records (strings, integers, UUIDs,
/// timestamps) always serialize; anything that does not becomes `null`.
pub fn field_value<V: Serialize + ?Sized>(value: &V) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Implement [`Shapeable`] for a struct by listing its fields in order.
///
/// ```
/// use roster_core::shapeable;
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// shapeable!(Point { x, y });
/// ```
#[macro_export]
macro_rules! shapeable {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::shaping::Shapeable for $ty {
            fn field_table() -> &'static [$crate::shaping::FieldAccessor<Self>] {
                static FIELDS: &[$crate::shaping::FieldAccessor<$ty>] = &[
                    $(
                        $crate::shaping::FieldAccessor {
                            name: stringify!($field),
                            read: |record: &$ty| $crate::shaping::field_value(&record.$field),
                        },
                    )+
                ];
                FIELDS
            }
        }
    };
}

/// A loosely-typed projection of a record: field name -> value, in the
/// record type's declared field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShapedRecord(IndexMap<&'static str, Value>);

impl ShapedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A field selection resolved against the accessor table of `T`.
pub struct DataShaper<T: 'static> {
    fields: Vec<&'static FieldAccessor<T>>,
}

impl<T: Shapeable> DataShaper<T> {
    /// Resolve the requested fields against `T`'s declared fields.
    ///
    /// Unknown names are dropped. When nothing valid remains (including the
    /// empty selection) every declared field is used.
    pub fn resolve(selection: &FieldSelection) -> Self {
        let table = T::field_table();
        let mut fields: Vec<_> = table
            .iter()
            .filter(|accessor| selection.contains(accessor.name))
            .collect();
        if fields.is_empty() {
            fields = table.iter().collect();
        }
        Self { fields }
    }

    /// Resolved field names in output order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|accessor| accessor.name)
    }

    pub fn shape_record(&self, record: &T) -> ShapedRecord {
        ShapedRecord(
            self.fields
                .iter()
                .map(|accessor| (accessor.name, (accessor.read)(record)))
                .collect(),
        )
    }
}

/// Shape a sequence of records, resolving the selection once for the batch.
pub fn shape<'a, T, I>(records: I, selection: &FieldSelection) -> Vec<ShapedRecord>
where
    T: Shapeable,
    I: IntoIterator<Item = &'a T>,
{
    let shaper = DataShaper::<T>::resolve(selection);
    records
        .into_iter()
        .map(|record| shaper.shape_record(record))
        .collect()
}

/// Shape a single record. Equivalent to [`shape`] on a one-element slice.
pub fn shape_one<T: Shapeable>(record: &T, selection: &FieldSelection) -> ShapedRecord {
    DataShaper::<T>::resolve(selection).shape_record(record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
