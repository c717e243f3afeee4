// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Total field accessors over raw JSON objects.
//!
//! Each accessor returns `None` for a missing key, a `null`, a value of the
//! wrong type, or a number outside the target range. Callers pick the default.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Returns the value at `key`, treating `null` as missing.
pub(crate) fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn u64_at(obj: &Value, key: &str) -> Option<u64> {
    field(obj, key).and_then(Value::as_u64)
}

pub(crate) fn i64_at(obj: &Value, key: &str) -> Option<i64> {
    field(obj, key).and_then(Value::as_i64)
}

pub(crate) fn u32_at(obj: &Value, key: &str) -> Option<u32> {
    u64_at(obj, key).and_then(|v| u32::try_from(v).ok())
}

pub(crate) fn u8_at(obj: &Value, key: &str) -> Option<u8> {
    u64_at(obj, key).and_then(|v| u8::try_from(v).ok())
}

pub(crate) fn i32_at(obj: &Value, key: &str) -> Option<i32> {
    i64_at(obj, key).and_then(|v| i32::try_from(v).ok())
}

/// Booleans are sometimes sent as `0`/`1`.
pub(crate) fn bool_at(obj: &Value, key: &str) -> Option<bool> {
    match field(obj, key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

pub(crate) fn str_at<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    field(obj, key).and_then(Value::as_str)
}

/// Parses a numeric-string object key such as `"12"`.
pub(crate) fn id_key(key: &str) -> Option<u32> {
    key.trim().parse().ok()
}

/// Deserializes a record one key at a time.
///
/// Keys that are `null`, or that fail to deserialize on their own, are
/// dropped so the field keeps its default. A non-object yields `T::default()`.
pub(crate) fn lenient<T: DeserializeOwned + Default>(value: &Value) -> T {
    let Some(map) = value.as_object() else {
        return T::default();
    };

    let fields: Map<String, Value> = map
        .iter()
        .filter(|(key, field)| {
            let single = Map::from_iter([((*key).clone(), (*field).clone())]);
            !field.is_null() && T::deserialize(&Value::Object(single)).is_ok()
        })
        .map(|(key, field)| (key.clone(), field.clone()))
        .collect();

    T::deserialize(&Value::Object(fields)).unwrap_or_default()
}
