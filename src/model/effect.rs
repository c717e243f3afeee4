// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Effects and palettes.
//!
//! The API lists both as plain arrays of names; the position in the array is
//! the id used everywhere else (`seg.fx`, `seg.pal`).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Name used for effects and palettes the device references but never listed.
pub const UNKNOWN_NAME: &str = "Unknown";

/// A light effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Effect {
    /// Position in the device's effect list.
    pub effect_id: u32,
    /// Display name.
    pub name: String,
}

impl Effect {
    /// The placeholder `{0, "Unknown"}` used for unresolvable ids.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            effect_id: 0,
            name: UNKNOWN_NAME.to_string(),
        }
    }
}

/// A color palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Palette {
    /// Position in the device's palette list.
    pub palette_id: u32,
    /// Display name.
    pub name: String,
}

impl Palette {
    /// The placeholder `{0, "Unknown"}` used for unresolvable ids.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            palette_id: 0,
            name: UNKNOWN_NAME.to_string(),
        }
    }
}

/// Indexes an `effects` array. Non-string entries are skipped but still
/// consume their id.
#[must_use]
pub fn index_effects(names: &Value) -> BTreeMap<u32, Effect> {
    indexed_names(names)
        .map(|(effect_id, name)| {
            (
                effect_id,
                Effect {
                    effect_id,
                    name: name.to_string(),
                },
            )
        })
        .collect()
}

/// Indexes a `palettes` array, same rules as [`index_effects`].
#[must_use]
pub fn index_palettes(names: &Value) -> BTreeMap<u32, Palette> {
    indexed_names(names)
        .map(|(palette_id, name)| {
            (
                palette_id,
                Palette {
                    palette_id,
                    name: name.to_string(),
                },
            )
        })
        .collect()
}

fn indexed_names(names: &Value) -> impl Iterator<Item = (u32, &str)> {
    names
        .as_array()
        .into_iter()
        .flatten()
        .enumerate()
        .filter_map(|(index, name)| Some((u32::try_from(index).ok()?, name.as_str()?)))
}

/// Returns the ids of `items` ordered by name, ties kept in id order.
pub(crate) fn ids_sorted_by_name<T>(
    items: &BTreeMap<u32, T>,
    name: impl Fn(&T) -> &str,
) -> Vec<u32> {
    let mut ids: Vec<u32> = items.keys().copied().collect();
    ids.sort_by(|a, b| name(&items[a]).cmp(name(&items[b])));
    ids
}
