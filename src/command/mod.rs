// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WLED state commands.
//!
//! Commands are builders that produce a [`StateRequest`], the JSON body posted
//! to `/json/state`. Building a request may consult the current [`Device`]
//! to resolve names or to fill values the device expects positionally.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Keys |
//! |-------------|---------|------|
//! | [`MasterCommand`] | Master power and brightness | `on`, `bri`, `tt` |
//! | [`SegmentCommand`] | One segment | `seg` |
//! | [`TransitionCommand`] | Default transition | `transition` |
//! | [`PresetCommand`] | Load a preset | `ps` |
//! | [`PlaylistCommand`] | Start a playlist | `ps` |
//! | [`LiveCommand`] | Live data override | `lor` |
//! | [`NightlightCommand`] | Nightlight timer | `nl` |
//! | [`SyncCommand`] | UDP sync | `udpn` |
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use wled_lib::command::{Command, MasterCommand};
//! use wled_lib::model::Device;
//!
//! let device = Device::new(&json!({
//!     "effects": [], "palettes": [], "info": {}, "state": {}
//! }))
//! .unwrap();
//!
//! let request = MasterCommand::new().on(true).brightness(200).to_request(&device).unwrap();
//! assert_eq!(serde_json::to_value(request).unwrap(), json!({"on": true, "bri": 200}));
//! ```

mod request;
mod segment;
mod state;

pub use request::{NightlightRequest, SegmentRequest, StateRequest, SyncRequest};
pub use segment::SegmentCommand;
pub use state::{
    LiveCommand, MasterCommand, NightlightCommand, PlaylistCommand, PresetCommand, SyncCommand,
    TransitionCommand,
};

use crate::error::ValueError;
use crate::model::Device;

/// A state change that can be sent to a WLED device.
pub trait Command {
    /// Builds the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownName`] if a name does not match anything
    /// on `device`.
    fn to_request(&self, device: &Device) -> Result<StateRequest, ValueError>;
}

/// Selects an effect, palette, preset or playlist by id or by name.
///
/// Ids are sent as given. Names are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Numeric id.
    Id(u32),
    /// Display name.
    Name(String),
}

impl Selector {
    /// Returns the id, looking names up with `find`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownName`] if `find` finds nothing.
    pub fn resolve(
        &self,
        kind: &'static str,
        find: impl FnOnce(&str) -> Option<u32>,
    ) -> Result<u32, ValueError> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => find(name).ok_or_else(|| ValueError::UnknownName {
                kind,
                name: name.clone(),
            }),
        }
    }
}

impl From<u32> for Selector {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_resolution() {
        assert_eq!(Selector::Id(3).resolve("effect", |_| None), Ok(3));
        assert_eq!(
            Selector::from("Solid").resolve("effect", |n| (n == "Solid").then_some(0)),
            Ok(0)
        );
        assert!(Selector::from("x".to_string())
            .resolve("palette", |_| None)
            .is_err());
    }
}
