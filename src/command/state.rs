// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Master, timing, preset and sync commands.

use crate::command::request::{NightlightRequest, StateRequest, SyncRequest};
use crate::command::{Command, Selector};
use crate::error::ValueError;
use crate::model::Device;
use crate::types::{LiveDataOverride, NightlightMode, SyncGroup};

/// Changes master power, brightness and the transition used for this change.
///
/// # Examples
///
/// ```
/// use wled_lib::command::MasterCommand;
///
/// let cmd = MasterCommand::new().on(true).brightness(200).transition(5);
/// assert_eq!(cmd.request().bri, Some(200));
/// assert_eq!(cmd.request().tt, Some(5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasterCommand {
    on: Option<bool>,
    brightness: Option<u8>,
    transition: Option<u32>,
}

impl MasterCommand {
    /// Creates a command that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets master power.
    #[must_use]
    pub fn on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets master brightness.
    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets the transition for this change in units of 100 ms.
    #[must_use]
    pub fn transition(mut self, transition: u32) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Returns the request body.
    #[must_use]
    pub fn request(&self) -> StateRequest {
        StateRequest {
            on: self.on,
            bri: self.brightness,
            tt: self.transition,
            ..StateRequest::default()
        }
    }
}

impl Command for MasterCommand {
    fn to_request(&self, _device: &Device) -> Result<StateRequest, ValueError> {
        Ok(self.request())
    }
}

/// Sets the default transition time (100 ms units).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCommand(pub u32);

impl Command for TransitionCommand {
    fn to_request(&self, _device: &Device) -> Result<StateRequest, ValueError> {
        Ok(StateRequest {
            transition: Some(self.0),
            ..StateRequest::default()
        })
    }
}

/// Sets the live data override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveCommand(pub LiveDataOverride);

impl Command for LiveCommand {
    fn to_request(&self, _device: &Device) -> Result<StateRequest, ValueError> {
        Ok(StateRequest {
            lor: Some(self.0),
            ..StateRequest::default()
        })
    }
}

/// Loads a stored preset by id or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCommand(pub Selector);

impl Command for PresetCommand {
    fn to_request(&self, device: &Device) -> Result<StateRequest, ValueError> {
        let id = self
            .0
            .resolve("preset", |name| device.preset_by_name(name).map(|p| p.preset_id))?;
        Ok(StateRequest {
            ps: Some(id),
            ..StateRequest::default()
        })
    }
}

/// Starts a stored playlist by id or name.
///
/// Playlists share the preset id space and are started the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCommand(pub Selector);

impl Command for PlaylistCommand {
    fn to_request(&self, device: &Device) -> Result<StateRequest, ValueError> {
        let id = self.0.resolve("playlist", |name| {
            device.playlist_by_name(name).map(|p| p.playlist_id)
        })?;
        Ok(StateRequest {
            ps: Some(id),
            ..StateRequest::default()
        })
    }
}

/// Controls the nightlight timer.
///
/// # Examples
///
/// ```
/// use wled_lib::command::NightlightCommand;
/// use wled_lib::types::NightlightMode;
///
/// let cmd = NightlightCommand::new()
///     .on(true)
///     .duration(30)
///     .mode(NightlightMode::Sunrise)
///     .target_brightness(0);
/// let nl = cmd.request().nl.unwrap();
/// assert_eq!(nl.dur, Some(30));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NightlightCommand {
    inner: NightlightRequest,
}

impl NightlightCommand {
    /// Creates a command that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts or stops the timer.
    #[must_use]
    pub fn on(mut self, on: bool) -> Self {
        self.inner.on = Some(on);
        self
    }

    /// Sets the duration in minutes.
    #[must_use]
    pub fn duration(mut self, minutes: u8) -> Self {
        self.inner.dur = Some(minutes);
        self
    }

    /// Sets the dimming mode.
    #[must_use]
    pub fn mode(mut self, mode: NightlightMode) -> Self {
        self.inner.mode = Some(mode);
        self
    }

    /// Sets the brightness reached at the end of the timer.
    #[must_use]
    pub fn target_brightness(mut self, brightness: u8) -> Self {
        self.inner.tbri = Some(brightness);
        self
    }

    /// Returns the request body.
    #[must_use]
    pub fn request(&self) -> StateRequest {
        StateRequest {
            nl: Some(self.inner),
            ..StateRequest::default()
        }
    }
}

impl Command for NightlightCommand {
    fn to_request(&self, _device: &Device) -> Result<StateRequest, ValueError> {
        Ok(self.request())
    }
}

/// Controls UDP broadcast sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCommand {
    inner: SyncRequest,
}

impl SyncCommand {
    /// Creates a command that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables broadcasting.
    #[must_use]
    pub fn send(mut self, send: bool) -> Self {
        self.inner.send = Some(send);
        self
    }

    /// Enables or disables receiving.
    #[must_use]
    pub fn receive(mut self, receive: bool) -> Self {
        self.inner.recv = Some(receive);
        self
    }

    /// Sets the groups broadcast to.
    #[must_use]
    pub fn send_groups(mut self, groups: SyncGroup) -> Self {
        self.inner.sgrp = Some(groups);
        self
    }

    /// Sets the groups listened to.
    #[must_use]
    pub fn receive_groups(mut self, groups: SyncGroup) -> Self {
        self.inner.rgrp = Some(groups);
        self
    }

    /// Returns the request body.
    #[must_use]
    pub fn request(&self) -> StateRequest {
        StateRequest {
            udpn: Some(self.inner),
            ..StateRequest::default()
        }
    }
}

impl Command for SyncCommand {
    fn to_request(&self, _device: &Device) -> Result<StateRequest, ValueError> {
        Ok(self.request())
    }
}
