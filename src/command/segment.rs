// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment command.

use crate::command::request::{SegmentRequest, StateRequest};
use crate::command::{Command, Selector};
use crate::error::ValueError;
use crate::model::Device;
use crate::types::Color;

/// Changes one segment.
///
/// Effects and palettes may be given by id or by name (case-insensitive).
/// Colors are positional on the device, so setting only the secondary or
/// tertiary color re-sends the earlier slots from the current state.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wled_lib::command::{Command, SegmentCommand};
/// use wled_lib::model::Device;
/// use wled_lib::types::Color;
///
/// let device = Device::new(&json!({
///     "effects": ["Solid", "Rainbow"],
///     "palettes": ["Default"],
///     "info": {},
///     "state": {"seg": [{"col": [[1, 2, 3]]}]}
/// }))
/// .unwrap();
///
/// let cmd = SegmentCommand::new(0)
///     .effect("rainbow")
///     .secondary_color(Color::rgb(0, 0, 255));
/// let body = serde_json::to_value(cmd.to_request(&device).unwrap()).unwrap();
/// assert_eq!(body, json!({"seg": [{"id": 0, "fx": 1, "col": [[1, 2, 3], [0, 0, 255]]}]}));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentCommand {
    segment_id: u32,
    on: Option<bool>,
    brightness: Option<u8>,
    primary: Option<Color>,
    secondary: Option<Color>,
    tertiary: Option<Color>,
    effect: Option<Selector>,
    palette: Option<Selector>,
    intensity: Option<u8>,
    speed: Option<u8>,
    reverse: Option<bool>,
    selected: Option<bool>,
    clones: Option<i32>,
    start: Option<u32>,
    stop: Option<u32>,
    length: Option<u32>,
    transition: Option<u32>,
}

impl SegmentCommand {
    /// Creates a command for `segment_id` that changes nothing.
    #[must_use]
    pub fn new(segment_id: u32) -> Self {
        Self {
            segment_id,
            ..Self::default()
        }
    }

    /// Returns the target segment id.
    #[must_use]
    pub fn segment_id(&self) -> u32 {
        self.segment_id
    }

    /// Sets power.
    #[must_use]
    pub fn on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets brightness.
    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets the primary color.
    #[must_use]
    pub fn primary_color(mut self, color: Color) -> Self {
        self.primary = Some(color);
        self
    }

    /// Sets the secondary color.
    #[must_use]
    pub fn secondary_color(mut self, color: Color) -> Self {
        self.secondary = Some(color);
        self
    }

    /// Sets the tertiary color.
    #[must_use]
    pub fn tertiary_color(mut self, color: Color) -> Self {
        self.tertiary = Some(color);
        self
    }

    /// Sets the effect by id or name.
    #[must_use]
    pub fn effect(mut self, effect: impl Into<Selector>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Sets the palette by id or name.
    #[must_use]
    pub fn palette(mut self, palette: impl Into<Selector>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    /// Sets the effect intensity.
    #[must_use]
    pub fn intensity(mut self, intensity: u8) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Sets the effect speed.
    #[must_use]
    pub fn speed(mut self, speed: u8) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Reverses the effect direction.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    /// Sets the selection flag.
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Mirrors another segment, -1 to stop.
    #[must_use]
    pub fn clones(mut self, segment_id: i32) -> Self {
        self.clones = Some(segment_id);
        self
    }

    /// Sets the first LED.
    #[must_use]
    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the LED after the last one.
    #[must_use]
    pub fn stop(mut self, stop: u32) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Sets the length in LEDs.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets the transition for this change in units of 100 ms.
    #[must_use]
    pub fn transition(mut self, transition: u32) -> Self {
        self.transition = Some(transition);
        self
    }

    fn colors(&self, device: &Device) -> Option<Vec<Color>> {
        let current = device
            .segment(self.segment_id)
            .map(|segment| segment.colors)
            .unwrap_or_default();

        let mut colors = Vec::with_capacity(3);
        if let Some(primary) = self.primary {
            colors.push(primary);
        } else if self.secondary.is_some() || self.tertiary.is_some() {
            colors.push(current.primary);
        }
        if let Some(secondary) = self.secondary {
            colors.push(secondary);
        } else if self.tertiary.is_some() {
            colors.push(current.secondary);
        }
        if let Some(tertiary) = self.tertiary {
            colors.push(tertiary);
        }

        (!colors.is_empty()).then_some(colors)
    }
}

impl Command for SegmentCommand {
    fn to_request(&self, device: &Device) -> Result<StateRequest, ValueError> {
        let fx = self
            .effect
            .as_ref()
            .map(|effect| {
                effect.resolve("effect", |name| {
                    device.effect_by_name(name).map(|e| e.effect_id)
                })
            })
            .transpose()?;
        let pal = self
            .palette
            .as_ref()
            .map(|palette| {
                palette.resolve("palette", |name| {
                    device.palette_by_name(name).map(|p| p.palette_id)
                })
            })
            .transpose()?;

        let segment = SegmentRequest {
            id: self.segment_id,
            on: self.on,
            bri: self.brightness,
            col: self.colors(device),
            fx,
            pal,
            ix: self.intensity,
            sx: self.speed,
            rev: self.reverse,
            sel: self.selected,
            cln: self.clones,
            start: self.start,
            stop: self.stop,
            len: self.length,
        };

        Ok(StateRequest {
            tt: self.transition,
            seg: Some(vec![segment]),
            ..StateRequest::default()
        })
    }
}
