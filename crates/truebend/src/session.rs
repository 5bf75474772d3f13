//! Interactive bend session: drag handling, typed values, toggles and the
//! texts a host shows in its status bar and value box.

use tracing::debug;
use truebend_math::Vec3;
use truebend_scene::Host;

use crate::bender::{BendState, Bender, CommitReport};
use crate::error::{BendError, Result};
use crate::input::{parse_input, InputValue};
use crate::settings::BendSettings;

/// One bend session for one object.
#[derive(Debug, Clone)]
pub struct BendSession {
    bender: Bender,
    settings: BendSettings,
    cached_direction: Option<Vec3>,
    bend_by_distance: bool,
}

impl BendSession {
    /// Start a session. The bender picks up the settings' toggles.
    pub fn new(mut bender: Bender, settings: BendSettings) -> Result<Self> {
        settings.validate()?;
        bender.set_segmented(settings.segmented)?;
        bender.set_soften_seams(settings.soften_seams)?;
        Ok(Self {
            bender,
            settings,
            cached_direction: None,
            bend_by_distance: false,
        })
    }

    /// The bender.
    pub fn bender(&self) -> &Bender {
        &self.bender
    }

    /// Settings, including toggles changed during the session.
    pub fn settings(&self) -> &BendSettings {
        &self.settings
    }

    /// A drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.cached_direction.is_some()
    }

    /// Typed values are read as distances rather than angles.
    pub fn bend_by_distance(&self) -> bool {
        self.bend_by_distance
    }

    /// Drag the handle by `delta` from where the drag started.
    pub fn drag(&mut self, delta: Vec3) -> Result<()> {
        let start = *self
            .cached_direction
            .get_or_insert_with(|| self.bender.direction());
        self.bender.bend(start + delta)
    }

    /// End the current drag.
    pub fn drag_complete(&mut self) {
        self.cached_direction = None;
    }

    /// Apply typed text.
    ///
    /// `"<n>s"` sets the subdivisions (at least 2). A value with a unit
    /// switches to distance mode, degrees switch to angle mode, and a bare
    /// number is read in the current mode. Values other than segments need
    /// an existing bend to adjust.
    pub fn user_text(&mut self, text: &str) -> Result<()> {
        let value = parse_input(text)?;
        let amount = match value {
            InputValue::Segments(count) => {
                if count < 2 {
                    return Err(BendError::Validation(format!(
                        "segments must be at least 2, got {count}"
                    )));
                }
                let count = usize::try_from(count)
                    .map_err(|_| BendError::Validation(format!("too many segments: {count}")))?;
                return self.bender.set_subdivisions(count);
            }
            InputValue::Length(length) => {
                self.bend_by_distance = true;
                length
            }
            InputValue::Angle(angle) => {
                self.bend_by_distance = false;
                angle
            }
            InputValue::Number(number) if self.bend_by_distance => number,
            InputValue::Number(degrees) => degrees.to_radians(),
        };
        if !self.bender.can_bend() {
            return Err(BendError::Validation("drag to start a bend first".into()));
        }
        debug!(text, by_distance = self.bend_by_distance, "typed value");
        if self.bend_by_distance {
            self.bender.set_distance(amount)
        } else {
            self.bender.set_angle(amount)
        }
    }

    /// Flip faceted mode and remember it.
    pub fn toggle_segmented(&mut self) -> Result<()> {
        let value = !self.bender.segmented();
        self.bender.set_segmented(value)?;
        self.settings.segmented = value;
        Ok(())
    }

    /// Flip seam softening and remember it.
    pub fn toggle_soften_seams(&mut self) -> Result<()> {
        let value = !self.bender.soften_seams();
        self.bender.set_soften_seams(value)?;
        self.settings.soften_seams = value;
        Ok(())
    }

    /// Whether the soften toggle applies (only faceted bends have hard seams).
    pub fn soften_seams_enabled(&self) -> bool {
        self.bender.segmented()
    }

    /// Drop the bend.
    pub fn cancel(&mut self) -> Result<()> {
        self.cached_direction = None;
        self.bender.reset()
    }

    /// Apply the bend. `None` when there is nothing to bend.
    pub fn commit<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<Option<CommitReport>> {
        if !self.bender.can_bend() || self.bender.state() == BendState::Committed {
            return Ok(None);
        }
        self.cached_direction = None;
        self.bender.commit(host).map(Some)
    }

    /// Status bar hint.
    pub fn status_text(&self) -> &'static str {
        if self.is_dragging() {
            "Drag to adjust the amount of bend."
        } else {
            "Pick a handle to start bending the instance."
        }
    }

    /// Caption of the value box.
    pub fn value_label(&self) -> &'static str {
        if self.bend_by_distance {
            "Distance"
        } else {
            "Angle"
        }
    }

    /// Current value for the value box.
    pub fn value_text(&self) -> String {
        if self.bend_by_distance {
            format!("{:.2}mm", self.bender.distance())
        } else {
            format!("{:.1}°", self.bender.angle().to_degrees())
        }
    }
}
