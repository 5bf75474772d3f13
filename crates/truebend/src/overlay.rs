//! Drawing data for a bend preview.
//!
//! The engine draws nothing itself. [`Overlay::build`] turns the bend
//! state into world-space polylines, point markers and labels that a host
//! renders however it likes.

use truebend_geom::Segment;
use truebend_math::Point3;
use truebend_slicer::cut_quads;

use crate::bender::{curve_length, Bender};
use crate::settings::BendSettings;

/// Line pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Continuous line.
    Solid,
    /// Dots.
    Dotted,
    /// Short dashes.
    ShortDash,
    /// Long dashes.
    LongDash,
}

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Filled square.
    Square,
    /// Cross.
    Cross,
}

/// A connected line strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Vertices in world space.
    pub points: Vec<Point3>,
    /// Line pattern.
    pub style: LineStyle,
    /// Width in pixels.
    pub width: f64,
    /// Color name.
    pub color: &'static str,
}

/// Point markers sharing a look.
#[derive(Debug, Clone, PartialEq)]
pub struct Markers {
    /// Marker positions in world space.
    pub points: Vec<Point3>,
    /// Shape.
    pub kind: MarkerKind,
    /// Size in pixels.
    pub size: f64,
    /// Color name.
    pub color: &'static str,
}

/// Text anchored at a world position.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Anchor in world space.
    pub position: Point3,
    /// Text.
    pub text: String,
    /// Color name.
    pub color: &'static str,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Line strips.
    pub polylines: Vec<Polyline>,
    /// Point markers.
    pub markers: Vec<Markers>,
    /// Text labels.
    pub labels: Vec<Label>,
    /// Tooltip, while bending.
    pub tooltip: Option<String>,
}

impl Overlay {
    /// Build the overlay for the bender's current state.
    pub fn build(bender: &Bender, settings: &BendSettings) -> Self {
        let mut overlay = Self::default();
        let reference = bender.reference();

        let flat = reference.subdivide(bender.subdivisions());
        overlay.line(flat.clone(), LineStyle::Solid, 3.0, "green");
        overlay.mark(flat, MarkerKind::Square, 6.0, "green");

        let polar = bender.bend_points();
        overlay.line(polar.clone(), LineStyle::Solid, 3.0, "red");
        overlay.mark(polar.clone(), MarkerKind::Square, 6.0, "red");

        let grid_style = if bender.is_bending() {
            (LineStyle::LongDash, "red")
        } else {
            (LineStyle::Solid, "green")
        };
        overlay.segments(&bender.preview_grid(), grid_style.0, 1.0, grid_style.1);

        if settings.debug.draw_boundingbox {
            if let Some(bounds) = bender.bounding_box() {
                overlay.segments(&bounds.segments(), LineStyle::Solid, 1.0, "orange");
            }
        }
        if settings.debug.draw_slice_planes {
            overlay.slice_planes(bender);
        }

        if !bender.is_bending() {
            return overlay;
        }
        let (Some(first), Some(last)) = (polar.first().copied(), polar.last().copied()) else {
            return overlay;
        };
        let origin = bender.origin();
        let mid = reference.midpoint();
        let degrees = bender.angle().to_degrees();
        let radius = bender.radius().unwrap_or_default();
        let sagitta = bender.sagitta().unwrap_or_default();

        // Pie sides and radius.
        overlay.line(vec![origin, first], LineStyle::LongDash, 2.0, "purple");
        overlay.line(vec![origin, last], LineStyle::LongDash, 1.0, "purple");
        overlay.line(vec![mid, origin], LineStyle::ShortDash, 1.0, "purple");
        overlay.mark(vec![mid, origin], MarkerKind::Cross, 6.0, "purple");

        // Sagitta over the chord.
        overlay.line(vec![first, last], LineStyle::Dotted, 1.0, "purple");
        if let Some(toward) = (origin - mid).try_normalize(f64::EPSILON) {
            overlay.mark(vec![mid + toward * sagitta], MarkerKind::Cross, 6.0, "purple");
        }

        let mut angle_text = format!("{degrees:.1}°");
        if settings.debug.draw_debug_info {
            angle_text.push_str(&format!(" ({:.4} rad)", bender.angle()));
            let arc = bender.arc_length().unwrap_or_default();
            overlay.label(first, format!("{:.2} ({arc:.2})", curve_length(&polar)), "red");
            overlay.label(reference.end, format!("{:.2}", reference.length()), "green");
        }
        overlay.label(origin, angle_text, "purple");

        overlay.tooltip = Some(format!(
            "Angle: {degrees:.1}°\nRadius: {radius:.2}\nBend: {:.2}",
            bender.distance()
        ));
        overlay
    }

    /// Add the bent mesh preview, plus the flat sliced mesh when the debug
    /// toggles ask for it. `sliced` is the world-space sliced mesh.
    pub fn add_mesh(
        &mut self,
        bender: &Bender,
        settings: &BendSettings,
        sliced: &[Segment],
        bent: &[Segment],
    ) {
        if bender.is_bending() {
            self.segments(bent, LineStyle::Solid, 2.0, "maroon");
        }
        if settings.debug.draw_global_mesh {
            self.segments(sliced, LineStyle::Solid, 1.0, "orange");
        }
        if settings.debug.draw_local_mesh {
            let to_segment = bender.to_segment_space();
            let local: Vec<Segment> = sliced.iter().map(|s| s.transform(to_segment)).collect();
            self.segments(&local, LineStyle::Solid, 1.0, "cyan");
        }
    }

    fn slice_planes(&mut self, bender: &Bender) {
        let Ok(planes) = bender.slicing_planes() else {
            return;
        };
        let size = bender
            .bounding_box()
            .map(|b| b.diagonal())
            .unwrap_or_else(|| bender.reference().length());
        let Ok(quads) = cut_quads(&planes, size) else {
            return;
        };
        for quad in quads {
            let mut points = quad.corners.to_vec();
            points.push(quad.corners[0]);
            self.line(points, LineStyle::Dotted, 1.0, "blue");
        }
    }

    fn line(&mut self, points: Vec<Point3>, style: LineStyle, width: f64, color: &'static str) {
        self.polylines.push(Polyline {
            points,
            style,
            width,
            color,
        });
    }

    fn segments(&mut self, segments: &[Segment], style: LineStyle, width: f64, color: &'static str) {
        for segment in segments {
            self.line(segment.points().to_vec(), style, width, color);
        }
    }

    fn mark(&mut self, points: Vec<Point3>, kind: MarkerKind, size: f64, color: &'static str) {
        self.markers.push(Markers {
            points,
            kind,
            size,
            color,
        });
    }

    fn label(&mut self, position: Point3, text: String, color: &'static str) {
        self.labels.push(Label {
            position,
            text,
            color,
        });
    }
}
