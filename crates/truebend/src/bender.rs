//! Bend state, derived metrics, previews and commit.
//!
//! A [`Bender`] is bound to one object and one reference segment. The drag
//! direction sets the bend: its length relative to
//! [`Bender::max_bend_distance`] is the fraction of a full loop, its side
//! relative to the concave normal selects a concave or convex bend.
//!
//! Geometry is expressed in the reference segment's frame: X runs along the
//! segment from its start, Y points away from the concave side and Z
//! completes a right-handed frame. The bend wraps X onto an arc of length
//! `L` and radius `L / angle` whose axis is parallel to Z.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use truebend_geom::bbox::FACE_FRONT;
use truebend_geom::{OrientedBox, Plane, PolarProjection, Segment};
use truebend_math::{Dir3, Point3, Tolerance, Transform, Vec3, TAU};
use truebend_scene::{EdgeFlags, Host, ObjectId, SceneProvider};
use truebend_slicer::{cut_object, object_segments, slice_segments, slicing_planes};

use crate::error::{BendError, Result};
use crate::settings::BendSettings;

/// Lifecycle of a bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BendState {
    /// No bend (angle is zero).
    Idle,
    /// A bend is set up and previewed.
    Bending,
    /// The bend was applied to the mesh; no further edits.
    Committed,
}

/// Snapshot of the bend parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendMetrics {
    /// Current state.
    pub state: BendState,
    /// Bend angle in radians.
    pub angle: f64,
    /// Sagitta of the bend, 0 when idle.
    pub distance: f64,
    /// Radius, when bending.
    pub radius: Option<f64>,
    /// Chord between the bent segment's end points, when bending.
    pub chord: Option<f64>,
    /// Sagitta, when bending.
    pub sagitta: Option<f64>,
    /// Arc length, when bending.
    pub arc_length: Option<f64>,
    /// Subdivisions along the reference segment.
    pub subdivisions: usize,
    /// Faceted rather than smooth.
    pub segmented: bool,
}

/// What a commit changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    /// Objects reshaped, nested ones included.
    pub objects: usize,
    /// Vertices moved.
    pub vertices: usize,
    /// Edges created by cutting.
    pub cut_edges: usize,
    /// Edges marked soft.
    pub softened_edges: usize,
}

/// Bend orchestrator for one object and reference segment.
#[derive(Debug, Clone)]
pub struct Bender {
    object: ObjectId,
    reference: Segment,
    concave_normal: Dir3,
    frame: Transform,
    to_segment: Transform,
    bounds: Option<OrientedBox>,
    direction: Vec3,
    angle: f64,
    subdivisions: usize,
    segmented: bool,
    soften_seams: bool,
    max_depth: usize,
    committed: bool,
}

impl Bender {
    /// Create a bender for `object` around `reference`.
    ///
    /// `concave_normal` picks the concave side; it must not be parallel to
    /// the reference segment.
    pub fn new(
        object: ObjectId,
        reference: Segment,
        concave_normal: Vec3,
        settings: &BendSettings,
    ) -> Result<Self> {
        settings.validate()?;
        if reference.length() <= Tolerance::DEFAULT.linear {
            return Err(BendError::DegenerateGeometry(
                "reference segment has zero length".into(),
            ));
        }
        let normal = Dir3::try_new(concave_normal, f64::EPSILON)
            .ok_or_else(|| BendError::DegenerateGeometry("concave normal has zero length".into()))?;
        let axis = reference.direction().normalize();
        let perpendicular = normal.as_ref() - axis * normal.dot(&axis);
        if perpendicular.norm() <= Tolerance::DEFAULT.linear {
            return Err(BendError::DegenerateGeometry(
                "concave normal is parallel to the reference segment".into(),
            ));
        }
        let frame = reference
            .local_frame_towards(&-normal.into_inner())
            .ok_or_else(|| BendError::DegenerateGeometry("no reference frame".into()))?;
        let to_segment = frame
            .inverse()
            .ok_or_else(|| BendError::DegenerateGeometry("reference frame is singular".into()))?;

        Ok(Self {
            object,
            reference,
            concave_normal: normal,
            frame,
            to_segment,
            bounds: None,
            direction: Vec3::zeros(),
            angle: 0.0,
            subdivisions: settings.subdivisions,
            segmented: settings.segmented,
            soften_seams: settings.soften_seams,
            max_depth: settings.max_depth,
            committed: false,
        })
    }

    /// Create a bender the way the interactive tool picks its reference:
    /// the first bounding box edge (left-front-bottom to right-front-bottom)
    /// and the outward normal of the front face.
    pub fn for_object<S: SceneProvider + ?Sized>(
        scene: &S,
        object: ObjectId,
        settings: &BendSettings,
    ) -> Result<Self> {
        let local = scene.local_bounds(object)?;
        if local.is_empty() {
            return Err(BendError::DegenerateGeometry("object has no geometry".into()));
        }
        let bounds = OrientedBox::new(local, scene.transform(object)?);
        let reference = bounds.segments()[0];
        let normal = bounds
            .polygon(FACE_FRONT)
            .and_then(|face| face.normal())
            .ok_or_else(|| BendError::DegenerateGeometry("bounding box has no front face".into()))?;
        let mut bender = Self::new(object, reference, normal.into_inner(), settings)?;
        bender.bounds = Some(bounds);
        Ok(bender)
    }

    /// The object being bent.
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// The reference segment in world space.
    pub fn reference(&self) -> &Segment {
        &self.reference
    }

    /// Unit normal of the concave side.
    pub fn concave_normal(&self) -> Vec3 {
        self.concave_normal.into_inner()
    }

    /// Current drag direction (zero when idle).
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Bend angle in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Subdivisions along the reference segment.
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    /// Whether the bend is faceted.
    pub fn segmented(&self) -> bool {
        self.segmented
    }

    /// Whether slicing seams are softened.
    pub fn soften_seams(&self) -> bool {
        self.soften_seams
    }

    /// Object bounds, when created from an object.
    pub fn bounding_box(&self) -> Option<&OrientedBox> {
        self.bounds.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BendState {
        if self.committed {
            BendState::Committed
        } else if self.is_bending() {
            BendState::Bending
        } else {
            BendState::Idle
        }
    }

    /// Angle is non-zero.
    pub fn is_bending(&self) -> bool {
        self.angle.abs() > 0.0
    }

    /// A drag direction is set.
    pub fn can_bend(&self) -> bool {
        Tolerance::DEFAULT.is_valid(&self.direction)
    }

    /// The drag points to the concave side.
    pub fn is_concave(&self) -> bool {
        self.direction.dot(self.concave_normal.as_ref()) > 0.0
    }

    /// The drag does not point to the concave side.
    pub fn is_convex(&self) -> bool {
        !self.is_concave()
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.committed {
            return Err(BendError::Validation("bend is already committed".into()));
        }
        Ok(())
    }

    /// Set the subdivision count (at least 1).
    pub fn set_subdivisions(&mut self, value: usize) -> Result<()> {
        self.ensure_editable()?;
        if value == 0 {
            return Err(BendError::Validation("subdivisions must be at least 1".into()));
        }
        self.subdivisions = value;
        Ok(())
    }

    /// Toggle faceted mode.
    pub fn set_segmented(&mut self, value: bool) -> Result<()> {
        self.ensure_editable()?;
        self.segmented = value;
        Ok(())
    }

    /// Toggle seam softening.
    pub fn set_soften_seams(&mut self, value: bool) -> Result<()> {
        self.ensure_editable()?;
        self.soften_seams = value;
        Ok(())
    }

    /// Bend by a drag vector.
    ///
    /// The length is capped at [`Bender::max_bend_distance`] (a full loop).
    /// Calling again with the same vector gives the same state.
    pub fn bend(&mut self, direction: Vec3) -> Result<()> {
        self.ensure_editable()?;
        if !direction.iter().all(|c| c.is_finite()) {
            return Err(BendError::Validation("bend direction is not finite".into()));
        }
        // Drags too short to build a frame from are no bend at all.
        if !Tolerance::DEFAULT.is_valid(&direction) {
            self.direction = Vec3::zeros();
            self.angle = 0.0;
            return Ok(());
        }
        let max = self.max_bend_distance();
        let mut direction = direction;
        let length = direction.norm();
        if length > max {
            direction *= max / length;
        }
        self.direction = direction;
        self.angle = TAU * (direction.norm() / max);
        debug!(angle = self.angle, concave = self.is_concave(), "bend");
        Ok(())
    }

    /// Back to idle.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_editable()?;
        self.direction = Vec3::zeros();
        self.angle = 0.0;
        Ok(())
    }

    /// Drag length of a full loop: the diameter of a circle whose
    /// circumference is the reference length.
    pub fn max_bend_distance(&self) -> f64 {
        2.0 * (self.reference.length() / TAU)
    }

    /// Sagitta of the bend; 0 when idle.
    pub fn distance(&self) -> f64 {
        self.sagitta().unwrap_or(0.0)
    }

    /// Largest sagitta any bend of this reference can have.
    pub fn max_distance(&self) -> f64 {
        sagitta_for(self.reference.length(), peak_sagitta_angle())
    }

    /// Bend so the sagitta equals `value`.
    ///
    /// Keeps the current drag side, or uses the concave side when idle.
    /// 0 resets. Values above [`Bender::max_distance`] are rejected.
    pub fn set_distance(&mut self, value: f64) -> Result<()> {
        self.ensure_editable()?;
        if !value.is_finite() || value < 0.0 {
            return Err(BendError::Validation(format!("bend distance {value} must be positive")));
        }
        if value == 0.0 {
            return self.reset();
        }
        let length = self.reference.length();
        let peak = peak_sagitta_angle();
        let max = sagitta_for(length, peak);
        if value > max * (1.0 + 1e-12) {
            return Err(BendError::Validation(format!(
                "bend distance {value} exceeds the maximum {max}"
            )));
        }
        let angle = solve_sagitta_angle(length, value.min(max), peak);
        self.bend_to_angle(angle)
    }

    /// Bend to `value` radians in `[0, τ]`.
    ///
    /// Keeps the current drag side, or uses the concave side when idle.
    pub fn set_angle(&mut self, value: f64) -> Result<()> {
        self.ensure_editable()?;
        if !value.is_finite() || !(0.0..=TAU).contains(&value) {
            return Err(BendError::Validation(format!(
                "bend angle {value} must be between 0 and a full turn"
            )));
        }
        if value == 0.0 {
            return self.reset();
        }
        self.bend_to_angle(value)
    }

    fn bend_to_angle(&mut self, angle: f64) -> Result<()> {
        let base = self
            .direction
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| self.concave_normal.into_inner());
        self.bend(base * (self.max_bend_distance() * angle / TAU))
    }

    /// `L / angle`, when bending.
    pub fn radius(&self) -> Option<f64> {
        self.is_bending()
            .then(|| self.reference.length() / self.angle)
    }

    /// Twice the radius, when bending.
    pub fn diameter(&self) -> Option<f64> {
        self.radius().map(|r| r * 2.0)
    }

    /// Distance between the bent segment's end points, when bending.
    pub fn chord(&self) -> Option<f64> {
        self.radius().map(|r| 2.0 * r * (0.5 * self.angle).sin())
    }

    /// Height of the arc over its chord, when bending.
    pub fn sagitta(&self) -> Option<f64> {
        self.radius().map(|r| r * (1.0 - (self.angle / 2.0).cos()))
    }

    /// Length of the arc, when bending. Equals the reference length.
    pub fn arc_length(&self) -> Option<f64> {
        self.radius().map(|r| r * self.angle)
    }

    /// Angle of one facet in faceted mode.
    pub fn segment_angle(&self) -> Option<f64> {
        self.segmented
            .then(|| self.angle / self.subdivisions as f64)
    }

    /// Unit vector from the reference midpoint toward the bend centre.
    fn bend_side(&self) -> Vec3 {
        let y = self.frame.apply_vec(&Vec3::y());
        if self.is_concave() {
            -y
        } else {
            y
        }
    }

    /// Centre of the bend arc; the reference midpoint when idle.
    pub fn origin(&self) -> Point3 {
        let mid = self.reference.midpoint();
        match self.radius() {
            Some(r) if self.can_bend() => mid + self.bend_side() * r,
            _ => mid,
        }
    }

    /// The reference segment bent onto the arc: `subdivisions + 1` points
    /// from where its start lands to where its end lands. The flat
    /// subdivision points when idle.
    pub fn bend_points(&self) -> Vec<Point3> {
        let flat = self.reference.subdivide(self.subdivisions);
        if !self.is_bending() || !self.can_bend() {
            return flat;
        }
        let origin = self.origin();
        let mid = self.reference.midpoint();
        let Some(axis) = Dir3::try_new((mid - origin).cross(&self.reference.direction()), 1e-12)
        else {
            return flat;
        };
        let n = self.subdivisions;
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                Transform::rotation(&origin, &axis, (t - 0.5) * self.angle).apply_point(&mid)
            })
            .collect()
    }

    /// Vector from the origin to where the reference start lands, when
    /// bending.
    pub fn polar_x_axis(&self) -> Option<Vec3> {
        if !self.is_bending() {
            return None;
        }
        self.bend_points()
            .first()
            .map(|p| p - self.origin())
            .filter(|v| Tolerance::DEFAULT.is_valid(v))
    }

    /// World to reference segment space.
    pub fn to_segment_space(&self) -> &Transform {
        &self.to_segment
    }

    /// Projection for the current bend, placed in world space.
    pub fn projection(&self) -> Result<PolarProjection> {
        let radius = self
            .radius()
            .ok_or_else(|| BendError::DegenerateGeometry("bend angle is zero".into()))?;
        let x_axis = self
            .polar_x_axis()
            .ok_or_else(|| BendError::DegenerateGeometry("bend arc collapses to a point".into()))?;
        let mut projection = PolarProjection::new(radius)?;
        projection.axes_with_normal(&self.origin(), &x_axis, &self.frame.apply_vec(&Vec3::z()))?;
        Ok(projection)
    }

    /// Cutting planes through the subdivision points.
    pub fn slicing_planes(&self) -> Result<Vec<Plane>> {
        Ok(slicing_planes(&self.reference, self.subdivisions)?)
    }

    /// Map world points onto the bend.
    pub fn bend_world_points(&self, projection: &PolarProjection, points: &[Point3]) -> Vec<Point3> {
        let local: Vec<Point3> = points
            .iter()
            .map(|p| self.to_segment.apply_point(p))
            .collect();
        projection.project(&local, self.is_convex(), self.segment_angle())
    }

    /// Visible edges of the object and its nested objects, in world space,
    /// split at every cutting plane.
    pub fn sliced_mesh<S: SceneProvider + ?Sized>(&self, scene: &S) -> Result<Vec<Segment>> {
        let transform = scene.transform(self.object)?;
        let segments = object_segments(scene, self.object, &transform, self.max_depth)?;
        Ok(slice_segments(&segments, &self.slicing_planes()?))
    }

    /// The sliced mesh mapped onto the bend. Unbent while idle.
    pub fn preview_mesh<S: SceneProvider + ?Sized>(&self, scene: &S) -> Result<Vec<Segment>> {
        let sliced = self.sliced_mesh(scene)?;
        if !self.is_bending() {
            return Ok(sliced);
        }
        let projection = self.projection()?;
        let points: Vec<Point3> = sliced.iter().flat_map(Segment::points).collect();
        let bent = self.bend_world_points(&projection, &points);
        Ok(bent
            .chunks_exact(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect())
    }

    /// Reference grid over the object's footprint, one column per
    /// subdivision, bent without facets. Empty without bounds.
    pub fn preview_grid(&self) -> Vec<Segment> {
        let Some(bounds) = &self.bounds else {
            return Vec::new();
        };
        let mut grid = truebend_geom::Grid::new(bounds.local.width(), bounds.local.height());
        grid.x_subdivs = self.subdivisions;
        let projection = match self.projection() {
            Ok(projection) if self.is_bending() => projection,
            _ => {
                let min = bounds.local.min;
                grid.transform = bounds
                    .transform
                    .then(&Transform::translation(min.x, min.y, min.z));
                return grid.segments();
            }
        };
        grid.segments()
            .iter()
            .map(|segment| {
                let bent = projection.project(&segment.points(), self.is_convex(), None);
                Segment::new(bent[0], bent[1])
            })
            .collect()
    }

    /// Parameter snapshot.
    pub fn metrics(&self) -> BendMetrics {
        BendMetrics {
            state: self.state(),
            angle: self.angle,
            distance: self.distance(),
            radius: self.radius(),
            chord: self.chord(),
            sagitta: self.sagitta(),
            arc_length: self.arc_length(),
            subdivisions: self.subdivisions,
            segmented: self.segmented,
        }
    }

    /// Apply the bend to the object's mesh and everything nested in it.
    ///
    /// Everything that can fail without touching the scene is checked
    /// first: the bend itself, the nesting depth and the object
    /// transforms. Then the object is made unique, and each object is cut
    /// along the slicing planes, its new edges softened (unless faceted
    /// with hard seams) and all its vertices moved in one batch.
    pub fn commit<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<CommitReport> {
        self.ensure_editable()?;
        if !self.can_bend() {
            return Err(BendError::DegenerateGeometry("nothing to bend".into()));
        }
        let projection = self.projection()?;
        let planes = self.slicing_planes()?;
        let transform = host.transform(self.object)?;
        self.check_tree(&*host, self.object, &transform, 0)?;

        let local = host.local_bounds(self.object)?;
        let diagonal = OrientedBox::new(local, transform.clone())
            .diagonal()
            .max(self.reference.length());

        host.make_unique(self.object)?;
        let pass = CommitPass {
            projection: &projection,
            planes: &planes,
            diagonal,
            soften: !(self.segmented && !self.soften_seams),
        };
        let mut report = CommitReport::default();
        self.commit_object(host, &pass, self.object, &transform, &mut report)?;
        self.committed = true;
        info!(
            objects = report.objects,
            vertices = report.vertices,
            cut_edges = report.cut_edges,
            "committed bend"
        );
        Ok(report)
    }

    fn check_tree<S: SceneProvider + ?Sized>(
        &self,
        scene: &S,
        object: ObjectId,
        transform: &Transform,
        depth: usize,
    ) -> Result<()> {
        if depth > self.max_depth {
            warn!(?object, max_depth = self.max_depth, "nesting too deep to bend");
            return Err(BendError::RecursionLimit(self.max_depth));
        }
        if transform.inverse().is_none() {
            return Err(BendError::DegenerateGeometry(format!(
                "object {object:?} has a singular transform"
            )));
        }
        for child in scene.children(object)? {
            let inner = transform.then(&scene.transform(child)?);
            self.check_tree(scene, child, &inner, depth + 1)?;
        }
        Ok(())
    }

    fn commit_object<H: Host + ?Sized>(
        &self,
        host: &mut H,
        pass: &CommitPass<'_>,
        object: ObjectId,
        transform: &Transform,
        report: &mut CommitReport,
    ) -> Result<()> {
        let to_local = transform.inverse().ok_or_else(|| {
            BendError::DegenerateGeometry(format!("object {object:?} has a singular transform"))
        })?;

        let cut = cut_object(host, object, transform, pass.planes, pass.diagonal)?;
        report.cut_edges += cut.len();
        if pass.soften && !cut.is_empty() {
            host.set_edge_flags(object, &cut, EdgeFlags::softened())?;
            report.softened_edges += cut.len();
        }

        let vertices = host.vertices(object)?;
        let world: Vec<Point3> = vertices
            .iter()
            .map(|v| transform.apply_point(&v.position))
            .collect();
        let bent = self.bend_world_points(pass.projection, &world);
        let ids: Vec<_> = vertices.iter().map(|v| v.id).collect();
        let vectors: Vec<Vec3> = vertices
            .iter()
            .zip(&bent)
            .map(|(v, target)| to_local.apply_point(target) - v.position)
            .collect();
        let created = host.displace(object, &ids, &vectors)?;
        if !created.is_empty() {
            host.set_edge_flags(object, &created, EdgeFlags::softened())?;
            report.softened_edges += created.len();
        }
        report.objects += 1;
        report.vertices += ids.len();
        debug!(?object, vertices = ids.len(), cut_edges = cut.len(), "bent object");

        for child in host.children(object)? {
            host.make_unique(child)?;
            let inner = transform.then(&host.transform(child)?);
            self.commit_object(host, pass, child, &inner, report)?;
        }
        Ok(())
    }
}

struct CommitPass<'a> {
    projection: &'a PolarProjection,
    planes: &'a [Plane],
    diagonal: f64,
    soften: bool,
}

/// Total length of a polyline.
pub fn curve_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

fn sagitta_for(length: f64, angle: f64) -> f64 {
    (length / angle) * (1.0 - (angle / 2.0).cos())
}

/// Angle at which the sagitta of a fixed-length arc peaks:
/// the root of `tan(a / 4) = a / 2`.
fn peak_sagitta_angle() -> f64 {
    let (mut lo, mut hi) = (3.0_f64, 6.0_f64);
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if (mid / 4.0).tan() < mid / 2.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Angle in `(0, peak]` whose sagitta is `target`; the sagitta increases
/// monotonically on that range.
fn solve_sagitta_angle(length: f64, target: f64, peak: f64) -> f64 {
    let (mut lo, mut hi) = (0.0_f64, peak);
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid == 0.0 || sagitta_for(length, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use truebend_scene::{MemoryScene, MeshCutter, VertexDisplacer};

    fn settings() -> BendSettings {
        BendSettings::default()
    }

    fn object() -> ObjectId {
        let mut scene = MemoryScene::new();
        let def = scene.add_definition();
        scene.add_instance(None, def, Transform::identity()).unwrap()
    }

    fn bender(length: f64) -> Bender {
        let reference = Segment::new(Point3::origin(), Point3::new(length, 0.0, 0.0));
        Bender::new(object(), reference, -Vec3::y(), &settings()).unwrap()
    }

    fn box_scene(size: Point3) -> (MemoryScene, ObjectId) {
        let mut scene = MemoryScene::new();
        let def = scene.add_definition();
        scene.add_box(def, Point3::origin(), size).unwrap();
        let obj = scene.add_instance(None, def, Transform::identity()).unwrap();
        (scene, obj)
    }

    fn xy_distance(a: &Point3, b: &Point3) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_new_rejects_degenerate_reference() {
        let settings = settings();
        let zero = Segment::new(Point3::origin(), Point3::origin());
        assert!(matches!(
            Bender::new(object(), zero, Vec3::y(), &settings),
            Err(BendError::DegenerateGeometry(_))
        ));
        let reference = Segment::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        assert!(Bender::new(object(), reference, Vec3::x(), &settings).is_err());
        assert!(Bender::new(object(), reference, Vec3::zeros(), &settings).is_err());
    }

    #[test]
    fn test_half_turn_scenario() {
        let mut b = bender(2000.0);
        b.set_angle(PI).unwrap();
        assert_relative_eq!(b.radius().unwrap(), 636.62, epsilon = 0.01);
        assert_relative_eq!(b.chord().unwrap(), 1273.24, epsilon = 0.01);
        assert_relative_eq!(b.sagitta().unwrap(), 636.62, epsilon = 0.01);
        assert_relative_eq!(b.arc_length().unwrap(), 2000.0, epsilon = 1e-9);
        assert_relative_eq!(b.diameter().unwrap(), 1273.24, epsilon = 0.01);
        assert_eq!(b.state(), BendState::Bending);
    }

    #[test]
    fn test_angle_follows_drag_length() {
        let mut b = bender(100.0);
        let max = b.max_bend_distance();
        assert_relative_eq!(max, 100.0 / PI, epsilon = 1e-12);
        b.bend(Vec3::new(0.0, -max / 4.0, 0.0)).unwrap();
        assert_relative_eq!(b.angle(), TAU / 4.0, epsilon = 1e-12);
        assert!(b.is_concave());
        b.bend(Vec3::new(0.0, max / 2.0, 0.0)).unwrap();
        assert_relative_eq!(b.angle(), PI, epsilon = 1e-12);
        assert!(b.is_convex());
    }

    #[test]
    fn test_long_drag_is_clamped_and_reset() {
        let mut b = bender(50.0);
        b.bend(Vec3::new(3.0, -500.0, 7.0)).unwrap();
        assert!(b.direction().norm() <= 50.0);
        assert_relative_eq!(b.direction().norm(), b.max_bend_distance(), epsilon = 1e-9);
        assert_relative_eq!(b.angle(), TAU, epsilon = 1e-12);
        let again = b.clone();
        b.bend(Vec3::new(3.0, -500.0, 7.0)).unwrap();
        assert_eq!(b.direction(), again.direction());
        b.reset().unwrap();
        assert_eq!(b.angle(), 0.0);
        assert!(!b.can_bend());
        assert_eq!(b.state(), BendState::Idle);
        assert!(b.radius().is_none());
        assert_eq!(b.distance(), 0.0);
    }

    #[test]
    fn test_sub_tolerance_drag_is_idle() {
        let (scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        let flat = b.preview_mesh(&scene).unwrap();
        b.bend(Vec3::new(0.0, -5e-7, 0.0)).unwrap();
        assert_eq!(b.state(), BendState::Idle);
        assert!(!b.is_bending());
        assert!(!b.can_bend());
        assert_eq!(b.angle(), 0.0);
        assert!(b.radius().is_none());
        assert_eq!(b.preview_mesh(&scene).unwrap(), flat);

        // Out and back leaves rounding residue behind.
        let out = Vec3::new(0.1, -7.3, 0.3);
        b.bend(out + Vec3::new(-0.1, 7.3, -0.3) + Vec3::new(1e-9, 0.0, 0.0))
            .unwrap();
        assert_eq!(b.state(), BendState::Idle);
        assert_eq!(b.direction(), Vec3::zeros());

        b.set_angle(1e-12).unwrap();
        assert_eq!(b.state(), BendState::Idle);
        assert_eq!(b.is_bending(), b.can_bend());
    }

    #[test]
    fn test_bend_rejects_non_finite() {
        let mut b = bender(10.0);
        b.bend(Vec3::new(0.0, -1.0, 0.0)).unwrap();
        let before = b.direction();
        assert!(b.bend(Vec3::new(f64::NAN, 0.0, 0.0)).is_err());
        assert_eq!(b.direction(), before);
    }

    #[test]
    fn test_arc_length_reconstructs_reference() {
        let mut b = bender(37.0);
        for i in 1..20 {
            let angle = TAU * i as f64 / 20.0;
            b.set_angle(angle).unwrap();
            assert_relative_eq!(b.arc_length().unwrap(), 37.0, epsilon = 1e-9);
            assert!(b.chord().unwrap() <= b.arc_length().unwrap());
        }
    }

    #[test]
    fn test_set_distance_inverts_sagitta() {
        let mut b = bender(120.0);
        b.set_distance(10.0).unwrap();
        assert!(b.is_concave());
        assert_relative_eq!(b.distance(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.sagitta().unwrap(), 10.0, epsilon = 1e-9);

        b.bend(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        b.set_distance(25.0).unwrap();
        assert!(b.is_convex());
        assert_relative_eq!(b.distance(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_set_distance_validation() {
        let mut b = bender(120.0);
        b.set_angle(1.0).unwrap();
        let before = b.metrics();
        let max = b.max_distance();
        assert_relative_eq!(max / 120.0, 0.3623, epsilon = 1e-3);
        assert!(matches!(b.set_distance(max * 1.01), Err(BendError::Validation(_))));
        assert!(matches!(b.set_distance(-1.0), Err(BendError::Validation(_))));
        assert_eq!(b.metrics(), before);
        b.set_distance(max).unwrap();
        assert_relative_eq!(b.angle(), peak_sagitta_angle(), epsilon = 1e-6);
        b.set_distance(0.0).unwrap();
        assert_eq!(b.state(), BendState::Idle);
    }

    #[test]
    fn test_set_angle_validation() {
        let mut b = bender(10.0);
        assert!(b.set_angle(-0.1).is_err());
        assert!(b.set_angle(TAU + 0.1).is_err());
        assert!(b.set_angle(f64::INFINITY).is_err());
        b.set_angle(1.5).unwrap();
        assert!(b.is_concave());
        assert_relative_eq!(b.angle(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_subdivisions_validation() {
        let mut b = bender(10.0);
        assert!(matches!(b.set_subdivisions(0), Err(BendError::Validation(_))));
        assert_eq!(b.subdivisions(), 24);
        b.set_subdivisions(6).unwrap();
        assert_eq!(b.bend_points().len(), 7);
        assert_eq!(b.slicing_planes().unwrap().len(), 7);
    }

    #[test]
    fn test_segment_angle() {
        let mut b = bender(10.0);
        b.set_subdivisions(4).unwrap();
        b.set_angle(2.0).unwrap();
        assert_relative_eq!(b.segment_angle().unwrap(), 0.5, epsilon = 1e-12);
        b.set_segmented(false).unwrap();
        assert!(b.segment_angle().is_none());
    }

    #[test]
    fn test_origin_is_on_drag_side() {
        let mut b = bender(100.0);
        assert_eq!(b.origin(), Point3::new(50.0, 0.0, 0.0));
        b.set_angle(PI / 2.0).unwrap();
        let r = b.radius().unwrap();
        assert_relative_eq!(b.origin(), Point3::new(50.0, -r, 0.0), epsilon = 1e-9);
        b.bend(Vec3::new(0.0, b.max_bend_distance() / 4.0, 0.0)).unwrap();
        assert_relative_eq!(b.origin(), Point3::new(50.0, r, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_bend_points_lie_on_arc() {
        let mut b = bender(100.0);
        b.set_subdivisions(8).unwrap();
        b.set_angle(PI / 2.0).unwrap();
        let points = b.bend_points();
        assert_eq!(points.len(), 9);
        let r = b.radius().unwrap();
        for p in &points {
            assert_relative_eq!((p - b.origin()).norm(), r, epsilon = 1e-9);
        }
        assert_relative_eq!(points[4], b.reference().midpoint(), epsilon = 1e-9);
        assert_relative_eq!(curve_length(&points), 100.0, epsilon = 0.5);
        assert_relative_eq!((points[8] - points[0]).norm(), b.chord().unwrap(), epsilon = 1e-9);
        // The start stays on the start side.
        assert!(points[0].x < points[8].x);
    }

    #[test]
    fn test_projection_matches_bend_points() {
        for side in [-1.0, 1.0] {
            let mut b = bender(100.0);
            b.set_subdivisions(4).unwrap();
            b.set_segmented(false).unwrap();
            b.bend(Vec3::new(0.0, side * b.max_bend_distance() / 3.0, 0.0)).unwrap();
            let projection = b.projection().unwrap();
            let flat = b.reference().subdivide(4);
            let bent = b.bend_world_points(&projection, &flat);
            for (p, q) in bent.iter().zip(b.bend_points()) {
                assert_relative_eq!(*p, q, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_offsets_keep_their_side() {
        let mut b = bender(100.0);
        b.set_segmented(false).unwrap();
        b.set_angle(1.0).unwrap();
        let projection = b.projection().unwrap();
        let r = b.radius().unwrap();
        let o = b.origin();
        // Concave side is -Y: the arc centre is there, points behind the
        // reference (+Y) move away from it.
        let bent = b.bend_world_points(&projection, &[Point3::new(50.0, 5.0, 3.0)]);
        assert_relative_eq!(xy_distance(&bent[0], &o), r + 5.0, epsilon = 1e-9);
        assert_relative_eq!(bent[0].z, 3.0, epsilon = 1e-9);

        b.bend(Vec3::new(0.0, b.max_bend_distance() / TAU, 0.0)).unwrap();
        let projection = b.projection().unwrap();
        let o = b.origin();
        let bent = b.bend_world_points(&projection, &[Point3::new(50.0, 5.0, 3.0)]);
        assert_relative_eq!(xy_distance(&bent[0], &o), r - 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_x_axis() {
        let mut b = bender(10.0);
        assert!(b.polar_x_axis().is_none());
        assert!(b.projection().is_err());
        b.set_angle(1.0).unwrap();
        let axis = b.polar_x_axis().unwrap();
        assert_relative_eq!(axis.norm(), b.radius().unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_metrics_serialize() {
        let mut b = bender(10.0);
        b.set_angle(1.0).unwrap();
        let json = serde_json::to_string(&b.metrics()).unwrap();
        let back: BendMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, BendState::Bending);
        assert_eq!(back.subdivisions, 24);
        assert_relative_eq!(back.radius.unwrap(), 10.0, epsilon = 1e-9);
        assert!(json.contains("\"segmented\":true"));
    }

    #[test]
    fn test_for_object_uses_front_bottom_edge() {
        let (scene, obj) = box_scene(Point3::new(100.0, 10.0, 20.0));
        let b = Bender::for_object(&scene, obj, &settings()).unwrap();
        assert_eq!(b.reference().start, Point3::origin());
        assert_eq!(b.reference().end, Point3::new(100.0, 0.0, 0.0));
        assert_relative_eq!(b.concave_normal(), -Vec3::y(), epsilon = 1e-12);
        assert!(b.bounding_box().is_some());

        let mut empty = MemoryScene::new();
        let def = empty.add_definition();
        let nothing = empty.add_instance(None, def, Transform::identity()).unwrap();
        assert!(Bender::for_object(&empty, nothing, &settings()).is_err());
    }

    #[test]
    fn test_preview_mesh() {
        let (scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(4).unwrap();
        // 12 box edges, the 4 running along X split in 4.
        let flat = b.preview_mesh(&scene).unwrap();
        assert_eq!(flat.len(), 8 + 4 * 4);

        b.set_segmented(false).unwrap();
        b.set_angle(PI / 2.0).unwrap();
        let bent = b.preview_mesh(&scene).unwrap();
        assert_eq!(bent.len(), flat.len());
        let r = b.radius().unwrap();
        let o = b.origin();
        for segment in &bent {
            for p in segment.points() {
                let d = xy_distance(&p, &o);
                assert!((d - r).abs() < 1e-6 || (d - r - 10.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_preview_grid() {
        let (scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(4).unwrap();
        let flat = b.preview_grid();
        // 4 columns x 4 row lines, 3 rows x 5 column lines.
        assert_eq!(flat.len(), 4 * 4 + 3 * 5);
        b.set_angle(1.0).unwrap();
        assert_eq!(b.preview_grid().len(), flat.len());
        assert!(bender(10.0).preview_grid().is_empty());
    }

    #[test]
    fn test_commit_requires_bend() {
        let (mut scene, obj) = box_scene(Point3::new(10.0, 1.0, 1.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        assert!(matches!(b.commit(&mut scene), Err(BendError::DegenerateGeometry(_))));
        assert_eq!(scene.vertices(obj).unwrap().len(), 8);
    }

    #[test]
    fn test_commit_wraps_box_smoothly() {
        let (mut scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(4).unwrap();
        b.set_segmented(false).unwrap();
        b.set_angle(PI / 2.0).unwrap();
        let r = b.radius().unwrap();
        let o = b.origin();
        let report = b.commit(&mut scene).unwrap();

        assert_eq!(report.objects, 1);
        assert_eq!(report.cut_edges, 3 * 4);
        assert_eq!(report.vertices, 8 + 3 * 4);
        assert_eq!(b.state(), BendState::Committed);
        for v in scene.vertices(obj).unwrap() {
            let d = xy_distance(&v.position, &o);
            assert!((d - r).abs() < 1e-6 || (d - r - 10.0).abs() < 1e-6, "{d}");
        }
        assert!(b.bend(Vec3::y()).is_err());
        assert!(b.commit(&mut scene).is_err());
    }

    #[test]
    fn test_commit_softens_seams() {
        let (mut scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(4).unwrap();
        b.set_angle(1.0).unwrap();
        let report = b.commit(&mut scene).unwrap();
        assert!(report.softened_edges >= 12);
        let soft = scene
            .edges(obj)
            .unwrap()
            .iter()
            .filter(|e| e.flags.soft && e.flags.smooth && !e.flags.casts_shadows)
            .count();
        assert_eq!(soft, report.softened_edges);
    }

    #[test]
    fn test_commit_keeps_hard_facets() {
        let (mut scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(4).unwrap();
        b.set_soften_seams(false).unwrap();
        b.set_angle(1.0).unwrap();
        let report = b.commit(&mut scene).unwrap();
        assert_eq!(report.cut_edges, 12);
        assert_eq!(report.softened_edges, 0);
        assert!(scene.edges(obj).unwrap().iter().all(|e| !e.flags.soft));
    }

    #[test]
    fn test_commit_leaves_other_instances() {
        let (mut scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let def = scene.definition_of(obj).unwrap();
        let twin = scene.add_instance(None, def, Transform::identity()).unwrap();
        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_angle(1.0).unwrap();
        b.commit(&mut scene).unwrap();
        assert_eq!(scene.vertices(twin).unwrap().len(), 8);
        assert_ne!(scene.definition_of(obj).unwrap(), def);
    }

    #[test]
    fn test_commit_bends_nested_objects() {
        let (mut scene, obj) = box_scene(Point3::new(100.0, 10.0, 10.0));
        let outer = scene.definition_of(obj).unwrap();
        let inner = scene.add_definition();
        scene
            .add_box(inner, Point3::origin(), Point3::new(20.0, 10.0, 5.0))
            .unwrap();
        scene
            .add_instance(Some(outer), inner, Transform::translation(40.0, 0.0, 2.0))
            .unwrap();

        let mut b = Bender::for_object(&scene, obj, &settings()).unwrap();
        b.set_subdivisions(10).unwrap();
        b.set_segmented(false).unwrap();
        b.set_angle(PI / 3.0).unwrap();
        let r = b.radius().unwrap();
        let o = b.origin();
        let report = b.commit(&mut scene).unwrap();
        assert_eq!(report.objects, 2);

        let child = scene.children(obj).unwrap()[0];
        let placed = scene.transform(child).unwrap();
        let vertices = scene.vertices(child).unwrap();
        // Only the plane at x = 50 crosses the nested box; 40 and 60 touch
        // its end faces.
        assert_eq!(vertices.len(), 8 + 4);
        for v in vertices {
            let world = placed.apply_point(&v.position);
            let d = xy_distance(&world, &o);
            assert!((d - r).abs() < 1e-6 || (d - r - 10.0).abs() < 1e-6, "{d}");
        }
    }

    #[test]
    fn test_commit_depth_guard_leaves_scene_untouched() {
        let (mut scene, obj) = box_scene(Point3::new(10.0, 1.0, 1.0));
        let def = scene.definition_of(obj).unwrap();
        scene.add_instance(Some(def), def, Transform::identity()).unwrap();
        let settings = BendSettings {
            max_depth: 3,
            ..settings()
        };
        let reference = Segment::new(Point3::origin(), Point3::new(10.0, 0.0, 0.0));
        let mut b = Bender::new(obj, reference, -Vec3::y(), &settings).unwrap();
        b.set_angle(1.0).unwrap();
        assert_eq!(b.commit(&mut scene).unwrap_err(), BendError::RecursionLimit(3));
        assert_eq!(scene.vertices(obj).unwrap().len(), 8);
        assert_eq!(scene.definition_of(obj).unwrap(), def);
        assert_eq!(b.state(), BendState::Bending);
    }

    /// A host whose displacement always fails, to check error propagation.
    struct FailingHost(MemoryScene);

    impl SceneProvider for FailingHost {
        fn transform(&self, object: ObjectId) -> truebend_scene::Result<Transform> {
            self.0.transform(object)
        }
        fn local_bounds(&self, object: ObjectId) -> truebend_scene::Result<truebend_geom::Aabb3> {
            self.0.local_bounds(object)
        }
        fn vertices(&self, object: ObjectId) -> truebend_scene::Result<Vec<truebend_scene::MeshVertex>> {
            self.0.vertices(object)
        }
        fn edges(&self, object: ObjectId) -> truebend_scene::Result<Vec<truebend_scene::MeshEdge>> {
            self.0.edges(object)
        }
        fn children(&self, object: ObjectId) -> truebend_scene::Result<Vec<ObjectId>> {
            self.0.children(object)
        }
        fn make_unique(&mut self, object: ObjectId) -> truebend_scene::Result<()> {
            self.0.make_unique(object)
        }
        fn set_edge_flags(
            &mut self,
            object: ObjectId,
            edges: &[truebend_scene::EdgeId],
            flags: EdgeFlags,
        ) -> truebend_scene::Result<()> {
            self.0.set_edge_flags(object, edges, flags)
        }
    }

    impl MeshCutter for FailingHost {
        fn cut(
            &mut self,
            object: ObjectId,
            transform: &Transform,
            quads: &[truebend_scene::CutQuad],
        ) -> truebend_scene::Result<Vec<truebend_scene::EdgeId>> {
            self.0.cut(object, transform, quads)
        }
    }

    impl VertexDisplacer for FailingHost {
        fn displace(
            &mut self,
            object: ObjectId,
            vertices: &[truebend_scene::VertexId],
            _vectors: &[Vec3],
        ) -> truebend_scene::Result<Vec<truebend_scene::EdgeId>> {
            self.0.displace(object, vertices, &[])
        }
    }

    #[test]
    fn test_commit_propagates_host_errors() {
        let (scene, obj) = box_scene(Point3::new(10.0, 1.0, 1.0));
        let mut host = FailingHost(scene);
        let mut b = Bender::for_object(&host, obj, &settings()).unwrap();
        b.set_angle(1.0).unwrap();
        let err = b.commit(&mut host).unwrap_err();
        assert!(matches!(
            err,
            BendError::Scene(truebend_scene::SceneError::LengthMismatch { .. })
        ));
        assert_ne!(b.state(), BendState::Committed);
    }
}
