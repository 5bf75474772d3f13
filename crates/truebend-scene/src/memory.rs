//! In-memory reference host.
//!
//! Definitions hold a vertex/edge/face mesh plus nested instances and may be
//! shared by several objects. Faces are ordered vertex loops; every loop
//! side is backed by an edge.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::{debug, warn};
use truebend_geom::{Aabb3, Plane, Polygon};
use truebend_math::{Point3, Tolerance, Transform, Vec3};

use crate::error::{Result, SceneError};
use crate::host::{MeshCutter, SceneProvider, VertexDisplacer};
use crate::mesh::{
    CutQuad, DefinitionId, EdgeFlags, EdgeId, MeshEdge, MeshVertex, ObjectId, VertexId,
};

#[derive(Debug, Clone, Default)]
struct Definition {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    faces: Vec<Vec<VertexId>>,
    instances: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
struct Vertex {
    definition: DefinitionId,
    position: Point3,
}

#[derive(Debug, Clone)]
struct Edge {
    definition: DefinitionId,
    start: VertexId,
    end: VertexId,
    flags: EdgeFlags,
}

#[derive(Debug, Clone)]
struct Object {
    definition: DefinitionId,
    transform: Transform,
}

/// A scene held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    definitions: SlotMap<DefinitionId, Definition>,
    objects: SlotMap<ObjectId, Object>,
    vertices: SlotMap<VertexId, Vertex>,
    edges: SlotMap<EdgeId, Edge>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty definition.
    pub fn add_definition(&mut self) -> DefinitionId {
        self.definitions.insert(Definition::default())
    }

    /// Add a vertex to a definition.
    pub fn add_vertex(&mut self, definition: DefinitionId, position: Point3) -> Result<VertexId> {
        self.definition(definition)?;
        let id = self.vertices.insert(Vertex {
            definition,
            position,
        });
        self.definitions[definition].vertices.push(id);
        Ok(id)
    }

    /// Connect two vertices; returns the existing edge if they already are.
    pub fn add_edge(&mut self, definition: DefinitionId, a: VertexId, b: VertexId) -> Result<EdgeId> {
        self.owned_vertex(definition, a)?;
        self.owned_vertex(definition, b)?;
        Ok(self.ensure_edge(definition, a, b, EdgeFlags::default()).0)
    }

    /// Add a face from a vertex loop, creating the missing loop edges.
    pub fn add_face(&mut self, definition: DefinitionId, loop_: &[VertexId]) -> Result<()> {
        if loop_.len() < 3 {
            return Err(truebend_geom::GeomError::TooFewPoints(loop_.len()).into());
        }
        for &v in loop_ {
            self.owned_vertex(definition, v)?;
        }
        for (i, &a) in loop_.iter().enumerate() {
            let b = loop_[(i + 1) % loop_.len()];
            self.ensure_edge(definition, a, b, EdgeFlags::default());
        }
        self.definitions[definition].faces.push(loop_.to_vec());
        Ok(())
    }

    /// Add an axis-aligned box mesh (8 vertices, 12 edges, 6 quads).
    pub fn add_box(&mut self, definition: DefinitionId, min: Point3, max: Point3) -> Result<()> {
        let bounds = Aabb3::new(min, max);
        let mut corners = Vec::with_capacity(8);
        for corner in bounds.corners() {
            corners.push(self.add_vertex(definition, corner)?);
        }
        // Corner index bits: 1 = max x, 2 = max y, 4 = max z.
        const LOOPS: [[usize; 4]; 6] = [
            [0, 1, 5, 4],
            [1, 3, 7, 5],
            [3, 2, 6, 7],
            [2, 0, 4, 6],
            [4, 5, 7, 6],
            [2, 3, 1, 0],
        ];
        for face in LOOPS {
            let loop_: Vec<VertexId> = face.iter().map(|&i| corners[i]).collect();
            self.add_face(definition, &loop_)?;
        }
        Ok(())
    }

    /// Place a definition. `parent: None` puts it at the top level,
    /// otherwise it is nested inside `parent`.
    pub fn add_instance(
        &mut self,
        parent: Option<DefinitionId>,
        definition: DefinitionId,
        transform: Transform,
    ) -> Result<ObjectId> {
        self.definition(definition)?;
        if let Some(parent) = parent {
            self.definition(parent)?;
        }
        let id = self.objects.insert(Object {
            definition,
            transform,
        });
        if let Some(parent) = parent {
            self.definitions[parent].instances.push(id);
        }
        Ok(id)
    }

    /// Definition an object currently places.
    pub fn definition_of(&self, object: ObjectId) -> Result<DefinitionId> {
        Ok(self.object(object)?.definition)
    }

    /// Current position of a vertex.
    pub fn position(&self, vertex: VertexId) -> Result<Point3> {
        self.vertices
            .get(vertex)
            .map(|v| v.position)
            .ok_or(SceneError::UnknownVertex(vertex))
    }

    /// Current flags of an edge.
    pub fn edge_flags(&self, edge: EdgeId) -> Result<EdgeFlags> {
        self.edges
            .get(edge)
            .map(|e| e.flags)
            .ok_or(SceneError::UnknownEdge(edge))
    }

    /// Face loops of an object's mesh.
    pub fn faces(&self, object: ObjectId) -> Result<Vec<Vec<VertexId>>> {
        let definition = self.definition_of(object)?;
        Ok(self.definitions[definition].faces.clone())
    }

    /// Number of objects placing the definition.
    pub fn instance_count(&self, definition: DefinitionId) -> usize {
        self.objects
            .values()
            .filter(|o| o.definition == definition)
            .count()
    }

    fn object(&self, object: ObjectId) -> Result<&Object> {
        self.objects
            .get(object)
            .ok_or(SceneError::UnknownObject(object))
    }

    fn definition(&self, definition: DefinitionId) -> Result<&Definition> {
        self.definitions
            .get(definition)
            .ok_or(SceneError::UnknownDefinition(definition))
    }

    fn owned_vertex(&self, definition: DefinitionId, vertex: VertexId) -> Result<&Vertex> {
        match self.vertices.get(vertex) {
            Some(v) if v.definition == definition => Ok(v),
            _ => Err(SceneError::UnknownVertex(vertex)),
        }
    }

    fn find_edge(&self, definition: DefinitionId, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.definitions[definition].edges.iter().copied().find(|&id| {
            let e = &self.edges[id];
            (e.start == a && e.end == b) || (e.start == b && e.end == a)
        })
    }

    /// Returns the edge and whether it was created.
    fn ensure_edge(
        &mut self,
        definition: DefinitionId,
        a: VertexId,
        b: VertexId,
        flags: EdgeFlags,
    ) -> (EdgeId, bool) {
        if let Some(id) = self.find_edge(definition, a, b) {
            return (id, false);
        }
        let id = self.edges.insert(Edge {
            definition,
            start: a,
            end: b,
            flags,
        });
        self.definitions[definition].edges.push(id);
        (id, true)
    }

    fn bounds_of(&self, definition: DefinitionId, stack: &mut Vec<DefinitionId>) -> Result<Aabb3> {
        if stack.contains(&definition) {
            warn!(?definition, "definition nests itself");
            return Err(SceneError::Cycle(definition));
        }
        stack.push(definition);
        let def = self.definition(definition)?;
        let mut bounds = Aabb3::from_points(def.vertices.iter().map(|&v| &self.vertices[v].position));
        for &child in &def.instances {
            let object = self.object(child)?;
            let inner = self.bounds_of(object.definition, stack)?;
            if !inner.is_empty() {
                for corner in inner.corners() {
                    bounds.include_point(&object.transform.apply_point(&corner));
                }
            }
        }
        stack.pop();
        Ok(bounds)
    }

    fn check_acyclic(&self, definition: DefinitionId, stack: &mut Vec<DefinitionId>) -> Result<()> {
        if stack.contains(&definition) {
            return Err(SceneError::Cycle(definition));
        }
        stack.push(definition);
        for &child in &self.definition(definition)?.instances {
            self.check_acyclic(self.object(child)?.definition, stack)?;
        }
        stack.pop();
        Ok(())
    }

    /// Copy a definition and, recursively, everything nested in it.
    /// `copies` keeps shared sub-definitions shared within the copy.
    fn copy_definition(
        &mut self,
        source: DefinitionId,
        copies: &mut HashMap<DefinitionId, DefinitionId>,
    ) -> DefinitionId {
        if let Some(&copy) = copies.get(&source) {
            return copy;
        }
        let target = self.definitions.insert(Definition::default());
        copies.insert(source, target);

        let original = self.definitions[source].clone();
        let mut vertex_map = HashMap::with_capacity(original.vertices.len());
        for &v in &original.vertices {
            let position = self.vertices[v].position;
            let id = self.vertices.insert(Vertex {
                definition: target,
                position,
            });
            vertex_map.insert(v, id);
            self.definitions[target].vertices.push(id);
        }
        for &e in &original.edges {
            let edge = self.edges[e].clone();
            let id = self.edges.insert(Edge {
                definition: target,
                start: vertex_map[&edge.start],
                end: vertex_map[&edge.end],
                flags: edge.flags,
            });
            self.definitions[target].edges.push(id);
        }
        self.definitions[target].faces = original
            .faces
            .iter()
            .map(|face| face.iter().map(|v| vertex_map[v]).collect())
            .collect();
        for &child in &original.instances {
            let object = self.objects[child].clone();
            let definition = self.copy_definition(object.definition, copies);
            let id = self.objects.insert(Object {
                definition,
                transform: object.transform,
            });
            self.definitions[target].instances.push(id);
        }
        target
    }

    /// Split every edge of `definition` crossing `plane`, then split faces
    /// along it. Returns the edges created across faces.
    fn cut_plane(&mut self, definition: DefinitionId, plane: &Plane) -> Vec<EdgeId> {
        let tol = Tolerance::DEFAULT;
        let mut midpoints: HashMap<(VertexId, VertexId), VertexId> = HashMap::new();

        for id in self.definitions[definition].edges.clone() {
            let Edge {
                start, end, flags, ..
            } = self.edges[id].clone();
            let a = self.vertices[start].position;
            let b = self.vertices[end].position;
            let (da, db) = (plane.signed_distance(&a), plane.signed_distance(&b));
            let crosses = (da > tol.linear && db < -tol.linear) || (da < -tol.linear && db > tol.linear);
            if !crosses {
                continue;
            }
            let t = da / (da - db);
            let mid = self.vertices.insert(Vertex {
                definition,
                position: a + (b - a) * t,
            });
            self.definitions[definition].vertices.push(mid);
            self.edges[id].end = mid;
            let half = self.edges.insert(Edge {
                definition,
                start: mid,
                end,
                flags,
            });
            self.definitions[definition].edges.push(half);
            midpoints.insert((start, end), mid);
            midpoints.insert((end, start), mid);
        }

        let faces = std::mem::take(&mut self.definitions[definition].faces);
        let mut result_faces = Vec::with_capacity(faces.len());
        let mut created = Vec::new();
        for face in faces {
            let mut loop_ = Vec::with_capacity(face.len() + 2);
            for (i, &a) in face.iter().enumerate() {
                loop_.push(a);
                let b = face[(i + 1) % face.len()];
                if let Some(&mid) = midpoints.get(&(a, b)) {
                    loop_.push(mid);
                }
            }
            match self.split_loop(&loop_, plane) {
                Some((first, second, (a, b))) => {
                    let (edge, is_new) = self.ensure_edge(definition, a, b, EdgeFlags::default());
                    if is_new {
                        created.push(edge);
                    }
                    result_faces.push(first);
                    result_faces.push(second);
                }
                None => result_faces.push(loop_),
            }
        }
        self.definitions[definition].faces = result_faces;
        created
    }

    /// Split a convex loop at its two on-plane vertices when the plane
    /// separates it.
    #[allow(clippy::type_complexity)]
    fn split_loop(
        &self,
        loop_: &[VertexId],
        plane: &Plane,
    ) -> Option<(Vec<VertexId>, Vec<VertexId>, (VertexId, VertexId))> {
        let tol = Tolerance::DEFAULT;
        let distances: Vec<f64> = loop_
            .iter()
            .map(|&v| plane.signed_distance(&self.vertices[v].position))
            .collect();
        let on: Vec<usize> = (0..loop_.len())
            .filter(|&i| distances[i].abs() <= tol.linear)
            .collect();
        let above = distances.iter().any(|&d| d > tol.linear);
        let below = distances.iter().any(|&d| d < -tol.linear);
        if !(above && below) {
            return None;
        }
        if on.len() != 2 {
            debug!(on_plane = on.len(), "face not split: not convex along the plane");
            return None;
        }
        let (i, j) = (on[0], on[1]);
        let n = loop_.len();
        if j - i == 1 || (i == 0 && j == n - 1) {
            return None;
        }
        let first = loop_[i..=j].to_vec();
        let second: Vec<VertexId> = loop_[j..].iter().chain(&loop_[..=i]).copied().collect();
        Some((first, second, (loop_[i], loop_[j])))
    }

    /// Replace a non-planar loop by a triangle fan. Returns the diagonals.
    fn triangulate_if_warped(
        &mut self,
        definition: DefinitionId,
        face: &[VertexId],
    ) -> Option<(Vec<Vec<VertexId>>, Vec<EdgeId>)> {
        if face.len() <= 3 {
            return None;
        }
        let points: Vec<Point3> = face.iter().map(|&v| self.vertices[v].position).collect();
        let polygon = Polygon::new(points).ok()?;
        let center = polygon.center();
        let planar = match polygon.normal() {
            Some(n) => polygon
                .points()
                .iter()
                .all(|p| (p - center).dot(n.as_ref()).abs() <= Tolerance::DEFAULT.linear),
            None => true,
        };
        if planar {
            return None;
        }
        let mut triangles = Vec::with_capacity(face.len() - 2);
        let mut diagonals = Vec::new();
        for i in 1..face.len() - 1 {
            triangles.push(vec![face[0], face[i], face[i + 1]]);
            if i > 1 {
                let (edge, is_new) =
                    self.ensure_edge(definition, face[0], face[i], EdgeFlags::default());
                if is_new {
                    diagonals.push(edge);
                }
            }
        }
        Some((triangles, diagonals))
    }
}

impl SceneProvider for MemoryScene {
    fn transform(&self, object: ObjectId) -> Result<Transform> {
        Ok(self.object(object)?.transform.clone())
    }

    fn local_bounds(&self, object: ObjectId) -> Result<Aabb3> {
        let definition = self.definition_of(object)?;
        self.bounds_of(definition, &mut Vec::new())
    }

    fn vertices(&self, object: ObjectId) -> Result<Vec<MeshVertex>> {
        let definition = self.definition_of(object)?;
        Ok(self.definitions[definition]
            .vertices
            .iter()
            .map(|&id| MeshVertex {
                id,
                position: self.vertices[id].position,
            })
            .collect())
    }

    fn edges(&self, object: ObjectId) -> Result<Vec<MeshEdge>> {
        let definition = self.definition_of(object)?;
        Ok(self.definitions[definition]
            .edges
            .iter()
            .map(|&id| {
                let edge = &self.edges[id];
                MeshEdge {
                    id,
                    start: self.vertices[edge.start].position,
                    end: self.vertices[edge.end].position,
                    flags: edge.flags,
                }
            })
            .collect())
    }

    fn children(&self, object: ObjectId) -> Result<Vec<ObjectId>> {
        let definition = self.definition_of(object)?;
        Ok(self.definitions[definition].instances.clone())
    }

    fn make_unique(&mut self, object: ObjectId) -> Result<()> {
        let definition = self.definition_of(object)?;
        if self.instance_count(definition) <= 1 {
            return Ok(());
        }
        self.check_acyclic(definition, &mut Vec::new())?;
        let copy = self.copy_definition(definition, &mut HashMap::new());
        self.objects[object].definition = copy;
        debug!(?object, ?definition, ?copy, "made definition unique");
        Ok(())
    }

    fn set_edge_flags(&mut self, object: ObjectId, edges: &[EdgeId], flags: EdgeFlags) -> Result<()> {
        let definition = self.definition_of(object)?;
        for &id in edges {
            match self.edges.get(id) {
                Some(edge) if edge.definition == definition => {}
                _ => return Err(SceneError::UnknownEdge(id)),
            }
        }
        for &id in edges {
            self.edges[id].flags = flags;
        }
        Ok(())
    }
}

impl MeshCutter for MemoryScene {
    fn cut(&mut self, object: ObjectId, transform: &Transform, quads: &[CutQuad]) -> Result<Vec<EdgeId>> {
        let definition = self.definition_of(object)?;
        let to_local = transform
            .inverse()
            .ok_or(truebend_geom::GeomError::SingularTransform)?;
        // Each quad acts through its supporting plane; quads are sized to
        // cover the whole mesh.
        let planes = quads
            .iter()
            .map(|quad| quad.plane().and_then(|p| p.transform(&to_local)))
            .collect::<truebend_geom::Result<Vec<Plane>>>()?;

        let mut created = Vec::new();
        for plane in &planes {
            created.extend(self.cut_plane(definition, plane));
        }
        debug!(?object, planes = planes.len(), new_edges = created.len(), "cut mesh");
        Ok(created)
    }
}

impl VertexDisplacer for MemoryScene {
    fn displace(&mut self, object: ObjectId, vertices: &[VertexId], vectors: &[Vec3]) -> Result<Vec<EdgeId>> {
        if vertices.len() != vectors.len() {
            return Err(SceneError::LengthMismatch {
                vertices: vertices.len(),
                vectors: vectors.len(),
            });
        }
        let definition = self.definition_of(object)?;
        let mut seen = HashSet::with_capacity(vertices.len());
        for &v in vertices {
            self.owned_vertex(definition, v)?;
            seen.insert(v);
        }
        for (&v, vector) in vertices.iter().zip(vectors) {
            self.vertices[v].position += *vector;
        }

        let faces = std::mem::take(&mut self.definitions[definition].faces);
        let mut result_faces = Vec::with_capacity(faces.len());
        let mut created = Vec::new();
        for face in faces {
            let touched = face.iter().any(|v| seen.contains(v));
            match touched.then(|| self.triangulate_if_warped(definition, &face)).flatten() {
                Some((triangles, diagonals)) => {
                    result_faces.extend(triangles);
                    created.extend(diagonals);
                }
                None => result_faces.push(face),
            }
        }
        self.definitions[definition].faces = result_faces;
        debug!(?object, moved = vertices.len(), new_edges = created.len(), "displaced vertices");
        Ok(created)
    }
}
