//! Incremental Voronoi diagram of point and line-segment sites.
//!
//! The diagram starts as the Voronoi diagram of three generator points far
//! outside the user disk, closed off by an outer triangle. Each insertion
//! grows a tree of IN vertices from a seed, places one new vertex on every
//! edge leaving that tree, stitches the new face in and deletes the tree.

mod augment;
pub mod checker;
mod edge_data;
mod insert;
pub mod positioner;
mod queue;
mod repair;
mod split;

pub use augment::AugmentStats;
pub use edge_data::EdgeData;
pub use positioner::{Placement, Positioner};
pub use queue::VertexQueue;

use slotmap::{SecondaryMap, SlotMap};

use crate::error::{Result, TopologyError, VoronoiError};
use crate::geometry::{EdgeCurve, Site, SiteId};
use crate::math::{Point2, TOLERANCE};
use crate::spatial::FaceGrid;
use crate::topology::{
    EdgeId, EdgeKind, FaceData, FaceId, FaceStatus, HalfEdgeGraph, VertexData, VertexId, VertexKind,
};

/// Distance of the generators from the origin, in far radii.
const GENERATOR_DISTANCE: f64 = 3.0;

/// Outer vertices sit at this multiple of the sum of two generators.
const OUTER_SCALE: f64 = 6.0;

/// Working sets of a single insertion, cleared (not freed) afterwards.
#[derive(Debug, Clone, Default)]
struct InsertionScratch {
    in_vertices: Vec<VertexId>,
    /// Every vertex whose transient state was touched.
    modified: Vec<VertexId>,
    incident_faces: Vec<FaceId>,
    queue: VertexQueue,
    stats: AugmentStats,
}

impl InsertionScratch {
    fn clear(&mut self) {
        self.in_vertices.clear();
        self.modified.clear();
        self.incident_faces.clear();
        self.queue.clear();
    }
}

/// Voronoi diagram of point and segment sites inside a disk of radius
/// `far_radius` centred at the origin.
///
/// Between calls the diagram is always a valid planar subdivision. A
/// rejected insertion leaves it unchanged. A segment insertion that fails
/// after its commit is rolled back and rejected; a point insertion that does
/// so poisons the diagram, and every later insertion is refused.
#[derive(Debug, Clone)]
pub struct VoronoiDiagram {
    far_radius: f64,
    graph: HalfEdgeGraph,
    sites: SlotMap<SiteId, Site>,
    site_faces: SecondaryMap<SiteId, FaceId>,
    generators: [SiteId; 3],
    outer_face: FaceId,
    grid: FaceGrid,
    positioner: Positioner,
    scratch: InsertionScratch,
    vertex_count: usize,
    num_point_sites: usize,
    num_line_sites: usize,
    poisoned: Option<String>,
}

impl VoronoiDiagram {
    /// Creates the initial diagram for sites within `far_radius` of the
    /// origin, with an `n_bins × n_bins` face grid.
    ///
    /// # Errors
    ///
    /// Returns [`VoronoiError::InvalidConfig`] if `far_radius` is not a
    /// positive finite number or `n_bins` is zero.
    pub fn new(far_radius: f64, n_bins: usize) -> Result<Self> {
        if !far_radius.is_finite() || far_radius <= 0.0 {
            return Err(VoronoiError::InvalidConfig(format!(
                "far radius must be positive and finite, got {far_radius}"
            )));
        }
        if n_bins == 0 {
            return Err(VoronoiError::InvalidConfig(
                "face grid needs at least one bin".to_string(),
            ));
        }

        let mut diagram = Self {
            far_radius,
            graph: HalfEdgeGraph::new(),
            sites: SlotMap::with_key(),
            site_faces: SecondaryMap::new(),
            generators: [SiteId::default(); 3],
            outer_face: FaceId::default(),
            grid: FaceGrid::new(far_radius, n_bins),
            positioner: Positioner::default(),
            scratch: InsertionScratch::default(),
            vertex_count: 0,
            num_point_sites: 0,
            num_line_sites: 0,
            poisoned: None,
        };
        diagram
            .initialize()
            .map_err(|e| VoronoiError::InvariantViolation(e.to_string()))?;
        tracing::debug!(far_radius, n_bins, "initialized diagram");
        Ok(diagram)
    }

    /// Builds the diagram of the three generators: one vertex at the origin,
    /// an apex at each generator-pair midpoint and an outer triangle.
    fn initialize(&mut self) -> std::result::Result<(), TopologyError> {
        let r = self.far_radius * GENERATOR_DISTANCE;
        let half_width = r * 3.0_f64.sqrt() / 2.0;
        let gens = [
            Point2::new(0.0, r),
            Point2::new(-half_width, -r / 2.0),
            Point2::new(half_width, -r / 2.0),
        ];
        self.generators = gens.map(|g| self.sites.insert(Site::Point(g)));
        let faces = self.generators.map(|id| {
            let face = self.graph.add_face(FaceData::new(Some(id)));
            self.site_faces.insert(id, face);
            face
        });
        for (g, f) in gens.iter().zip(faces) {
            self.grid.insert(*g, f);
        }
        self.outer_face = self.graph.add_face(FaceData::new(None));

        // Generator pairs in counter-clockwise order; pair k is (k, k + 1).
        let pairs = [(0, 1), (1, 2), (2, 0)];
        let center = self.new_vertex(Point2::origin(), r, VertexKind::Normal);
        let apexes = pairs.map(|(i, j)| {
            let p = nalgebra::center(&gens[i], &gens[j]);
            self.new_vertex(p, (p - gens[i]).norm(), VertexKind::Apex)
        });
        let outers = pairs.map(|(i, j)| {
            let p = Point2::from((gens[i].coords + gens[j].coords) * OUTER_SCALE);
            self.new_vertex(p, (p - gens[i]).norm(), VertexKind::Outer)
        });

        // Spokes centre → apex → outer; face j on the left, face i on the right.
        let mut spokes = [[EdgeId::default(); 4]; 3];
        for (k, &(i, j)) in pairs.iter().enumerate() {
            let (ca, ac) =
                self.graph
                    .add_twin_edges(center, apexes[k], faces[j], faces[i], EdgeKind::Bisector)?;
            let (ao, oa) =
                self.graph
                    .add_twin_edges(apexes[k], outers[k], faces[j], faces[i], EdgeKind::Bisector)?;
            self.graph.set_next(ca, ao)?;
            self.graph.set_next(oa, ac)?;
            spokes[k] = [ca, ao, oa, ac];
        }

        // Face f is bounded by centre → apex(f-1) → outer(f-1) → outer(f) → apex(f).
        let mut rim = [EdgeId::default(); 3];
        for f in 0..3 {
            let prev = (f + 2) % 3;
            let [ca_prev, ao_prev, _, _] = spokes[prev];
            let [_, _, oa, ac] = spokes[f];
            let (inner, outer) = self.graph.add_twin_edges(
                outers[prev],
                outers[f],
                faces[f],
                self.outer_face,
                EdgeKind::Outer,
            )?;
            self.graph.set_next(ao_prev, inner)?;
            self.graph.set_next(inner, oa)?;
            self.graph.set_next(ac, ca_prev)?;
            self.graph.face_mut(faces[f])?.edge = ca_prev;
            rim[f] = outer;
        }
        for f in 0..3 {
            self.graph.set_next(rim[f], rim[(f + 2) % 3])?;
        }
        self.graph.face_mut(self.outer_face)?.edge = rim[0];
        Ok(())
    }

    // --- Queries ---

    #[must_use]
    pub fn far_radius(&self) -> f64 {
        self.far_radius
    }

    /// Number of user point sites (the generators are not counted).
    #[must_use]
    pub fn num_point_sites(&self) -> usize {
        self.num_point_sites
    }

    #[must_use]
    pub fn num_line_sites(&self) -> usize {
        self.num_line_sites
    }

    /// Number of live graph vertices. Outer, apex, split and endpoint
    /// vertices are included.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.graph.num_vertices()
    }

    #[must_use]
    pub fn num_split_vertices(&self) -> usize {
        self.graph
            .vertices()
            .filter(|(_, v)| v.kind == VertexKind::Split)
            .count()
    }

    /// Number of faces, including the outer face.
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.graph.num_faces()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.graph.num_edges()
    }

    /// Index the next created vertex will receive.
    #[must_use]
    pub fn vertex_counter(&self) -> usize {
        self.vertex_count
    }

    /// Renumbers the live vertices `0..n` and restarts the counter at `n`.
    pub fn reset_vertex_count(&mut self) {
        for (index, (_, v)) in self.graph.vertices_mut().enumerate() {
            v.index = index;
        }
        self.vertex_count = self.graph.num_vertices();
    }

    /// The underlying half-edge graph.
    #[must_use]
    pub fn graph(&self) -> &HalfEdgeGraph {
        &self.graph
    }

    /// Looks up a site by handle. Generator sites are included.
    #[must_use]
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id)
    }

    /// Iterates over the user sites.
    pub fn sites(&self) -> impl Iterator<Item = (SiteId, &Site)> {
        self.sites
            .iter()
            .filter(|(id, _)| !self.generators.contains(id))
    }

    /// Face generated by a site.
    #[must_use]
    pub fn face_of(&self, site: SiteId) -> Option<FaceId> {
        self.site_faces.get(site).copied()
    }

    /// Returns `true` once an internal failure has made the diagram unusable.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Runs the full structural validation.
    ///
    /// # Errors
    ///
    /// Returns [`VoronoiError::InvariantViolation`] describing the first
    /// broken invariant.
    pub fn check(&self) -> Result<()> {
        self.ensure_usable()?;
        checker::validate(&self.graph, &self.sites)
            .map_err(|e| VoronoiError::InvariantViolation(e.to_string()))?;
        let expected = 4 + self.num_point_sites + self.num_line_sites;
        if self.graph.num_faces() != expected {
            return Err(VoronoiError::InvariantViolation(format!(
                "{} faces for {expected} expected",
                self.graph.num_faces()
            )));
        }
        Ok(())
    }

    // --- Internal helpers ---

    /// Distance under which two sites are considered coincident.
    fn tolerance(&self) -> f64 {
        TOLERANCE * self.far_radius.max(1.0)
    }

    fn new_vertex(&mut self, position: Point2, clearance: f64, kind: VertexKind) -> VertexId {
        let index = self.vertex_count;
        self.vertex_count += 1;
        self.graph
            .add_vertex(VertexData::new(position, clearance, kind, index))
    }

    fn face_site(&self, f: FaceId) -> std::result::Result<Option<&Site>, TopologyError> {
        match self.graph.face(f)?.site {
            Some(id) => self
                .sites
                .get(id)
                .map(Some)
                .ok_or(TopologyError::EntityNotFound("site")),
            None => Ok(None),
        }
    }

    fn face_of_site(&self, site: SiteId) -> std::result::Result<FaceId, TopologyError> {
        self.face_of(site)
            .ok_or(TopologyError::EntityNotFound("site face"))
    }

    /// Curve traced by half-edge `e`, from its origin to its target.
    fn edge_curve(&self, e: EdgeId) -> std::result::Result<EdgeCurve, TopologyError> {
        let edge = self.graph.edge(e)?;
        let twin = self.graph.edge(edge.twin)?;
        let start = self.graph.vertex(edge.origin)?.position;
        let end = self.graph.vertex(twin.origin)?.position;
        Ok(EdgeCurve::between(
            self.face_site(edge.face)?,
            self.face_site(twin.face)?,
            start,
            end,
        ))
    }

    /// Face whose site is nearest to `p`: a grid lookup over point sites,
    /// then a greedy walk to any adjacent face whose site is closer.
    fn nearest_face(&self, p: &Point2) -> std::result::Result<(FaceId, f64), TopologyError> {
        let (mut face, mut distance) = self.grid.nearest(p).ok_or(TopologyError::NoSeedVertex)?;
        loop {
            let mut step: Option<(FaceId, f64)> = None;
            for e in self.graph.face_edges(face)? {
                let neighbour = self.graph.edge(self.graph.edge(e)?.twin)?.face;
                if let Some(site) = self.face_site(neighbour)? {
                    let d = site.distance(p);
                    if d < distance && step.is_none_or(|(_, best)| d < best) {
                        step = Some((neighbour, d));
                    }
                }
            }
            match step {
                Some((f, d)) => {
                    face = f;
                    distance = d;
                }
                None => return Ok((face, distance)),
            }
        }
    }

    /// Restores baseline status on everything the last insertion touched.
    fn reset_status(&mut self) {
        for &v in &self.scratch.modified {
            // Vertices deleted by the insertion are skipped.
            if let Ok(vertex) = self.graph.vertex_mut(v) {
                vertex.reset_status();
            }
        }
        for &f in &self.scratch.incident_faces {
            if let Ok(face) = self.graph.face_mut(f) {
                face.status = FaceStatus::NonIncident;
            }
        }
        self.scratch.clear();
    }

    fn ensure_usable(&self) -> Result<()> {
        match &self.poisoned {
            Some(msg) => Err(VoronoiError::InvariantViolation(msg.clone())),
            None => Ok(()),
        }
    }

    fn poison(&mut self, msg: String) -> VoronoiError {
        tracing::error!(%msg, "diagram poisoned");
        self.scratch.clear();
        self.poisoned = Some(msg.clone());
        VoronoiError::InvariantViolation(msg)
    }
}
