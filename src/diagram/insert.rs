//! Point and segment insertion.
//!
//! Both operations run in two phases. Planning classifies vertices and
//! computes and verifies every new position without touching the topology
//! (apart from split vertices, which a segment insertion snapshots against).
//! Commit then rewires the graph and the new vertices are checked again. A
//! segment insertion that fails there is rolled back to its snapshot; a point
//! insertion has no snapshot and poisons the diagram.

use std::collections::HashMap;

use crate::error::{InputError, InsertionError, Result, SiteRef, TopologyError, VoronoiError};
use crate::geometry::{EdgeCurve, Segment, Site, SiteId};
use crate::math::intersect_2d::segments_touch;
use crate::math::Point2;
use crate::topology::{EdgeId, FaceId, VertexId};

use super::checker::{check_clearances, check_in_set, validate};
use super::{AugmentStats, EdgeData, Placement, VoronoiDiagram};

/// Everything the commit step needs, computed before the graph changes.
#[derive(Debug, Default)]
pub(super) struct InsertionPlan {
    pub(super) runs: Vec<EdgeData>,
    /// New vertex for each run's entering edge.
    pub(super) placements: Vec<Placement>,
}

impl VoronoiDiagram {
    /// Inserts a point site and returns its handle.
    ///
    /// # Errors
    ///
    /// - [`VoronoiError::SiteRejected`] if the point is not finite, lies
    ///   outside the far radius, coincides with an existing site or lies on
    ///   a segment, or if the insertion is topologically or numerically
    ///   inadmissible. The diagram is unchanged.
    /// - [`VoronoiError::InvariantViolation`] if the diagram is poisoned or
    ///   becomes invalid during the commit.
    ///
    /// The new vertices are always checked after the commit. The full
    /// validation of the diagram only runs in debug builds.
    pub fn insert_point_site(&mut self, p: Point2) -> Result<SiteId> {
        self.ensure_usable()?;
        self.scratch.stats = AugmentStats::default();
        let site = Site::Point(p);

        let plan = match self.plan_point_insertion(&p, &site) {
            Ok(plan) => plan,
            Err(cause) => return Err(self.reject(SiteRef::Point(p), cause)),
        };

        let id = self.sites.insert(site);
        let committed = self.commit_checked(id, &plan);
        self.reset_status();
        let face = match committed.and_then(|face| self.debug_validate().map(|()| face)) {
            Ok(face) => face,
            Err(e) => return Err(self.poison(format!("insertion of point ({}, {}) failed: {e}", p.x, p.y))),
        };
        self.site_faces.insert(id, face);
        self.grid.insert(p, face);
        self.num_point_sites += 1;
        tracing::debug!(x = p.x, y = p.y, "inserted point site");
        Ok(id)
    }

    fn plan_point_insertion(&mut self, p: &Point2, site: &Site) -> std::result::Result<InsertionPlan, InsertionError> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(InputError::NotFinite.into());
        }
        let distance = p.coords.norm();
        if distance > self.far_radius {
            return Err(InputError::OutsideFarRadius {
                distance,
                far_radius: self.far_radius,
            }
            .into());
        }

        let (face, d) = self.nearest_face(p)?;
        if d < self.tolerance() {
            return Err(match self.face_site(face)? {
                Some(Site::Segment(_)) => InputError::OnSegmentSite,
                Some(Site::Point(q)) => InputError::DuplicateSite { x: q.x, y: q.y },
                None => InputError::DuplicateSite { x: p.x, y: p.y },
            }
            .into());
        }
        tracing::debug!(face = ?face, distance = d, "located nearest face");

        let seed = self.seed_vertex(face, site)?;
        self.mark_face_incident(face, site)?;
        self.enqueue(seed, site)?;
        self.augment_vertex_set(site)?;
        check_in_set(&self.graph, &self.scratch.in_vertices)?;

        let runs = self.collect_runs(&[], true)?;
        let placements = self.place_vertices(&runs, site)?;
        self.check_apexes(&runs, &placements, site, &[])?;
        Ok(InsertionPlan { runs, placements })
    }

    /// Inserts the segment between two existing point sites.
    ///
    /// # Errors
    ///
    /// - [`VoronoiError::SiteRejected`] if an endpoint is not a user point
    ///   site, the segment is degenerate or already present, touches another
    ///   segment or passes through a point site, or if the insertion is
    ///   inadmissible. Also returned when the committed vertices fail their
    ///   check; the graph is then restored from a snapshot. Either way the
    ///   diagram is unchanged.
    /// - [`VoronoiError::InvariantViolation`] if the diagram is poisoned.
    ///
    /// Release builds only check the vertices the insertion created. The
    /// full validation of the diagram runs in debug builds.
    pub fn insert_line_site(&mut self, start: SiteId, end: SiteId) -> Result<()> {
        self.ensure_usable()?;
        self.scratch.stats = AugmentStats::default();
        let site_ref = SiteRef::Segment(start, end);

        let segment = match self.validate_segment(start, end) {
            Ok(segment) => segment,
            Err(cause) => return Err(self.reject(site_ref, cause.into())),
        };
        let site = Site::Segment(segment);

        // Split vertices change the graph before admissibility is known.
        let snapshot = (self.graph.clone(), self.vertex_count);
        let plan = match self.plan_segment_insertion(&segment, &site) {
            Ok(plan) => plan,
            Err(cause) => {
                (self.graph, self.vertex_count) = snapshot;
                return Err(self.reject(site_ref, cause));
            }
        };

        let id = self.sites.insert(site);
        let committed = self.commit_checked(id, &plan);
        self.reset_status();
        let face = match committed.and_then(|face| self.debug_validate().map(|()| face)) {
            Ok(face) => face,
            Err(cause) => {
                self.sites.remove(id);
                (self.graph, self.vertex_count) = snapshot;
                return Err(self.reject(site_ref, cause.into()));
            }
        };
        self.site_faces.insert(id, face);
        self.num_line_sites += 1;
        tracing::debug!(%site_ref, "inserted line site");
        Ok(())
    }

    fn plan_segment_insertion(
        &mut self,
        segment: &Segment,
        site: &Site,
    ) -> std::result::Result<InsertionPlan, InsertionError> {
        let start_face = self.face_of_site(segment.start_site)?;
        let end_face = self.face_of_site(segment.end_site)?;

        self.mark_face_incident(start_face, site)?;
        let seed = self.seed_vertex(start_face, site)?;
        self.enqueue(seed, site)?;
        self.augment_vertex_set(site)?;
        check_in_set(&self.graph, &self.scratch.in_vertices)?;

        if !self.scratch.incident_faces.contains(&end_face) {
            return Err(TopologyError::EndpointNotReached(end_face).into());
        }
        let endpoint_faces = [start_face, end_face];
        let runs = self.collect_runs(&endpoint_faces, false)?;
        let placements = self.place_vertices(&runs, site)?;
        self.check_apexes(&runs, &placements, site, &endpoint_faces)?;
        Ok(InsertionPlan { runs, placements })
    }

    fn validate_segment(&self, start: SiteId, end: SiteId) -> std::result::Result<Segment, InputError> {
        let a = self.user_point(start)?;
        let b = self.user_point(end)?;
        if start == end || (a - b).norm() < self.tolerance() {
            return Err(InputError::DegenerateSegment);
        }
        let segment = Segment {
            start: a,
            end: b,
            start_site: start,
            end_site: end,
        };

        for (_, s) in &self.sites {
            let Site::Segment(other) = s else {
                continue;
            };
            if other.connects(start, end) {
                return Err(InputError::DuplicateSegment);
            }
            if segments_touch(&a, &b, &other.start, &other.end) {
                return Err(InputError::SegmentIntersection);
            }
        }

        let line = Site::Segment(segment);
        for (id, s) in self.sites() {
            if id == start || id == end {
                continue;
            }
            if let Site::Point(q) = s {
                if line.distance(q) < self.tolerance() {
                    return Err(InputError::PointOnSegment(id));
                }
            }
        }
        Ok(segment)
    }

    /// Position of a user point site usable as a segment endpoint.
    fn user_point(&self, id: SiteId) -> std::result::Result<Point2, InputError> {
        let site = self.sites.get(id).ok_or(InputError::UnknownSite(id))?;
        if self.generators.contains(&id) {
            return Err(InputError::NotAPointSite(id));
        }
        site.as_point().copied().ok_or(InputError::NotAPointSite(id))
    }

    // --- Planning helpers ---

    /// Vertex of `face` with the smallest in-circle value against `site`,
    /// which must be in conflict.
    fn seed_vertex(&self, face: FaceId, site: &Site) -> std::result::Result<VertexId, TopologyError> {
        let mut best: Option<(VertexId, f64)> = None;
        for v in self.graph.face_vertices(face)? {
            let vertex = self.graph.vertex(v)?;
            if vertex.is_protected() {
                continue;
            }
            let det = site.in_circle(&vertex.position, vertex.clearance);
            if best.is_none_or(|(_, b)| det < b) {
                best = Some((v, det));
            }
        }
        match best {
            Some((v, det)) if det < 0.0 => {
                tracing::debug!(seed = ?v, det, "selected seed vertex");
                Ok(v)
            }
            _ => Err(TopologyError::NoSeedVertex),
        }
    }

    /// IN runs of every incident face. `single_run` faces, or all faces
    /// when `strict`, must have exactly one.
    fn collect_runs(
        &self,
        single_run: &[FaceId],
        strict: bool,
    ) -> std::result::Result<Vec<EdgeData>, TopologyError> {
        let mut all = Vec::new();
        for &f in &self.scratch.incident_faces {
            let runs = self.find_edge_data(f)?;
            let needs_one = strict || single_run.contains(&f);
            if runs.is_empty() || (needs_one && runs.len() != 1) {
                return Err(TopologyError::UnexpectedRunCount { face: f, runs: runs.len() });
            }
            all.extend(runs);
        }
        tracing::debug!(faces = self.scratch.incident_faces.len(), runs = all.len(), "collected IN runs");
        Ok(all)
    }

    /// New vertex on each run's entering edge, verified against the sites of
    /// both faces of the edge and the new site.
    fn place_vertices(
        &self,
        runs: &[EdgeData],
        site: &Site,
    ) -> std::result::Result<Vec<Placement>, InsertionError> {
        runs.iter()
            .map(|run| -> std::result::Result<Placement, InsertionError> {
                let edge = self.graph.edge(run.enter)?;
                let det_out = self.graph.vertex(edge.origin)?.det;
                let det_in = self.graph.vertex(self.graph.target(run.enter)?)?.det;
                let face_site = self.run_site(run)?;
                let curve = self.edge_curve(run.enter)?;
                let placement = self.positioner.position(&curve, face_site, site, det_out, det_in)?;

                let mut around = vec![face_site, site];
                if let Some(twin_site) = self.face_site(self.graph.edge(edge.twin)?.face)? {
                    around.push(twin_site);
                }
                placement.verify(&around)?;
                Ok(placement)
            })
            .collect()
    }

    /// Verifies the clearance minima that commit will add on the new
    /// bisectors, i.e. the chains of runs outside `endpoint_faces`.
    fn check_apexes(
        &self,
        runs: &[EdgeData],
        placements: &[Placement],
        site: &Site,
        endpoint_faces: &[FaceId],
    ) -> std::result::Result<(), InsertionError> {
        let by_enter: HashMap<EdgeId, &Placement> = runs.iter().map(|r| r.enter).zip(placements).collect();
        for (run, enter) in runs.iter().zip(placements) {
            if endpoint_faces.contains(&run.face) {
                continue;
            }
            let exit_twin = self.graph.edge(run.exit)?.twin;
            let exit = by_enter.get(&exit_twin).ok_or_else(|| {
                TopologyError::InvalidTopology(format!("run in face {:?} exits into no other run", run.face))
            })?;
            let face_site = self.run_site(run)?;
            let curve = EdgeCurve::between(Some(face_site), Some(site), enter.position, exit.position);
            if let Some(apex) = curve.apex_on_edge() {
                let placement = Placement {
                    position: apex,
                    clearance: site.distance(&apex),
                };
                placement.verify(&[face_site, site])?;
            }
        }
        Ok(())
    }

    fn run_site(&self, run: &EdgeData) -> std::result::Result<&Site, TopologyError> {
        self.face_site(run.face)?
            .ok_or_else(|| TopologyError::InvalidTopology(format!("IN run in siteless face {:?}", run.face)))
    }

    // --- Completion ---

    /// Restores baseline state after a rejected insertion.
    fn reject(&mut self, site: SiteRef, cause: InsertionError) -> VoronoiError {
        self.reset_status();
        tracing::warn!(%site, %cause, "site rejected");
        VoronoiError::SiteRejected { site, cause }
    }

    /// Commits `plan` and checks the clearance of every vertex the
    /// insertion created or touched.
    fn commit_checked(&mut self, id: SiteId, plan: &InsertionPlan) -> std::result::Result<FaceId, TopologyError> {
        let face = self.commit(id, plan)?;
        check_clearances(&self.graph, &self.sites, &self.scratch.modified)?;
        Ok(face)
    }

    fn debug_validate(&self) -> std::result::Result<(), TopologyError> {
        if cfg!(debug_assertions) {
            validate(&self.graph, &self.sites)?;
        }
        Ok(())
    }
}
