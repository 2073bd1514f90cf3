//! Pocket region: outer boundary, islands, and inscribed-circle queries.
//!
//! Boundaries are `cavalier_contours` polylines (bulge vertices encode
//! arcs). All segments are registered in a quadtree so nearest-boundary
//! and crossing queries stay local.

use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{
    seg_arc_radius_and_center, seg_closest_point, PlineSource, PlineSourceMut, PlineVertex,
    Polyline,
};
use pocketkit_core::{
    point::segment_intersection, Arc, Bounds, Point, RotationDir, SpatialIndex,
};

/// One boundary segment (line or bulge arc) of the outer outline or an island.
#[derive(Debug, Clone, Copy)]
pub struct BoundarySeg {
    pub v1: PlineVertex<f64>,
    pub v2: PlineVertex<f64>,
}

impl BoundarySeg {
    fn p1(&self) -> Point {
        Point::new(self.v1.x, self.v1.y)
    }

    fn p2(&self) -> Point {
        Point::new(self.v2.x, self.v2.y)
    }

    fn is_arc(&self) -> bool {
        self.v1.bulge != 0.0
    }

    /// Arc geometry of a bulge segment.
    fn arc(&self) -> Arc {
        let (_, center) = seg_arc_radius_and_center(self.v1, self.v2);
        let dir = if self.v1.bulge > 0.0 {
            RotationDir::Ccw
        } else {
            RotationDir::Cw
        };
        Arc::from_center_endpoints(Point::new(center.x, center.y), self.p1(), self.p2(), dir)
    }

    fn length(&self) -> f64 {
        if self.is_arc() {
            self.arc().length()
        } else {
            self.p1().distance_to(&self.p2())
        }
    }

    fn bounds(&self) -> Bounds {
        if self.is_arc() {
            self.arc().bounds()
        } else {
            let (a, b) = (self.p1(), self.p2());
            Bounds::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
        }
    }

    fn distance_to(&self, p: Point) -> f64 {
        let c = seg_closest_point(self.v1, self.v2, Vector2::new(p.x, p.y), 1e-8);
        p.distance_to(&Point::new(c.x, c.y))
    }
}

/// The pocket interior with spatially indexed boundary segments.
pub struct Region {
    outer: Polyline<f64>,
    islands: Vec<Polyline<f64>>,
    segs: Vec<BoundarySeg>,
    index: SpatialIndex,
    bounds: Bounds,
    cutter_r: f64,
    margin: f64,
}

impl Region {
    /// Builds the region model. Polylines are cleaned of repeat vertices
    /// and forced closed.
    pub fn build(
        outer: Polyline<f64>,
        islands: Vec<Polyline<f64>>,
        cutter_r: f64,
        margin: f64,
        tol: f64,
    ) -> Self {
        let outer = clean_polyline(outer, tol);
        let islands: Vec<_> = islands
            .into_iter()
            .map(|i| clean_polyline(i, tol))
            .collect();

        let mut segs = Vec::new();
        for pline in std::iter::once(&outer).chain(islands.iter()) {
            for (v1, v2) in pline.iter_segments() {
                segs.push(BoundarySeg { v1, v2 });
            }
        }

        let mut bounds = segs
            .first()
            .map(|s| s.bounds())
            .unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
        for s in &segs {
            let b = s.bounds();
            bounds = bounds.including_point(b.min_x, b.min_y);
            bounds = bounds.including_point(b.max_x, b.max_y);
        }

        let mut index = SpatialIndex::new(bounds.expanded(cutter_r), 8, 8);
        for (i, s) in segs.iter().enumerate() {
            index.insert(i, &s.bounds());
        }

        Self {
            outer,
            islands,
            segs,
            index,
            bounds,
            cutter_r,
            margin,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Winding test: inside the outer outline and outside every island.
    pub fn contains(&self, p: Point) -> bool {
        let v = Vector2::new(p.x, p.y);
        if self.outer.winding_number(v) == 0 {
            return false;
        }
        self.islands.iter().all(|i| i.winding_number(v) == 0)
    }

    /// Inside test with a clearance band: the point must be inside and at
    /// least `tol` away from every boundary.
    pub fn strictly_contains(&self, p: Point, tol: f64) -> bool {
        self.contains(p) && self.nearest_boundary_distance(p) > tol
    }

    /// Distance from `p` to the nearest boundary segment, via expanding
    /// quadtree queries.
    pub fn nearest_boundary_distance(&self, p: Point) -> f64 {
        let span = self.bounds.width().max(self.bounds.height()).max(1.0);
        let mut radius = (self.cutter_r).max(span / 64.0);
        loop {
            let rect = Bounds::new(p.x - radius, p.y - radius, p.x + radius, p.y + radius);
            let hits = self.index.query(&rect);
            if !hits.is_empty() {
                let d = hits
                    .iter()
                    .map(|&i| self.segs[i].distance_to(p))
                    .fold(f64::INFINITY, f64::min);
                // A nearer segment cannot hide outside the query window.
                if d <= radius {
                    return d;
                }
            }
            if radius > 4.0 * span {
                return self
                    .segs
                    .iter()
                    .map(|s| s.distance_to(p))
                    .fold(f64::INFINITY, f64::min);
            }
            radius *= 2.0;
        }
    }

    /// Maximum-inscribed-circle radius for the cutter centre at `p`:
    /// boundary clearance less cutter radius and user margin.
    pub fn mic_radius(&self, p: Point) -> f64 {
        self.nearest_boundary_distance(p) - self.cutter_r - self.margin
    }

    /// Boundary samples for the medial axis: every segment start plus
    /// interior samples at `cutter_r / 10` arc-length spacing, so sharp
    /// corners stay in the set.
    pub fn sample_boundary(&self) -> Vec<Point> {
        let spacing = self.cutter_r / 10.0;
        let mut out = Vec::new();
        for seg in &self.segs {
            out.push(seg.p1());
            let len = seg.length();
            if len <= spacing {
                continue;
            }
            let n = (len / spacing).ceil() as usize;
            if seg.is_arc() {
                let arc = seg.arc();
                for i in 1..n {
                    out.push(arc.point_at(i as f64 / n as f64));
                }
            } else {
                let (a, b) = (seg.p1(), seg.p2());
                for i in 1..n {
                    out.push(a.lerp(b, i as f64 / n as f64));
                }
            }
        }
        out
    }

    /// True when the open segment `a`..`b` crosses any boundary segment.
    pub fn segment_crosses_boundary(&self, a: Point, b: Point) -> bool {
        let rect = Bounds::new(
            a.x.min(b.x),
            a.y.min(b.y),
            a.x.max(b.x),
            a.y.max(b.y),
        );
        for i in self.index.query(&rect) {
            let seg = &self.segs[i];
            if seg.is_arc() {
                if !seg.arc().line_intersections(a, b).is_empty() {
                    return true;
                }
            } else if segment_intersection(a, b, seg.p1(), seg.p2()).is_some() {
                return true;
            }
        }
        false
    }
}

/// Removes repeat positions and a duplicated closing vertex, then closes
/// the polyline.
fn clean_polyline(mut pline: Polyline<f64>, tol: f64) -> Polyline<f64> {
    pline.remove_repeat_pos(tol);
    if pline.vertex_count() > 1 {
        let first = pline.get(0).unwrap();
        let last = pline.get(pline.vertex_count() - 1).unwrap();
        if (first.x - last.x).abs() < tol && (first.y - last.y).abs() < tol {
            pline.remove(pline.vertex_count() - 1);
        }
    }
    pline.set_is_closed(true);
    pline
}
