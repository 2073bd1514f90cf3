//! Axis-aligned bounds and a bounding-box quadtree.
//!
//! The index stores opaque `usize` ids under rectangles. Items are never
//! removed; queries return ids in insertion order within each node, which
//! keeps downstream processing deterministic.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Degenerate rectangle covering a single point.
    pub fn at_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grows the rectangle to cover `(x, y)`.
    pub fn including_point(&self, x: f64, y: f64) -> Bounds {
        Bounds::new(
            self.min_x.min(x),
            self.min_y.min(y),
            self.max_x.max(x),
            self.max_y.max(y),
        )
    }

    /// Grows the rectangle outward by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }
}

#[derive(Debug)]
struct QuadtreeNode {
    bounds: Bounds,
    depth: usize,
    items: Vec<(usize, Bounds)>,
    children: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
    fn new(bounds: Bounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, id: usize, bounds: &Bounds, max_depth: usize, max_items: usize) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.contains_bounds(bounds) {
                    child.insert(id, bounds, max_depth, max_items);
                    return;
                }
            }
            // Straddles a split line: stays here.
            self.items.push((id, *bounds));
            return;
        }

        self.items.push((id, *bounds));
        if self.items.len() > max_items && self.depth < max_depth {
            self.split(max_depth, max_items);
        }
    }

    fn split(&mut self, max_depth: usize, max_items: usize) {
        let (cx, cy) = self.bounds.center();
        let b = &self.bounds;
        let children = Box::new([
            QuadtreeNode::new(Bounds::new(b.min_x, b.min_y, cx, cy), self.depth + 1),
            QuadtreeNode::new(Bounds::new(cx, b.min_y, b.max_x, cy), self.depth + 1),
            QuadtreeNode::new(Bounds::new(b.min_x, cy, cx, b.max_y), self.depth + 1),
            QuadtreeNode::new(Bounds::new(cx, cy, b.max_x, b.max_y), self.depth + 1),
        ]);
        self.children = Some(children);
        let items = std::mem::take(&mut self.items);
        for (id, bounds) in items {
            self.insert(id, &bounds, max_depth, max_items);
        }
    }

    fn query(&self, rect: &Bounds, out: &mut Vec<usize>) {
        // Straddling (and out-of-root) items live in parent item lists, so
        // those are scanned unconditionally; children hold only fully
        // contained items and can be pruned by their bounds.
        for (id, bounds) in &self.items {
            if bounds.intersects(rect) {
                out.push(*id);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                if child.bounds.intersects(rect) {
                    child.query(rect, out);
                }
            }
        }
    }
}

/// A bounding-box quadtree over `usize` ids.
#[derive(Debug)]
pub struct SpatialIndex {
    root: QuadtreeNode,
    max_depth: usize,
    max_items: usize,
    len: usize,
}

impl SpatialIndex {
    /// Creates an index covering `bounds`, subdividing nodes past
    /// `max_items` entries down to `max_depth` levels.
    pub fn new(bounds: Bounds, max_depth: usize, max_items: usize) -> Self {
        Self {
            root: QuadtreeNode::new(bounds, 0),
            max_depth,
            max_items: max_items.max(1),
            len: 0,
        }
    }

    /// Registers `id` under `bounds`. Items outside the root rectangle are
    /// kept at the root so they still show up in queries.
    pub fn insert(&mut self, id: usize, bounds: &Bounds) {
        self.root
            .insert(id, bounds, self.max_depth, self.max_items);
        self.len += 1;
    }

    /// All ids whose rectangles overlap `rect`.
    pub fn query(&self, rect: &Bounds) -> Vec<usize> {
        let mut out = Vec::new();
        self.root.query(rect, &mut out);
        out
    }

    /// All ids whose rectangles cover the point.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<usize> {
        self.query(&Bounds::at_point(x, y))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
        self.len = 0;
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(Bounds::new(-1.0e6, -1.0e6, 1.0e6, 1.0e6), 8, 16)
    }
}
