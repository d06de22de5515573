//! Hit testing: fingertip point → key label.

use crate::key::Key;
use crate::layout::KeyZone;
use std::collections::BTreeSet;

/// Keys touched by at least one fingertip in a frame.
pub type TouchSet = BTreeSet<Key>;

/// A fingertip position in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Find the first zone containing `point`, in zone order.
/// Returns `None` if the point is outside every zone.
pub fn locate(point: Point, zones: &[KeyZone]) -> Option<Key> {
    zones
        .iter()
        .find(|z| z.contains(point.x, point.y))
        .map(|z| z.label)
}

/// Resolve every fingertip of a frame into the set of touched keys.
pub fn locate_all(points: &[Point], zones: &[KeyZone]) -> TouchSet {
    points.iter().filter_map(|&p| locate(p, zones)).collect()
}
