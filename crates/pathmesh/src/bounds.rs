//! Axis-aligned bounding boxes.

use crate::Vec2;

/// Axis-aligned box `[min, max]`.
///
/// Invariants:
/// - Non-empty boxes have `min <= max` componentwise.
/// - `Bounds2::EMPTY` (`min = +inf`, `max = -inf`) means "no region yet" and
///   is absorbed by any `union` / `include`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Bounds2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds2 {
    pub const EMPTY: Bounds2 = Bounds2 {
        min: Vec2::new(f64::INFINITY, f64::INFINITY),
        max: Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Vec2>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, p| acc.include(*p))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn include(self, p: Vec2) -> Self {
        Self {
            min: self.min.inf(&p),
            max: self.max.sup(&p),
        }
    }

    #[inline]
    pub fn union(self, other: Bounds2) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Closed containment with slack `eps` (negative `eps` shrinks the box).
    #[inline]
    pub fn contains_eps(&self, p: Vec2, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.x <= self.max.x + eps
            && p.y >= self.min.y - eps
            && p.y <= self.max.y + eps
    }

    pub fn intersects(&self, other: &Bounds2) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Width/height; zero for the empty box.
    pub fn size(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::zeros()
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Option<Vec2> {
        (!self.is_empty()).then(|| (self.min + self.max) * 0.5)
    }

    pub fn area(&self) -> f64 {
        let s = self.size();
        s.x * s.y
    }
}
