use serde::{Deserialize, Serialize};

/// Axis-aligned pixel box with a top-left origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds a box from two arbitrary corners, ordering each axis so that
    /// `x1 <= x2` and `y1 <= y2`. Returns `None` for non-finite coordinates.
    pub fn from_corners(xa: f32, ya: f32, xb: f32, yb: f32) -> Option<Self> {
        if ![xa, ya, xb, yb].iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Self {
            x1: xa.min(xb),
            y1: ya.min(yb),
            x2: xa.max(xb),
            y2: ya.max(yb),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    pub fn top(&self) -> f32 {
        self.y1.min(self.y2)
    }

    pub fn bottom(&self) -> f32 {
        self.y1.max(self.y2)
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).abs()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Coordinates truncated toward zero, as exchanged with the translation
    /// service.
    pub fn truncated(&self) -> [i64; 4] {
        [
            self.x1 as i64,
            self.y1 as i64,
            self.x2 as i64,
            self.y2 as i64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unions_boxes() {
        let a = BBox::new(0.0, 5.0, 10.0, 15.0);
        let b = BBox::new(-2.0, 8.0, 6.0, 30.0);
        assert_eq!(a.union(&b), BBox::new(-2.0, 5.0, 10.0, 30.0));
    }

    #[test]
    fn orders_corners() {
        let bbox = BBox::from_corners(10.0, 20.0, 0.0, 5.0).unwrap();
        assert_eq!(bbox, BBox::new(0.0, 5.0, 10.0, 20.0));
        assert_eq!(bbox.top(), 5.0);
        assert_eq!(bbox.bottom(), 20.0);
        assert_eq!(bbox.height(), 15.0);
        assert_eq!(bbox.width(), 10.0);
    }

    #[test]
    fn truncates_toward_zero() {
        let bbox = BBox::new(1.9, -2.7, 30.5, 40.0);
        assert_eq!(bbox.truncated(), [1, -2, 30, 40]);
    }

    #[test]
    fn rejects_non_finite_corners() {
        assert!(BBox::from_corners(f32::NAN, 0.0, 1.0, 1.0).is_none());
        assert!(BBox::from_corners(0.0, 0.0, f32::INFINITY, 1.0).is_none());
    }
}
