// Planar polygon helpers shared by the placers. Polygons are open vertex
// rings (the last vertex is not repeated) in screen space.

use serde::Serialize;

pub type Point = (f32, f32);

const AREA_EPS: f32 = 1e-6;

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// `[0, 0, width, height]`.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Grow outward by `pad` on every side.
    pub fn inflate(self, pad: f32) -> Self {
        Self::new(
            self.min_x - pad,
            self.min_y - pad,
            self.max_x + pad,
            self.max_y + pad,
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.0 >= self.min_x
            && point.0 <= self.max_x
            && point.1 >= self.min_y
            && point.1 <= self.max_y
    }

    pub fn to_polygon(&self) -> Vec<Point> {
        vec![
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }
}

/// Shoelace area; the sign follows vertex winding.
pub fn polygon_area(polygon: &[Point]) -> f32 {
    let Some(&origin) = polygon.first() else {
        return 0.0;
    };
    let mut twice = 0.0f32;
    for pair in polygon.windows(2) {
        twice += cross(sub(pair[0], origin), sub(pair[1], origin));
    }
    twice / 2.0
}

/// Area centroid; `None` when the polygon has no area.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    let &origin = polygon.first()?;
    let mut twice_area = 0.0f32;
    let mut cx = 0.0f32;
    let mut cy = 0.0f32;
    for pair in polygon.windows(2) {
        let a = sub(pair[0], origin);
        let b = sub(pair[1], origin);
        let c = cross(a, b);
        twice_area += c;
        cx += (a.0 + b.0) * c;
        cy += (a.1 + b.1) * c;
    }
    if twice_area.abs() <= AREA_EPS {
        return None;
    }
    let scale = 1.0 / (3.0 * twice_area);
    Some((origin.0 + cx * scale, origin.1 + cy * scale))
}

/// Keep the part of `polygon` at least as close to `site` as to `other`
/// (the half-plane bounded by their perpendicular bisector).
pub fn clip_to_bisector(polygon: &[Point], site: Point, other: Point) -> Vec<Point> {
    let mid = ((site.0 + other.0) / 2.0, (site.1 + other.1) / 2.0);
    let normal = sub(other, site);
    let side = |p: Point| dot(sub(p, mid), normal);

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (idx, &a) in polygon.iter().enumerate() {
        let b = polygon[(idx + 1) % polygon.len()];
        let fa = side(a);
        let fb = side(b);
        if fa <= 0.0 {
            out.push(a);
        }
        if (fa < 0.0 && fb > 0.0) || (fa > 0.0 && fb < 0.0) {
            let t = fa / (fa - fb);
            out.push((a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1)));
        }
    }
    out
}

/// Even-odd point-in-polygon test.
pub fn polygon_contains(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > point.1) != (yj > point.1) {
            let x_cross = xi + (point.1 - yi) / (yj - yi) * (xj - xi);
            if point.0 < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn distance(a: Point, b: Point) -> f32 {
    let d = sub(a, b);
    (d.0 * d.0 + d.1 * d.1).sqrt()
}

fn sub(a: Point, b: Point) -> Point {
    (a.0 - b.0, a.1 - b.1)
}

fn dot(a: Point, b: Point) -> f32 {
    a.0 * b.0 + a.1 * b.1
}

fn cross(a: Point, b: Point) -> f32 {
    a.0 * b.1 - a.1 * b.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        Bounds::from_size(10.0, 10.0).to_polygon()
    }

    #[test]
    fn area_of_square() {
        assert_eq!(polygon_area(&square()).abs(), 100.0);
    }

    #[test]
    fn area_sign_follows_winding() {
        let mut reversed = square();
        reversed.reverse();
        assert_eq!(polygon_area(&square()), -polygon_area(&reversed));
    }

    #[test]
    fn centroid_of_square() {
        assert_eq!(polygon_centroid(&square()), Some((5.0, 5.0)));
    }

    #[test]
    fn centroid_of_triangle() {
        let (cx, cy) = polygon_centroid(&[(0.0, 0.0), (6.0, 0.0), (0.0, 3.0)]).unwrap();
        assert!((cx - 2.0).abs() < 1e-5);
        assert!((cy - 1.0).abs() < 1e-5);
    }

    #[test]
    fn centroid_of_flat_polygon_is_none() {
        assert_eq!(polygon_centroid(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]), None);
    }

    #[test]
    fn bisector_clip_halves_square() {
        let half = clip_to_bisector(&square(), (2.0, 5.0), (8.0, 5.0));
        assert!((polygon_area(&half).abs() - 50.0).abs() < 1e-4);
        assert!(half.iter().all(|p| p.0 <= 5.0 + 1e-5));
    }

    #[test]
    fn bisector_far_away_keeps_polygon() {
        let kept = clip_to_bisector(&square(), (5.0, 5.0), (100.0, 5.0));
        assert_eq!(kept, square());
    }

    #[test]
    fn contains_inside_and_outside() {
        assert!(polygon_contains(&square(), (3.0, 4.0)));
        assert!(!polygon_contains(&square(), (11.0, 4.0)));
        assert!(!polygon_contains(&[(0.0, 0.0), (1.0, 1.0)], (0.5, 0.5)));
    }

    #[test]
    fn inflate_grows_every_side() {
        let bounds = Bounds::from_size(100.0, 50.0).inflate(1.0);
        assert_eq!(bounds, Bounds::new(-1.0, -1.0, 101.0, 51.0));
        assert_eq!(bounds.area(), 102.0 * 52.0);
    }
}
