use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A closed planar curve in profile-local 2D coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClosedCurve {
    Circle {
        center: [f64; 2],
        radius: f64,
    },
    /// Regular polygon with its first vertex on the +X side of `center`.
    /// A non-zero `corner_radius` rounds every vertex with a tangent arc.
    RegularPolygon {
        center: [f64; 2],
        circumradius: f64,
        sides: u32,
        corner_radius: f64,
    },
    Polyline {
        points: Vec<[f64; 2]>,
    },
}

impl ClosedCurve {
    pub fn circle(radius: f64) -> Self {
        ClosedCurve::Circle {
            center: [0.0, 0.0],
            radius,
        }
    }

    pub fn regular_polygon(circumradius: f64, sides: u32) -> Self {
        ClosedCurve::RegularPolygon {
            center: [0.0, 0.0],
            circumradius,
            sides,
            corner_radius: 0.0,
        }
    }

    pub fn rounded_polygon(circumradius: f64, sides: u32, corner_radius: f64) -> Self {
        ClosedCurve::RegularPolygon {
            center: [0.0, 0.0],
            circumradius,
            sides,
            corner_radius,
        }
    }

    /// Same curve shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        match self {
            ClosedCurve::Circle { center, radius } => ClosedCurve::Circle {
                center: [center[0] + dx, center[1] + dy],
                radius: *radius,
            },
            ClosedCurve::RegularPolygon {
                center,
                circumradius,
                sides,
                corner_radius,
            } => ClosedCurve::RegularPolygon {
                center: [center[0] + dx, center[1] + dy],
                circumradius: *circumradius,
                sides: *sides,
                corner_radius: *corner_radius,
            },
            ClosedCurve::Polyline { points } => ClosedCurve::Polyline {
                points: points.iter().map(|p| [p[0] + dx, p[1] + dy]).collect(),
            },
        }
    }

    pub fn center(&self) -> [f64; 2] {
        match self {
            ClosedCurve::Circle { center, .. } | ClosedCurve::RegularPolygon { center, .. } => {
                *center
            }
            ClosedCurve::Polyline { points } => {
                if points.is_empty() {
                    return [0.0, 0.0];
                }
                let n = points.len() as f64;
                let sx: f64 = points.iter().map(|p| p[0]).sum();
                let sy: f64 = points.iter().map(|p| p[1]).sum();
                [sx / n, sy / n]
            }
        }
    }

    /// Enclosed area. Rounded polygon corners subtract `r²(tan(π/n) - π/n)` each.
    pub fn area(&self) -> f64 {
        match self {
            ClosedCurve::Circle { radius, .. } => PI * radius * radius,
            ClosedCurve::RegularPolygon {
                circumradius,
                sides,
                corner_radius,
                ..
            } => {
                let n = *sides as f64;
                let sharp = 0.5 * n * circumradius * circumradius * (2.0 * PI / n).sin();
                let corner_loss = n * corner_radius * corner_radius * ((PI / n).tan() - PI / n);
                sharp - corner_loss
            }
            ClosedCurve::Polyline { points } => shoelace_area(points).abs(),
        }
    }

    /// Distance from the center to the closest point of the curve.
    pub fn inscribed_radius(&self) -> f64 {
        match self {
            ClosedCurve::Circle { radius, .. } => *radius,
            ClosedCurve::RegularPolygon {
                circumradius,
                sides,
                ..
            } => circumradius * (PI / *sides as f64).cos(),
            ClosedCurve::Polyline { points } => {
                let c = self.center();
                let n = points.len();
                (0..n)
                    .map(|i| point_segment_distance(c, points[i], points[(i + 1) % n]))
                    .fold(f64::INFINITY, f64::min)
            }
        }
    }

    /// Distance from the center to the farthest point of the curve.
    pub fn circumradius(&self) -> f64 {
        match self {
            ClosedCurve::Circle { radius, .. } => *radius,
            ClosedCurve::RegularPolygon {
                circumradius,
                sides,
                corner_radius,
                ..
            } => {
                if *corner_radius <= 0.0 {
                    return *circumradius;
                }
                let half = PI / *sides as f64;
                let apothem = circumradius * half.cos();
                (apothem - corner_radius) / half.cos() + corner_radius
            }
            ClosedCurve::Polyline { points } => {
                let c = self.center();
                points
                    .iter()
                    .map(|p| ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt())
                    .fold(0.0, f64::max)
            }
        }
    }

    /// Corner points of polygonal curves (sharp corners for rounded polygons).
    /// Circles have none.
    pub fn vertices(&self) -> Vec<[f64; 2]> {
        match self {
            ClosedCurve::Circle { .. } => Vec::new(),
            ClosedCurve::RegularPolygon {
                center,
                circumradius,
                sides,
                ..
            } => (0..*sides)
                .map(|k| {
                    let a = 2.0 * PI * k as f64 / *sides as f64;
                    [
                        center[0] + circumradius * a.cos(),
                        center[1] + circumradius * a.sin(),
                    ]
                })
                .collect(),
            ClosedCurve::Polyline { points } => points.clone(),
        }
    }

    /// Number of boundary segments a kernel builds for this curve.
    pub fn segment_count(&self) -> usize {
        match self {
            ClosedCurve::Circle { .. } => 1,
            ClosedCurve::RegularPolygon {
                sides,
                corner_radius,
                ..
            } => {
                if *corner_radius > 0.0 {
                    2 * *sides as usize
                } else {
                    *sides as usize
                }
            }
            ClosedCurve::Polyline { points } => points.len(),
        }
    }

    /// True when the curve cannot bound a face: non-positive size, fewer
    /// than three polygon sides, or corners rounded past the side length.
    pub fn is_degenerate(&self) -> bool {
        match self {
            ClosedCurve::Circle { radius, .. } => *radius <= 0.0 || !radius.is_finite(),
            ClosedCurve::RegularPolygon {
                circumradius,
                sides,
                corner_radius,
                ..
            } => {
                if *sides < 3 || *circumradius <= 0.0 || !circumradius.is_finite() {
                    return true;
                }
                let half = PI / *sides as f64;
                let half_side = circumradius * half.sin();
                // tangent length of a corner arc must fit in half a side
                *corner_radius < 0.0 || corner_radius * half.tan() > half_side + 1e-12
            }
            ClosedCurve::Polyline { points } => {
                points.len() < 3 || shoelace_area(points).abs() < 1e-12
            }
        }
    }
}

/// A planar region: one outer boundary with optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub boundary: ClosedCurve,
    #[serde(default)]
    pub holes: Vec<ClosedCurve>,
}

impl Profile {
    pub fn new(boundary: ClosedCurve) -> Self {
        Self {
            boundary,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: ClosedCurve) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn area(&self) -> f64 {
        self.boundary.area() - self.holes.iter().map(|h| h.area()).sum::<f64>()
    }

    pub fn center(&self) -> [f64; 2] {
        self.boundary.center()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            boundary: self.boundary.translated(dx, dy),
            holes: self.holes.iter().map(|h| h.translated(dx, dy)).collect(),
        }
    }

    /// Conservative containment: the inner curve's circumscribed circle
    /// must fit inside the boundary's inscribed circle.
    pub fn contains(&self, inner: &ClosedCurve) -> bool {
        let a = self.boundary.center();
        let b = inner.center();
        let offset = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
        offset + inner.circumradius() <= self.boundary.inscribed_radius() + 1e-9
    }

    /// Narrowest material band between the boundary and any hole.
    /// Without holes this is the boundary's inscribed radius.
    pub fn wall_thickness(&self) -> f64 {
        let outer = self.boundary.inscribed_radius();
        let a = self.boundary.center();
        self.holes
            .iter()
            .map(|h| {
                let b = h.center();
                let offset = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
                outer - offset - h.circumradius()
            })
            .fold(outer, f64::min)
    }
}

/// Signed area of a 2D polygon (shoelace formula).
fn shoelace_area(pts: &[[f64; 2]]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i][0] * pts[j][1];
        area -= pts[j][0] * pts[i][1];
    }
    area / 2.0
}

fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len2 > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let d = [ap[0] - t * ab[0], ap[1] - t * ab[1]];
    (d[0] * d[0] + d[1] * d[1]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hexagon_inscribed_radius_is_apothem() {
        let hex = ClosedCurve::regular_polygon(20.0, 6);
        assert_relative_eq!(hex.inscribed_radius(), 20.0 * 3f64.sqrt() / 2.0, epsilon = 1e-12);
        assert_relative_eq!(hex.circumradius(), 20.0);
    }

    #[test]
    fn rounding_corners_keeps_flats_and_pulls_in_corners() {
        let sharp = ClosedCurve::regular_polygon(20.0, 6);
        let rounded = ClosedCurve::rounded_polygon(20.0, 6, 5.0);
        assert_relative_eq!(rounded.inscribed_radius(), sharp.inscribed_radius());
        assert!(rounded.circumradius() < 20.0);
        assert!(rounded.area() < sharp.area());
        assert_eq!(rounded.segment_count(), 12);
    }

    #[test]
    fn square_polyline_area_and_radii() {
        let sq = ClosedCurve::Polyline {
            points: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
        };
        assert_relative_eq!(sq.area(), 4.0);
        assert_relative_eq!(sq.inscribed_radius(), 1.0);
        assert_relative_eq!(sq.circumradius(), 2f64.sqrt());
    }

    #[test]
    fn annulus_wall_and_containment() {
        let ring = Profile::new(ClosedCurve::circle(5.75)).with_hole(ClosedCurve::circle(3.25));
        assert_relative_eq!(ring.wall_thickness(), 2.5);
        assert!(ring.contains(&ClosedCurve::circle(5.0)));
        assert!(!ring.contains(&ClosedCurve::circle(6.0)));
        assert_relative_eq!(ring.area(), PI * (5.75f64.powi(2) - 3.25f64.powi(2)));
    }

    #[test]
    fn degenerate_curves_detected() {
        assert!(ClosedCurve::circle(0.0).is_degenerate());
        assert!(ClosedCurve::circle(-1.0).is_degenerate());
        assert!(ClosedCurve::regular_polygon(1.0, 2).is_degenerate());
        assert!(ClosedCurve::rounded_polygon(10.0, 6, 20.0).is_degenerate());
        assert!(!ClosedCurve::rounded_polygon(10.0, 6, 2.5).is_degenerate());
    }
}
