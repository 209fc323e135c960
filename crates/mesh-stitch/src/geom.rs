//! Planes, axis-aligned projections, bounding boxes, and the angular
//! predicates used by complex-edge resolution.

use nalgebra::{Point2, Point3, Vector3};

/// A plane in Hessian normal form: `dot(normal, p) = offset` for points `p`
/// on the plane. `normal` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Create a plane from a unit normal and a point on the plane.
    #[inline]
    pub fn from_point_normal(point: &Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            offset: normal.dot(&point.coords),
            normal,
        }
    }

    /// Signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }
}

/// The coordinate axis a face projection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The axis with the largest absolute component of `v`.
    pub fn dominant(v: &Vector3<f64>) -> Axis {
        let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
        if az >= ax && az >= ay {
            Axis::Z
        } else if ay >= ax {
            Axis::Y
        } else {
            Axis::X
        }
    }
}

/// An axis-aligned drop from 3D to 2D, chosen per face so that the projected
/// polygon is simple and has positive signed area.
///
/// The in-plane coordinate order follows the right-handed cyclic convention
/// (drop Z -> `(x, y)`, drop X -> `(y, z)`, drop Y -> `(z, x)`); when the
/// face normal points along the negative axis the two coordinates are swapped
/// so that counter-clockwise loops stay counter-clockwise after projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub axis: Axis,
    /// True when the face normal points along the negative `axis` direction.
    pub flip: bool,
}

impl Projection {
    /// Choose the projection for a face with the given (unit) normal.
    pub fn for_normal(normal: &Vector3<f64>) -> Self {
        let axis = Axis::dominant(normal);
        let component = match axis {
            Axis::X => normal.x,
            Axis::Y => normal.y,
            Axis::Z => normal.z,
        };
        Self {
            axis,
            flip: component < 0.0,
        }
    }

    /// Project a 3D point into the face's 2D coordinate system.
    #[inline]
    pub fn project(&self, p: &Point3<f64>) -> Point2<f64> {
        let (u, v) = match self.axis {
            Axis::X => (p.y, p.z),
            Axis::Y => (p.z, p.x),
            Axis::Z => (p.x, p.y),
        };
        if self.flip {
            Point2::new(v, u)
        } else {
            Point2::new(u, v)
        }
    }

    /// Lift a 2D point back onto the plane, reconstructing the dropped
    /// coordinate from the plane equation.
    ///
    /// The plane's normal must have a non-zero component along the dropped
    /// axis; this holds for any plane whose projection was chosen by
    /// [`Projection::for_normal`].
    pub fn unproject(&self, q: &Point2<f64>, plane: &Plane) -> Point3<f64> {
        let (u, v) = if self.flip { (q.y, q.x) } else { (q.x, q.y) };
        let n = &plane.normal;
        let d = plane.offset;
        match self.axis {
            Axis::X => {
                let x = (d - n.y * u - n.z * v) / n.x;
                Point3::new(x, u, v)
            }
            Axis::Y => {
                let y = (d - n.z * u - n.x * v) / n.y;
                Point3::new(v, y, u)
            }
            Axis::Z => {
                let z = (d - n.x * u - n.y * v) / n.z;
                Point3::new(u, v, z)
            }
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// An empty box that unions as the identity.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// True if no point has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow the box to contain `p`.
    pub fn grow(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grow the box to contain another box.
    pub fn union(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.grow(&other.min);
            self.grow(&other.max);
        }
    }
}

/// Area-weighted normal of a vertex loop via Newell's method, computed
/// relative to the loop centroid for numerical robustness. The result is
/// unnormalized; its magnitude is twice the loop's area.
///
/// Tolerates mildly non-planar loops; returns the zero vector for collinear
/// or coincident input.
pub fn newell_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    let n = positions.len();
    if n < 3 {
        return Vector3::zeros();
    }

    let centroid = loop_centroid(positions);
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = positions[i] - centroid;
        let b = positions[(i + 1) % n] - centroid;
        normal += a.cross(&b);
    }
    normal
}

/// Mean of a vertex loop's positions.
pub fn loop_centroid(positions: &[Point3<f64>]) -> Point3<f64> {
    let mut sum = Vector3::zeros();
    for p in positions {
        sum += p.coords;
    }
    Point3::from(sum / positions.len() as f64)
}

/// Counter-clockwise angle of `dir` about `axis`, measured from `base`, in
/// `[0, 2*pi)`. Both `base` and `dir` are projected into the plane
/// perpendicular to `axis` before the angle is taken; `axis` must be unit
/// length.
///
/// This is the single authoritative ordering used when sorting faces around
/// a shared edge; ties are broken structurally by the caller.
pub fn ccw_angle_about(axis: &Vector3<f64>, base: &Vector3<f64>, dir: &Vector3<f64>) -> f64 {
    let u = base - axis * base.dot(axis);
    let w = dir - axis * dir.dot(axis);
    let x = u.dot(&w);
    let y = axis.dot(&u.cross(&w));
    let angle = y.atan2(x);
    if angle < 0.0 {
        angle + 2.0 * std::f64::consts::PI
    } else {
        angle
    }
}

/// Parameter of the orthogonal projection of `p` onto the segment `a -> b`,
/// together with the distance from `p` to the segment's supporting line.
/// Returns `None` for a zero-length segment.
pub fn project_onto_segment(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> Option<(f64, f64)> {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq <= f64::EPSILON {
        return None;
    }
    let t = (p - a).dot(&d) / len_sq;
    let closest = a + d * t;
    Some((t, (p - closest).norm()))
}
