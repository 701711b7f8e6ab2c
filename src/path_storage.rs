//! Path storage and curve flattening.
//!
//! A [`PathStorage`] records move/line/quad/cubic/close commands in absolute
//! coordinates. [`PathStorage::polygons`] flattens it into closed polygons
//! ready for the rasterizer. Curves are split into a step count derived from
//! the control polygon length, and each step is evaluated directly from the
//! Bernstein form so the output never depends on accumulated error.

use crate::basics::PointD;

/// Curve steps per pixel of control polygon length.
const CURVE_STEP_SCALE: f64 = 0.25;
const CURVE_MIN_STEPS: usize = 4;
const CURVE_MAX_STEPS: usize = 256;

/// A single path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCmd {
    MoveTo(PointD),
    LineTo(PointD),
    QuadTo(PointD, PointD),
    CubicTo(PointD, PointD, PointD),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStorage {
    cmds: Vec<PathCmd>,
}

impl PathStorage {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn remove_all(&mut self) {
        self.cmds.clear();
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    // ---------------------------------------------------------------
    // Path construction
    // ---------------------------------------------------------------

    pub fn move_to(&mut self, p: PointD) -> &mut Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: PointD) -> &mut Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, ctrl: PointD, to: PointD) -> &mut Self {
        self.cmds.push(PathCmd::QuadTo(ctrl, to));
        self
    }

    pub fn cubic_to(&mut self, ctrl1: PointD, ctrl2: PointD, to: PointD) -> &mut Self {
        self.cmds.push(PathCmd::CubicTo(ctrl1, ctrl2, to));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    /// A closed polygon path through `points`.
    pub fn from_polygon(points: &[PointD]) -> Self {
        let mut path = Self::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            path.close();
        }
        path
    }

    // ---------------------------------------------------------------
    // Flattening
    // ---------------------------------------------------------------

    /// Flatten into closed polygons. Every contour is implicitly closed;
    /// contours with fewer than three points are dropped.
    pub fn polygons(&self) -> Vec<Vec<PointD>> {
        let mut out = Vec::new();
        let mut contour: Vec<PointD> = Vec::new();
        let mut last = PointD::default();

        let finish = |contour: &mut Vec<PointD>, out: &mut Vec<Vec<PointD>>| {
            if contour.len() >= 3 {
                out.push(std::mem::take(contour));
            } else {
                contour.clear();
            }
        };

        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    finish(&mut contour, &mut out);
                    contour.push(p);
                    last = p;
                }
                PathCmd::LineTo(p) => {
                    if contour.is_empty() {
                        contour.push(last);
                    }
                    contour.push(p);
                    last = p;
                }
                PathCmd::QuadTo(c, p) => {
                    if contour.is_empty() {
                        contour.push(last);
                    }
                    flatten_quad(last, c, p, &mut contour);
                    last = p;
                }
                PathCmd::CubicTo(c1, c2, p) => {
                    if contour.is_empty() {
                        contour.push(last);
                    }
                    flatten_cubic(last, c1, c2, p, &mut contour);
                    last = p;
                }
                PathCmd::Close => {
                    if let Some(&start) = contour.first() {
                        last = start;
                    }
                    finish(&mut contour, &mut out);
                }
            }
        }
        finish(&mut contour, &mut out);
        out
    }
}

#[inline]
fn distance(a: PointD, b: PointD) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

fn curve_steps(len: f64) -> usize {
    if !len.is_finite() {
        return CURVE_MIN_STEPS;
    }
    ((len * CURVE_STEP_SCALE).round() as usize).clamp(CURVE_MIN_STEPS, CURVE_MAX_STEPS)
}

/// Append the points of a quadratic curve after `p0` (exclusive) up to `p2`.
pub fn flatten_quad(p0: PointD, p1: PointD, p2: PointD, out: &mut Vec<PointD>) {
    let n = curve_steps(distance(p0, p1) + distance(p1, p2));
    for i in 1..n {
        let t = i as f64 / n as f64;
        let mt = 1.0 - t;
        let a = mt * mt;
        let b = 2.0 * mt * t;
        let c = t * t;
        out.push(PointD::new(
            a * p0.x + b * p1.x + c * p2.x,
            a * p0.y + b * p1.y + c * p2.y,
        ));
    }
    out.push(p2);
}

/// Append the points of a cubic curve after `p0` (exclusive) up to `p3`.
pub fn flatten_cubic(p0: PointD, p1: PointD, p2: PointD, p3: PointD, out: &mut Vec<PointD>) {
    let n = curve_steps(distance(p0, p1) + distance(p1, p2) + distance(p2, p3));
    for i in 1..n {
        let t = i as f64 / n as f64;
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        out.push(PointD::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        ));
    }
    out.push(p3);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_has_no_polygons() {
        assert!(PathStorage::new().polygons().is_empty());
    }

    #[test]
    fn test_from_polygon() {
        let pts = [
            PointD::new(0.0, 0.0),
            PointD::new(10.0, 0.0),
            PointD::new(0.0, 10.0),
        ];
        let path = PathStorage::from_polygon(&pts);
        assert_eq!(path.commands().len(), 4);
        assert_eq!(path.polygons(), vec![pts.to_vec()]);
    }

    #[test]
    fn test_quad_flattening_ends_at_target() {
        let mut path = PathStorage::new();
        path.move_to(PointD::new(0.0, 0.0))
            .quad_to(PointD::new(50.0, 100.0), PointD::new(100.0, 0.0))
            .close();
        let polys = path.polygons();
        assert_eq!(polys.len(), 1);
        let poly = &polys[0];
        assert!(poly.len() > CURVE_MIN_STEPS);
        assert_eq!(*poly.last().unwrap(), PointD::new(100.0, 0.0));
        // Apex of the symmetric curve at t = 0.5.
        assert!(poly.iter().any(|p| (p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9));
    }

    #[test]
    fn test_cubic_step_count_is_bounded() {
        let mut out = Vec::new();
        flatten_cubic(
            PointD::new(0.0, 0.0),
            PointD::new(1e6, 0.0),
            PointD::new(-1e6, 1e6),
            PointD::new(5.0, 5.0),
            &mut out,
        );
        assert_eq!(out.len(), CURVE_MAX_STEPS);
        assert_eq!(*out.last().unwrap(), PointD::new(5.0, 5.0));
    }

    #[test]
    fn test_flattening_is_deterministic() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let p = [
            PointD::new(3.0, 7.0),
            PointD::new(400.0, -20.0),
            PointD::new(-30.0, 500.0),
            PointD::new(250.0, 250.0),
        ];
        flatten_cubic(p[0], p[1], p[2], p[3], &mut a);
        flatten_cubic(p[0], p[1], p[2], p[3], &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_contours_dropped() {
        let mut path = PathStorage::new();
        path.move_to(PointD::new(0.0, 0.0))
            .line_to(PointD::new(1.0, 1.0))
            .move_to(PointD::new(5.0, 5.0))
            .line_to(PointD::new(9.0, 5.0))
            .line_to(PointD::new(9.0, 9.0));
        let polys = path.polygons();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0][0], PointD::new(5.0, 5.0));
    }
}
