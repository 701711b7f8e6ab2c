//! Drawing commands and their outlines.

use crate::basics::{BoxI, PointD, RectD, RectI};
use crate::glyph_raster_bin::RasterFont;
use crate::path_storage::PathStorage;

/// A run of text placed with its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub origin: PointD,
    pub text: String,
}

/// A single fill operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FillRectI(RectI),
    FillRectD(RectD),
    FillTriangle([PointD; 3]),
    FillPolygon(Vec<PointD>),
    /// Start point, control point, end point; closed back to the start.
    FillPathQuad([PointD; 3]),
    /// Start point, two control points, end point; closed back to the start.
    FillPathCubic([PointD; 4]),
    FillText { font_size: f64, runs: Vec<TextRun> },
}

/// Geometry to rasterize for a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Empty,
    /// Pixel-aligned box; every covered pixel has full coverage.
    Box(BoxI),
    Polygons(Vec<Vec<PointD>>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::FillRectI(_) => "FillRectI",
            Command::FillRectD(_) => "FillRectD",
            Command::FillTriangle(_) => "FillTriangle",
            Command::FillPolygon(_) => "FillPolygon",
            Command::FillPathQuad(_) => "FillPathQuad",
            Command::FillPathCubic(_) => "FillPathCubic",
            Command::FillText { .. } => "FillText",
        }
    }

    pub fn outline(&self) -> Outline {
        match self {
            Command::FillRectI(r) => {
                if r.w <= 0 || r.h <= 0 {
                    return Outline::Empty;
                }
                Outline::Box(BoxI::new(
                    r.x,
                    r.y,
                    r.x.saturating_add(r.w),
                    r.y.saturating_add(r.h),
                ))
            }
            Command::FillRectD(r) => {
                if !(r.w > 0.0 && r.h > 0.0) {
                    return Outline::Empty;
                }
                polygons(vec![vec![
                    PointD::new(r.x, r.y),
                    PointD::new(r.x + r.w, r.y),
                    PointD::new(r.x + r.w, r.y + r.h),
                    PointD::new(r.x, r.y + r.h),
                ]])
            }
            Command::FillTriangle(pts) => polygons(vec![pts.to_vec()]),
            Command::FillPolygon(pts) => polygons(vec![pts.clone()]),
            Command::FillPathQuad([p0, p1, p2]) => {
                let mut path = PathStorage::new();
                path.move_to(*p0).quad_to(*p1, *p2).close();
                polygons(path.polygons())
            }
            Command::FillPathCubic([p0, p1, p2, p3]) => {
                let mut path = PathStorage::new();
                path.move_to(*p0).cubic_to(*p1, *p2, *p3).close();
                polygons(path.polygons())
            }
            Command::FillText { font_size, runs } => {
                let font = RasterFont::new(*font_size);
                polygons(
                    runs.iter()
                        .flat_map(|run| font.text_polygons(&run.text, run.origin))
                        .collect(),
                )
            }
        }
    }
}

/// Keep polygons with at least three finite points.
fn polygons(mut list: Vec<Vec<PointD>>) -> Outline {
    list.retain(|p| p.len() >= 3 && p.iter().all(|v| v.x.is_finite() && v.y.is_finite()));
    if list.is_empty() {
        Outline::Empty
    } else {
        Outline::Polygons(list)
    }
}

fn write_points(f: &mut std::fmt::Formatter<'_>, pts: &[PointD]) -> std::fmt::Result {
    for (i, p) in pts.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", p.x, p.y)?;
    }
    Ok(())
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())?;
        f.write_str("(")?;
        match self {
            Command::FillRectI(r) => write!(f, "{}, {}, {}, {}", r.x, r.y, r.w, r.h)?,
            Command::FillRectD(r) => write!(f, "{}, {}, {}, {}", r.x, r.y, r.w, r.h)?,
            Command::FillTriangle(pts) => write_points(f, pts)?,
            Command::FillPolygon(pts) => write_points(f, pts)?,
            Command::FillPathQuad(pts) => write_points(f, pts)?,
            Command::FillPathCubic(pts) => write_points(f, pts)?,
            Command::FillText { font_size, runs } => {
                write!(f, "size={}", font_size)?;
                for run in runs {
                    write!(f, ", {} {} {:?}", run.origin.x, run.origin.y, run.text)?;
                }
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_i_outline_is_box() {
        let cmd = Command::FillRectI(RectI::new(1, 2, 3, 4));
        assert_eq!(cmd.outline(), Outline::Box(BoxI::new(1, 2, 4, 6)));
        assert_eq!(cmd.to_string(), "FillRectI(1, 2, 3, 4)");
    }

    #[test]
    fn test_empty_rects() {
        assert_eq!(Command::FillRectI(RectI::new(1, 2, 0, 4)).outline(), Outline::Empty);
        assert_eq!(
            Command::FillRectD(RectD::new(1.0, 2.0, 3.0, f64::NAN)).outline(),
            Outline::Empty
        );
    }

    #[test]
    fn test_rect_d_outline() {
        let cmd = Command::FillRectD(RectD::new(0.5, 0.5, 2.0, 1.0));
        match cmd.outline() {
            Outline::Polygons(p) => {
                assert_eq!(p.len(), 1);
                assert_eq!(p[0][2], PointD::new(2.5, 1.5));
            }
            other => panic!("unexpected outline {:?}", other),
        }
    }

    #[test]
    fn test_quad_outline_is_closed_polygon() {
        let cmd = Command::FillPathQuad([
            PointD::new(0.0, 0.0),
            PointD::new(100.0, 200.0),
            PointD::new(200.0, 0.0),
        ]);
        match cmd.outline() {
            Outline::Polygons(p) => {
                assert_eq!(p.len(), 1);
                assert_eq!(p[0][0], PointD::new(0.0, 0.0));
                assert_eq!(*p[0].last().unwrap(), PointD::new(200.0, 0.0));
            }
            other => panic!("unexpected outline {:?}", other),
        }
    }

    #[test]
    fn test_text_display_and_outline() {
        let cmd = Command::FillText {
            font_size: 20.0,
            runs: vec![TextRun {
                origin: PointD::new(10.0, 40.0),
                text: "Ab1!".to_string(),
            }],
        };
        assert_eq!(cmd.to_string(), "FillText(size=20, 10 40 \"Ab1!\")");
        assert!(matches!(cmd.outline(), Outline::Polygons(_)));
    }

    #[test]
    fn test_blank_text_is_empty() {
        let cmd = Command::FillText {
            font_size: 20.0,
            runs: vec![TextRun {
                origin: PointD::new(0.0, 0.0),
                text: "    ".to_string(),
            }],
        };
        assert_eq!(cmd.outline(), Outline::Empty);
    }

    #[test]
    fn test_triangle_display() {
        let cmd = Command::FillTriangle([
            PointD::new(1.0, 2.0),
            PointD::new(3.5, 4.0),
            PointD::new(5.0, 6.25),
        ]);
        assert_eq!(cmd.to_string(), "FillTriangle(1 2, 3.5 4, 5 6.25)");
    }
}
