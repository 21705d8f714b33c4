use crate::geometry::{Line, Point};
use crate::portals::Portal;

/// A directed line through two floating-point points, used for the
/// frustum's bounding edges (portal endpoints rarely land on integer
/// coordinates once resolved through a chain of splitters).
#[derive(Debug, Clone, Copy)]
struct GLine {
    a: Point,
    b: Point,
}

impl GLine {
    fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    fn raw_cross(&self, p: Point) -> f64 {
        let dx = self.b.x - self.a.x;
        let dy = self.b.y - self.a.y;
        dx * (p.y - self.a.y) - dy * (p.x - self.a.x)
    }
}

/// The open wedge bounded by two lines through the entry and exit
/// portal endpoint pairs. `inside` is the convention `cross > 0` for
/// both bounding lines.
#[derive(Debug, Clone)]
pub struct Frustum {
    lines: [GLine; 2],
}

impl Frustum {
    /// Build the frustum that continues a DFS walk from `entry` through
    /// `exit`, pairing endpoints so the two bounding segments don't
    /// cross, and orienting both lines to a shared "inside" convention.
    pub fn build(entry: &Portal, exit: &Portal, lines_table: &[Line]) -> Self {
        let entry_line = lines_table[entry.line.index()];
        let exit_line = lines_table[exit.line.index()];

        let e_start = entry_line.point_at(entry.t_start);
        let e_end = entry_line.point_at(entry.t_end);
        let mut x_start = exit_line.point_at(exit.t_start);
        let mut x_end = exit_line.point_at(exit.t_end);

        let v1 = (x_start.x - e_start.x, x_start.y - e_start.y);
        let v2 = (x_end.x - e_end.x, x_end.y - e_end.y);
        if v1.0 * v2.0 + v1.1 * v2.1 > 0.0 {
            std::mem::swap(&mut x_start, &mut x_end);
        }

        let line_a = GLine::new(e_start, x_start);
        let mut line_b = GLine::new(e_end, x_end);
        if line_b.raw_cross(x_start) <= 0.0 {
            line_b = GLine::new(x_end, e_end);
        }

        Frustum { lines: [line_a, line_b] }
    }

    /// Narrow `[t_start, t_end]` on `line` to the portion inside this
    /// frustum, or `None` if the portal is entirely outside it.
    pub fn crop(&self, line: &Line, mut t_start: f64, mut t_end: f64, eps: f64) -> Option<(f64, f64)> {
        for fline in &self.lines {
            match crossing_param(line, fline) {
                None => {
                    let mid = (t_start + t_end) * 0.5;
                    let p = line.point_at(mid);
                    if fline.raw_cross(p) <= 0.0 {
                        return None;
                    }
                }
                Some(t) => {
                    let p_start = line.point_at(t_start);
                    if fline.raw_cross(p_start) > 0.0 {
                        t_end = t_end.min(t);
                    } else {
                        t_start = t_start.max(t);
                    }
                }
            }
            if t_start > t_end + eps {
                return None;
            }
        }
        Some((t_start, t_end))
    }
}

/// Parameter (on `line`'s own parameterization) where `line` crosses
/// the floating-point bounding line `fline`, or `None` if parallel.
fn crossing_param(line: &Line, fline: &GLine) -> Option<f64> {
    let (ax, ay) = (line.a.x as f64, line.a.y as f64);
    let (bx, by) = (line.b.x as f64, line.b.y as f64);
    let dx = fline.b.x - fline.a.x;
    let dy = fline.b.y - fline.a.y;
    let denom = dx * (by - ay) - dy * (bx - ax);
    if denom.abs() < 1e-12 {
        return None;
    }
    let numer = dx * (ay - fline.a.y) - dy * (ax - fline.a.x);
    Some(-numer / denom)
}
