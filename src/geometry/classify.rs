use super::line::{intersect_raw, Line};
use crate::ids::LineId;

/// Nine-way classification of a feature (a segment or portal's own
/// line, restricted to its `[t_start, t_end]` interval) against a
/// splitter line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitClass {
    /// On the splitter's own line.
    Col,
    /// Parallel to the splitter, entirely left.
    LParal,
    /// Parallel to the splitter, entirely right.
    RParal,
    /// Crosses the splitter's line; the far (`t_end`) half resolves left.
    SFl,
    /// Crosses the splitter's line; the far (`t_end`) half resolves right.
    SFr,
    /// Whole feature left, oriented "facing left" (`denom < 0`).
    LFl,
    /// Whole feature left, oriented "facing right" (`denom >= 0`).
    LFr,
    /// Whole feature right, oriented "facing left" (`denom < 0`).
    RFl,
    /// Whole feature right, oriented "facing right" (`denom >= 0`).
    RFr,
}

impl SplitClass {
    pub fn is_left(self) -> bool {
        matches!(self, SplitClass::LParal | SplitClass::LFl | SplitClass::LFr)
    }

    pub fn is_right(self) -> bool {
        matches!(self, SplitClass::RParal | SplitClass::RFl | SplitClass::RFr)
    }

    pub fn is_split(self) -> bool {
        matches!(self, SplitClass::SFl | SplitClass::SFr)
    }
}

/// Classify `feature` (with its own line id/geometry and `[t_start,
/// t_end]` interval) against `splitter`. Returns the classification and,
/// for `SFl`/`SFr` only, the crossing parameter on `feature`'s own line.
pub fn classify(
    splitter_id: LineId,
    splitter: &Line,
    feature_id: LineId,
    feature: &Line,
    t_start: f64,
    t_end: f64,
    eps: f64,
) -> (SplitClass, Option<f64>) {
    if feature_id == splitter_id {
        return (SplitClass::Col, None);
    }

    let (numer, denom) = intersect_raw(splitter, feature);

    if denom == 0 {
        if numer == 0 {
            // Distinct Line ids that are nonetheless geometrically
            // collinear; treat as on-line rather than parallel.
            return (SplitClass::Col, None);
        }
        return if numer > 0 {
            (SplitClass::LParal, None)
        } else {
            (SplitClass::RParal, None)
        };
    }

    let t = numer as f64 / denom as f64;

    if t > t_start + eps && t < t_end - eps {
        let class = if denom < 0 { SplitClass::SFl } else { SplitClass::SFr };
        return (class, Some(t));
    }

    let middle = (t_start + t_end) * 0.5;
    let faces_left = denom < 0;
    let middle_after = middle > t;
    let class = match (faces_left, middle_after) {
        (true, true) => SplitClass::LFl,
        (true, false) => SplitClass::RFl,
        (false, true) => SplitClass::RFr,
        (false, false) => SplitClass::LFr,
    };
    (class, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::IPoint;

    #[test]
    fn perpendicular_crossing_splits() {
        let splitter_id = LineId(0);
        let feature_id = LineId(1);
        let splitter = Line::new(IPoint::new(0, 0), IPoint::new(0, 10));
        let feature = Line::new(IPoint::new(-5, 5), IPoint::new(5, 5));
        let (class, t) = classify(splitter_id, &splitter, feature_id, &feature, 0.0, 1.0, 0.0625);
        assert!(class.is_split());
        assert!(t.is_some());
    }

    #[test]
    fn wholly_left_segment_is_left() {
        let splitter_id = LineId(0);
        let feature_id = LineId(1);
        let splitter = Line::new(IPoint::new(0, 0), IPoint::new(0, 10));
        let feature = Line::new(IPoint::new(-5, 0), IPoint::new(-5, 10));
        let (class, t) = classify(splitter_id, &splitter, feature_id, &feature, 0.0, 1.0, 0.0625);
        assert!(class.is_left());
        assert!(t.is_none());
    }

    #[test]
    fn same_line_is_collinear() {
        let id = LineId(0);
        let line = Line::new(IPoint::new(0, 0), IPoint::new(10, 0));
        let (class, _) = classify(id, &line, id, &line, 0.0, 1.0, 0.0625);
        assert_eq!(class, SplitClass::Col);
    }
}
