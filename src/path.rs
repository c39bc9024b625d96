// MIT/Apache2 License

use lyon_geom::{Arc, LineSegment, Point};
use lyon_path::{Path, PathEvent};

/// Maximum distance between an arc and the polyline standing in for it.
pub(crate) const TOLERANCE: f32 = 0.1;

/// Simple combinator to turn a flat path into lines.
#[inline]
pub(crate) fn path_to_lines(
    i: impl IntoIterator<Item = PathEvent>,
) -> impl Iterator<Item = LineSegment<f32>> {
    i.into_iter().filter_map(|pe| match pe {
        PathEvent::Line { from, to } => Some(LineSegment { from, to }),
        PathEvent::End {
            last,
            first,
            close: true,
        } => Some(LineSegment {
            from: last,
            to: first,
        }),
        _ => None,
    })
}

/// Turn a flat path into the points of a polygon.
#[inline]
pub(crate) fn path_to_points(
    i: impl IntoIterator<Item = PathEvent>,
) -> impl Iterator<Item = Point<f32>> {
    i.into_iter().filter_map(|pe| match pe {
        PathEvent::Begin { at } => Some(at),
        PathEvent::Line { to, .. } => Some(to),
        _ => None,
    })
}

/// Flatten an arc into an open path.
#[inline]
pub(crate) fn path_from_arc(arc: Arc<f32>) -> Path {
    let mut builder = Path::builder();
    builder.begin(arc.from());
    for point in arc.flattened(TOLERANCE) {
        builder.line_to(point);
    }
    builder.end(false);
    builder.build()
}
