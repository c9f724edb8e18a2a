//! Polyline helpers shared by the store and the snap resolver.

use kurbo::Point;

/// Total length of a polyline. Zero for fewer than two points.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Index and value of the point nearest to `target`. The first candidate wins ties.
pub fn nearest<I>(target: Point, candidates: I) -> Option<(usize, Point)>
where
    I: IntoIterator<Item = Point>,
{
    let mut best: Option<(usize, Point, f64)> = None;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let dist = candidate.distance(target);
        if best.is_none_or(|(_, _, best_dist)| dist < best_dist) {
            best = Some((i, candidate, dist));
        }
    }
    best.map(|(i, p, _)| (i, p))
}
