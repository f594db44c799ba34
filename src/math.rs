use nalgebra as na;

use crate::point::Point;

/// Angle in degrees between two displacement vectors.
///
/// Returns `None` when either vector is not longer than `min_norm`, short
/// vectors carry no usable direction.
pub fn angle_between(v1: &na::Vector2<f64>, v2: &na::Vector2<f64>, min_norm: f64) -> Option<f64> {
    let (n1, n2) = (v1.norm(), v2.norm());

    if !(n1 > min_norm && n2 > min_norm) {
        return None;
    }

    let cos = (v1.dot(v2) / (n1 * n2)).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();

    angle.is_finite().then_some(angle)
}

/// Centered moving average over `window` points, clamped at both ends.
///
/// Frame tags are carried over from the original points.
pub fn moving_average(points: &[Point], window: usize) -> Vec<Point> {
    let half = window / 2;

    if half == 0 || points.len() < 2 {
        return points.to_vec();
    }

    (0..points.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(points.len() - 1);
            let span = &points[lo..=hi];

            let sum = span
                .iter()
                .fold(na::Vector2::<f64>::zeros(), |acc, p| acc + p.coords());
            let mean = sum / span.len() as f64;

            Point {
                x: mean.x,
                y: mean.y,
                frame: points[i].frame,
            }
        })
        .collect()
}

/// Per-axis mean of consecutive displacements, zero for fewer than 2 points.
pub fn mean_delta(points: &[Point]) -> na::Vector2<f64> {
    if points.len() < 2 {
        return na::Vector2::zeros();
    }

    let sum = points
        .windows(2)
        .fold(na::Vector2::<f64>::zeros(), |acc, w| acc + w[0].delta(&w[1]));

    sum / (points.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn right_angle() {
        let a = angle_between(&na::Vector2::new(10.0, 0.0), &na::Vector2::new(0.0, 10.0), 0.1);
        assert_relative_eq!(a.unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_vectors() {
        let v = na::Vector2::new(1.0, 1.0);
        assert_relative_eq!(angle_between(&v, &(v * 3.0), 0.1).unwrap(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(angle_between(&v, &(-v), 0.1).unwrap(), 180.0, epsilon = 1e-6);
    }

    #[test]
    fn short_vectors_have_no_angle() {
        let zero = na::Vector2::zeros();
        let v = na::Vector2::new(5.0, 0.0);
        assert_eq!(angle_between(&zero, &v, 0.1), None);
        assert_eq!(angle_between(&v, &na::Vector2::new(0.05, 0.05), 0.1), None);
    }

    #[test]
    fn smoothing_clamps_at_edges() {
        let points = vec![
            Point::at(0.0, 0.0, 0),
            Point::at(3.0, 0.0, 1),
            Point::at(6.0, 3.0, 2),
        ];

        let smooth = moving_average(&points, 3);

        assert_eq!(smooth.len(), 3);
        assert_relative_eq!(smooth[0].x, 1.5);
        assert_relative_eq!(smooth[1].x, 3.0);
        assert_relative_eq!(smooth[1].y, 1.0);
        assert_relative_eq!(smooth[2].x, 4.5);
        assert_eq!(smooth[2].frame, Some(2));
    }

    #[test]
    fn mean_of_deltas() {
        let points = vec![
            Point::at(0.0, 0.0, 0),
            Point::at(10.0, 0.0, 1),
            Point::at(10.0, 10.0, 2),
        ];

        assert_eq!(mean_delta(&points), na::Vector2::new(5.0, 5.0));
        assert_eq!(mean_delta(&points[..1]), na::Vector2::zeros());
    }
}
