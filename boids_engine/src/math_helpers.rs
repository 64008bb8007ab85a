use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::agent::Agent;

pub fn distance_agent(a1: &Agent, a2: &Agent) -> f32 {
    simple_distance(
        a1.position().x,
        a2.position().x,
        a1.position().y,
        a2.position().y,
    )
}

pub fn simple_distance(x1: f32, x2: f32, y1: f32, y2: f32) -> f32 {
    simple_distance_sq(x1, x2, y1, y2).sqrt()
}

pub fn simple_distance_sq(x1: f32, x2: f32, y1: f32, y2: f32) -> f32 {
    (x1 - x2).powi(2) + (y1 - y2).powi(2)
}

/// Heading of a velocity vector as used by the triangle renderer.
///
/// `atan2(-vx, vy) + π/2` points the triangle's tip along the velocity. For
/// non-zero vectors it agrees with `atan2(vy, vx)` modulo 2π, but the range is
/// `[-π/2, 3π/2]`, so callers comparing angles should do so modulo 2π.
#[inline]
pub fn heading_of(vx: f32, vy: f32) -> f32 {
    (-vx).atan2(vy) + FRAC_PI_2
}

/// Unit vector pointing along `heading`.
#[inline]
pub fn heading_unit(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Wraps a coordinate onto `[0, bound)`.
///
/// Values already inside the range come back untouched, `bound + e` maps to
/// `e` and `-e` maps to `bound - e`.
#[inline]
pub fn wrap_coordinate(value: f32, bound: f32) -> f32 {
    if (0. ..bound).contains(&value) {
        return value;
    }

    let wrapped = value.rem_euclid(bound);
    // rem_euclid of a tiny negative value rounds up to `bound` itself
    if wrapped >= bound {
        0.
    } else {
        wrapped
    }
}

/// Clamps a coordinate onto `[0, bound]`.
#[inline]
pub fn clamp_coordinate(value: f32, bound: f32) -> f32 {
    value.clamp(0., bound)
}

/// Returns the maximum of the given values, or `None` for an empty iterator.
pub fn max_f32<I: IntoIterator<Item = f32>>(values: I) -> Option<f32> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::{clamp_coordinate, heading_of, heading_unit, max_f32, simple_distance, wrap_coordinate};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn simple_distance_is_euclidean() {
        assert_eqf32!(simple_distance(0., 3., 0., 4.), 5.);
        assert_eqf32!(simple_distance(-1., -1., 2., 2.), 0.);
    }

    #[rstest]
    #[case(1., 0., 0.)]
    #[case(0., 1., FRAC_PI_2)]
    #[case(-1., 0., PI)]
    #[case(0., -1., -FRAC_PI_2)]
    fn heading_follows_render_convention(#[case] vx: f32, #[case] vy: f32, #[case] expected: f32) {
        assert_eqf32!(heading_of(vx, vy), expected);
    }

    #[test]
    fn heading_unit_round_trips_direction() {
        let heading = heading_of(3., 4.);
        let unit = heading_unit(heading);

        assert_eqf32!(unit.x, 0.6);
        assert_eqf32!(unit.y, 0.8);
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(500., 500.)]
    #[case(999.5, 999.5)]
    #[case(1000., 0.)]
    #[case(1000.5, 0.5)]
    #[case(-0.5, 999.5)]
    #[case(2250., 250.)]
    fn wrap_coordinate_cases(#[case] value: f32, #[case] expected: f32) {
        assert_eqf32!(wrap_coordinate(value, 1000.), expected);
    }

    #[test]
    fn wrap_coordinate_tiny_negative_stays_in_range() {
        let wrapped = wrap_coordinate(-1e-9, 1920.);

        assert!(wrapped >= 0. && wrapped < 1920.);
    }

    #[test]
    fn wrap_coordinate_inside_range_is_bitwise_noop() {
        let value = 123.456_f32;

        assert_eq!(wrap_coordinate(value, 1080.).to_bits(), value.to_bits());
    }

    #[rstest]
    #[case(-3., 0.)]
    #[case(40., 40.)]
    #[case(100., 100.)]
    #[case(130., 100.)]
    fn clamp_coordinate_cases(#[case] value: f32, #[case] expected: f32) {
        assert_eqf32!(clamp_coordinate(value, 100.), expected);
    }

    #[test]
    fn max_f32_picks_largest() {
        assert_eq!(max_f32([15., 100., 50.]), Some(100.));
        assert_eq!(max_f32(Vec::<f32>::new()), None);
    }
}
