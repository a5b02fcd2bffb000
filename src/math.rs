//! Vector helpers for 3D positions
//!
//! Positions, velocities and accelerations are plain `[f32; 3]` arrays so they can be
//! handed to a renderer without conversion.

/// A point or direction in 3D space
pub type Vec3 = [f32; 3];

/// The origin
pub const ZERO: Vec3 = [0.0, 0.0, 0.0];

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn neg(v: Vec3) -> Vec3 {
    [-v[0], -v[1], -v[2]]
}

pub fn length_squared(v: Vec3) -> f32 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

pub fn length(v: Vec3) -> f32 {
    length_squared(v).sqrt()
}

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    length(sub(a, b))
}

/// Scale `v` down so its length does not exceed `max`
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let len_sq = length_squared(v);
    if len_sq > max * max {
        scale(v, max / len_sq.sqrt())
    } else {
        v
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

pub fn is_finite(v: Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Arithmetic mean of a set of points (origin for an empty set)
pub fn mean<I>(points: I) -> Vec3
where
    I: IntoIterator<Item = Vec3>,
{
    let mut sum = ZERO;
    let mut count = 0usize;
    for p in points {
        sum = add(sum, p);
        count += 1;
    }
    if count == 0 {
        ZERO
    } else {
        scale(sum, 1.0 / count as f32)
    }
}

/// Point on a horizontal ring (XZ plane) around `center`
pub fn ring_point(center: Vec3, radius: f32, angle: f32) -> Vec3 {
    [
        center[0] + radius * angle.cos(),
        center[1],
        center[2] + radius * angle.sin(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_length_caps_magnitude() {
        let v = clamp_length([30.0, 0.0, 40.0], 5.0);
        assert!((length(v) - 5.0).abs() < 1e-5);
        assert_eq!(clamp_length([1.0, 0.0, 0.0], 5.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn mean_of_empty_is_origin() {
        assert_eq!(mean(Vec::new()), ZERO);
        assert_eq!(mean(vec![[0.0, 0.0, 0.0], [2.0, 4.0, 6.0]]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn ring_point_lies_on_ring() {
        let p = ring_point([1.0, 2.0, 3.0], 5.0, 1.3);
        assert!((distance(p, [1.0, 2.0, 3.0]) - 5.0).abs() < 1e-5);
        assert_eq!(p[1], 2.0);
    }
}
