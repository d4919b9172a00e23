//! Real roots of low-degree polynomials in power basis `c0 + c1 t + c2 t² + c3 t³`.
//!
//! Degenerate leading coefficients (relative to the coefficient scale) drop
//! to the next lower degree. Roots are returned sorted and deduplicated;
//! cubic roots get two Newton polishing steps.

use std::f64::consts::PI;

const REL_EPS: f64 = 1e-12;
const DEDUP_EPS: f64 = 1e-10;

fn scale(cs: &[f64]) -> f64 {
    cs.iter().fold(0.0f64, |m, c| m.max(c.abs()))
}

fn finish(mut roots: Vec<f64>) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    roots.dedup_by(|a, b| (*a - *b).abs() < DEDUP_EPS);
    roots
}

/// Real roots of `c0 + c1 t`. A constant polynomial yields no roots.
pub fn solve_linear(c0: f64, c1: f64) -> Vec<f64> {
    if c1.abs() <= REL_EPS * scale(&[c0, c1]) || c1 == 0.0 {
        return Vec::new();
    }
    vec![-c0 / c1]
}

/// Real roots of `c0 + c1 t + c2 t²` (numerically stable form).
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> Vec<f64> {
    let s = scale(&[c0, c1, c2]);
    if s == 0.0 {
        return Vec::new();
    }
    if c2.abs() <= REL_EPS * s {
        return solve_linear(c0, c1);
    }
    let disc = c1 * c1 - 4.0 * c2 * c0;
    if disc < -REL_EPS * s * s {
        return Vec::new();
    }
    if disc <= REL_EPS * s * s {
        return vec![-c1 / (2.0 * c2)];
    }
    let root = disc.sqrt();
    let q = if c1 < 0.0 {
        -0.5 * (c1 - root)
    } else {
        -0.5 * (c1 + root)
    };
    let mut out = vec![q / c2];
    if q != 0.0 {
        out.push(c0 / q);
    }
    finish(out)
}

/// Real roots of `c0 + c1 t + c2 t² + c3 t³`.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> Vec<f64> {
    let s = scale(&[c0, c1, c2, c3]);
    if s == 0.0 {
        return Vec::new();
    }
    if c3.abs() <= REL_EPS * s {
        return solve_quadratic(c0, c1, c2);
    }
    let a = c2 / c3;
    let b = c1 / c3;
    let c = c0 / c3;
    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 54.0;
    let q3 = q * q * q;
    let mut roots = Vec::with_capacity(3);
    if r * r < q3 {
        let theta = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let m = -2.0 * q.sqrt();
        roots.push(m * (theta / 3.0).cos() - a / 3.0);
        roots.push(m * ((theta + 2.0 * PI) / 3.0).cos() - a / 3.0);
        roots.push(m * ((theta - 2.0 * PI) / 3.0).cos() - a / 3.0);
    } else {
        let disc = (r * r - q3).max(0.0).sqrt();
        let big_a = -r.signum() * (r.abs() + disc).cbrt();
        let big_b = if big_a != 0.0 { q / big_a } else { 0.0 };
        roots.push(big_a + big_b - a / 3.0);
        // Double root at the boundary between the one- and three-root cases.
        if disc <= 1e-9 * (1.0 + r.abs()) && big_a != 0.0 {
            roots.push(-0.5 * (big_a + big_b) - a / 3.0);
        }
    }
    let polished = roots
        .into_iter()
        .map(|t| polish(t, c0, c1, c2, c3))
        .collect();
    finish(polished)
}

fn polish(mut t: f64, c0: f64, c1: f64, c2: f64, c3: f64) -> f64 {
    for _ in 0..2 {
        let f = ((c3 * t + c2) * t + c1) * t + c0;
        let df = (3.0 * c3 * t + 2.0 * c2) * t + c1;
        if df.abs() < 1e-300 {
            break;
        }
        let step = f / df;
        if !step.is_finite() {
            break;
        }
        t -= step;
    }
    t
}

/// Keep roots in `[0, 1]` (with slack `eps`), clamped into the interval.
pub fn in_unit_interval(roots: Vec<f64>, eps: f64) -> Vec<f64> {
    roots
        .into_iter()
        .filter(|t| *t >= -eps && *t <= 1.0 + eps)
        .map(|t| t.clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn quadratic_cases() {
        // (t-1)(t-3) = t² - 4t + 3
        assert!(close(&solve_quadratic(3.0, -4.0, 1.0), &[1.0, 3.0]));
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(close(&solve_quadratic(1.0, -2.0, 1.0), &[1.0]));
        // Degenerates to linear.
        assert!(close(&solve_quadratic(-2.0, 4.0, 0.0), &[0.5]));
        assert!(solve_quadratic(0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn cubic_three_real_roots() {
        // (t-1)(t-2)(t-3)
        let r = solve_cubic(-6.0, 11.0, -6.0, 1.0);
        assert!(close(&r, &[1.0, 2.0, 3.0]), "{r:?}");
    }

    #[test]
    fn cubic_single_and_double_roots() {
        // t³ + t + 1 has one real root near -0.6823.
        let r = solve_cubic(1.0, 1.0, 0.0, 1.0);
        assert_eq!(r.len(), 1);
        assert!((r[0] + 0.682_327_803_8).abs() < 1e-8);
        // (t-1)²(t+2) = t³ - 3t + 2
        let d = solve_cubic(2.0, -3.0, 0.0, 1.0);
        assert!(close(&d, &[-2.0, 1.0]), "{d:?}");
    }

    #[test]
    fn cubic_degenerates_to_quadratic() {
        let r = solve_cubic(3.0, -4.0, 1.0, 0.0);
        assert!(close(&r, &[1.0, 3.0]));
    }

    #[test]
    fn unit_interval_filter() {
        let r = in_unit_interval(vec![-0.5, -1e-12, 0.25, 1.0 + 1e-12, 2.0], 1e-9);
        assert!(close(&r, &[0.0, 0.25, 1.0]));
    }
}
