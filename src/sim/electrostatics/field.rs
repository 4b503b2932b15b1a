//! Coulomb force and electric field computation

use super::charge::Charge;
use crate::consts::{FIELD_LINE_MAX_STEPS, FIELD_LINE_STEP, MAX_LINES_PER_CHARGE};
use crate::sim::Vector2;

/// Samples closer than this to a charge are skipped in the vector field
pub const FIELD_SAMPLE_MIN_DIST: f32 = 10.0;

/// Force on `on` exerted by `by`: `k·q1·q2/r²` along the separation.
///
/// Zero while the discs touch or overlap; the magnitude is capped at `max_force`.
pub fn coulomb_force(on: &Charge, by: &Charge, k: f32, max_force: f32) -> Vector2 {
    let r_vec = on.pos - by.pos;
    let r = r_vec.mag();
    if r <= on.radius + by.radius {
        return Vector2::ZERO;
    }
    let magnitude = (k * on.q * by.q / (r * r)).clamp(-max_force, max_force);
    r_vec.normalize() * magnitude
}

/// Electric field at `point`, skipping charges closer than `min_dist`
pub fn field_at(point: Vector2, charges: &[Charge], k: f32, min_dist: f32) -> Vector2 {
    charges.iter().fold(Vector2::ZERO, |e, c| {
        let r_vec = point - c.pos;
        let r = r_vec.mag();
        if r > min_dist {
            e + r_vec.normalize() * (k * c.q / (r * r))
        } else {
            e
        }
    })
}

/// One arrow of the vector field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub point: Vector2,
    pub field: Vector2,
}

/// Sample the field on a regular grid of `cell` spacing starting at the origin
pub fn sample_grid(width: f32, height: f32, cell: f32, charges: &[Charge], k: f32) -> Vec<FieldSample> {
    if cell <= 0.0 {
        return Vec::new();
    }
    let cols = (width / cell).ceil() as usize;
    let rows = (height / cell).ceil() as usize;
    let mut samples = Vec::with_capacity(cols * rows);
    for i in 0..cols {
        for j in 0..rows {
            let point = Vector2::new(i as f32 * cell, j as f32 * cell);
            samples.push(FieldSample {
                point,
                field: field_at(point, charges, k, FIELD_SAMPLE_MIN_DIST),
            });
        }
    }
    samples
}

/// Why a field line stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// Entered a negative charge
    Sink,
    /// Left the canvas
    Escaped,
    /// Hit the step cap
    StepLimit,
    /// Field vanished (e.g. a balanced saddle point)
    Stalled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLine {
    pub points: Vec<Vector2>,
    pub end: LineEnd,
}

/// Lines seeded per positive charge: proportional to `|q| / 2`, between one
/// and `MAX_LINES_PER_CHARGE`
pub fn lines_for_charge(q: f32) -> usize {
    ((q.abs() / 2.0).round() as usize).clamp(1, MAX_LINES_PER_CHARGE)
}

/// Integrate one line from `start` by fixed arc-length steps along the field
pub fn trace_line(start: Vector2, charges: &[Charge], k: f32, width: f32, height: f32) -> FieldLine {
    let mut points = Vec::with_capacity(64);
    let mut p = start;
    points.push(p);

    for _ in 0..FIELD_LINE_MAX_STEPS {
        let dir = field_at(p, charges, k, f32::EPSILON).normalize();
        if dir == Vector2::ZERO {
            return FieldLine {
                points,
                end: LineEnd::Stalled,
            };
        }
        p = p + dir * FIELD_LINE_STEP;
        points.push(p);

        if charges.iter().any(|c| c.q < 0.0 && p.dist(c.pos) < c.radius) {
            return FieldLine {
                points,
                end: LineEnd::Sink,
            };
        }
        if p.x < 0.0 || p.x > width || p.y < 0.0 || p.y > height {
            return FieldLine {
                points,
                end: LineEnd::Escaped,
            };
        }
    }

    FieldLine {
        points,
        end: LineEnd::StepLimit,
    }
}

/// All field lines, seeded evenly around the surface of each positive charge
pub fn trace_all(charges: &[Charge], k: f32, width: f32, height: f32) -> Vec<FieldLine> {
    let mut lines = Vec::new();
    for c in charges.iter().filter(|c| c.q > 0.0) {
        let n = lines_for_charge(c.q);
        for i in 0..n {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            let start = c.pos + Vector2::from_angle(angle) * c.radius;
            lines.push(trace_line(start, charges, k, width, height));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn charge(x: f32, y: f32, q: f32) -> Charge {
        Charge::new(0, Vector2::new(x, y), q, 1.0, 20.0)
    }

    #[test]
    fn test_like_charges_repel() {
        let a = charge(0.0, 0.0, 10.0);
        let b = charge(100.0, 0.0, 10.0);
        let f = coulomb_force(&a, &b, 1000.0, 1e9);
        assert!(f.x < 0.0);
        assert!((f.mag() - 1000.0 * 100.0 / 10_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_opposite_charges_attract() {
        let a = charge(0.0, 0.0, 10.0);
        let b = charge(100.0, 0.0, -10.0);
        assert!(coulomb_force(&a, &b, 1000.0, 1e9).x > 0.0);
    }

    #[test]
    fn test_no_force_on_contact() {
        let a = charge(0.0, 0.0, 10.0);
        let b = charge(39.0, 0.0, -10.0);
        assert_eq!(coulomb_force(&a, &b, 1000.0, 1e9), Vector2::ZERO);
    }

    #[test]
    fn test_field_skips_near_points() {
        let cs = [charge(0.0, 0.0, 10.0)];
        assert_eq!(field_at(Vector2::new(5.0, 0.0), &cs, 1.0, 10.0), Vector2::ZERO);
        assert!(field_at(Vector2::new(20.0, 0.0), &cs, 1.0, 10.0).x > 0.0);
    }

    #[test]
    fn test_grid_covers_canvas() {
        let samples = sample_grid(90.0, 60.0, 30.0, &[], 1.0);
        assert_eq!(samples.len(), 3 * 2);
        assert!(samples.iter().all(|s| s.field == Vector2::ZERO));
    }

    #[test]
    fn test_dipole_lines_reach_the_sink() {
        let cs = [charge(300.0, 300.0, 50.0), charge(500.0, 300.0, -50.0)];
        let lines = trace_all(&cs, 20000.0, 800.0, 600.0);
        assert_eq!(lines.len(), lines_for_charge(50.0));
        // The line leaving straight toward the negative charge must end in it
        assert_eq!(lines[0].end, LineEnd::Sink);
    }

    #[test]
    fn test_lone_charge_lines_escape() {
        let cs = [charge(400.0, 300.0, 10.0)];
        let lines = trace_all(&cs, 20000.0, 800.0, 600.0);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.end == LineEnd::Escaped));
    }

    #[test]
    fn test_line_count_is_capped_for_huge_charges() {
        assert_eq!(lines_for_charge(1e6), MAX_LINES_PER_CHARGE);
        assert_eq!(lines_for_charge(f32::MAX), MAX_LINES_PER_CHARGE);
        assert_eq!(lines_for_charge(-1e6), MAX_LINES_PER_CHARGE);
        assert_eq!(lines_for_charge(0.0), 1);

        let cs = [charge(400.0, 300.0, 2e5)];
        let lines = trace_all(&cs, 20000.0, 800.0, 600.0);
        assert_eq!(lines.len(), MAX_LINES_PER_CHARGE);
    }

    proptest! {
        #[test]
        fn force_never_exceeds_cap(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            q1 in -100.0f32..100.0, q2 in -100.0f32..100.0,
            max_force in 1.0f32..10_000.0,
        ) {
            let a = charge(0.0, 0.0, q1);
            let b = charge(x, y, q2);
            let f = coulomb_force(&a, &b, 5000.0, max_force);
            prop_assert!(f.mag() <= max_force * 1.0001);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn field_lines_always_terminate(
            charges in proptest::collection::vec(
                (20.0f32..780.0, 20.0f32..580.0, -80.0f32..80.0), 1..5),
        ) {
            let cs: Vec<Charge> = charges.iter().map(|&(x, y, q)| charge(x, y, q)).collect();
            for line in trace_all(&cs, 20000.0, 800.0, 600.0) {
                prop_assert!(line.points.len() <= FIELD_LINE_MAX_STEPS + 1);
                let last = *line.points.last().unwrap();
                match line.end {
                    LineEnd::Escaped => prop_assert!(
                        last.x < 0.0 || last.x > 800.0 || last.y < 0.0 || last.y > 600.0
                    ),
                    LineEnd::Sink => prop_assert!(
                        cs.iter().any(|c| c.q < 0.0 && last.dist(c.pos) < c.radius)
                    ),
                    LineEnd::StepLimit => prop_assert_eq!(line.points.len(), FIELD_LINE_MAX_STEPS + 1),
                    LineEnd::Stalled => {}
                }
            }
        }
    }
}
