//! Laser raycasting
//!
//! A ray leaves the source heading right. Each leg takes the nearest of the
//! mirror segments and the first solid cell found by a DDA march over the
//! wall grid. Mirrors and reflector cells bounce the ray; absorbers end it.
//! The whole path is capped at `MAX_BOUNCES` legs and `MAX_RAY_DISTANCE`
//! pixels.

use super::grid::{Material, WallGrid};
use super::mirror::Mirror;
use crate::consts::{MAX_BOUNCES, MAX_RAY_DISTANCE};
use crate::point_segment_distance;
use crate::sim::Vector2;

/// Origin nudge along the new direction after a bounce
const NUDGE: f32 = 0.1;
/// Mirror hits closer than this to the origin are ignored
const MIN_HIT_DIST: f32 = 0.1;
/// Direction components smaller than this are treated as zero in the march
const AXIS_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Mirror,
    Reflector,
    Absorber,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vector2,
    /// Unit surface normal (zero for absorbers)
    pub normal: Vector2,
    pub kind: HitKind,
    /// Distance from the leg origin in pixels
    pub distance: f32,
}

/// Traced laser path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaserPath {
    /// Vertices in pixels, starting at the source
    pub points: Vec<Vector2>,
    pub bounces: usize,
    pub hit_target: bool,
}

impl LaserPath {
    /// Sum of leg lengths
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].dist(w[1])).sum()
    }
}

/// Intersection of segments `p0-p1` and `p2-p3`; returns the point and the
/// parameter along `p2-p3`
fn segment_intersection(p0: Vector2, p1: Vector2, p2: Vector2, p3: Vector2) -> Option<(Vector2, f32)> {
    let s1 = p1 - p0;
    let s2 = p3 - p2;
    let denom = -s2.x * s1.y + s1.x * s2.y;
    if denom == 0.0 {
        return None;
    }
    let s = (-s1.y * (p0.x - p2.x) + s1.x * (p0.y - p2.y)) / denom;
    let t = (s2.x * (p0.y - p2.y) - s2.y * (p0.x - p2.x)) / denom;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some((p0 + s1 * t, s))
    } else {
        None
    }
}

/// Per-axis DDA state: step direction, distance to next boundary, distance per cell
fn axis_setup(origin: f32, dir: f32, cell: i32) -> (i32, f32, f32) {
    if dir.abs() < AXIS_EPS {
        return (0, f32::INFINITY, f32::INFINITY);
    }
    let unit = (1.0 / dir).abs();
    if dir < 0.0 {
        (-1, (origin - cell as f32) * unit, unit)
    } else {
        (1, (cell as f32 + 1.0 - origin) * unit, unit)
    }
}

pub struct Raycaster<'a> {
    pub grid: &'a WallGrid,
    pub mirrors: &'a [Mirror],
    /// Pixels per cell
    pub scale: f32,
}

impl Raycaster<'_> {
    /// Nearest mirror crossing within `max_dist` pixels
    fn nearest_mirror(&self, origin: Vector2, dir: Vector2, max_dist: f32) -> Option<RayHit> {
        let far = origin + dir * max_dist;
        self.mirrors
            .iter()
            .filter_map(|m| {
                let (a, b) = m.segment(self.scale);
                let (point, _) = segment_intersection(origin, far, a, b)?;
                let distance = point.dist(origin);
                (distance > MIN_HIT_DIST).then(|| RayHit {
                    point,
                    normal: m.normal(),
                    kind: HitKind::Mirror,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// March the grid from `origin` for at most `max_dist` pixels
    fn march(&self, origin: Vector2, dir: Vector2, max_dist: f32) -> Option<RayHit> {
        let o = origin / self.scale;
        let mut cell = WallGrid::cell_at(origin, self.scale);
        let (step_x, mut side_x, unit_x) = axis_setup(o.x, dir.x, cell.0);
        let (step_y, mut side_y, unit_y) = axis_setup(o.y, dir.y, cell.1);
        let max_cells = max_dist / self.scale;

        let mut dist = 0.0;
        while dist < max_cells {
            let crossed_x = side_x < side_y;
            if crossed_x {
                cell.0 += step_x;
                dist = side_x;
                side_x += unit_x;
            } else {
                cell.1 += step_y;
                dist = side_y;
                side_y += unit_y;
            }
            if dist > max_cells {
                break;
            }

            let kind = match self.grid.get(cell.0, cell.1) {
                Material::Air => continue,
                Material::Reflector => HitKind::Reflector,
                Material::Absorber => HitKind::Absorber,
            };
            let normal = match kind {
                HitKind::Reflector if crossed_x => Vector2::new(-step_x as f32, 0.0),
                HitKind::Reflector => Vector2::new(0.0, -step_y as f32),
                _ => Vector2::ZERO,
            };
            return Some(RayHit {
                point: origin + dir * (dist * self.scale),
                normal,
                kind,
                distance: dist * self.scale,
            });
        }
        None
    }

    /// Nearest surface along one leg
    pub fn cast(&self, origin: Vector2, dir: Vector2, max_dist: f32) -> Option<RayHit> {
        let mirror = self.nearest_mirror(origin, dir, max_dist);
        let reach = mirror.map_or(max_dist, |m| m.distance);
        self.march(origin, dir, reach).or(mirror)
    }

    /// Full path from `source` (pixels), testing each leg against the target disc
    pub fn trace(&self, source: Vector2, target: Vector2, target_radius: f32) -> LaserPath {
        let mut path = LaserPath {
            points: vec![source],
            ..Default::default()
        };
        let mut origin = source;
        let mut dir = Vector2::RIGHT;
        let mut remaining = MAX_RAY_DISTANCE;
        let mut travelled = 0.0;

        for _ in 0..MAX_BOUNCES {
            let start = path.points.last().copied().unwrap_or(source);
            let hit = self.cast(origin, dir, remaining);
            let end = hit.map_or(origin + dir * remaining, |h| h.point);
            path.points.push(end);
            if point_segment_distance(target, start, end) < target_radius {
                path.hit_target = true;
            }

            let Some(hit) = hit else { break };
            if hit.kind == HitKind::Absorber {
                break;
            }

            // The next leg is drawn from the hit point, so the nudge counts
            travelled += start.dist(end);
            remaining = MAX_RAY_DISTANCE - travelled - NUDGE;
            dir = dir.reflect(hit.normal).normalize();
            origin = hit.point + dir * NUDGE;
            path.bounces += 1;
            if remaining <= 0.0 {
                break;
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::optics::mirror::BRUSH_ANGLES;
    use proptest::prelude::*;

    const SCALE: f32 = 2.0;

    fn open_grid() -> WallGrid {
        WallGrid::new(400, 300)
    }

    fn mirror(x: i32, y: i32, angle: u16) -> Mirror {
        Mirror {
            id: 0,
            x,
            y,
            angle,
            length: 15.0,
        }
    }

    #[test]
    fn test_straight_shot_hits_target() {
        let grid = open_grid();
        let rc = Raycaster {
            grid: &grid,
            mirrors: &[],
            scale: SCALE,
        };
        let path = rc.trace(Vector2::new(100.0, 200.0), Vector2::new(500.0, 200.0), 15.0);
        assert!(path.hit_target);
        assert_eq!(path.bounces, 0);
        // Ends on the grid edge (out of bounds reads as wall)
        assert!((path.points[1].x - 800.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_blocks_target() {
        let mut grid = open_grid();
        grid.fill_rect(150, 0, 5, 300, Material::Absorber);
        let rc = Raycaster {
            grid: &grid,
            mirrors: &[],
            scale: SCALE,
        };
        let path = rc.trace(Vector2::new(100.0, 200.0), Vector2::new(500.0, 200.0), 15.0);
        assert!(!path.hit_target);
        assert_eq!(path.points.len(), 2);
        assert!((path.points[1].x - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_mirror_turns_ray_onto_target() {
        let grid = open_grid();
        // 135 degrees: incoming +x is sent to -y (up the screen)
        let mirrors = [mirror(100, 100, 135)];
        let rc = Raycaster {
            grid: &grid,
            mirrors: &mirrors,
            scale: SCALE,
        };
        let path = rc.trace(Vector2::new(50.0, 200.0), Vector2::new(200.0, 60.0), 15.0);
        assert_eq!(path.bounces, 1);
        assert!(path.hit_target);
        let leg = path.points[2] - path.points[1];
        assert!(leg.x.abs() < 1e-2 && leg.y < 0.0);
    }

    #[test]
    fn test_reflector_cell_bounces_back() {
        let mut grid = open_grid();
        grid.fill_rect(200, 0, 2, 300, Material::Reflector);
        let rc = Raycaster {
            grid: &grid,
            mirrors: &[],
            scale: SCALE,
        };
        let path = rc.trace(Vector2::new(100.0, 200.0), Vector2::new(-100.0, -100.0), 1.0);
        assert_eq!(path.bounces, 1);
        assert!((path.points[1].x - 400.0).abs() < 1e-3);
        // Heads back the way it came and stops at the left edge
        assert!(path.points[2].x.abs() < 1e-2);
    }

    #[test]
    fn test_facing_mirrors_hit_bounce_cap() {
        let grid = open_grid();
        // Two vertical mirrors facing each other trap the ray
        let mirrors = [mirror(100, 100, 90), mirror(60, 100, 90)];
        let rc = Raycaster {
            grid: &grid,
            mirrors: &mirrors,
            scale: SCALE,
        };
        let path = rc.trace(Vector2::new(150.0, 200.0), Vector2::new(-100.0, -100.0), 1.0);
        assert_eq!(path.bounces, MAX_BOUNCES);
        assert_eq!(path.points.len(), MAX_BOUNCES + 1);
    }

    #[test]
    fn test_segment_intersection_parallel() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);
        assert!(segment_intersection(a, b, Vector2::new(0.0, 1.0), Vector2::new(10.0, 1.0)).is_none());
        let (p, _) = segment_intersection(a, b, Vector2::new(5.0, -1.0), Vector2::new(5.0, 1.0)).unwrap();
        assert!((p.x - 5.0).abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn path_respects_caps(
            mirrors in proptest::collection::vec((20i32..380, 20i32..280, 0usize..4), 0..12),
            sx in 10.0f32..790.0, sy in 10.0f32..590.0,
        ) {
            let grid = open_grid();
            let mirrors: Vec<Mirror> = mirrors
                .iter()
                .map(|&(x, y, a)| mirror(x, y, BRUSH_ANGLES[a]))
                .collect();
            let rc = Raycaster { grid: &grid, mirrors: &mirrors, scale: SCALE };
            let path = rc.trace(Vector2::new(sx, sy), Vector2::new(-1000.0, -1000.0), 1.0);
            prop_assert!(path.bounces <= MAX_BOUNCES);
            prop_assert!(path.points.len() <= MAX_BOUNCES + 1);
            prop_assert!(path.length() <= MAX_RAY_DISTANCE + 1e-2);
        }

        #[test]
        fn mirror_reflection_law(angle_idx in 0usize..4, dir_angle in 0.0f32..6.28) {
            let m = mirror(0, 0, BRUSH_ANGLES[angle_idx]);
            let n = m.normal();
            let d = Vector2::from_angle(dir_angle);
            let r = d.reflect(n);
            // Normal component flips, tangential component kept
            prop_assert!((r.dot(n) + d.dot(n)).abs() < 1e-4);
            prop_assert!((r.dot(n.perp()) - d.dot(n.perp())).abs() < 1e-4);
        }
    }
}
