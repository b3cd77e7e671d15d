//! Seam-aware addressing on the six faces of the cube-sphere.
//!
//! Every directed edge crossing (6 faces x 4 directions) is one entry of
//! [`EDGE_TRANSITIONS`]: the face on the other side and the number of
//! quarter turns that re-express the target face's frame. Crossing an edge
//! first shifts the out-of-range axis by one tile width (which puts the point
//! on the neighbour as if the cube were unfolded flat across that edge) and
//! then rotates the point inside the target square.
//!
//! The entries were traced from the embedding in `cube_sphere.rs`; the
//! geometric-continuity test below checks all 24 of them against it.

use glam::DVec2;

use super::face::{CubeFaceId, Direction};

/// Largest representable sub-pixel offset below 1.0.
const OFFSET_MAX: f64 = 1.0 - f64::EPSILON;

/// A single height sample: a face plus integer coordinates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FacePoint {
    pub face: CubeFaceId,
    pub x: u32,
    pub y: u32,
}

impl FacePoint {
    pub const fn new(face: CubeFaceId, x: u32, y: u32) -> Self {
        Self { face, x, y }
    }
}

/// One directed edge crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTransition {
    /// Face on the far side of the edge.
    pub target: CubeFaceId,
    /// Clockwise quarter turns (x East, y South) applied after the shift.
    pub quarter_turns: u8,
}

const fn cross(target: CubeFaceId, quarter_turns: u8) -> EdgeTransition {
    EdgeTransition { target, quarter_turns }
}

/// Edge crossing rules, indexed by `[face.index()][direction.index()]`.
///
/// Direction order is West, East, North, South.
pub const EDGE_TRANSITIONS: [[EdgeTransition; 4]; 6] = {
    use CubeFaceId::*;
    [
        // Up
        [cross(Left, 3), cross(Right, 1), cross(Back, 2), cross(Front, 0)],
        // Down
        [cross(Left, 1), cross(Right, 3), cross(Front, 0), cross(Back, 2)],
        // Front
        [cross(Left, 0), cross(Right, 0), cross(Up, 0), cross(Down, 0)],
        // Back
        [cross(Right, 0), cross(Left, 0), cross(Up, 2), cross(Down, 2)],
        // Left
        [cross(Back, 0), cross(Front, 0), cross(Up, 1), cross(Down, 3)],
        // Right
        [cross(Front, 0), cross(Back, 0), cross(Up, 3), cross(Down, 1)],
    ]
};

/// Returns the crossing rule for leaving `face` towards `direction`.
pub fn edge_transition(face: CubeFaceId, direction: Direction) -> EdgeTransition {
    EDGE_TRANSITIONS[face.index()][direction.index()]
}

/// Result of [`CubeTopology::step_with_vector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorStep {
    pub point: FacePoint,
    /// Sub-pixel offset in the landing face's frame, each component in [0, 1).
    pub offset: DVec2,
    /// Velocity in the landing face's frame.
    pub velocity: DVec2,
    /// Total clockwise quarter turns accumulated while crossing.
    pub quarter_turns: u8,
}

/// A shared edge between two faces, stored once per unordered face pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeEdge {
    /// Face whose local frame addresses the edge.
    pub face: CubeFaceId,
    /// Side of `face` the edge lies on.
    pub side: Direction,
    /// Face on the other side.
    pub neighbor: CubeFaceId,
}

/// Pure addressing over six square faces of width `resolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeTopology {
    resolution: u32,
}

impl CubeTopology {
    pub fn new(resolution: u32) -> Self {
        assert!(resolution >= 2, "cube faces need at least 2x2 samples");
        Self { resolution }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Moves `origin` by `(dx, dy)`, crossing onto neighbouring faces as needed.
    ///
    /// X is resolved before Y, so diagonal steps off a cube corner are
    /// well-defined even though the cube has no sample "diagonally" there.
    ///
    /// # Panics
    /// If `|dx|` or `|dy|` is not below the tile width.
    pub fn step(&self, origin: FacePoint, dx: i32, dy: i32) -> FacePoint {
        self.resolve(origin, dx, dy).0
    }

    /// Like [`step`](Self::step), but also re-expresses a sub-pixel offset and
    /// a velocity in the landing face's frame.
    pub fn step_with_vector(
        &self,
        origin: FacePoint,
        offset: DVec2,
        velocity: DVec2,
        dx: i32,
        dy: i32,
    ) -> VectorStep {
        let (point, quarter_turns) = self.resolve(origin, dx, dy);
        VectorStep {
            point,
            offset: rotate_offset(offset, quarter_turns),
            velocity: rotate_vector(velocity, quarter_turns),
            quarter_turns,
        }
    }

    /// The four edge neighbours of `p` in the order West, East, North, South.
    pub fn neighbors(&self, p: FacePoint) -> [FacePoint; 4] {
        Direction::all().map(|dir| {
            let (dx, dy) = dir.delta();
            self.step(p, dx, dy)
        })
    }

    /// Samples on other faces that sit on the same seam as `p`.
    ///
    /// Empty for interior samples, one twin for an edge sample and two for a
    /// sample in a face corner (the other two members of its cube corner).
    pub fn edge_twins(&self, p: FacePoint) -> Vec<FacePoint> {
        let r = self.resolution - 1;
        let mut twins = Vec::new();
        if p.x == 0 {
            twins.push(self.step(p, -1, 0));
        } else if p.x == r {
            twins.push(self.step(p, 1, 0));
        }
        if p.y == 0 {
            twins.push(self.step(p, 0, -1));
        } else if p.y == r {
            twins.push(self.step(p, 0, 1));
        }
        twins
    }

    /// Returns true if `p` lies in the outermost ring of its face.
    pub fn is_edge_sample(&self, p: FacePoint) -> bool {
        let r = self.resolution - 1;
        p.x == 0 || p.y == 0 || p.x == r || p.y == r
    }

    /// The 12 cube edges, each reported once.
    pub fn cube_edges(&self) -> Vec<CubeEdge> {
        let mut edges = Vec::with_capacity(12);
        for face in CubeFaceId::all() {
            for side in Direction::all() {
                let neighbor = edge_transition(face, side).target;
                if face < neighbor {
                    edges.push(CubeEdge { face, side, neighbor });
                }
            }
        }
        edges
    }

    /// The 8 cube corners as triplets of face corner samples, sorted within
    /// each triplet.
    pub fn cube_corners(&self) -> Vec<[FacePoint; 3]> {
        let r = self.resolution - 1;
        let mut corners: Vec<[FacePoint; 3]> = Vec::with_capacity(8);
        for face in CubeFaceId::all() {
            for (x, y) in [(0, 0), (r, 0), (0, r), (r, r)] {
                let p = FacePoint::new(face, x, y);
                let twins = self.edge_twins(p);
                debug_assert_eq!(twins.len(), 2);
                let mut triplet = [p, twins[0], twins[1]];
                triplet.sort();
                if !corners.contains(&triplet) {
                    corners.push(triplet);
                }
            }
        }
        corners
    }

    fn resolve(&self, origin: FacePoint, dx: i32, dy: i32) -> (FacePoint, u8) {
        let n = self.resolution as i64;
        assert!(
            (dx as i64).abs() < n && (dy as i64).abs() < n,
            "step ({}, {}) must be smaller than the tile width {}",
            dx,
            dy,
            n
        );

        let mut face = origin.face;
        let mut x = origin.x as i64 + dx as i64;
        let mut y = origin.y as i64 + dy as i64;
        let mut turns = 0u8;

        // One crossing per axis at most; the second can only come from the
        // residual Y displacement after X was rotated onto a new face.
        for _ in 0..2 {
            let direction = if x < 0 {
                Direction::West
            } else if x >= n {
                Direction::East
            } else if y < 0 {
                Direction::North
            } else if y >= n {
                Direction::South
            } else {
                break;
            };

            match direction {
                Direction::West => x += n,
                Direction::East => x -= n,
                Direction::North => y += n,
                Direction::South => y -= n,
            }

            let rule = edge_transition(face, direction);
            (x, y) = rotate_coords(x, y, rule.quarter_turns, n - 1);
            face = rule.target;
            turns = (turns + rule.quarter_turns) % 4;
        }

        assert!(
            (0..n).contains(&x) && (0..n).contains(&y),
            "edge crossing from {:?} by ({}, {}) produced ({}, {}) on {:?}: transition table is inconsistent",
            origin,
            dx,
            dy,
            x,
            y,
            face
        );

        (FacePoint::new(face, x as u32, y as u32), turns)
    }
}

/// Rotates grid coordinates clockwise inside a square whose last index is `r`.
fn rotate_coords(x: i64, y: i64, quarter_turns: u8, r: i64) -> (i64, i64) {
    match quarter_turns % 4 {
        0 => (x, y),
        1 => (r - y, x),
        2 => (r - x, r - y),
        _ => (y, r - x),
    }
}

/// Rotates a direction or velocity by the same turns as [`rotate_coords`].
pub fn rotate_vector(v: DVec2, quarter_turns: u8) -> DVec2 {
    match quarter_turns % 4 {
        0 => v,
        1 => DVec2::new(-v.y, v.x),
        2 => DVec2::new(-v.x, -v.y),
        _ => DVec2::new(v.y, -v.x),
    }
}

/// Rotates a position inside a cell's footprint, keeping it in [0, 1).
fn rotate_offset(o: DVec2, quarter_turns: u8) -> DVec2 {
    let flip = |c: f64| (1.0 - c).min(OFFSET_MAX);
    match quarter_turns % 4 {
        0 => o,
        1 => DVec2::new(flip(o.y), o.x),
        2 => DVec2::new(flip(o.x), flip(o.y)),
        _ => DVec2::new(o.y, flip(o.x)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FaceCoord;
    use rstest::rstest;
    use CubeFaceId::*;

    fn samples(r: u32) -> [(u32, u32); 9] {
        [
            (0, 0),
            (0, r),
            (r, 0),
            (r, r),
            (0, r / 2),
            (r, r / 2),
            (r / 2, 0),
            (r / 2, r),
            (r / 2, r / 2),
        ]
    }

    #[rstest]
    #[case(Up, 0, 2, -1, 0, Left, 2, 0)]
    #[case(Up, 7, 2, 1, 0, Right, 5, 0)]
    #[case(Up, 2, 0, 0, -1, Back, 5, 0)]
    #[case(Up, 2, 7, 0, 1, Front, 2, 0)]
    #[case(Down, 0, 2, -1, 0, Left, 5, 7)]
    #[case(Down, 7, 2, 1, 0, Right, 2, 7)]
    #[case(Down, 2, 0, 0, -1, Front, 2, 7)]
    #[case(Down, 2, 7, 0, 1, Back, 5, 7)]
    #[case(Front, 0, 2, -1, 0, Left, 7, 2)]
    #[case(Front, 7, 2, 1, 0, Right, 0, 2)]
    #[case(Front, 2, 0, 0, -1, Up, 2, 7)]
    #[case(Front, 2, 7, 0, 1, Down, 2, 0)]
    #[case(Back, 0, 2, -1, 0, Right, 7, 2)]
    #[case(Back, 7, 2, 1, 0, Left, 0, 2)]
    #[case(Back, 2, 0, 0, -1, Up, 5, 0)]
    #[case(Back, 2, 7, 0, 1, Down, 5, 7)]
    #[case(Left, 0, 2, -1, 0, Back, 7, 2)]
    #[case(Left, 7, 2, 1, 0, Front, 0, 2)]
    #[case(Left, 2, 0, 0, -1, Up, 0, 2)]
    #[case(Left, 2, 7, 0, 1, Down, 0, 5)]
    #[case(Right, 0, 2, -1, 0, Front, 7, 2)]
    #[case(Right, 7, 2, 1, 0, Back, 0, 2)]
    #[case(Right, 2, 0, 0, -1, Up, 7, 5)]
    #[case(Right, 2, 7, 0, 1, Down, 7, 2)]
    fn test_edge_crossing_golden(
        #[case] face: CubeFaceId,
        #[case] x: u32,
        #[case] y: u32,
        #[case] dx: i32,
        #[case] dy: i32,
        #[case] expected_face: CubeFaceId,
        #[case] expected_x: u32,
        #[case] expected_y: u32,
    ) {
        let topo = CubeTopology::new(8);
        let landed = topo.step(FacePoint::new(face, x, y), dx, dy);
        assert_eq!(landed, FacePoint::new(expected_face, expected_x, expected_y));
    }

    #[test]
    fn test_west_of_up_corner() {
        let topo = CubeTopology::new(16);
        assert_eq!(topo.step(FacePoint::new(Up, 0, 0), -1, 0), FacePoint::new(Left, 0, 0));
        // Axes swap across this edge: Up(0, y) lands on Left(y, 0).
        assert_eq!(topo.step(FacePoint::new(Up, 0, 9), -1, 0), FacePoint::new(Left, 9, 0));
        assert_eq!(topo.step(FacePoint::new(Up, 0, 9), -3, 0), FacePoint::new(Left, 9, 2));
    }

    #[test]
    fn test_zero_step_is_identity() {
        let topo = CubeTopology::new(8);
        let p = FacePoint::new(Back, 0, 7);
        let offset = DVec2::new(0.25, 0.75);
        let velocity = DVec2::new(-0.6, 0.8);
        let out = topo.step_with_vector(p, offset, velocity, 0, 0);
        assert_eq!(out.point, p);
        assert_eq!(out.offset, offset);
        assert_eq!(out.velocity, velocity);
        assert_eq!(out.quarter_turns, 0);
    }

    #[test]
    fn test_edge_transitions_are_reciprocal() {
        // Leaving F towards D and turning round must lead back to F.
        for face in CubeFaceId::all() {
            for dir in Direction::all() {
                let rule = edge_transition(face, dir);
                assert_ne!(rule.target, face);
                let back_dir = rotate_vector(
                    {
                        let (dx, dy) = dir.opposite().delta();
                        DVec2::new(dx as f64, dy as f64)
                    },
                    rule.quarter_turns,
                );
                let back = Direction::all()
                    .into_iter()
                    .find(|d| {
                        let (dx, dy) = d.delta();
                        DVec2::new(dx as f64, dy as f64) == back_dir
                    })
                    .unwrap();
                let reverse = edge_transition(rule.target, back);
                assert_eq!(reverse.target, face, "{:?} {:?}", face, dir);
                assert_eq!((rule.quarter_turns + reverse.quarter_turns) % 4, 0);
            }
        }
    }

    #[test]
    fn test_closure_for_large_steps() {
        let res = 16;
        let topo = CubeTopology::new(res);
        let deltas = [-15, -9, -1, 0, 1, 8, 15];
        for face in CubeFaceId::all() {
            for (x, y) in samples(res - 1) {
                for &dx in &deltas {
                    for &dy in &deltas {
                        let q = topo.step(FacePoint::new(face, x, y), dx, dy);
                        assert!(q.x < res && q.y < res, "{:?} ({},{}) by ({},{}) -> {:?}", face, x, y, dx, dy, q);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_axis_round_trip() {
        let res = 16;
        let topo = CubeTopology::new(res);
        for face in CubeFaceId::all() {
            for (x, y) in samples(res - 1) {
                for dir in Direction::all() {
                    for dist in [1, 3, 15] {
                        let (ux, uy) = dir.delta();
                        let p = FacePoint::new(face, x, y);
                        let v = DVec2::new((ux * dist) as f64, (uy * dist) as f64);
                        let out = topo.step_with_vector(p, DVec2::ZERO, v, ux * dist, uy * dist);
                        let back = topo.step(out.point, -out.velocity.x as i32, -out.velocity.y as i32);
                        assert_eq!(back, p, "{:?} by {:?}x{} via {:?}", p, dir, dist, out.point);
                    }
                }
            }
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let res = 16;
        let topo = CubeTopology::new(res);
        for face in CubeFaceId::all() {
            for (x, y) in samples(res - 1) {
                let p = FacePoint::new(face, x, y);
                for q in topo.neighbors(p) {
                    assert!(
                        topo.neighbors(q).contains(&p),
                        "Adjacency not bidirectional: {:?} -> {:?}; back={:?}",
                        p,
                        q,
                        topo.neighbors(q)
                    );
                }
            }
        }
    }

    #[test]
    fn test_neighbor_geometric_continuity() {
        // Neighbours must be close on the sphere, which pins down every rule.
        let res = 64;
        let topo = CubeTopology::new(res);
        let max_angle = 3.0 / res as f32;

        for face in CubeFaceId::all() {
            for (x, y) in samples(res - 1) {
                let p0 = FaceCoord::from_pixel(face, x, y, res).to_sphere_point();
                for q in topo.neighbors(FacePoint::new(face, x, y)) {
                    let p1 = FaceCoord::from_pixel(q.face, q.x, q.y, res).to_sphere_point();
                    let angle = p0.dot(p1).clamp(-1.0, 1.0).acos();
                    assert!(
                        angle < max_angle,
                        "Neighbor too far: {:?} ({},{}) -> {:?}, angle={}",
                        face,
                        x,
                        y,
                        q,
                        angle
                    );
                }
            }
        }
    }

    #[test]
    fn test_velocity_follows_the_fold() {
        // Walking straight across any edge keeps walking away from it.
        let res = 32;
        let topo = CubeTopology::new(res);
        for face in CubeFaceId::all() {
            for dir in Direction::all() {
                let (dx, dy) = dir.delta();
                let mid = res / 2;
                let start = match dir {
                    Direction::West => FacePoint::new(face, 0, mid),
                    Direction::East => FacePoint::new(face, res - 1, mid),
                    Direction::North => FacePoint::new(face, mid, 0),
                    Direction::South => FacePoint::new(face, mid, res - 1),
                };
                let v = DVec2::new(dx as f64, dy as f64);
                let first = topo.step_with_vector(start, DVec2::ZERO, v, dx, dy);
                let second = topo.step(first.point, first.velocity.x as i32, first.velocity.y as i32);
                assert_eq!(second.face, first.point.face);
                let first_depth = depth_from_edge(first.point, res);
                let second_depth = depth_from_edge(second, res);
                assert_eq!(first_depth, 0);
                assert_eq!(second_depth, 1, "{:?} {:?}", face, dir);
            }
        }
    }

    fn depth_from_edge(p: FacePoint, res: u32) -> u32 {
        let r = res - 1;
        p.x.min(p.y).min(r - p.x).min(r - p.y)
    }

    #[test]
    fn test_offset_rotation_stays_in_unit_cell() {
        for turns in 0..4 {
            for o in [DVec2::ZERO, DVec2::new(0.25, 0.5), DVec2::new(0.999, 0.0)] {
                let r = rotate_offset(o, turns);
                assert!((0.0..1.0).contains(&r.x) && (0.0..1.0).contains(&r.y), "{:?} -> {:?}", o, r);
            }
        }
        assert_eq!(rotate_offset(DVec2::new(0.25, 0.5), 2), DVec2::new(0.75, 0.5));
    }

    #[test]
    fn test_edge_twins() {
        let topo = CubeTopology::new(8);
        assert!(topo.edge_twins(FacePoint::new(Front, 3, 3)).is_empty());
        assert_eq!(
            topo.edge_twins(FacePoint::new(Front, 0, 3)),
            vec![FacePoint::new(Left, 7, 3)]
        );
        let corner = topo.edge_twins(FacePoint::new(Up, 0, 0));
        assert_eq!(corner.len(), 2);
        assert!(corner.contains(&FacePoint::new(Left, 0, 0)));
        assert!(corner.contains(&FacePoint::new(Back, 7, 0)));
    }

    #[test]
    fn test_cube_edges_and_corners() {
        let topo = CubeTopology::new(8);
        let edges = topo.cube_edges();
        assert_eq!(edges.len(), 12);

        let corners = topo.cube_corners();
        assert_eq!(corners.len(), 8);
        for triplet in &corners {
            let faces: Vec<_> = triplet.iter().map(|p| p.face).collect();
            assert!(faces[0] != faces[1] && faces[1] != faces[2] && faces[0] != faces[2]);
            // Every member sees the other two as its twins.
            for p in triplet {
                let twins = topo.edge_twins(*p);
                for q in triplet.iter().filter(|q| *q != p) {
                    assert!(twins.contains(q));
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "smaller than the tile width")]
    fn test_oversized_step_fails_fast() {
        let topo = CubeTopology::new(8);
        topo.step(FacePoint::new(Front, 0, 0), 8, 0);
    }
}
