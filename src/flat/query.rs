//! Spatial queries over a flat scene.
//!
//! [`SpatialQuery`] is the interface acceleration structures implement for
//! renderers and simulators. [`BruteForce`] answers the same queries by
//! testing every element and serves as a reference.

use super::types::FlatScene;
use crate::util::{Vec2, Vec3};

/// Half-line `origin + t * dir` restricted to `tmin <= t <= tmax`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
    pub tmin: f32,
    pub tmax: f32,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir, tmin: 1e-4, tmax: f32::INFINITY }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Closest ray intersection with a triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Index into [`FlatScene::meshes`].
    pub mesh: usize,
    /// Index into [`FlatScene::primitives`].
    pub primitive: usize,
    /// Triangle index within the primitive.
    pub element: usize,
    pub t: f32,
    /// Barycentric coordinates of the hit relative to vertices 1 and 2.
    pub uv: Vec2,
}

/// Closest vertex to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    pub mesh: usize,
    pub primitive: usize,
    pub vertex: usize,
    /// World-space vertex position.
    pub point: Vec3,
    pub distance: f32,
}

/// Geometric queries a flat scene exposes to collaborating systems.
pub trait SpatialQuery {
    /// Closest triangle hit along `ray` in world space.
    fn intersect_ray(&self, ray: &Ray) -> Option<Hit>;

    /// Closest vertex within `max_distance` of `point`.
    fn nearest_vertex(&self, point: Vec3, max_distance: f32) -> Option<Nearest>;
}

/// Linear scan over every mesh instance.
#[derive(Clone, Copy, Debug)]
pub struct BruteForce<'a> {
    scene: &'a FlatScene,
}

impl<'a> BruteForce<'a> {
    pub fn new(scene: &'a FlatScene) -> Self {
        Self { scene }
    }
}

impl SpatialQuery for BruteForce<'_> {
    fn intersect_ray(&self, ray: &Ray) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        for (mi, mesh) in self.scene.meshes.iter().enumerate() {
            // Rays move to object space; an affine map keeps t unchanged.
            let inv = mesh.xform.inverse();
            if !inv.is_finite() {
                continue;
            }
            let origin = inv.transform_point3(ray.origin);
            let dir = inv.transform_vector3(ray.dir);
            for &pi in &mesh.primitives {
                let Some(prim) = self.scene.primitives.get(pi) else { continue };
                for (ei, tri) in prim.triangles.iter().enumerate() {
                    let fetch = |i: u32| prim.pos.get(i as usize).map(|&p| Vec3::from_array(p));
                    let (Some(a), Some(b), Some(c)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
                        continue;
                    };
                    let tmax = best.map_or(ray.tmax, |h| h.t);
                    if let Some((t, uv)) = intersect_triangle(origin, dir, ray.tmin, tmax, a, b, c) {
                        best = Some(Hit { mesh: mi, primitive: pi, element: ei, t, uv });
                    }
                }
            }
        }
        best
    }

    fn nearest_vertex(&self, point: Vec3, max_distance: f32) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for (mi, mesh) in self.scene.meshes.iter().enumerate() {
            for &pi in &mesh.primitives {
                let Some(prim) = self.scene.primitives.get(pi) else { continue };
                for (vi, &p) in prim.pos.iter().enumerate() {
                    let world = mesh.xform.transform_point3(Vec3::from_array(p));
                    let distance = world.distance(point);
                    let limit = best.map_or(max_distance, |n| n.distance);
                    if distance <= limit {
                        best = Some(Nearest { mesh: mi, primitive: pi, vertex: vi, point: world, distance });
                    }
                }
            }
        }
        best
    }
}

/// Moller-Trumbore ray/triangle test. Returns `t` and barycentrics.
pub fn intersect_triangle(
    origin: Vec3,
    dir: Vec3,
    tmin: f32,
    tmax: f32,
    a: Vec3,
    b: Vec3,
    c: Vec3,
) -> Option<(f32, Vec2)> {
    let e1 = b - a;
    let e2 = c - a;
    let pvec = dir.cross(e2);
    let det = e1.dot(pvec);
    if det.abs() < f32::EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - a;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(e1);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(qvec) * inv_det;
    (t >= tmin && t <= tmax).then_some((t, Vec2::new(u, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::{FlatMesh, FlatPrimitive};
    use crate::util::Mat4;

    fn quad_scene() -> FlatScene {
        let prim = FlatPrimitive {
            pos: vec![[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0], [-1.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            ..Default::default()
        };
        FlatScene {
            primitives: vec![prim],
            meshes: vec![
                FlatMesh { primitives: vec![0], ..Default::default() },
                FlatMesh {
                    xform: Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
                    primitives: vec![0],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_ray_hits_closest_instance() {
        let scene = quad_scene();
        let q = BruteForce::new(&scene);
        let hit = q.intersect_ray(&Ray::new(Vec3::new(0.5, -0.5, 10.0), -Vec3::Z)).unwrap();
        assert_eq!(hit.mesh, 0);
        assert_eq!(hit.element, 0);
        assert!((hit.t - 10.0).abs() < 1e-5);

        let from_below = q.intersect_ray(&Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z)).unwrap();
        assert_eq!(from_below.mesh, 1);
        assert!((from_below.t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_miss() {
        let scene = quad_scene();
        let q = BruteForce::new(&scene);
        assert!(q.intersect_ray(&Ray::new(Vec3::new(3.0, 0.0, 10.0), -Vec3::Z)).is_none());
        assert!(q.intersect_ray(&Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z)).is_none());
    }

    #[test]
    fn test_nearest_vertex() {
        let scene = quad_scene();
        let q = BruteForce::new(&scene);
        let n = q.nearest_vertex(Vec3::new(1.1, 1.0, -4.9), 1.0).unwrap();
        assert_eq!(n.mesh, 1);
        assert_eq!(n.vertex, 2);
        assert_eq!(n.point, Vec3::new(1.0, 1.0, -5.0));
        assert!(q.nearest_vertex(Vec3::splat(100.0), 1.0).is_none());
    }
}
