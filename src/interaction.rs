use crate::geometry::Normal3;
use crate::material::TransportMode;
use crate::{offset_ray_origin, Float, Point2f, Point3f, Ray, RayDifferential, Vec3f, Vec2f, solve_linear_system_2x2, Differential};
use crate::memory::MemoryPool;
use cgmath::{EuclideanSpace, InnerSpace, Matrix2, Vector2};
use crate::reflection::bsdf::Bsdf;
use crate::primitive::Primitive;
use crate::spectrum::Spectrum;

/// The common fields shared by every kind of scene interaction: a hit point,
/// its floating-point error bound, the time of the hit, and the geometric
/// normal at that point.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceHit {
    pub p: Point3f,
    pub p_err: Vec3f,
    pub time: Float,
    pub n: Normal3,
}

impl SurfaceHit {
    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        let o = offset_ray_origin(&self.p, &self.p_err, &self.n, &dir);
        Ray { origin: o, dir, t_max: std::f32::INFINITY, time: self.time }
    }

    pub fn spawn_ray_to_point(&self, p2: Point3f) -> Ray {
        let dir = p2 - self.p;
        let o = offset_ray_origin(&self.p, &self.p_err, &self.n, &dir);
        Ray { origin: o, dir, t_max: 1.0 - 1e-4, time: self.time }
    }

    /// Spawn a shadow ray from this hit towards another hit, offsetting both
    /// ends along their respective normals so neither endpoint re-intersects
    /// the surface it came from.
    pub fn spawn_ray_to_hit(&self, other: SurfaceHit) -> Ray {
        let o = offset_ray_origin(&self.p, &self.p_err, &self.n, &(other.p - self.p));
        let target = offset_ray_origin(&other.p, &other.p_err, &other.n, &(o - other.p));
        let dir = target - o;
        Ray { origin: o, dir, t_max: 1.0 - 1e-3, time: self.time }
    }
}

pub struct SurfaceInteraction<'i> {
    pub hit: SurfaceHit,

    /// (u, v) coordinates from the parametrization of the surface
    pub uv: Point2f,

    pub wo: Vec3f,

    pub geom: DiffGeom,

    pub shading_n: Normal3,

    pub shading_geom: DiffGeom,

    pub tex_diffs: Option<TextureDifferentials>,

    pub primitive: Option<&'i dyn Primitive>,

    pub bsdf: Option<Bsdf<'i>>,
}

impl<'i> SurfaceInteraction<'i> {
    pub fn new(
        p: Point3f,
        p_err: Vec3f,
        time: Float,
        uv: Point2f,
        wo: Vec3f,
        n: Normal3,
        geom: DiffGeom,
    ) -> Self {
        Self {
            hit: SurfaceHit { p, p_err, time, n },
            uv,
            wo,
            geom,

            shading_n: n,
            shading_geom: geom,

            tex_diffs: None,
            primitive: None,
            bsdf: None,
        }
    }

    pub fn n(&self) -> Normal3 {
        self.hit.n
    }

    /// Flip the shading normal (and the geometric-shading dpdu/dndu pair it's
    /// derived from) to face the same hemisphere as `n`, matching whichever
    /// of `reverse_normals`/`transform_changes_coords` requires it. Shapes
    /// call this once, right after building the raw differential geometry.
    pub fn set_shading_geometry(
        &mut self,
        dpdus: Vec3f,
        dpdvs: Vec3f,
        dndus: Normal3,
        dndvs: Normal3,
        orientation_is_authoritative: bool,
    ) {
        self.shading_n = Normal3(dpdus.cross(dpdvs)).normalize();
        if orientation_is_authoritative {
            self.hit.n = face_forward(self.hit.n, self.shading_n);
        } else {
            self.shading_n = face_forward(self.shading_n, self.hit.n);
        }
        self.shading_geom = DiffGeom {
            dpdu: dpdus,
            dpdv: dpdvs,
            dndu: dndus,
            dndv: dndvs,
        };
    }

    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        let o = offset_ray_origin(&self.hit.p, &self.hit.p_err, &self.hit.n, &dir);
        Ray {
            origin: o,
            dir,
            t_max: std::f32::INFINITY,
            time: self.hit.time,
        }
    }

    pub fn spawn_ray_to(&self, p2: Point3f) -> Ray {
        let dir = p2 - self.hit.p;
        let o = offset_ray_origin(&self.hit.p, &self.hit.p_err, &self.hit.n, &dir);
        Ray {
            origin: o,
            dir,
            t_max: 1.0 - 1e-4,
            time: self.hit.time,
        }
    }

    pub fn spawn_ray_with_differentials(&self, dir: Vec3f, diff: Option<Differential>) -> RayDifferential {
        let ray = self.spawn_ray(dir);
        RayDifferential { ray, diff }
    }

    /// Radiance emitted towards `w` if this hit lies on an emitting primitive, black otherwise.
    pub fn emitted_radiance(&self, w: Vec3f) -> Spectrum {
        self.primitive
            .and_then(|p| p.area_light())
            .map_or(Spectrum::uniform(0.0), |light| light.emitted_radiance(self.hit, w))
    }

    /// Build this intersection's BSDF into `pool` and stash it on `self.bsdf`,
    /// mirroring pbrt's `ComputeScatteringFunctions`.
    pub fn compute_scattering_functions<'a>(
        &mut self,
        ray: &RayDifferential,
        pool: &'a MemoryPool,
        allow_multiple_lobes: bool,
        mode: TransportMode,
    ) where
        'a: 'i,
    {
        self.tex_diffs = self.compute_tex_differentials(ray);
        let material = self.primitive.and_then(|p| p.material());
        self.bsdf = material.map(|m| m.compute_scattering_functions(self, pool, mode, allow_multiple_lobes));
    }

    fn compute_tex_differentials(&self, ray: &RayDifferential) -> Option<TextureDifferentials> {
        let n = self.hit.n;
        let diff = ray.diff?;
        let d = n.dot(self.hit.p.to_vec());

        let px = {
            let tx = -(n.dot(diff.rx_origin.to_vec()) - d) / n.dot(diff.rx_dir);
            diff.rx_origin + tx * diff.rx_dir
        };

        let py = {
            let ty = -(n.dot(diff.ry_origin.to_vec()) - d) / n.dot(diff.ry_dir);
            diff.ry_origin + ty * diff.ry_dir
        };

        let dpdx = px - self.hit.p;
        let dpdy = py - self.hit.p;

        let dim = if n.x.abs() > n.y.abs() && n.x.abs() > n.z.abs() {
            (1, 2)
        } else if n.y.abs() > n.z.abs() {
            (0, 2)
        } else {
            (0, 1)
        };

        let dpdu = self.geom.dpdu;
        let dpdv = self.geom.dpdv;
        let a = Matrix2::from_cols(
            Vector2::new(dpdu[dim.0], dpdu[dim.1]),
            Vector2::new(dpdv[dim.0], dpdv[dim.1]),
        );

        let bx = Vec2f::new(dpdx[dim.0], dpdx[dim.1]);
        let by = Vec2f::new(dpdy[dim.0], dpdy[dim.1]);

        let (dudx, dvdx) = solve_linear_system_2x2(a, bx)?.into();
        let (dudy, dvdy) = solve_linear_system_2x2(a, by)?.into();
        Some(TextureDifferentials {
            dpdx,
            dpdy,

            dudx,
            dvdx,

            dudy,
            dvdy,
        })
    }
}

/// Flip `n` so it lies in the same hemisphere as `v`, pbrt's `Faceforward`.
pub fn face_forward(n: Normal3, v: Normal3) -> Normal3 {
    if n.dot(*v) < 0.0 { -n } else { n }
}

#[derive(Clone, Copy)]
pub struct DiffGeom {
    pub dpdu: Vec3f,
    pub dpdv: Vec3f,
    pub dndu: Normal3,
    pub dndv: Normal3,
}

/// Partial derivatives used for ray-differential-driven antialiasing.
#[derive(Clone, Copy)]
pub struct TextureDifferentials {
    pub dpdx: Vec3f,
    pub dpdy: Vec3f,

    pub dudx: Float,
    pub dvdx: Float,

    pub dudy: Float,
    pub dvdy: Float,
}
