use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use raytracer::bvh::BVH;
use raytracer::geometry::Transform;
use raytracer::primitive::{GeometricPrimitive, Primitive};
use raytracer::shapes::sphere::Sphere;
use raytracer::{Point3f, Ray, Vec3f, INFINITY};

/// A grid of non-overlapping unit spheres, plus the identity transforms they
/// borrow from (the BVH and sphere shapes are both non-owning over transforms).
struct SphereField {
    transforms: Vec<(Transform, Transform)>,
}

impl SphereField {
    fn new(n: usize) -> Self {
        let transforms = (0..n).map(|_| (Transform::identity(), Transform::identity())).collect();
        SphereField { transforms }
    }

    fn build_bvh(&self) -> BVH<'_> {
        let prims: Vec<Arc<dyn Primitive + '_>> = self.transforms.iter()
            .map(|(o2w, w2o)| {
                let shape = Sphere::whole(o2w, w2o, 0.4);
                Arc::new(GeometricPrimitive::new(shape, None, None)) as Arc<dyn Primitive + '_>
            })
            .collect();
        BVH::build(prims)
    }
}

fn bvh_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_build");
    for &n in &[16usize, 128, 1024] {
        let field = SphereField::new(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| field.build_bvh());
        });
    }
    group.finish();
}

fn bvh_intersect_benchmark(c: &mut Criterion) {
    let field = SphereField::new(256);
    let bvh = field.build_bvh();

    c.bench_function("bvh_intersect_miss", |b| {
        b.iter(|| {
            let mut ray = Ray {
                origin: Point3f::new(0.0, 0.0, -100.0),
                dir: Vec3f::new(0.0, 1.0, 0.0),
                t_max: INFINITY,
                time: 0.0,
            };
            bvh.intersect(&mut ray)
        });
    });
}

criterion_group!(benches, bvh_build_benchmark, bvh_intersect_benchmark);
criterion_main!(benches);
