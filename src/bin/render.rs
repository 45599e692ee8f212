use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raytracer::bvh::BVH;
use raytracer::camera::PerspectiveCamera;
use raytracer::concurrency::ParallelPool;
use raytracer::config::{LightDistributionKind, RenderConfig};
use raytracer::film::Film;
use raytracer::filter::BoxFilter;
use raytracer::geometry::Transform;
use raytracer::imageio::write_exr;
use raytracer::integrator::path::PathIntegrator;
use raytracer::integrator::SamplerIntegrator;
use raytracer::light::point::PointLight;
use raytracer::light::Light;
use raytracer::material::matte::MatteMaterial;
use raytracer::material::mirror::MirrorMaterial;
use raytracer::primitive::{GeometricPrimitive, Primitive};
use raytracer::sampler::stratified::StratifiedSampler;
use raytracer::scene::Scene;
use raytracer::shapes::sphere::Sphere;
use raytracer::spectrum::Spectrum;
use raytracer::{vec3f, Bounds2f, Point2i, Point3f};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match env::args().nth(1) {
        Some(path) => RenderConfig::from_file(&path)
            .with_context(|| format!("reading render config from {}", path))?,
        None => RenderConfig::default(),
    };

    if config.light_distribution != LightDistributionKind::Spatial {
        tracing::warn!(
            distribution = ?config.light_distribution,
            "light_distribution is parsed but not yet wired into light sampling; every light is still sampled uniformly"
        );
    }

    info!(?config, "starting render");
    render(&config)
}

/// Renders the built-in two-sphere demonstration scene: a mirror sphere in
/// front of a matte red one, lit so a ray through the frame's center
/// reflects off the mirror into the red sphere.
fn render(config: &RenderConfig) -> anyhow::Result<()> {
    let mirror_to_world = Transform::translate(vec3f!(-1.1, 0.0, 0.0));
    let mirror_to_object = mirror_to_world.inverse();
    let red_to_world = Transform::translate(vec3f!(1.3, 4.0, 0.0));
    let red_to_object = red_to_world.inverse();

    let mirror_sphere = Sphere::whole(&mirror_to_world, &mirror_to_object, 1.0);
    let red_sphere = Sphere::whole(&red_to_world, &red_to_object, 1.0);

    let mirror_material = Arc::new(MirrorMaterial::new(Spectrum::from([0.9, 0.9, 0.9])));
    let red_material = Arc::new(MatteMaterial::new(Spectrum::from([0.7, 0.1, 0.1]), 0.0));

    let prims: Vec<Arc<dyn Primitive + '_>> = vec![
        Arc::new(GeometricPrimitive::new(mirror_sphere, Some(mirror_material), None)),
        Arc::new(GeometricPrimitive::new(red_sphere, Some(red_material), None)),
    ];
    let bvh = BVH::build(prims);

    let light: Box<dyn Light> = Box::new(PointLight::new(
        Transform::translate(vec3f!(-3.0, -3.0, 5.0)),
        Spectrum::from([40.0, 40.0, 40.0]),
    ));
    let scene = Scene::new(bvh, vec![light]);

    let camera_to_world = Transform::camera_look_at(
        Point3f::new(0.0, -6.0, 0.5),
        Point3f::new(0.0, 0.0, 0.0),
        vec3f!(0, 0, 1),
    );

    let (res_x, res_y) = config.resolution;
    let resolution = Point2i::new(res_x, res_y);
    let aspect = res_x as f32 / res_y as f32;
    let screen_window: Bounds2f = if aspect > 1.0 {
        ((-aspect, -1.0), (aspect, 1.0)).into()
    } else {
        ((-1.0, -1.0 / aspect), (1.0, 1.0 / aspect)).into()
    };

    let camera = Box::new(PerspectiveCamera::new(
        camera_to_world,
        resolution,
        screen_window,
        (0.0, 1.0),
        0.0,
        1.0e6,
        50.0,
    ));

    let film = Film::new(
        resolution,
        ((0.0, 0.0), (1.0, 1.0)).into(),
        BoxFilter::default(),
        35.0,
    );

    let samples_per_side = (config.samples_per_pixel as f64).sqrt().ceil() as usize;
    let sampler = StratifiedSampler::new(samples_per_side.max(1), samples_per_side.max(1), true, 4, 0);

    let mut integrator = SamplerIntegrator {
        tile_size: config.tile_size,
        ..SamplerIntegrator::new(camera, PathIntegrator::new(config.max_depth, 0.05))
    };

    let pool = ParallelPool::new();
    info!(threads = pool.n_threads(), "rendering");
    integrator.render_parallel(&scene, &film, sampler, &pool);

    let image = film.into_image_buffer();
    write_exr(&config.output, &image).context("writing output image")?;

    info!(output = %config.output, "wrote render");
    Ok(())
}
