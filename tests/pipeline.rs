use std::sync::atomic::{AtomicBool, Ordering};

use approx::assert_abs_diff_eq;
use bevy::color::Srgba;
use gyroid_cubes::{
    canvas::{DrawingSurface, PixelCanvas},
    config::{GyroidConfig, MARCHING_CUBE_RANGE},
    field::gyroid_volume,
    march::marching_cubes,
    mesh::Scene,
    plugin::build_scene,
    render::FrameRenderer,
    types::{ScreenPoint, Value, Vector},
};
use rand::{SeedableRng, rngs::StdRng};

#[derive(Default)]
struct Counter {
    clears: usize,
    filled: usize,
    outlined: usize,
}

impl DrawingSurface for Counter {
    fn clear(&mut self) {
        self.clears += 1;
        self.filled = 0;
        self.outlined = 0;
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        _stroke: Srgba,
        fill: Option<Srgba>,
        _opacity: Value,
    ) {
        assert_eq!(points.len(), 3);
        if fill.is_some() {
            self.filled += 1;
        } else {
            self.outlined += 1;
        }
    }
}

#[test]
fn gyroid_volume_to_scene() {
    let config = GyroidConfig::default();
    let volume = gyroid_volume(config.volume, config.gyroid_resolution);

    assert_eq!(volume.len(), config.volume.len());
    for coord in config.volume.iter() {
        let v = volume.get(coord);
        assert!(v >= MARCHING_CUBE_RANGE[0] && v <= MARCHING_CUBE_RANGE[1]);
    }
    assert_abs_diff_eq!(volume.get([0, 0, 0]), 0.0);

    let vertices = marching_cubes(
        &volume,
        &config.volume.shrink_by_step(),
        config.cell_resolution,
        config.iso_level,
    )
    .unwrap();
    assert_eq!(vertices.len() % 3, 0);

    let scene = Scene::from_vertices(&vertices, Vector::new(16.0, 16.0, 16.0)).unwrap();
    assert_eq!(scene.len(), vertices.len() / 3);
}

#[test]
fn every_face_is_drawn_each_frame() {
    let config = GyroidConfig::default();
    let scene = build_scene(&config).unwrap();
    let mut renderer =
        FrameRenderer::from_config(&config, 320, 320, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut surface = Counter::default();

    for _ in 0..3 {
        let stats = renderer.tick(scene.faces(), &mut surface);
        assert_eq!(stats.filled, surface.filled);
        assert_eq!(stats.outlined, surface.outlined);
        assert_eq!(surface.filled + surface.outlined, scene.len());
    }
    assert_eq!(surface.clears, 3);
    // Some faces face the light, some face away
    assert!(surface.filled > 0);
    assert!(surface.outlined > 0);
}

#[test]
fn renders_pixels_until_cancelled() {
    let config = GyroidConfig::default();
    let scene = build_scene(&config).unwrap();
    let mut renderer =
        FrameRenderer::from_config(&config, 128, 128, &mut StdRng::seed_from_u64(9)).unwrap();
    let mut canvas = PixelCanvas::new(128, 128).unwrap();
    let cancel = AtomicBool::new(false);

    let mut drawn = Vec::new();
    let frames = renderer.run_until_cancelled(scene.faces(), &mut canvas, &cancel, |c, _| {
        drawn.push(c.pixels().iter().filter(|&&b| b != 0).count());
        if drawn.len() == 2 {
            cancel.store(true, Ordering::Release);
        }
    });

    assert_eq!(frames, 2);
    assert!(drawn.iter().all(|&n| n > 0));
    // The centre of the volume is covered by the surface
    let [.., alpha] = canvas.pixel(64, 64).unwrap();
    assert!(alpha > 0);
}
