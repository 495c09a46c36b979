use std::sync::Arc;

use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{error, info};

use crate::{
    canvas::PixelCanvas,
    config::GyroidConfig,
    error::Result,
    field::gyroid_volume,
    march::marching_cubes,
    mesh::Scene,
    render::FrameRenderer,
    types::{Face, Value, Vector},
};

/// System sets for the gyroid pipeline.
///
/// ```text
/// GyroidSet::Render  →  GyroidSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GyroidSet {
    /// Ticks the [`FrameRenderer`] into the [`GyroidCanvas`].
    Render,
    /// Copies the canvas pixels into the displayed [`Image`].
    Upload,
}

/// The static, recentered face list. Built once in `Startup`.
#[derive(Resource, Clone)]
pub struct GyroidScene {
    pub faces: Arc<Vec<Face>>,
}

/// The software canvas, the renderer that owns the rotation state, and the
/// image the canvas is shown through.
#[derive(Resource)]
pub struct GyroidCanvas {
    pub renderer: FrameRenderer,
    pub canvas: PixelCanvas,
    pub image: Handle<Image>,
}

/// Bevy plugin that builds the gyroid mesh once and redraws it every frame.
///
/// Bevy's `Update` schedule stands in for the host's animation-frame callback:
/// one tick per frame until the app exits.
///
/// ```text
/// Startup
///   → sample gyroid volume → marching cubes → Scene      (GyroidScene)
///   → FrameRenderer + PixelCanvas + Image sprite         (GyroidCanvas)
/// Update (every frame, feature `auto_render`)
///   → FrameRenderer::tick                                (GyroidSet::Render)
///   → canvas pixels → Image                              (GyroidSet::Upload)
/// ```
pub struct GyroidPlugin {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Seed for the rotation shuffle. `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub config: GyroidConfig,
}

impl Default for GyroidPlugin {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            seed: None,
            config: GyroidConfig::default(),
        }
    }
}

/// Canvas size and seed, as given to the plugin.
#[derive(Resource, Clone, Copy, Debug)]
pub struct GyroidViewport {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
}

impl Plugin for GyroidPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(GyroidViewport {
                width: self.width,
                height: self.height,
                seed: self.seed,
            })
            .add_systems(Startup, setup_gyroid.map(report_setup_error));

        #[cfg(feature = "auto_render")]
        app.configure_sets(Update, (GyroidSet::Render, GyroidSet::Upload).chain())
            .add_systems(
                Update,
                (
                    render_frame.in_set(GyroidSet::Render),
                    upload_canvas.in_set(GyroidSet::Upload),
                ),
            );
    }
}

/// Runs the one-off geometry pipeline for `config`.
///
/// Returns [`InvalidStep`](crate::error::GyroidError::InvalidStep) before sampling if `config.volume` has a
/// non-positive step.
///
/// ```text
/// gyroid_volume(config.volume)                   →  DensityVolume
/// marching_cubes(volume, volume - one step)      →  flat vertex list
/// Scene::from_vertices(vertices, config.volume.to) →  recentered faces
/// ```
pub fn build_scene(config: &GyroidConfig) -> Result<Scene> {
    config.volume.validate()?;
    let volume = gyroid_volume(config.volume, config.gyroid_resolution);
    let cells = config.volume.shrink_by_step();
    let vertices = marching_cubes(&volume, &cells, config.cell_resolution, config.iso_level)?;

    let [x, y, z] = config.volume.to;
    let scene = Scene::from_vertices(&vertices, Vector::new(x as Value, y as Value, z as Value))?;

    info!(
        samples = volume.len(),
        vertices = vertices.len(),
        faces = scene.len(),
        "built gyroid scene"
    );
    Ok(scene)
}

fn setup_gyroid(
    mut commands: Commands,
    config: Res<GyroidConfig>,
    viewport: Res<GyroidViewport>,
    mut images: ResMut<Assets<Image>>,
) -> Result<()> {
    let scene = build_scene(&config)?;

    let renderer = match viewport.seed {
        Some(seed) => FrameRenderer::from_config(
            &config,
            viewport.width,
            viewport.height,
            &mut StdRng::seed_from_u64(seed),
        )?,
        None => FrameRenderer::from_config(
            &config,
            viewport.width,
            viewport.height,
            &mut rand::thread_rng(),
        )?,
    };
    let canvas = PixelCanvas::new(viewport.width, viewport.height)?;

    let image = images.add(Image::new_fill(
        Extent3d {
            width: viewport.width,
            height: viewport.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    ));

    commands.spawn(Camera2d);
    commands.spawn(Sprite::from_image(image.clone()));

    commands.insert_resource(GyroidScene {
        faces: Arc::new(scene.faces().to_vec()),
    });
    commands.insert_resource(GyroidCanvas {
        renderer,
        canvas,
        image,
    });
    Ok(())
}

/// Scene setup errors are fatal.
fn report_setup_error(result: Result<()>) {
    if let Err(err) = result {
        error!("failed to set up gyroid scene: {err}");
        panic!("failed to set up gyroid scene: {err}");
    }
}

/// Draws one frame of the scene into the software canvas.
fn render_frame(scene: Res<GyroidScene>, mut state: ResMut<GyroidCanvas>) {
    let GyroidCanvas {
        renderer, canvas, ..
    } = &mut *state;
    renderer.tick(&scene.faces, canvas);
}

/// Copies the canvas into the sprite's [`Image`].
fn upload_canvas(state: Res<GyroidCanvas>, mut images: ResMut<Assets<Image>>) {
    if let Some(mut image) = images.get_mut(&state.image) {
        match image.data.as_mut() {
            Some(data) => data.copy_from_slice(state.canvas.pixels()),
            None => image.data = Some(state.canvas.pixels().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GyroidError;

    #[test]
    fn default_scene_is_centered_on_volume_midpoint() {
        let scene = build_scene(&GyroidConfig::default()).unwrap();
        assert!(!scene.is_empty());
        for face in scene.faces() {
            for p in face {
                assert!(p.x.abs() <= 8.0 && p.y.abs() <= 8.0 && p.z.abs() <= 8.0);
            }
        }
    }

    #[test]
    fn zero_volume_step_is_rejected_before_sampling() {
        let mut config = GyroidConfig::default();
        config.volume.by = [0, 1, 1];
        assert_eq!(build_scene(&config).unwrap_err(), GyroidError::InvalidStep);
    }

    #[test]
    #[should_panic(expected = "failed to set up gyroid scene: InvalidViewport")]
    fn setup_failure_is_fatal() {
        report_setup_error(Err(GyroidError::InvalidViewport));
    }
}
