use bevy::prelude::*;
use gyroid_cubes::GyroidPlugin;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "gyroid".into(),
                    ..default()
                }),
                ..default()
            }),
            GyroidPlugin {
                width: 640,
                height: 640,
                ..default()
            },
        ))
        .insert_resource(ClearColor(Color::srgb(0.06, 0.06, 0.08)))
        .run();
}
