pub mod camera;
pub mod canvas;
pub mod config;
pub mod error;
pub mod field;
pub mod interp;
pub mod lattice;
pub mod march;
pub mod mesh;
pub mod plugin;
pub mod render;
pub mod tables;
pub mod types;
pub mod utils;
pub mod volume;

pub use plugin::GyroidPlugin;
