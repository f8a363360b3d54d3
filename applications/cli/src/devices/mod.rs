//! Headless stand-ins for the camera and audio element

pub mod camera;
pub mod player;

pub use camera::FileCamera;
pub use player::HeadlessPlayer;
