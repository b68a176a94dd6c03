mod camera;
mod still;

pub use camera::CameraInput;
pub use still::StillInput;
