mod jpeg;

pub use jpeg::{draw_quad, JpegOutput};
