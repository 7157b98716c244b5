pub mod progress;
pub mod session;
pub mod video;
