//! Repository structs providing async CRUD operations for each entity.
//!
//! Each repository is a zero-sized struct with associated functions that
//! take a `&PgPool` as the first argument.

pub mod progress_repo;
pub mod video_repo;

pub use progress_repo::ProgressRepo;
pub use video_repo::VideoRepo;
