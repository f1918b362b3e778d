pub mod geometry;
pub mod status;
