pub mod face_grid;

pub use face_grid::FaceGrid;
