pub mod error;
pub mod geom;
pub mod input;
pub mod mesh;
pub mod model;
pub mod report;
pub mod scene;
pub mod stl;

pub use error::{EmptyMeshError, FormatError, InvalidInputError};
