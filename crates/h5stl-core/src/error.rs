use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("STL payload is empty")]
    Empty,
    #[error("STL payload too short for a header: {len} bytes (need at least {min})")]
    MissingHeader { len: usize, min: usize },
    #[error(
        "STL header declares {declared} triangles ({expected} bytes) but payload is {actual} bytes"
    )]
    CountMismatch {
        declared: u32,
        expected: u64,
        actual: usize,
    },
    #[error("binary STL records unreadable: {0}")]
    Binary(String),
    #[error("ASCII STL is not valid UTF-8")]
    NotText,
    #[error("malformed ASCII STL: {0}")]
    Ascii(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("mesh has no triangles")]
pub struct EmptyMeshError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name:?} is not {expected} (declared type: {declared})")]
pub struct InvalidInputError {
    pub name: String,
    pub expected: &'static str,
    pub declared: String,
}
