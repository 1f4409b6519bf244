use crate::error::InvalidInputError;
use crate::stl::STL_MIME;
use std::path::Path;

pub const H5_MIME: &str = "application/x-hdf5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Stl,
    H5,
}

impl FileKind {
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Stl => "stl",
            FileKind::H5 => "h5",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            FileKind::Stl => STL_MIME,
            FileKind::H5 => H5_MIME,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FileKind::Stl => "an STL file",
            FileKind::H5 => "an h5 file",
        }
    }
}

/// A user-selected file already read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Declares the MIME type from the file extension, as a browser would.
    pub fn with_guessed_mime(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name).map(str::to_string);
        Self { name, mime, bytes }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }

    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
    }

    /// Either the declared type or the extension may identify the file.
    pub fn is(&self, kind: FileKind) -> bool {
        let mime_matches = self
            .mime
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(kind.mime()));
        mime_matches || self.extension().as_deref() == Some(kind.extension())
    }

    pub fn require(&self, kind: FileKind) -> Result<(), InvalidInputError> {
        if self.is(kind) {
            return Ok(());
        }
        Err(InvalidInputError {
            name: self.name.clone(),
            expected: kind.describe(),
            declared: self.mime.clone().unwrap_or_else(|| "none".to_string()),
        })
    }
}

pub fn guess_mime(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "stl" => Some(STL_MIME),
        "h5" => Some(H5_MIME),
        _ => None,
    }
}
