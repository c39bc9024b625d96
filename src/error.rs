// MIT/Apache2 License

use crate::{Image, ResourceIndex};
use std::fmt;

/// Sum error type for easel operations.
#[derive(Debug, Clone)]
pub enum Error {
    /// A static string message.
    StaticMsg(&'static str),
    /// A string message.
    Msg(String),
    /// A color literal could not be parsed.
    InvalidColor(String),
    /// The image cache has no resource at this index.
    NoResource(ResourceIndex),
    /// The rendering context does not know of this image.
    UnknownImage(Image),
    /// The resource backing a drawable failed to load.
    LoadFailed { source: String, error: LoadError },
}

/// Why an image resource did not load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The loader reported a failure.
    Failed(String),
    /// The loader dropped its completion without reporting anything.
    Abandoned,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticMsg(s) => f.write_str(s),
            Self::Msg(s) => f.write_str(s),
            Self::InvalidColor(s) => write!(f, "\"{}\" is not a valid color", s),
            Self::NoResource(index) => write!(f, "Image resource #{} does not exist", index.get()),
            Self::UnknownImage(image) => {
                write!(f, "Image of ID {:#010x} does not exist", image.into_raw())
            }
            Self::LoadFailed { source, error } => {
                write!(f, "Image \"{}\" failed to load: {}", source, error)
            }
        }
    }
}

impl fmt::Display for LoadError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => f.write_str(reason),
            Self::Abandoned => f.write_str("loader dropped the request without completing it"),
        }
    }
}

/// Convenience result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
