use std::{error, fmt};

/// Unified error type
///
/// Errors from the crates used for importing (gltf, tobj, image, serde_yaml)
/// are wrapped so the `?` operator can be used throughout. Some of them are
/// quite large so are boxed.
///
/// Errors that are specific to the structure of the imported scene are
/// described by `ImportError` which has its own variant here.
#[derive(Debug)]
pub enum SwError {
    UnsupportedFormat,
    VertexCountTooLarge,
    StdIoError(std::io::Error),
    SerdeYamlError(Box<serde_yaml::Error>),
    TObjLoadError(tobj::LoadError),
    ImageImageError(Box<image::error::ImageError>),
    GltfError(Box<gltf::Error>),
    ImportError(crate::scene_import::ImportError),
}

impl error::Error for SwError {}

impl fmt::Display for SwError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnsupportedFormat => write!(f, "format is not supported"),
            Self::VertexCountTooLarge => {
                write!(f, "vertex count does not fit in 32 bits")
            }
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::SerdeYamlError(e) => write!(f, "serde_yaml::Error: {e}"),
            Self::TObjLoadError(e) => write!(f, "tobj crate LoadError: {e}"),
            Self::ImageImageError(e) => {
                write!(f, "image crate ImageError: {e}")
            }
            Self::GltfError(e) => write!(f, "gltf Error: {e}"),
            Self::ImportError(e) => write!(f, "import error: {e}"),
        }
    }
}

impl From<std::io::Error> for SwError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl From<serde_yaml::Error> for SwError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<tobj::LoadError> for SwError {
    fn from(e: tobj::LoadError) -> Self {
        Self::TObjLoadError(e)
    }
}

impl From<image::error::ImageError> for SwError {
    fn from(e: image::error::ImageError) -> Self {
        Self::ImageImageError(Box::new(e))
    }
}

impl From<gltf::Error> for SwError {
    fn from(e: gltf::Error) -> Self {
        Self::GltfError(Box::new(e))
    }
}

impl From<crate::scene_import::ImportError> for SwError {
    fn from(e: crate::scene_import::ImportError) -> Self {
        Self::ImportError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::SwError;
    use crate::scene_import::ImportError;

    #[test]
    fn conversions() {
        let e: SwError = ImportError::NoIndices.into();
        assert!(matches!(e, SwError::ImportError(ImportError::NoIndices)));

        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let e: SwError = io.into();
        assert!(matches!(e, SwError::StdIoError(_)));

        assert_eq!(
            SwError::VertexCountTooLarge.to_string(),
            "vertex count does not fit in 32 bits"
        );
    }
}
