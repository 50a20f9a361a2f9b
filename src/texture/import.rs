use crate::sw_error::SwError;
use image::{io::Reader, RgbaImage};
use log::info;
use std::path::Path;

/// Decodes an image file into 8 bit RGBA, ready to be uploaded by the
/// renderer. The format is detected from the file contents.
///
/// # Errors
/// May return `SwError`
pub fn load(path: &Path) -> Result<RgbaImage, SwError> {
    let image = Reader::open(path)?
        .with_guessed_format()?
        .decode()?
        .into_rgba8();
    let (width, height) = image.dimensions();
    info!("{} texture loaded w: {width}, h: {height}", path.display());
    Ok(image)
}
