use std::io::Cursor;

use image::{ImageReader, Limits};
use tracing::debug;

use crate::application::ports::ImageDecoderPort;
use crate::config::DecoderConfig;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::image::Image;

/// Decodificador basado en el crate `image`. Normaliza escala de grises,
/// canal alfa y 16 bits a RGB de 8 bits.
pub struct ImageCrateDecoder {
    cfg: DecoderConfig,
}

impl ImageCrateDecoder {
    pub fn new(cfg: DecoderConfig) -> Self { Self { cfg } }
}

impl ImageDecoderPort for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> DomainResult<Image> {
        if bytes.is_empty() {
            return Err(DomainError::Decode("empty image buffer".into()));
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DomainError::Decode(e.to_string()))?;
        let Some(format) = reader.format() else {
            return Err(DomainError::Decode("unrecognized image format".into()));
        };

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.cfg.max_width);
        limits.max_image_height = Some(self.cfg.max_height);
        reader.limits(limits);

        let decoded = reader.decode().map_err(|e| DomainError::Decode(e.to_string()))?;
        debug!(?format, color = ?decoded.color(), "Imagen decodificada");
        Image::from_rgb(decoded.to_rgb8())
    }
}
