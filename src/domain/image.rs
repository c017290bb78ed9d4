use image::{Rgb, RgbImage};

use super::errors::{DomainError, DomainResult};

/// Imagen decodificada en memoria: alto × ancho × 3 canales de 8 bits.
/// Nunca tiene dimensiones vacías.
#[derive(Debug, Clone)]
pub struct Image {
    rgb: RgbImage,
}

impl Image {
    pub fn from_rgb(rgb: RgbImage) -> DomainResult<Self> {
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(DomainError::Decode(format!(
                "image has empty dimensions {}x{}",
                rgb.width(),
                rgb.height()
            )));
        }
        Ok(Self { rgb })
    }

    pub fn width(&self) -> u32 { self.rgb.width() }

    pub fn height(&self) -> u32 { self.rgb.height() }

    /// Coordenada x de referencia del vehículo: el punto medio horizontal.
    pub fn center_x(&self) -> u32 { self.rgb.width() / 2 }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> { *self.rgb.get_pixel(x, y) }

    pub fn rgb(&self) -> &RgbImage { &self.rgb }
}
