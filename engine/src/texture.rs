//! 2D textures.

use crate::{Error, Gl, Result};
use image::RgbaImage;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Highest texture unit accepted by [`Texture::bind`]. OpenGL 3.3 guarantees at least 32 units
/// across all stages.
pub const MAX_TEXTURE_SLOT: u32 = 31;

/// Bytes per pixel of decoded images, which are always expanded to RGBA8.
const BYTES_PER_PIXEL: u32 = 4;

/// Decoded RGBA8 pixels on the CPU, bottom row first.
#[derive(Clone, PartialEq, Eq)]
#[must_use]
pub struct TextureImage {
    pixels: RgbaImage,
    path: Option<PathBuf>,
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl TextureImage {
    /// Decode an image file, flipping it vertically since OpenGL puts (0, 0) at the bottom left.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let pixels = image.flipv().into_rgba8();
        tracing::debug!(
            "loaded texture image {path:?} ({}x{})",
            pixels.width(),
            pixels.height()
        );
        Ok(Self {
            pixels,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap raw RGBA8 pixels, bottom row first.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL as usize;
        let actual = pixels.len();
        let pixels = RgbaImage::from_raw(width, height, pixels)
            .filter(|_| actual == expected)
            .ok_or(Error::InvalidImage {
                width,
                height,
                expected,
                actual,
            })?;
        Ok(Self { pixels, path: None })
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Bytes per pixel.
    #[inline]
    #[must_use]
    pub fn bpp(&self) -> u32 {
        BYTES_PER_PIXEL
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// An RGBA8 texture with linear filtering, clamped at the edges.
#[must_use]
pub struct Texture {
    gl: Gl,
    id: glow::Texture,
    width: u32,
    height: u32,
    path: Option<PathBuf>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Texture {
    /// Load an image file and upload it.
    pub fn from_path(gl: &Gl, path: impl AsRef<Path>) -> Result<Self> {
        Self::new(gl, &TextureImage::load(path)?)
    }

    /// Upload decoded pixels. The CPU copy can be dropped afterwards.
    pub fn new(gl: &Gl, image: &TextureImage) -> Result<Self> {
        let id = gl_call!(gl, create_texture())?.map_err(Error::Create)?;
        let texture = Self {
            gl: Gl::clone(gl),
            id,
            width: image.width(),
            height: image.height(),
            path: image.path.clone(),
        };

        gl_call!(gl, bind_texture(glow::TEXTURE_2D, Some(id)))?;
        for (parameter, value) in [
            (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
            (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
            (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
            (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
        ] {
            gl_call!(
                gl,
                tex_parameter_i32(glow::TEXTURE_2D, parameter, value as i32)
            )?;
        }
        gl_call!(
            gl,
            tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                image.width() as i32,
                image.height() as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(image.as_bytes()),
            )
        )?;
        texture.unbind()?;

        tracing::debug!(
            "uploaded texture {:?} ({}x{}) from {:?}",
            texture.id,
            texture.width,
            texture.height,
            texture.path
        );
        Ok(texture)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bind to texture unit `slot` so a `sampler2D` uniform set to `slot` samples it.
    pub fn bind(&self, slot: u32) -> Result<()> {
        if slot > MAX_TEXTURE_SLOT {
            return Err(Error::InvalidTextureSlot(slot));
        }
        gl_call!(self.gl, active_texture(glow::TEXTURE0 + slot))?;
        gl_call!(self.gl, bind_texture(glow::TEXTURE_2D, Some(self.id)))
    }

    #[inline]
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.gl, bind_texture(glow::TEXTURE_2D, None))
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        let _ = gl_call!(self.gl, delete_texture(self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_validates_length() {
        let image = TextureImage::from_rgba(2, 1, vec![255; 8]).expect("valid image");
        assert_eq!((image.width(), image.height(), image.bpp()), (2, 1, 4));
        assert_eq!(image.path(), None);

        let err = TextureImage::from_rgba(2, 2, vec![0; 8]).expect_err("too short");
        assert!(matches!(
            err,
            Error::InvalidImage {
                expected: 16,
                actual: 8,
                ..
            }
        ));
        assert!(TextureImage::from_rgba(1, 1, vec![0; 5]).is_err());
    }

    #[test]
    fn load_flips_vertically() {
        let path = std::env::temp_dir().join(format!("quad-engine-flip-{}.png", std::process::id()));
        let mut source = RgbaImage::new(1, 2);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        source.save(&path).expect("write png");

        let image = TextureImage::load(&path).expect("decodable png");
        assert_eq!((image.width(), image.height()), (1, 2));
        assert_eq!(&image.as_bytes()[..4], &[0, 0, 255, 255]);
        assert_eq!(&image.as_bytes()[4..], &[255, 0, 0, 255]);
        assert_eq!(image.path(), Some(path.as_path()));

        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn load_missing_file() {
        let err = TextureImage::load("res/textures/missing.png").expect_err("missing file");
        assert!(matches!(err, Error::Image { .. }));
        assert!(err.to_string().contains("missing.png"));
    }
}
