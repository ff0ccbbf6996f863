//! Framebuffer header (version 2) and pixel layout resolution.
//!
//! The header is 14 little-endian `u32` words. The channel pairs arrive
//! red, blue, green, alpha.

use tokio::io::AsyncRead;

use crate::error::Result;
use crate::wire;

/// Fourteen `u32` words.
pub const FRAMEBUFFER_HEADER_SIZE: usize = 14 * 4;

/// The only header version this crate decodes.
pub const FRAMEBUFFER_VERSION: u32 = 2;

/// Bit offset and bit length of one colour channel within a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSpec {
    pub offset: u32,
    pub length: u32,
}

impl ChannelSpec {
    pub const fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    fn pair(self) -> (u32, u32) {
        (self.offset, self.length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferHeader {
    pub version: u32,
    pub bpp: u32,
    pub color_space: u32,
    pub size: u32,
    pub width: u32,
    pub height: u32,
    pub red: ChannelSpec,
    pub blue: ChannelSpec,
    pub green: ChannelSpec,
    pub alpha: ChannelSpec,
}

impl FramebufferHeader {
    pub fn from_le_bytes(bytes: &[u8; FRAMEBUFFER_HEADER_SIZE]) -> Self {
        let word = |i: usize| {
            let at = i * 4;
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Self {
            version: word(0),
            bpp: word(1),
            color_space: word(2),
            size: word(3),
            width: word(4),
            height: word(5),
            red: ChannelSpec::new(word(6), word(7)),
            blue: ChannelSpec::new(word(8), word(9)),
            green: ChannelSpec::new(word(10), word(11)),
            alpha: ChannelSpec::new(word(12), word(13)),
        }
    }

    /// Read the header from a stream. The version is not checked here.
    pub async fn read_from<R>(reader: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let raw = wire::read_array::<FRAMEBUFFER_HEADER_SIZE, _>(reader).await?;
        Ok(Self::from_le_bytes(&raw))
    }

    /// Resolve the pixel layout this header describes.
    pub fn layout(&self) -> Option<PixelLayout> {
        PixelLayout::resolve(self)
    }
}

/// Pixel layouts the ADB framebuffer service produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Rgba8888,
    /// Four bytes per pixel, the fourth undefined and treated as opaque.
    Rgbx8888,
    Rgb888,
    Bgr565,
    Bgra8888,
}

impl PixelLayout {
    /// Match `(bpp, red, green, blue, alpha)` against the known layouts.
    ///
    /// The alpha offset is not compared when its length is 0.
    pub fn resolve(header: &FramebufferHeader) -> Option<Self> {
        let alpha = header.alpha.pair();
        let opaque = header.alpha.length == 0;
        match (
            header.bpp,
            header.red.pair(),
            header.green.pair(),
            header.blue.pair(),
        ) {
            (32, (0, 8), (8, 8), (16, 8)) if alpha == (24, 8) => Some(PixelLayout::Rgba8888),
            (32, (0, 8), (8, 8), (16, 8)) if opaque => Some(PixelLayout::Rgbx8888),
            (24, (0, 8), (8, 8), (16, 8)) if opaque => Some(PixelLayout::Rgb888),
            (16, (11, 5), (5, 6), (0, 5)) if opaque => Some(PixelLayout::Bgr565),
            (32, (16, 8), (8, 8), (0, 8)) if alpha == (24, 8) => Some(PixelLayout::Bgra8888),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgba8888 | PixelLayout::Rgbx8888 | PixelLayout::Bgra8888 => 4,
            PixelLayout::Rgb888 => 3,
            PixelLayout::Bgr565 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelLayout::Rgba8888 => "rgba8888",
            PixelLayout::Rgbx8888 => "rgbx8888",
            PixelLayout::Rgb888 => "rgb888",
            PixelLayout::Bgr565 => "bgr565",
            PixelLayout::Bgra8888 => "bgra8888",
        }
    }

    /// Convert one pixel to RGBA. `px` must hold `bytes_per_pixel()` bytes.
    pub fn to_rgba(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelLayout::Rgba8888 => [px[0], px[1], px[2], px[3]],
            PixelLayout::Rgbx8888 => [px[0], px[1], px[2], 0xFF],
            PixelLayout::Rgb888 => [px[0], px[1], px[2], 0xFF],
            PixelLayout::Bgra8888 => [px[2], px[1], px[0], px[3]],
            PixelLayout::Bgr565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1F) as u8;
                let g = ((v >> 5) & 0x3F) as u8;
                let b = (v & 0x1F) as u8;
                [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 0xFF]
            }
        }
    }
}

impl std::fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bpp: u32, r: (u32, u32), g: (u32, u32), b: (u32, u32), a: (u32, u32)) -> FramebufferHeader {
        FramebufferHeader {
            version: FRAMEBUFFER_VERSION,
            bpp,
            width: 1,
            height: 1,
            size: bpp / 8,
            red: ChannelSpec::new(r.0, r.1),
            green: ChannelSpec::new(g.0, g.1),
            blue: ChannelSpec::new(b.0, b.1),
            alpha: ChannelSpec::new(a.0, a.1),
            ..Default::default()
        }
    }

    #[test]
    fn layout_table() {
        let cases = [
            (header(32, (0, 8), (8, 8), (16, 8), (24, 8)), Some(PixelLayout::Rgba8888)),
            (header(32, (0, 8), (8, 8), (16, 8), (0, 0)), Some(PixelLayout::Rgbx8888)),
            (header(32, (0, 8), (8, 8), (16, 8), (24, 0)), Some(PixelLayout::Rgbx8888)),
            (header(24, (0, 8), (8, 8), (16, 8), (0, 0)), Some(PixelLayout::Rgb888)),
            (header(16, (11, 5), (5, 6), (0, 5), (0, 0)), Some(PixelLayout::Bgr565)),
            (header(32, (16, 8), (8, 8), (0, 8), (24, 8)), Some(PixelLayout::Bgra8888)),
            (header(32, (16, 8), (8, 8), (0, 8), (0, 0)), None),
            (header(16, (0, 5), (5, 6), (11, 5), (0, 0)), None),
            (header(24, (0, 8), (8, 8), (16, 8), (24, 8)), None),
            (header(8, (0, 8), (0, 0), (0, 0), (0, 0)), None),
        ];
        for (hdr, expected) in cases {
            assert_eq!(PixelLayout::resolve(&hdr), expected, "{hdr:?}");
        }
    }

    #[test]
    fn header_reads_blue_before_green() {
        let words: [u32; 14] = [2, 32, 0, 4, 1, 1, 0, 8, 16, 8, 8, 8, 24, 8];
        let mut raw = [0u8; FRAMEBUFFER_HEADER_SIZE];
        for (i, w) in words.iter().enumerate() {
            raw[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        let hdr = FramebufferHeader::from_le_bytes(&raw);
        assert_eq!(hdr.blue, ChannelSpec::new(16, 8));
        assert_eq!(hdr.green, ChannelSpec::new(8, 8));
        assert_eq!(hdr.layout(), Some(PixelLayout::Rgba8888));
    }

    #[tokio::test]
    async fn read_from_stream() {
        let mut raw = Vec::new();
        for w in [2u32, 16, 0, 2, 1, 1, 11, 5, 0, 5, 5, 6, 0, 0] {
            raw.extend_from_slice(&w.to_le_bytes());
        }
        let mut reader: &[u8] = &raw;
        let hdr = FramebufferHeader::read_from(&mut reader).await.unwrap();
        assert_eq!(hdr.version, 2);
        assert_eq!(hdr.layout(), Some(PixelLayout::Bgr565));
        assert_eq!(PixelLayout::Bgr565.bytes_per_pixel(), 2);
    }

    #[test]
    fn pixel_conversion() {
        assert_eq!(PixelLayout::Rgbx8888.to_rgba(&[1, 2, 3, 0]), [1, 2, 3, 0xFF]);
        assert_eq!(PixelLayout::Bgra8888.to_rgba(&[3, 2, 1, 9]), [1, 2, 3, 9]);
        assert_eq!(PixelLayout::Bgr565.to_rgba(&0xF800u16.to_le_bytes()), [0xFF, 0, 0, 0xFF]);
        assert_eq!(PixelLayout::Bgr565.to_rgba(&0x001Fu16.to_le_bytes()), [0, 0, 0xFF, 0xFF]);
    }
}
