use adbwire_frame::framebuffer::FRAMEBUFFER_VERSION;
use adbwire_frame::{wire, FramebufferHeader, PixelLayout};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::connector::HostConnection;
use crate::error::{ClientError, Result};

/// Largest framebuffer accepted: 256 MiB.
const MAX_FRAMEBUFFER_SIZE: usize = 256 * 1024 * 1024;

/// One captured screen: header, resolved layout and raw pixels.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub header: FramebufferHeader,
    pub layout: PixelLayout,
    pub data: Bytes,
}

impl Framebuffer {
    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.layout.bytes_per_pixel()
    }

    /// Convert every pixel to RGBA, forcing alpha opaque where the layout has none.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.data
            .chunks_exact(self.bytes_per_pixel())
            .flat_map(|px| self.layout.to_rgba(px))
            .collect()
    }

    /// Header fields suitable for display.
    pub fn summary(&self) -> FramebufferSummary {
        FramebufferSummary {
            width: self.header.width,
            height: self.header.height,
            bpp: self.header.bpp,
            color_space: self.header.color_space,
            size: self.header.size,
            layout: self.layout.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramebufferSummary {
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub color_space: u32,
    pub size: u32,
    pub layout: &'static str,
}

/// Read header and pixels from an accepted `framebuffer:` session.
pub(crate) async fn read(mut conn: HostConnection) -> Result<Framebuffer> {
    let stream = conn.stream_mut();
    let header = FramebufferHeader::read_from(stream).await?;
    if header.version != FRAMEBUFFER_VERSION {
        return Err(ClientError::protocol(format!(
            "invalid framebuffer version {}",
            header.version
        )));
    }

    let data = wire::read_vec(stream, header.size as usize, MAX_FRAMEBUFFER_SIZE).await?;
    let layout = header.layout().ok_or_else(|| {
        ClientError::protocol(format!(
            "invalid pixel format: bpp {} red {:?} green {:?} blue {:?} alpha {:?}",
            header.bpp, header.red, header.green, header.blue, header.alpha
        ))
    })?;

    debug!(
        width = header.width,
        height = header.height,
        %layout,
        bytes = data.len(),
        "framebuffer captured"
    );
    Ok(Framebuffer {
        header,
        layout,
        data: Bytes::from(data),
    })
}
