// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera device
//!
//! Opens `/dev/video*` nodes through the v4l crate and streams frames from
//! memory-mapped buffers. The device is asked for YUYV first and MJPG
//! second; RGB3 is accepted when the driver insists on it.

use super::format_converters::{rgb_to_rgba, yuyv_to_rgba};
use super::types::{CameraFrame, FacingMode, StreamRequest};
use super::{MediaDevice, VideoStream};
use crate::errors::{CameraError, CameraResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// Memory-mapped buffers queued on the driver
const BUFFER_COUNT: u32 = 4;

/// Formats requested from the driver, in order of preference
const PREFERRED_FORMATS: [&[u8; 4]; 2] = [b"YUYV", b"MJPG"];

/// Map an OS error from a V4L2 call to the acquisition error the user sees
pub fn camera_error_from_io(err: &io::Error) -> CameraError {
    match err.raw_os_error() {
        Some(libc::EACCES | libc::EPERM) => CameraError::PermissionDenied,
        Some(libc::ENOENT | libc::ENODEV | libc::ENXIO) => CameraError::NotFound,
        Some(libc::EBUSY) => CameraError::Busy,
        Some(_) => CameraError::Other(err.to_string()),
        None => match err.kind() {
            io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
            io::ErrorKind::NotFound => CameraError::NotFound,
            _ => CameraError::Other(err.to_string()),
        },
    }
}

/// Pixel layouts the stream can convert to RGBA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Yuyv,
    Mjpeg,
    Rgb24,
}

impl PixelLayout {
    fn from_fourcc(fourcc: FourCC) -> Option<Self> {
        match &fourcc.repr {
            b"YUYV" => Some(PixelLayout::Yuyv),
            b"MJPG" => Some(PixelLayout::Mjpeg),
            b"RGB3" => Some(PixelLayout::Rgb24),
            _ => None,
        }
    }
}

/// Camera backed by one or two V4L2 video nodes
pub struct V4l2Device {
    front: PathBuf,
    back: Option<PathBuf>,
    name: String,
}

impl V4l2Device {
    /// Device whose `front` node serves both facings
    pub fn new(front: impl Into<PathBuf>) -> Self {
        let front = front.into();
        let name = front.display().to_string();
        Self {
            front,
            back: None,
            name,
        }
    }

    /// Use a separate node for the back camera
    pub fn with_back(mut self, back: Option<PathBuf>) -> Self {
        self.back = back;
        self
    }

    /// Video node opened for `facing`
    pub fn path_for(&self, facing: FacingMode) -> &Path {
        match (facing, &self.back) {
            (FacingMode::Back, Some(back)) => back,
            _ => &self.front,
        }
    }
}

impl MediaDevice for V4l2Device {
    fn open(&self, request: &StreamRequest) -> CameraResult<Box<dyn VideoStream>> {
        let path = self.path_for(request.facing);
        let dev = Device::with_path(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to open V4L2 device");
            camera_error_from_io(&e)
        })?;

        let (format, layout) = negotiate_format(&dev, request)?;
        info!(
            path = %path.display(),
            width = format.width,
            height = format.height,
            fourcc = %format.fourcc,
            "V4L2 format configured"
        );

        let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "Failed to create buffer stream");
                camera_error_from_io(&e)
            })?;

        Ok(Box::new(V4l2Stream {
            facing: request.facing,
            width: format.width,
            height: format.height,
            stride: format.stride,
            layout,
            stream: Some(stream),
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ask for each preferred format until the driver settles on one we can convert
fn negotiate_format(dev: &Device, request: &StreamRequest) -> CameraResult<(Format, PixelLayout)> {
    let mut last_error = CameraError::Other("No supported pixel format".to_string());

    for fourcc in PREFERRED_FORMATS {
        let wanted = Format::new(request.ideal_width, request.ideal_height, FourCC::new(fourcc));
        match dev.set_format(&wanted) {
            Ok(actual) => match PixelLayout::from_fourcc(actual.fourcc) {
                Some(layout) => return Ok((actual, layout)),
                None => {
                    debug!(wanted = %wanted.fourcc, got = %actual.fourcc, "Driver chose another format");
                    last_error =
                        CameraError::Other(format!("Unsupported pixel format {}", actual.fourcc));
                }
            },
            Err(e) => {
                let err = camera_error_from_io(&e);
                if matches!(err, CameraError::Busy | CameraError::PermissionDenied) {
                    return Err(err);
                }
                debug!(fourcc = %wanted.fourcc, error = %e, "Format rejected");
                last_error = err;
            }
        }
    }

    Err(last_error)
}

/// Convert one raw buffer to an RGBA frame
fn decode_frame(
    layout: PixelLayout,
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> CameraResult<CameraFrame> {
    let short = || CameraError::Other(format!("Short {:?} frame: {} bytes", layout, data.len()));

    match layout {
        PixelLayout::Yuyv => {
            let rgba = yuyv_to_rgba(data, width, height, stride).ok_or_else(short)?;
            Ok(CameraFrame::from_rgba(width, height, rgba))
        }
        PixelLayout::Rgb24 => {
            let rgba = rgb_to_rgba(data, width, height, stride).ok_or_else(short)?;
            Ok(CameraFrame::from_rgba(width, height, rgba))
        }
        PixelLayout::Mjpeg => {
            let image = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
                .map_err(|e| CameraError::Other(format!("MJPG decode failed: {}", e)))?
                .to_rgba8();
            let (width, height) = image.dimensions();
            Ok(CameraFrame::from_rgba(width, height, image.into_raw()))
        }
    }
}

struct V4l2Stream {
    facing: FacingMode,
    width: u32,
    height: u32,
    stride: u32,
    layout: PixelLayout,
    stream: Option<MmapStream<'static>>,
}

impl VideoStream for V4l2Stream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> CameraResult<CameraFrame> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CameraError::Other("Stream stopped".to_string()))?;
        let (buf, meta) = stream.next().map_err(|e| camera_error_from_io(&e))?;

        // Compressed frames only fill part of the buffer
        let used = (meta.bytesused as usize).min(buf.len());
        let data = if used > 0 { &buf[..used] } else { buf };
        decode_frame(self.layout, data, self.width, self.height, self.stride)
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!(facing = %self.facing, "V4L2 stream stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop();
    }
}
