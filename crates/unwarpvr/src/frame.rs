//! Borrowed views of packed 8-bit RGB frames with an arbitrary row stride.

use image::RgbImage;

use crate::error::FrameError;

/// Interleaved channels per pixel.
pub const CHANNELS: usize = 3;

fn check_layout(len: usize, width: u32, height: u32, stride: usize) -> Result<(), FrameError> {
    let row_bytes = width as usize * CHANNELS;
    if stride < row_bytes {
        return Err(FrameError::StrideTooSmall { stride, row_bytes });
    }
    let needed = match height as usize {
        0 => 0,
        h => stride * (h - 1) + row_bytes,
    };
    if len < needed {
        return Err(FrameError::BufferTooShort { len, needed });
    }
    Ok(())
}

/// Read-only source frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> FrameRef<'a> {
    /// Wrap `data` whose rows start every `stride` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self, FrameError> {
        check_layout(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Wrap tightly packed rows.
    pub fn packed(data: &'a [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(data, width, height, width as usize * CHANNELS)
    }

    pub fn from_image(image: &'a RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.as_raw(),
            width,
            height,
            stride: width as usize * CHANNELS,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Rows carry no padding.
    pub fn is_packed(&self) -> bool {
        self.stride == self.width as usize * CHANNELS
    }
}

/// Writable destination frame.
#[derive(Debug)]
pub struct FrameMut<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> FrameMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, FrameError> {
        check_layout(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn packed(data: &'a mut [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(data, width, height, width as usize * CHANNELS)
    }

    pub fn from_image(image: &'a mut RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data: &'a mut [u8] = image;
        Self {
            data,
            width,
            height,
            stride: width as usize * CHANNELS,
        }
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}
