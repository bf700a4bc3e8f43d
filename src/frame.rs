// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/frame.rs - 交错（HWC）帧定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

use crate::config::ChannelOrder;

const RGB_CHANNELS: u32 = 3;

pub trait AsNhwcFrame {
  fn as_nhwc(&self) -> &[u8];
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("帧尺寸无效: {width}x{height}x{channels}")]
  EmptyFrame {
    width: u32,
    height: u32,
    channels: u32,
  },
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("通道数不匹配: 期望 {expected}, 实际 {actual}")]
  ChannelMismatch { expected: u32, actual: u32 },
}

/// 任意尺寸的 8 位交错图像帧
///
/// 通道顺序由调用方声明，摄像头和 OpenCV 风格的数据通常为 BGR。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
  data: Box<[u8]>,
  width: u32,
  height: u32,
  channels: u32,
  order: ChannelOrder,
}

impl Frame {
  pub fn new(
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u32,
    order: ChannelOrder,
  ) -> Result<Self, FrameError> {
    if width == 0 || height == 0 || channels == 0 {
      return Err(FrameError::EmptyFrame {
        width,
        height,
        channels,
      });
    }

    let expected = width as usize * height as usize * channels as usize;
    if data.len() != expected {
      return Err(FrameError::LengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
      width,
      height,
      channels,
      order,
    })
  }

  /// 以 BGR 顺序的三通道数据构造帧
  pub fn from_bgr(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
    Self::new(data, width, height, RGB_CHANNELS, ChannelOrder::Bgr)
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> u32 {
    self.channels
  }

  pub fn order(&self) -> ChannelOrder {
    self.order
  }

  /// 转为 RGB 顺序的 `RgbImage`，BGR 帧会交换通道
  pub fn to_rgb_image(&self) -> Result<RgbImage, FrameError> {
    if self.channels != RGB_CHANNELS {
      return Err(FrameError::ChannelMismatch {
        expected: RGB_CHANNELS,
        actual: self.channels,
      });
    }

    let width = self.width as usize;
    let data = &self.data;
    let swap = self.order == ChannelOrder::Bgr;

    Ok(ImageBuffer::from_fn(self.width, self.height, |x, y| {
      let idx = (y as usize * width + x as usize) * 3;
      let (a, b, c) = (data[idx], data[idx + 1], data[idx + 2]);
      if swap { Rgb([c, b, a]) } else { Rgb([a, b, c]) }
    }))
  }
}

impl From<RgbImage> for Frame {
  fn from(image: RgbImage) -> Self {
    let (width, height) = image.dimensions();
    Self {
      data: image.into_raw().into_boxed_slice(),
      width,
      height,
      channels: RGB_CHANNELS,
      order: ChannelOrder::Rgb,
    }
  }
}

impl AsNhwcFrame for Frame {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}
