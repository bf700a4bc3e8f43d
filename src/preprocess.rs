// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/preprocess.rs - 网络输入预处理
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

use image::{
  ImageBuffer, Rgb, RgbImage,
  imageops::{self, FilterType},
};
use thiserror::Error;
use tracing::debug;

use crate::{
  config::{NETWORK_CHANNELS, NetworkConfig},
  frame::{AsNhwcFrame, Frame},
  geometry::{GeometryError, LetterboxTransform, forward_transform},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
  #[error("输入通道数与网络不匹配: 期望 {expected}, 实际 {actual}")]
  ChannelMismatch { expected: usize, actual: usize },
  #[error("几何变换错误: {0}")]
  Geometry(#[from] GeometryError),
  #[error("帧数据无法按 {width}x{height} 解释")]
  InvalidFrame { width: u32, height: u32 },
}

/// 平面（CHW）排列的 f32 网络输入张量，形状为 `(3, S, S)`
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
  data: Box<[f32]>,
  size: usize,
}

impl InputTensor {
  pub fn shape(&self) -> [usize; 3] {
    [NETWORK_CHANNELS, self.size, self.size]
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 单个通道平面，按行主序排列
  pub fn plane(&self, channel: usize) -> Option<&[f32]> {
    let plane = self.size * self.size;
    self.data.get(channel * plane..(channel + 1) * plane)
  }

  /// 小端字节序列，用于写入主机侧暂存缓冲区
  pub fn to_le_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
  }
}

pub struct Preprocessor<'a> {
  config: &'a NetworkConfig,
}

impl<'a> Preprocessor<'a> {
  pub fn new(config: &'a NetworkConfig) -> Self {
    Self { config }
  }

  /// 缩放、居中补零、调整通道顺序并减去通道偏置
  ///
  /// 返回网络输入张量以及本次使用的信箱变换，解码时需要同一个变换。
  pub fn preprocess(
    &self,
    frame: &Frame,
  ) -> Result<(InputTensor, LetterboxTransform), PreprocessError> {
    if frame.channels() as usize != NETWORK_CHANNELS {
      return Err(PreprocessError::ChannelMismatch {
        expected: NETWORK_CHANNELS,
        actual: frame.channels() as usize,
      });
    }

    let size = self.config.input_size();
    let transform = forward_transform(frame.width(), frame.height(), size)?;
    debug!(
      "信箱变换: {}x{} -> {}x{}, 偏移 ({}, {}), 缩放 {:.4}",
      frame.width(),
      frame.height(),
      transform.new_width,
      transform.new_height,
      transform.pad_x,
      transform.pad_y,
      transform.scale
    );

    // 按原始通道顺序缩放，通道交换放到写入张量时进行
    let source: ImageBuffer<Rgb<u8>, &[u8]> =
      ImageBuffer::from_raw(frame.width(), frame.height(), frame.as_nhwc()).ok_or(
        PreprocessError::InvalidFrame {
          width: frame.width(),
          height: frame.height(),
        },
      )?;
    let resized = imageops::resize(
      &source,
      transform.new_width,
      transform.new_height,
      FilterType::Triangle,
    );

    // 网络训练时的边框为零填充
    let mut canvas = RgbImage::new(size, size);
    imageops::replace(
      &mut canvas,
      &resized,
      transform.pad_x as i64,
      transform.pad_y as i64,
    );

    let swap = frame.order() != self.config.channel_order();
    let bias = self.config.bias();
    let side = size as usize;
    let plane = side * side;
    let pixels = canvas.as_raw();
    let mut data = vec![0.0f32; NETWORK_CHANNELS * plane];

    for (c, out) in data.chunks_exact_mut(plane).enumerate() {
      let src_c = if swap { NETWORK_CHANNELS - 1 - c } else { c };
      for (p, value) in out.iter_mut().enumerate() {
        *value = pixels[p * NETWORK_CHANNELS + src_c] as f32 - bias[c];
      }
    }

    Ok((
      InputTensor {
        data: data.into_boxed_slice(),
        size: side,
      },
      transform,
    ))
  }
}
