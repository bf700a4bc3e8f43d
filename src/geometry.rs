// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/geometry.rs - 信箱（letterbox）坐标变换
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

//! 原图像素空间与网络张量空间之间的映射。
//!
//! 长边缩放到 `S`，保持宽高比，短边两侧对称补零。正向变换由预处理使用，
//! 逆变换由解码使用，两者共用同一个 [`LetterboxTransform`]。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
  #[error("图像尺寸无效: {width}x{height}, 网络尺寸 {size}")]
  EmptyInput { width: u32, height: u32, size: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
  pub x: f32,
  pub y: f32,
}

impl Point {
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

/// 针对一组输入尺寸计算出的信箱变换参数
///
/// 每次调用都应重新计算，不同尺寸的输入不能共用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
  /// 网络输入边长 `S`
  pub size: u32,
  pub input_width: u32,
  pub input_height: u32,
  pub scale: f64,
  /// 缩放后（补边前）的宽度
  pub new_width: u32,
  /// 缩放后（补边前）的高度
  pub new_height: u32,
  pub pad_x: u32,
  pub pad_y: u32,
}

pub fn forward_transform(
  input_width: u32,
  input_height: u32,
  size: u32,
) -> Result<LetterboxTransform, GeometryError> {
  if input_width == 0 || input_height == 0 || size == 0 {
    return Err(GeometryError::EmptyInput {
      width: input_width,
      height: input_height,
      size,
    });
  }

  let max_dim = input_width.max(input_height);
  let scale = size as f64 / max_dim as f64;
  // 极端宽高比下短边可能舍入为 0，至少保留 1 个像素
  let new_width = ((input_width as f64 * scale).round() as u32).clamp(1, size);
  let new_height = ((input_height as f64 * scale).round() as u32).clamp(1, size);

  Ok(LetterboxTransform {
    size,
    input_width,
    input_height,
    scale,
    new_width,
    new_height,
    pad_x: (size - new_width) / 2,
    pad_y: (size - new_height) / 2,
  })
}

pub fn to_network_space(point: Point, transform: &LetterboxTransform) -> Point {
  Point {
    x: (point.x as f64 * transform.scale + transform.pad_x as f64) as f32,
    y: (point.y as f64 * transform.scale + transform.pad_y as f64) as f32,
  }
}

/// 逆变换，结果截断到 `[0, input_width] x [0, input_height]`
pub fn to_image_space(
  point: Point,
  transform: &LetterboxTransform,
  input_width: u32,
  input_height: u32,
) -> Point {
  let x = (point.x as f64 - transform.pad_x as f64) / transform.scale;
  let y = (point.y as f64 - transform.pad_y as f64) / transform.scale;

  Point {
    x: x.clamp(0.0, input_width as f64) as f32,
    y: y.clamp(0.0, input_height as f64) as f32,
  }
}

impl LetterboxTransform {
  pub fn new(input_width: u32, input_height: u32, size: u32) -> Result<Self, GeometryError> {
    forward_transform(input_width, input_height, size)
  }

  pub fn to_network_space(&self, point: Point) -> Point {
    to_network_space(point, self)
  }

  pub fn to_image_space(&self, point: Point) -> Point {
    to_image_space(point, self, self.input_width, self.input_height)
  }
}
