// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/decode.rs - 推理引擎输出解码
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

//! 把检测表与掩膜栈解码为原图坐标下的 [`Detection`]。
//!
//! 检测表由 `M` 条记录组成，每条 6 个 f32：
//! `[y_start, x_start, y_end, x_end, class_id, confidence]`。
//! 掩膜栈由 `M * C` 张边长为 `2K` 的概率图组成，按
//! `instance * C + class_id` 寻址。
//!
//! 类别为背景、类别越界以及退化的边界框都不算错误，只跳过对应的槽位。
//! 置信度原样透传，阈值过滤由推理引擎负责。

use std::fmt;

use image::{
  GrayImage, Luma,
  imageops::{self, FilterType},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  config::{BoxEncoding, NetworkConfig, RAW_DETECTION_FIELDS},
  geometry::{GeometryError, LetterboxTransform, Point, forward_transform, to_image_space},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  #[error("{name} 缓冲区长度不匹配: 期望 {expected}, 实际 {actual}")]
  BufferSize {
    name: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("几何变换错误: {0}")]
  Geometry(#[from] GeometryError),
}

/// 检测表中的一条原始记录，坐标位于张量空间
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawDetection {
  pub y_start: f32,
  pub x_start: f32,
  pub y_end: f32,
  pub x_end: f32,
  pub class_id: f32,
  pub confidence: f32,
}

impl RawDetection {
  pub fn from_fields(fields: [f32; RAW_DETECTION_FIELDS]) -> Self {
    let [y_start, x_start, y_end, x_end, class_id, confidence] = fields;
    Self {
      y_start,
      x_start,
      y_end,
      x_end,
      class_id,
      confidence,
    }
  }

  pub fn to_fields(&self) -> [f32; RAW_DETECTION_FIELDS] {
    [
      self.y_start,
      self.x_start,
      self.y_end,
      self.x_end,
      self.class_id,
      self.confidence,
    ]
  }

  /// 向零截断的类别编号，NaN 视为 0
  pub fn class_id(&self) -> i64 {
    self.class_id as i64
  }
}

/// 检测表的只读视图，构造时校验长度
#[derive(Debug, Clone, Copy)]
pub struct RawDetections<'a> {
  buffer: &'a [f32],
}

impl<'a> RawDetections<'a> {
  pub fn new(buffer: &'a [f32], config: &NetworkConfig) -> Result<Self, DecodeError> {
    let expected = config.detection_buffer_len();
    if buffer.len() != expected {
      return Err(DecodeError::BufferSize {
        name: "检测表",
        expected,
        actual: buffer.len(),
      });
    }
    Ok(Self { buffer })
  }

  pub fn len(&self) -> usize {
    self.buffer.len() / RAW_DETECTION_FIELDS
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<RawDetection> {
    let start = index.checked_mul(RAW_DETECTION_FIELDS)?;
    let fields = self.buffer.get(start..start + RAW_DETECTION_FIELDS)?;
    fields.try_into().ok().map(RawDetection::from_fields)
  }

  pub fn iter(&self) -> impl Iterator<Item = RawDetection> {
    self
      .buffer
      .chunks_exact(RAW_DETECTION_FIELDS)
      .filter_map(|fields| fields.try_into().ok().map(RawDetection::from_fields))
  }
}

/// 掩膜栈的只读视图
#[derive(Debug, Clone, Copy)]
pub struct RawMaskStack<'a> {
  buffer: &'a [f32],
  num_classes: usize,
  side: usize,
}

impl<'a> RawMaskStack<'a> {
  pub fn new(buffer: &'a [f32], config: &NetworkConfig) -> Result<Self, DecodeError> {
    let expected = config.mask_buffer_len();
    if buffer.len() != expected {
      return Err(DecodeError::BufferSize {
        name: "掩膜栈",
        expected,
        actual: buffer.len(),
      });
    }
    Ok(Self {
      buffer,
      num_classes: config.num_classes(),
      side: config.mask_side(),
    })
  }

  pub fn side(&self) -> usize {
    self.side
  }

  pub fn plane(&self, instance: usize, class_id: u32) -> Option<&'a [f32]> {
    let class_id = class_id as usize;
    if class_id >= self.num_classes {
      return None;
    }
    let plane_len = self.side * self.side;
    let start = (instance * self.num_classes + class_id) * plane_len;
    self.buffer.get(start..start + plane_len)
  }
}

/// 掩膜在整图中实际写入的像素矩形
///
/// 横向覆盖 `[floor(x_start), floor(x_start) + round(x_end - x_start))`，纵向同理，
/// 因此小数起点所在的那一列（行）也会写入掩膜。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaskRegion {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl MaskRegion {
  /// 起点向下截断，尺寸为四舍五入后的框宽高，并裁剪到图像内
  fn from_box(start: Point, end: Point, image_width: u32, image_height: u32) -> Self {
    let x = (start.x as u32).min(image_width);
    let y = (start.y as u32).min(image_height);
    let width = ((end.x - start.x).round() as u32).min(image_width - x);
    let height = ((end.y - start.y).round() as u32).min(image_height - y);
    Self {
      x,
      y,
      width,
      height,
    }
  }

  pub fn contains(&self, x: u32, y: u32) -> bool {
    x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
  }
}

/// 原图坐标下的单个检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  /// 类别编号，范围 `1..C`
  pub class_id: u32,
  pub confidence: f32,
  pub x_start: f32,
  pub y_start: f32,
  /// 右边界（不包含）
  pub x_end: f32,
  /// 下边界（不包含）
  pub y_end: f32,
  /// 与原图同尺寸的单通道掩膜，框外全为 0，框内为 `[0, 255]` 的概率
  pub mask: GrayImage,
}

impl Detection {
  pub fn width(&self) -> f32 {
    self.x_end - self.x_start
  }

  pub fn height(&self) -> f32 {
    self.y_end - self.y_start
  }

  pub fn mask_region(&self) -> MaskRegion {
    MaskRegion::from_box(
      Point::new(self.x_start, self.y_start),
      Point::new(self.x_end, self.y_end),
      self.mask.width(),
      self.mask.height(),
    )
  }

  /// 按阈值（`[0, 1]`）二值化掩膜，大于阈值的像素为 255
  pub fn binary_mask(&self, threshold: f32) -> GrayImage {
    let cut = threshold * u8::MAX as f32;
    let mut binary = self.mask.clone();
    for pixel in binary.pixels_mut() {
      pixel.0[0] = if pixel.0[0] as f32 > cut { u8::MAX } else { 0 };
    }
    binary
  }
}

impl fmt::Display for Detection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "class {} with confidence {:.4}, bbox ({:.1}, {:.1}), ({:.1}, {:.1}) and mask {}x{}",
      self.class_id,
      self.confidence,
      self.x_start,
      self.y_start,
      self.x_end,
      self.y_end,
      self.mask.width(),
      self.mask.height()
    )
  }
}

fn probability_to_byte(p: f32) -> u8 {
  (p * u8::MAX as f32).round().clamp(0.0, u8::MAX as f32) as u8
}

pub struct Decoder<'a> {
  config: &'a NetworkConfig,
}

impl<'a> Decoder<'a> {
  pub fn new(config: &'a NetworkConfig) -> Self {
    Self { config }
  }

  /// 解码一次推理的输出，`input_width`/`input_height` 为预处理前的原图尺寸
  ///
  /// 输出顺序与槽位顺序一致，不做排序。
  pub fn decode(
    &self,
    input_width: u32,
    input_height: u32,
    detections: &[f32],
    masks: &[f32],
  ) -> Result<Vec<Detection>, DecodeError> {
    let transform = forward_transform(input_width, input_height, self.config.input_size())?;
    self.decode_with_transform(&transform, detections, masks)
  }

  /// 使用预处理阶段得到的同一个变换进行解码
  pub fn decode_with_transform(
    &self,
    transform: &LetterboxTransform,
    detections: &[f32],
    masks: &[f32],
  ) -> Result<Vec<Detection>, DecodeError> {
    let (input_width, input_height) = (transform.input_width, transform.input_height);
    let raw_detections = RawDetections::new(detections, self.config)?;
    let raw_masks = RawMaskStack::new(masks, self.config)?;

    let coord_scale = match self.config.box_encoding() {
      BoxEncoding::Pixels => 1.0,
      BoxEncoding::Normalized => self.config.input_size() as f32,
    };

    let mut results = Vec::new();
    for (index, raw) in raw_detections.iter().enumerate() {
      let class_id = raw.class_id();
      if class_id <= 0 {
        continue;
      }
      if class_id as usize >= self.config.num_classes() {
        warn!(
          "槽位 {}: 类别编号 {} 超出类别数 {}, 跳过",
          index,
          class_id,
          self.config.num_classes()
        );
        continue;
      }
      let class_id = class_id as u32;

      let start = to_image_space(
        Point::new(raw.x_start * coord_scale, raw.y_start * coord_scale),
        transform,
        input_width,
        input_height,
      );
      let end = to_image_space(
        Point::new(raw.x_end * coord_scale, raw.y_end * coord_scale),
        transform,
        input_width,
        input_height,
      );

      // 同时排除 NaN
      if !(end.x > start.x && end.y > start.y) {
        debug!("槽位 {}: 边界框退化 {:?} -> {:?}, 跳过", index, start, end);
        continue;
      }

      let Some(plane) = raw_masks.plane(index, class_id) else {
        continue;
      };
      let mask = self.place_mask(plane, raw_masks.side(), start, end, transform);

      debug!(
        "槽位 {}: 类别 {} 置信度 {:.3} 边界框 ({:.1}, {:.1}) - ({:.1}, {:.1})",
        index, class_id, raw.confidence, start.x, start.y, end.x, end.y
      );

      results.push(Detection {
        class_id,
        confidence: raw.confidence,
        x_start: start.x,
        y_start: start.y,
        x_end: end.x,
        y_end: end.y,
        mask,
      });
    }

    debug!("解码得到 {} 个实例", results.len());
    Ok(results)
  }

  /// 概率图转为 8 位后缩放到边界框大小，贴入整图大小的零掩膜
  fn place_mask(
    &self,
    plane: &[f32],
    side: usize,
    start: Point,
    end: Point,
    transform: &LetterboxTransform,
  ) -> GrayImage {
    let (width, height) = (transform.input_width, transform.input_height);
    let mut mask = GrayImage::new(width, height);

    let box_width = (end.x - start.x).round() as u32;
    let box_height = (end.y - start.y).round() as u32;
    if box_width == 0 || box_height == 0 {
      return mask;
    }

    let side = side as u32;
    let byte_mask = GrayImage::from_fn(side, side, |x, y| {
      Luma([probability_to_byte(plane[(y * side + x) as usize])])
    });
    let box_mask = imageops::resize(&byte_mask, box_width, box_height, FilterType::Triangle);

    let region = MaskRegion::from_box(start, end, width, height);
    imageops::replace(&mut mask, &box_mask, region.x as i64, region.y as i64);
    mask
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ClassInfo;
  use proptest::prelude::*;

  fn config(input_size: u32, max_instances: usize, encoding: BoxEncoding) -> NetworkConfig {
    NetworkConfig::builder()
      .input_size(input_size)
      .max_instances(max_instances)
      .mask_pool_size(1)
      .box_encoding(encoding)
      .classes(vec![
        ClassInfo::new("BG", [0, 0, 0]),
        ClassInfo::new("cat", [255, 0, 0]),
        ClassInfo::new("dog", [0, 255, 0]),
      ])
      .build()
      .unwrap()
  }

  fn buffers(config: &NetworkConfig, slots: &[[f32; 6]], mask_value: f32) -> (Vec<f32>, Vec<f32>) {
    let mut detections = vec![0.0; config.detection_buffer_len()];
    for (i, slot) in slots.iter().enumerate() {
      detections[i * 6..(i + 1) * 6].copy_from_slice(slot);
    }
    (detections, vec![mask_value; config.mask_buffer_len()])
  }

  #[test]
  fn full_hd_box_spans_whole_image() {
    let config = config(1024, 3, BoxEncoding::Pixels);
    let (dets, masks) = buffers(&config, &[[224.0, 0.0, 800.0, 1024.0, 1.0, 0.9]], 1.0);
    let result = Decoder::new(&config).decode(1920, 1080, &dets, &masks).unwrap();

    assert_eq!(result.len(), 1);
    let d = &result[0];
    assert_eq!(d.class_id, 1);
    assert_eq!(d.confidence, 0.9);
    assert!(d.x_start.abs() < 1e-3 && d.y_start.abs() < 1e-3);
    assert!((d.x_end - 1920.0).abs() < 1e-2);
    assert!((d.y_end - 1080.0).abs() < 1e-2);
    assert_eq!(d.mask.dimensions(), (1920, 1080));
  }

  #[test]
  fn background_and_negative_classes_are_skipped() {
    let config = config(64, 3, BoxEncoding::Pixels);
    let (dets, masks) = buffers(
      &config,
      &[
        [10.0, 10.0, 50.0, 50.0, 0.0, 0.99],
        [10.0, 10.0, 50.0, 50.0, -1.0, 0.99],
        [10.0, 10.0, 50.0, 50.0, 0.7, 0.99],
      ],
      1.0,
    );
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn class_id_is_truncated() {
    let config = config(64, 1, BoxEncoding::Pixels);
    let (dets, masks) = buffers(&config, &[[10.0, 10.0, 50.0, 50.0, 2.9, 0.5]], 1.0);
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    assert_eq!(result[0].class_id, 2);
  }

  #[test]
  fn out_of_range_class_is_skipped() {
    let config = config(64, 2, BoxEncoding::Pixels);
    let (dets, masks) = buffers(
      &config,
      &[
        [10.0, 10.0, 50.0, 50.0, 3.0, 0.9],
        [10.0, 10.0, 50.0, 50.0, 1.0, 0.9],
      ],
      1.0,
    );
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].class_id, 1);
  }

  #[test]
  fn degenerate_boxes_are_skipped() {
    let config = config(64, 3, BoxEncoding::Pixels);
    let (dets, masks) = buffers(
      &config,
      &[
        // 两个角都被截断到右边界
        [10.0, 70.0, 50.0, 90.0, 1.0, 0.9],
        // 反向的框
        [50.0, 50.0, 10.0, 10.0, 1.0, 0.9],
        [f32::NAN, 10.0, 50.0, 50.0, 1.0, 0.9],
      ],
      1.0,
    );
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn partially_outside_box_is_clamped() {
    let config = config(64, 1, BoxEncoding::Pixels);
    let (dets, masks) = buffers(&config, &[[-8.0, -4.0, 80.0, 40.0, 1.0, 0.9]], 1.0);
    // 32x16 输入，缩放 2，上下各补 16
    let result = Decoder::new(&config).decode(32, 16, &dets, &masks).unwrap();
    let d = &result[0];
    assert_eq!((d.x_start, d.y_start), (0.0, 0.0));
    assert_eq!((d.x_end, d.y_end), (20.0, 16.0));
  }

  #[test]
  fn mask_is_zero_outside_box() {
    let config = config(64, 1, BoxEncoding::Pixels);
    // 图像坐标 x: 10..30, y: 5..15
    let (dets, masks) = buffers(&config, &[[26.0, 20.0, 46.0, 60.0, 1.0, 0.9]], 1.0);
    let result = Decoder::new(&config).decode(32, 16, &dets, &masks).unwrap();
    let d = &result[0];

    assert_eq!((d.x_start, d.y_start, d.x_end, d.y_end), (10.0, 5.0, 30.0, 15.0));
    let region = d.mask_region();
    assert_eq!(
      region,
      MaskRegion {
        x: 10,
        y: 5,
        width: 20,
        height: 10
      }
    );
    assert_eq!(d.mask.dimensions(), (32, 16));
    for (x, y, pixel) in d.mask.enumerate_pixels() {
      let expected = if region.contains(x, y) { 255 } else { 0 };
      assert_eq!(pixel.0[0], expected, "({}, {})", x, y);
    }
  }

  #[test]
  fn fractional_start_is_truncated() {
    let detection = Detection {
      class_id: 1,
      confidence: 0.9,
      x_start: 10.7,
      y_start: 3.2,
      x_end: 20.9,
      y_end: 8.4,
      mask: GrayImage::new(32, 16),
    };
    let region = detection.mask_region();
    assert_eq!(
      region,
      MaskRegion {
        x: 10,
        y: 3,
        width: 10,
        height: 5
      }
    );
    assert!(region.contains(10, 3));
    assert!(!region.contains(20, 3));
  }

  #[test]
  fn mask_plane_is_selected_by_instance_and_class() {
    let config = config(64, 2, BoxEncoding::Pixels);
    let (dets, mut masks) = buffers(
      &config,
      &[
        [26.0, 20.0, 46.0, 60.0, 1.0, 0.9],
        [26.0, 20.0, 46.0, 60.0, 2.0, 0.8],
      ],
      1.0,
    );
    let plane = config.mask_plane_len();
    let classes = config.num_classes();
    // 实例 1 类别 2
    masks[(classes + 2) * plane..(classes + 3) * plane].fill(0.2);

    let result = Decoder::new(&config).decode(32, 16, &dets, &masks).unwrap();
    assert_eq!(result[0].mask.get_pixel(12, 7).0[0], 255);
    assert_eq!(result[1].mask.get_pixel(12, 7).0[0], 51);
  }

  #[test]
  fn probabilities_round_to_nearest_byte() {
    assert_eq!(probability_to_byte(0.0), 0);
    assert_eq!(probability_to_byte(0.5), 128);
    assert_eq!(probability_to_byte(1.0), 255);
    assert_eq!(probability_to_byte(1.2), 255);
    assert_eq!(probability_to_byte(-0.3), 0);
  }

  #[test]
  fn order_and_confidence_are_passed_through() {
    let config = config(64, 3, BoxEncoding::Pixels);
    let (dets, masks) = buffers(
      &config,
      &[
        [10.0, 10.0, 20.0, 20.0, 2.0, 0.1],
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [30.0, 30.0, 60.0, 60.0, 1.0, 0.95],
      ],
      0.5,
    );
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    let summary: Vec<_> = result.iter().map(|d| (d.class_id, d.confidence)).collect();
    assert_eq!(summary, vec![(2, 0.1), (1, 0.95)]);
    assert!(result.iter().all(|d| d.mask.get_pixel(d.x_start as u32, d.y_start as u32).0[0] == 128));
  }

  #[test]
  fn normalized_boxes_are_scaled_by_input_size() {
    let config = config(64, 1, BoxEncoding::Normalized);
    let (dets, masks) = buffers(&config, &[[0.25, 0.25, 0.5, 0.75, 1.0, 0.9]], 1.0);
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    let d = &result[0];
    assert_eq!((d.x_start, d.y_start, d.x_end, d.y_end), (16.0, 16.0, 48.0, 32.0));
  }

  #[test]
  fn tiny_box_keeps_empty_mask() {
    let config = config(64, 1, BoxEncoding::Pixels);
    let (dets, masks) = buffers(&config, &[[10.0, 10.0, 10.2, 10.2, 1.0, 0.9]], 1.0);
    let result = Decoder::new(&config).decode(64, 64, &dets, &masks).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].mask.pixels().all(|p| p.0[0] == 0));
  }

  #[test]
  fn wrong_buffer_sizes_are_errors() {
    let config = config(64, 2, BoxEncoding::Pixels);
    let masks = vec![0.0; config.mask_buffer_len()];
    assert_eq!(
      Decoder::new(&config).decode(64, 64, &[0.0; 6], &masks).unwrap_err(),
      DecodeError::BufferSize {
        name: "检测表",
        expected: 12,
        actual: 6
      }
    );
    let dets = vec![0.0; 12];
    assert!(matches!(
      Decoder::new(&config).decode(64, 64, &dets, &masks[1..]),
      Err(DecodeError::BufferSize { name: "掩膜栈", .. })
    ));
  }

  #[test]
  fn raw_views_read_by_offset() {
    let config = config(64, 2, BoxEncoding::Pixels);
    let (dets, _) = buffers(&config, &[[0.0; 6], [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]], 0.0);
    let view = RawDetections::new(&dets, &config).unwrap();
    assert_eq!(view.len(), 2);
    let second = view.get(1).unwrap();
    assert_eq!((second.y_start, second.x_start, second.confidence), (1.0, 2.0, 6.0));
    assert_eq!(second.to_fields(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert!(view.get(2).is_none());
  }

  #[test]
  fn binary_mask_thresholds_on_request() {
    let mut mask = GrayImage::new(2, 1);
    mask.put_pixel(0, 0, Luma([200]));
    mask.put_pixel(1, 0, Luma([100]));
    let detection = Detection {
      class_id: 1,
      confidence: 1.0,
      x_start: 0.0,
      y_start: 0.0,
      x_end: 2.0,
      y_end: 1.0,
      mask,
    };
    let binary = detection.binary_mask(0.5);
    assert_eq!(binary.get_pixel(0, 0).0[0], 255);
    assert_eq!(binary.get_pixel(1, 0).0[0], 0);
    assert_eq!(
      detection.to_string(),
      "class 1 with confidence 1.0000, bbox (0.0, 0.0), (2.0, 1.0) and mask 2x1"
    );
  }

  fn raw_coord() -> impl Strategy<Value = f32> {
    -64.0f32..128.0
  }

  proptest! {
    #[test]
    fn non_positive_class_emits_nothing(
      class_id in prop_oneof![Just(0.0f32), Just(-1.0f32), Just(0.5f32)],
      y0 in raw_coord(),
      x0 in raw_coord(),
      y1 in raw_coord(),
      x1 in raw_coord(),
      confidence in -1.0f32..2.0,
      w in 1u32..200,
      h in 1u32..200,
    ) {
      let config = config(64, 1, BoxEncoding::Pixels);
      let (dets, masks) = buffers(&config, &[[y0, x0, y1, x1, class_id, confidence]], 1.0);
      let result = Decoder::new(&config).decode(w, h, &dets, &masks).unwrap();
      prop_assert!(result.is_empty());
    }

    #[test]
    fn boxes_stay_inside_image(
      y0 in raw_coord(),
      x0 in raw_coord(),
      y1 in raw_coord(),
      x1 in raw_coord(),
      w in 1u32..200,
      h in 1u32..200,
    ) {
      let config = config(64, 1, BoxEncoding::Pixels);
      let (dets, masks) = buffers(&config, &[[y0, x0, y1, x1, 1.0, 0.9]], 1.0);
      let result = Decoder::new(&config).decode(w, h, &dets, &masks).unwrap();
      for d in &result {
        prop_assert!(0.0 <= d.x_start && d.x_start < d.x_end && d.x_end <= w as f32, "{}", d);
        prop_assert!(0.0 <= d.y_start && d.y_start < d.y_end && d.y_end <= h as f32, "{}", d);
      }
    }

    #[test]
    fn mask_is_zero_outside_region(
      y0 in raw_coord(),
      x0 in raw_coord(),
      y1 in raw_coord(),
      x1 in raw_coord(),
      w in 1u32..120,
      h in 1u32..120,
    ) {
      let config = config(64, 1, BoxEncoding::Pixels);
      let (dets, masks) = buffers(&config, &[[y0, x0, y1, x1, 2.0, 0.9]], 1.0);
      let result = Decoder::new(&config).decode(w, h, &dets, &masks).unwrap();
      for d in &result {
        prop_assert_eq!(d.mask.dimensions(), (w, h));
        let region = d.mask_region();
        prop_assert!(region.x + region.width <= w && region.y + region.height <= h);
        for (x, y, pixel) in d.mask.enumerate_pixels() {
          if !region.contains(x, y) {
            prop_assert_eq!(pixel.0[0], 0, "({}, {}) outside {:?}", x, y, region);
          }
        }
      }
    }
  }
}
