// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/config.rs - 网络常量配置
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

use std::sync::Arc;

use thiserror::Error;

mod coco;
pub use self::coco::{COCO_CLASS_COLOURS, COCO_CLASS_NAMES};

/// 网络输入的通道数
pub const NETWORK_CHANNELS: usize = 3;

/// 每条原始检测记录包含的浮点数个数
pub const RAW_DETECTION_FIELDS: usize = 6;

const COCO_INPUT_SIZE: u32 = 1024;
const COCO_MAX_INSTANCES: usize = 100;
const COCO_MASK_POOL_SIZE: usize = 14;
const COCO_NETWORK_BIAS: [f32; 3] = [123.7, 116.8, 103.9];
const COCO_MIN_CONFIDENCE: f32 = 0.7;
const COCO_NMS_THRESHOLD: f32 = 0.3;
const COCO_MASK_THRESHOLD: f32 = 0.5;

/// 像素通道顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
  #[default]
  Rgb,
  Bgr,
}

/// 推理引擎输出边界框的坐标编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxEncoding {
  /// 坐标位于 `[0, S]` 的张量像素空间
  #[default]
  Pixels,
  /// 坐标位于 `[0, 1]`，解码前需乘以 `S`
  Normalized,
}

/// 单个类别的名称与显示颜色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
  pub name: String,
  pub colour: [u8; 3],
}

impl ClassInfo {
  pub fn new(name: impl Into<String>, colour: [u8; 3]) -> Self {
    Self {
      name: name.into(),
      colour,
    }
  }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
  #[error("网络输入尺寸必须大于 0")]
  ZeroInputSize,
  #[error("最大实例数必须大于 0")]
  ZeroMaxInstances,
  #[error("掩膜池化尺寸必须大于 0")]
  ZeroMaskPoolSize,
  #[error("类别表至少需要背景类和一个前景类, 实际数量 {0}")]
  TooFewClasses(usize),
  #[error("阈值 {name} 无效: {value}")]
  InvalidThreshold { name: &'static str, value: f32 },
  #[error("通道偏置必须为有限值: {0:?}")]
  InvalidBias([f32; 3]),
}

/// 实例分割网络的常量参数
///
/// 构造后不可修改，可以在多个流水线之间低成本共享（类别表使用 `Arc`）。
#[derive(Debug, Clone)]
pub struct NetworkConfig {
  input_size: u32,
  max_instances: usize,
  mask_pool_size: usize,
  bias: [f32; 3],
  channel_order: ChannelOrder,
  box_encoding: BoxEncoding,
  min_confidence: f32,
  nms_threshold: f32,
  mask_threshold: f32,
  classes: Arc<[ClassInfo]>,
}

impl NetworkConfig {
  pub fn builder() -> NetworkConfigBuilder {
    NetworkConfigBuilder::default()
  }

  /// COCO 数据集上训练的 Mask R-CNN（ResNet101 骨干网络）
  pub fn coco() -> Self {
    let classes = COCO_CLASS_NAMES
      .iter()
      .zip(COCO_CLASS_COLOURS.iter())
      .map(|(name, colour)| ClassInfo::new(*name, *colour))
      .collect();

    Self {
      input_size: COCO_INPUT_SIZE,
      max_instances: COCO_MAX_INSTANCES,
      mask_pool_size: COCO_MASK_POOL_SIZE,
      bias: COCO_NETWORK_BIAS,
      channel_order: ChannelOrder::Rgb,
      box_encoding: BoxEncoding::Pixels,
      min_confidence: COCO_MIN_CONFIDENCE,
      nms_threshold: COCO_NMS_THRESHOLD,
      mask_threshold: COCO_MASK_THRESHOLD,
      classes,
    }
  }

  /// 网络输入边长 `S`
  pub fn input_size(&self) -> u32 {
    self.input_size
  }

  /// 类别数量 `C`（包含背景类 0）
  pub fn num_classes(&self) -> usize {
    self.classes.len()
  }

  /// 最大检测实例数 `M`
  pub fn max_instances(&self) -> usize {
    self.max_instances
  }

  /// 掩膜池化尺寸 `K`
  pub fn mask_pool_size(&self) -> usize {
    self.mask_pool_size
  }

  /// 原始掩膜边长 `2K`
  pub fn mask_side(&self) -> usize {
    2 * self.mask_pool_size
  }

  pub fn bias(&self) -> [f32; 3] {
    self.bias
  }

  /// 网络期望的输入通道顺序
  pub fn channel_order(&self) -> ChannelOrder {
    self.channel_order
  }

  pub fn box_encoding(&self) -> BoxEncoding {
    self.box_encoding
  }

  pub fn min_confidence(&self) -> f32 {
    self.min_confidence
  }

  pub fn nms_threshold(&self) -> f32 {
    self.nms_threshold
  }

  pub fn mask_threshold(&self) -> f32 {
    self.mask_threshold
  }

  pub fn classes(&self) -> &[ClassInfo] {
    &self.classes
  }

  pub fn class(&self, class_id: u32) -> Option<&ClassInfo> {
    self.classes.get(class_id as usize)
  }

  /// 类别名称，越界时返回 `"unknown"`
  pub fn class_name(&self, class_id: u32) -> &str {
    self
      .class(class_id)
      .map(|info| info.name.as_str())
      .unwrap_or("unknown")
  }

  pub fn input_tensor_len(&self) -> usize {
    let side = self.input_size as usize;
    NETWORK_CHANNELS * side * side
  }

  pub fn detection_buffer_len(&self) -> usize {
    self.max_instances * RAW_DETECTION_FIELDS
  }

  pub fn mask_plane_len(&self) -> usize {
    self.mask_side() * self.mask_side()
  }

  pub fn mask_buffer_len(&self) -> usize {
    self.max_instances * self.num_classes() * self.mask_plane_len()
  }
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self::coco()
  }
}

/// `NetworkConfig` 构建器，默认值取自 COCO 配置
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
  inner: NetworkConfig,
  classes: Vec<ClassInfo>,
}

impl Default for NetworkConfigBuilder {
  fn default() -> Self {
    let inner = NetworkConfig::coco();
    let classes = inner.classes.to_vec();
    Self { inner, classes }
  }
}

impl NetworkConfigBuilder {
  pub fn input_size(mut self, input_size: u32) -> Self {
    self.inner.input_size = input_size;
    self
  }

  pub fn max_instances(mut self, max_instances: usize) -> Self {
    self.inner.max_instances = max_instances;
    self
  }

  pub fn mask_pool_size(mut self, mask_pool_size: usize) -> Self {
    self.inner.mask_pool_size = mask_pool_size;
    self
  }

  pub fn bias(mut self, bias: [f32; 3]) -> Self {
    self.inner.bias = bias;
    self
  }

  pub fn channel_order(mut self, order: ChannelOrder) -> Self {
    self.inner.channel_order = order;
    self
  }

  pub fn box_encoding(mut self, encoding: BoxEncoding) -> Self {
    self.inner.box_encoding = encoding;
    self
  }

  pub fn min_confidence(mut self, value: f32) -> Self {
    self.inner.min_confidence = value;
    self
  }

  pub fn nms_threshold(mut self, value: f32) -> Self {
    self.inner.nms_threshold = value;
    self
  }

  pub fn mask_threshold(mut self, value: f32) -> Self {
    self.inner.mask_threshold = value;
    self
  }

  pub fn classes(mut self, classes: Vec<ClassInfo>) -> Self {
    self.classes = classes;
    self
  }

  pub fn build(self) -> Result<NetworkConfig, ConfigError> {
    let Self { mut inner, classes } = self;

    if inner.input_size == 0 {
      return Err(ConfigError::ZeroInputSize);
    }
    if inner.max_instances == 0 {
      return Err(ConfigError::ZeroMaxInstances);
    }
    if inner.mask_pool_size == 0 {
      return Err(ConfigError::ZeroMaskPoolSize);
    }
    if classes.len() < 2 {
      return Err(ConfigError::TooFewClasses(classes.len()));
    }
    if inner.bias.iter().any(|b| !b.is_finite()) {
      return Err(ConfigError::InvalidBias(inner.bias));
    }

    for (name, value) in [
      ("min_confidence", inner.min_confidence),
      ("nms_threshold", inner.nms_threshold),
      ("mask_threshold", inner.mask_threshold),
    ] {
      if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidThreshold { name, value });
      }
    }

    inner.classes = classes.into();
    Ok(inner)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coco_matches_network_constants() {
    let config = NetworkConfig::coco();
    assert_eq!(config.input_size(), 1024);
    assert_eq!(config.num_classes(), 81);
    assert_eq!(config.max_instances(), 100);
    assert_eq!(config.mask_side(), 28);
    assert_eq!(config.detection_buffer_len(), 600);
    assert_eq!(config.mask_buffer_len(), 100 * 81 * 28 * 28);
    assert_eq!(config.input_tensor_len(), 3 * 1024 * 1024);
    assert_eq!(config.class_name(0), "BG");
    assert_eq!(config.class_name(1), "person");
    assert_eq!(config.class_name(80), "toothbrush");
    assert_eq!(config.class_name(81), "unknown");
    assert_eq!(config.class(1).map(|c| c.colour), Some([0xae, 0xc7, 0xe8]));
  }

  #[test]
  fn builder_rejects_invalid_values() {
    assert_eq!(
      NetworkConfig::builder().input_size(0).build().unwrap_err(),
      ConfigError::ZeroInputSize
    );
    assert_eq!(
      NetworkConfig::builder()
        .classes(vec![ClassInfo::new("BG", [0, 0, 0])])
        .build()
        .unwrap_err(),
      ConfigError::TooFewClasses(1)
    );
    assert!(matches!(
      NetworkConfig::builder().mask_threshold(1.5).build(),
      Err(ConfigError::InvalidThreshold {
        name: "mask_threshold",
        ..
      })
    ));
    assert!(matches!(
      NetworkConfig::builder().bias([f32::NAN, 0.0, 0.0]).build(),
      Err(ConfigError::InvalidBias(_))
    ));
  }

  #[test]
  fn builder_derives_class_count_from_table() {
    let config = NetworkConfig::builder()
      .input_size(64)
      .max_instances(4)
      .mask_pool_size(2)
      .classes(vec![
        ClassInfo::new("BG", [0, 0, 0]),
        ClassInfo::new("cat", [255, 0, 0]),
        ClassInfo::new("dog", [0, 255, 0]),
      ])
      .build()
      .unwrap();

    assert_eq!(config.num_classes(), 3);
    assert_eq!(config.mask_buffer_len(), 4 * 3 * 16);
    assert_eq!(config.class_name(2), "dog");
  }
}
