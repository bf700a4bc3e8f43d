// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/model/mask_rcnn.rs - Mask R-CNN 推理流水线
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

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
  config::NetworkConfig,
  decode::{DecodeError, Decoder, Detection},
  engine::{EngineBuilder, InferenceEngine},
  frame::Frame,
  model::Model,
  preprocess::{PreprocessError, Preprocessor},
};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum MaskRcnnError {
  #[error("推理引擎尚未构建")]
  NotBuilt,
  #[error("预处理错误: {0}")]
  Preprocess(#[from] PreprocessError),
  #[error("推理引擎构建失败: {0}")]
  Build(#[source] BoxedError),
  #[error("推理执行失败: {0}")]
  Engine(#[source] BoxedError),
  #[error("输出解码错误: {0}")]
  Decode(#[from] DecodeError),
}

impl MaskRcnnError {
  /// 是否为调用方违反前置条件（未构建、输入图像不合法）
  pub fn is_precondition(&self) -> bool {
    matches!(self, MaskRcnnError::NotBuilt | MaskRcnnError::Preprocess(_))
  }
}

/// 预处理、引擎执行、解码三步串行的实例分割流水线
///
/// 引擎由本实例独占，`infer` 需要 `&mut self`。
pub struct MaskRcnn<B: EngineBuilder> {
  config: NetworkConfig,
  builder: B,
  engine: Option<B::Engine>,
}

impl<B: EngineBuilder> MaskRcnn<B> {
  pub fn new(config: NetworkConfig, builder: B) -> Self {
    Self {
      config,
      builder,
      engine: None,
    }
  }

  pub fn config(&self) -> &NetworkConfig {
    &self.config
  }

  pub fn is_built(&self) -> bool {
    self.engine.is_some()
  }

  pub fn build(&mut self) -> Result<(), MaskRcnnError> {
    info!(
      "构建推理引擎: 输入 {}x{}, {} 个类别, 最多 {} 个实例",
      self.config.input_size(),
      self.config.input_size(),
      self.config.num_classes(),
      self.config.max_instances()
    );
    let now = Instant::now();
    let engine = self.builder.build(&self.config).map_err(|e| {
      error!("推理引擎构建失败: {}", e);
      MaskRcnnError::Build(Box::new(e))
    })?;
    info!("推理引擎构建完成，耗时: {:.2?}", now.elapsed());

    self.engine = Some(engine);
    Ok(())
  }

  pub fn infer(&mut self, frame: &Frame) -> Result<Vec<Detection>, MaskRcnnError> {
    let Some(engine) = self.engine.as_mut() else {
      error!("推理引擎尚未构建，无法推理");
      return Err(MaskRcnnError::NotBuilt);
    };

    let now = Instant::now();
    let (tensor, transform) = Preprocessor::new(&self.config).preprocess(frame)?;
    debug!("预处理完成，耗时: {:.2?}", now.elapsed());

    let now = Instant::now();
    let output = engine.execute(&tensor).map_err(|e| {
      error!("推理执行失败: {}", e);
      MaskRcnnError::Engine(Box::new(e))
    })?;
    debug!(
      "引擎执行完成，耗时: {:.2?}, 检测表 {} 个元素, 掩膜栈 {} 个元素",
      now.elapsed(),
      output.detections.len(),
      output.masks.len()
    );

    let now = Instant::now();
    let detections = Decoder::new(&self.config).decode_with_transform(
      &transform,
      &output.detections,
      &output.masks,
    )?;
    debug!(
      "解码完成，耗时: {:.2?}, 共 {} 个实例",
      now.elapsed(),
      detections.len()
    );

    Ok(detections)
  }
}

impl<B: EngineBuilder> Model for MaskRcnn<B> {
  type Input = Frame;
  type Output = Vec<Detection>;
  type Error = MaskRcnnError;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    MaskRcnn::infer(self, input)
  }
}
