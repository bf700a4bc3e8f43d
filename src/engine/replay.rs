// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/engine/replay.rs - 回放推理引擎
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

//! 从磁盘读取预先导出的网络输出并在每次推理时原样返回，
//! 用于在没有加速硬件的机器上跑通整条流水线。
//!
//! 目录中需要两个小端 f32 文件：`detections.f32` 与 `masks.f32`。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  config::NetworkConfig,
  engine::{EngineBuilder, InferenceEngine, RawOutput},
  preprocess::InputTensor,
};

pub const DETECTIONS_FILE: &str = "detections.f32";
pub const MASKS_FILE: &str = "masks.f32";

const F32_BYTES: usize = std::mem::size_of::<f32>();

#[derive(Error, Debug)]
pub enum ReplayEngineError {
  #[error("URI 方案不匹配, 期望 {expected}, 实际 {actual}")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("读取 {} 失败: {source}", .path.display())]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("文件 {} 长度 {len} 不是 f32 的整数倍", .path.display())]
  Misaligned { path: PathBuf, len: usize },
  #[error("{name} 元素数量不匹配: 期望 {expected}, 实际 {actual}")]
  OutputSize {
    name: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("输入张量长度不匹配: 期望 {expected}, 实际 {actual}")]
  InputSize { expected: usize, actual: usize },
}

/// 读取小端 f32 数组文件
pub fn read_f32_file(path: &Path) -> Result<Vec<f32>, ReplayEngineError> {
  let bytes = std::fs::read(path).map_err(|source| ReplayEngineError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  if bytes.len() % F32_BYTES != 0 {
    return Err(ReplayEngineError::Misaligned {
      path: path.to_path_buf(),
      len: bytes.len(),
    });
  }

  Ok(
    bytes
      .chunks_exact(F32_BYTES)
      .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
      .collect(),
  )
}

pub fn write_f32_file(path: &Path, values: &[f32]) -> std::io::Result<()> {
  let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
  std::fs::write(path, bytes)
}

#[derive(Debug, Clone)]
pub struct ReplayEngineBuilder {
  directory: PathBuf,
}

impl ReplayEngineBuilder {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
    }
  }

  /// 将一次推理输出保存为回放目录
  pub fn dump(directory: &Path, output: &RawOutput) -> std::io::Result<()> {
    std::fs::create_dir_all(directory)?;
    write_f32_file(&directory.join(DETECTIONS_FILE), &output.detections)?;
    write_f32_file(&directory.join(MASKS_FILE), &output.masks)
  }
}

impl FromUrlWithScheme for ReplayEngineBuilder {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayEngineBuilder {
  type Error = ReplayEngineError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayEngineError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: url.scheme().to_string(),
      });
    }

    Ok(Self::new(url.path()))
  }
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), ReplayEngineError> {
  if expected != actual {
    error!("{} 元素数量不匹配: 期望 {}, 实际 {}", name, expected, actual);
    return Err(ReplayEngineError::OutputSize {
      name,
      expected,
      actual,
    });
  }
  Ok(())
}

impl EngineBuilder for ReplayEngineBuilder {
  type Engine = ReplayEngine;
  type Error = ReplayEngineError;

  fn build(&self, config: &NetworkConfig) -> Result<ReplayEngine, ReplayEngineError> {
    info!("加载回放输出: {}", self.directory.display());
    let detections = read_f32_file(&self.directory.join(DETECTIONS_FILE))?;
    let masks = read_f32_file(&self.directory.join(MASKS_FILE))?;

    check_len("检测表", config.detection_buffer_len(), detections.len())?;
    check_len("掩膜栈", config.mask_buffer_len(), masks.len())?;
    debug!(
      "回放输出: 检测表 {} 个元素, 掩膜栈 {} 个元素",
      detections.len(),
      masks.len()
    );

    Ok(ReplayEngine {
      output: RawOutput { detections, masks },
      input_len: config.input_tensor_len(),
    })
  }
}

/// 忽略输入内容、始终返回同一份输出的推理引擎
#[derive(Debug, Clone)]
pub struct ReplayEngine {
  output: RawOutput,
  input_len: usize,
}

impl ReplayEngine {
  pub fn new(output: RawOutput, input_len: usize) -> Self {
    Self { output, input_len }
  }
}

impl InferenceEngine for ReplayEngine {
  type Error = ReplayEngineError;

  fn execute(&mut self, input: &InputTensor) -> Result<RawOutput, Self::Error> {
    if input.len() != self.input_len {
      return Err(ReplayEngineError::InputSize {
        expected: self.input_len,
        actual: input.len(),
      });
    }
    Ok(self.output.clone())
  }
}
