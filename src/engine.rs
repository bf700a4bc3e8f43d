// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/engine.rs - 推理引擎抽象
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

//! 推理后端被视为不透明的执行器：输入一个 `(3, S, S)` 的 f32 张量，
//! 输出检测表和掩膜栈两块扁平缓冲区。

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, config::NetworkConfig, preprocess::InputTensor};

mod cache;
pub use self::cache::{CachedEngineBuilder, SerializableBackend};

#[cfg(feature = "replay_engine")]
mod replay;
#[cfg(feature = "replay_engine")]
pub use self::replay::{
  DETECTIONS_FILE, MASKS_FILE, ReplayEngine, ReplayEngineBuilder, ReplayEngineError,
  read_f32_file, write_f32_file,
};

/// 默认的构建期工作空间上限：2 GiB
pub const DEFAULT_MAX_WORKSPACE_SIZE: usize = 1 << 31;

/// 单次推理得到的两块原始输出
///
/// `detections` 长度为 `M * 6`，`masks` 长度为 `M * C * 2K * 2K`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutput {
  pub detections: Vec<f32>,
  pub masks: Vec<f32>,
}

pub trait InferenceEngine {
  type Error: std::error::Error + Send + Sync + 'static;

  fn execute(&mut self, input: &InputTensor) -> Result<RawOutput, Self::Error>;
}

/// 根据网络配置创建推理引擎
pub trait EngineBuilder {
  type Engine: InferenceEngine;
  type Error: std::error::Error + Send + Sync + 'static;

  fn build(&self, config: &NetworkConfig) -> Result<Self::Engine, Self::Error>;
}

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("引擎参数 {key} 无效: {value}")]
  InvalidOption { key: String, value: String },
  #[error("读取模型文件 {} 失败: {source}", .path.display())]
  ReadModel {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("推理后端错误: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
  pub fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
    EngineError::Backend(Box::new(err))
  }
}

/// 引擎构建选项
///
/// 可以从 URL 解析，路径部分为模型文件，查询参数：
/// `serialized=<路径>`、`fp16[=true|false]`、`workspace=<字节数>`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
  pub model_path: PathBuf,
  pub serialized_model_path: Option<PathBuf>,
  pub use_fp16: bool,
  pub max_workspace_size: usize,
}

impl EngineOptions {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
      serialized_model_path: None,
      use_fp16: true,
      max_workspace_size: DEFAULT_MAX_WORKSPACE_SIZE,
    }
  }

  pub fn with_serialized_model_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.serialized_model_path = Some(path.into());
    self
  }

  pub fn with_fp16(mut self, use_fp16: bool) -> Self {
    self.use_fp16 = use_fp16;
    self
  }

  pub fn with_max_workspace_size(mut self, size: usize) -> Self {
    self.max_workspace_size = size;
    self
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, EngineError> {
  match value {
    "" | "1" | "true" | "yes" => Ok(true),
    "0" | "false" | "no" => Ok(false),
    _ => Err(EngineError::InvalidOption {
      key: key.to_string(),
      value: value.to_string(),
    }),
  }
}

impl FromUrl for EngineOptions {
  type Error = EngineError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let mut options = EngineOptions::new(url.path());

    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "serialized" => options.serialized_model_path = Some(PathBuf::from(value.into_owned())),
        "fp16" => options.use_fp16 = parse_bool(&key, &value)?,
        "workspace" => {
          options.max_workspace_size =
            value
              .parse::<usize>()
              .map_err(|_| EngineError::InvalidOption {
                key: key.to_string(),
                value: value.to_string(),
              })?
        }
        _ => {
          return Err(EngineError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
          });
        }
      }
    }

    Ok(options)
  }
}
