// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/engine/cache.rs - 序列化引擎缓存
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

use tracing::{debug, info, warn};

use crate::{
  config::NetworkConfig,
  engine::{EngineBuilder, EngineError, EngineOptions, InferenceEngine},
};

/// 能够从模型文件构建引擎，并支持引擎序列化的推理后端
pub trait SerializableBackend {
  type Engine: InferenceEngine;
  type Error: std::error::Error + Send + Sync + 'static;

  fn build_engine(
    &self,
    model: &[u8],
    options: &EngineOptions,
    config: &NetworkConfig,
  ) -> Result<Self::Engine, Self::Error>;

  fn serialize(&self, engine: &Self::Engine) -> Result<Vec<u8>, Self::Error>;

  fn deserialize(&self, data: &[u8], config: &NetworkConfig) -> Result<Self::Engine, Self::Error>;
}

/// 优先加载已序列化的引擎，失败时回退到从模型文件构建，
/// 构建成功后写回序列化文件供下次使用。
pub struct CachedEngineBuilder<B> {
  backend: B,
  options: EngineOptions,
}

impl<B: SerializableBackend> CachedEngineBuilder<B> {
  pub fn new(backend: B, options: EngineOptions) -> Self {
    Self { backend, options }
  }

  pub fn options(&self) -> &EngineOptions {
    &self.options
  }

  fn load_serialized(&self, config: &NetworkConfig) -> Option<B::Engine> {
    let path = self.options.serialized_model_path.as_ref()?;
    if !path.is_file() {
      debug!("序列化引擎 {} 不存在", path.display());
      return None;
    }

    info!("加载序列化引擎: {}", path.display());
    let data = match std::fs::read(path) {
      Ok(data) => data,
      Err(e) => {
        warn!("读取序列化引擎失败: {}, 改为重新构建", e);
        return None;
      }
    };

    match self.backend.deserialize(&data, config) {
      Ok(engine) => Some(engine),
      Err(e) => {
        warn!("反序列化引擎失败: {}, 改为重新构建", e);
        None
      }
    }
  }

  fn persist(&self, engine: &B::Engine) {
    let Some(path) = self.options.serialized_model_path.as_ref() else {
      return;
    };

    let data = match self.backend.serialize(engine) {
      Ok(data) => data,
      Err(e) => {
        warn!("序列化引擎失败: {}", e);
        return;
      }
    };

    match std::fs::write(path, &data) {
      Ok(()) => info!(
        "序列化引擎已写入 {} ({:.2} MB)",
        path.display(),
        data.len() as f64 / (1024.0 * 1024.0)
      ),
      Err(e) => warn!("写入序列化引擎 {} 失败: {}", path.display(), e),
    }
  }
}

impl<B: SerializableBackend> EngineBuilder for CachedEngineBuilder<B> {
  type Engine = B::Engine;
  type Error = EngineError;

  fn build(&self, config: &NetworkConfig) -> Result<Self::Engine, Self::Error> {
    if let Some(engine) = self.load_serialized(config) {
      return Ok(engine);
    }

    let path = &self.options.model_path;
    info!("从模型文件构建引擎: {}", path.display());
    let model = std::fs::read(path).map_err(|source| EngineError::ReadModel {
      path: path.clone(),
      source,
    })?;
    debug!(
      "模型文件大小: {:.2} MB, fp16: {}, 工作空间: {} 字节",
      model.len() as f64 / (1024.0 * 1024.0),
      self.options.use_fp16,
      self.options.max_workspace_size
    );

    let engine = self
      .backend
      .build_engine(&model, &self.options, config)
      .map_err(EngineError::backend)?;
    info!("引擎构建完成");

    self.persist(&engine);
    Ok(engine)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use thiserror::Error;

  use super::*;
  use crate::{engine::RawOutput, preprocess::InputTensor};

  #[derive(Error, Debug)]
  #[error("{0}")]
  struct FakeError(&'static str);

  #[derive(Debug)]
  struct FakeEngine {
    origin: Vec<u8>,
  }

  impl InferenceEngine for FakeEngine {
    type Error = FakeError;

    fn execute(&mut self, _input: &InputTensor) -> Result<RawOutput, Self::Error> {
      Ok(RawOutput::default())
    }
  }

  #[derive(Default)]
  struct FakeBackend {
    builds: Cell<usize>,
    loads: Cell<usize>,
  }

  const MAGIC: &[u8] = b"ENGINE:";

  impl SerializableBackend for FakeBackend {
    type Engine = FakeEngine;
    type Error = FakeError;

    fn build_engine(
      &self,
      model: &[u8],
      _options: &EngineOptions,
      _config: &NetworkConfig,
    ) -> Result<FakeEngine, FakeError> {
      self.builds.set(self.builds.get() + 1);
      Ok(FakeEngine {
        origin: model.to_vec(),
      })
    }

    fn serialize(&self, engine: &FakeEngine) -> Result<Vec<u8>, FakeError> {
      Ok([MAGIC, engine.origin.as_slice()].concat())
    }

    fn deserialize(&self, data: &[u8], _config: &NetworkConfig) -> Result<FakeEngine, FakeError> {
      self.loads.set(self.loads.get() + 1);
      data
        .strip_prefix(MAGIC)
        .map(|origin| FakeEngine {
          origin: origin.to_vec(),
        })
        .ok_or(FakeError("bad magic"))
    }
  }

  #[test]
  fn builds_without_serialized_path() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.uff");
    std::fs::write(&model, b"weights").unwrap();

    let builder = CachedEngineBuilder::new(FakeBackend::default(), EngineOptions::new(&model));
    let engine = builder.build(&NetworkConfig::coco()).unwrap();
    assert_eq!(engine.origin, b"weights");
    assert_eq!(builder.backend.builds.get(), 1);
    assert_eq!(builder.backend.loads.get(), 0);
  }

  #[test]
  fn builds_then_reuses_serialized_engine() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.uff");
    let serialized = dir.path().join("model.engine");
    std::fs::write(&model, b"weights").unwrap();
    let options = EngineOptions::new(&model).with_serialized_model_path(&serialized);

    let first = CachedEngineBuilder::new(FakeBackend::default(), options.clone());
    first.build(&NetworkConfig::coco()).unwrap();
    assert_eq!(first.backend.builds.get(), 1);
    assert_eq!(std::fs::read(&serialized).unwrap(), b"ENGINE:weights");

    // 模型文件删除后仍可以从序列化文件加载
    std::fs::remove_file(&model).unwrap();
    let second = CachedEngineBuilder::new(FakeBackend::default(), options);
    let engine = second.build(&NetworkConfig::coco()).unwrap();
    assert_eq!(engine.origin, b"weights");
    assert_eq!(second.backend.builds.get(), 0);
    assert_eq!(second.backend.loads.get(), 1);
  }

  #[test]
  fn corrupt_serialized_engine_falls_back_to_build() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.uff");
    let serialized = dir.path().join("model.engine");
    std::fs::write(&model, b"weights").unwrap();
    std::fs::write(&serialized, b"garbage").unwrap();

    let options = EngineOptions::new(&model).with_serialized_model_path(&serialized);
    let builder = CachedEngineBuilder::new(FakeBackend::default(), options);
    let engine = builder.build(&NetworkConfig::coco()).unwrap();

    assert_eq!(engine.origin, b"weights");
    assert_eq!(builder.backend.loads.get(), 1);
    assert_eq!(builder.backend.builds.get(), 1);
    assert_eq!(std::fs::read(&serialized).unwrap(), b"ENGINE:weights");
  }

  #[test]
  fn missing_model_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = EngineOptions::new(dir.path().join("missing.uff"));
    let builder = CachedEngineBuilder::new(FakeBackend::default(), options);
    assert!(matches!(
      builder.build(&NetworkConfig::coco()),
      Err(EngineError::ReadModel { .. })
    ));
  }

  #[test]
  fn unwritable_cache_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.uff");
    std::fs::write(&model, b"weights").unwrap();
    let options = EngineOptions::new(&model)
      .with_serialized_model_path(dir.path().join("no-such-dir").join("model.engine"));

    let builder = CachedEngineBuilder::new(FakeBackend::default(), options);
    assert!(builder.build(&NetworkConfig::coco()).is_ok());
  }
}
