// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/output/record.rs - 检测结果记录
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

use std::{
  fs::File,
  io::BufWriter,
  path::{Path, PathBuf},
  sync::Arc,
};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  config::{COCO_CLASS_NAMES, NetworkConfig},
  decode::{Detection, MaskRegion},
  frame::FrameError,
};
#[cfg(feature = "save_record_file")]
use crate::{FromUrl, FromUrlWithScheme, frame::Frame, output::Render};

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("帧错误: {0}")]
  FrameError(#[from] FrameError),
}

#[derive(Serialize)]
struct DetectionRecord<'a> {
  label: &'a str,
  class_id: u32,
  confidence: f32,
  bbox: [f32; 4],
  mask_region: MaskRegion,
  mask_file: String,
}

/// 将检测结果写成文本、JSON 与逐实例掩膜图像
///
/// 对于路径 `p`，生成 `p.txt`、`p.json` 以及 `p.mask<i>.png`，
/// 后缀直接追加在文件名之后，不替换已有的扩展名。
#[derive(Debug, Clone)]
pub struct Record {
  pub label_with_name: bool,
  class_names: Arc<[String]>,
}

impl Default for Record {
  fn default() -> Self {
    Self::new(true)
  }
}

impl Record {
  pub fn new(label_with_name: bool) -> Self {
    Self {
      label_with_name,
      class_names: COCO_CLASS_NAMES.iter().map(|name| name.to_string()).collect(),
    }
  }

  pub fn with_config(mut self, config: &NetworkConfig) -> Self {
    self.class_names = config
      .classes()
      .iter()
      .map(|class| class.name.clone())
      .collect();
    self
  }

  pub fn label(&self, class_id: u32) -> String {
    if self.label_with_name {
      self
        .class_names
        .get(class_id as usize)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
    } else {
      class_id.to_string()
    }
  }

  pub fn lines(&self, detections: &[Detection]) -> Vec<String> {
    detections
      .iter()
      .map(|detection| format!("{}: {}", self.label(detection.class_id), detection))
      .collect()
  }

  /// 在文件名后追加 `.suffix`
  pub fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
  }

  fn mask_path(path: &Path, index: usize) -> PathBuf {
    Self::sibling(path, &format!("mask{}.png", index))
  }

  pub fn record(&self, detections: &[Detection], path: &Path) -> Result<(), RecordError> {
    std::fs::write(Self::sibling(path, "txt"), self.lines(detections).join("\n"))?;

    let labels: Vec<String> = detections.iter().map(|d| self.label(d.class_id)).collect();
    let mut records = Vec::with_capacity(detections.len());
    for (index, (detection, label)) in detections.iter().zip(labels.iter()).enumerate() {
      let mask_path = Self::mask_path(path, index);
      detection.mask.save(&mask_path)?;

      records.push(DetectionRecord {
        label,
        class_id: detection.class_id,
        confidence: detection.confidence,
        bbox: [
          detection.x_start,
          detection.y_start,
          detection.x_end,
          detection.y_end,
        ],
        mask_region: detection.mask_region(),
        mask_file: mask_path
          .file_name()
          .map(|name| name.to_string_lossy().into_owned())
          .unwrap_or_default(),
      });
    }

    let writer = BufWriter::new(File::create(Self::sibling(path, "json"))?);
    serde_json::to_writer_pretty(writer, &records)?;
    debug!("记录 {} 个实例到 {}", detections.len(), path.display());
    Ok(())
  }
}

/// 每次推理都覆盖写入同一组记录文件
#[cfg(feature = "save_record_file")]
pub struct SaveRecordOutput {
  path: PathBuf,
  record: Record,
}

#[cfg(feature = "save_record_file")]
impl FromUrlWithScheme for SaveRecordOutput {
  const SCHEME: &'static str = "record";
}

#[cfg(feature = "save_record_file")]
impl FromUrl for SaveRecordOutput {
  type Error = RecordError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(RecordError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: uri.scheme().to_string(),
      });
    }

    let label_with_name = !uri.query_pairs().any(|(k, v)| k == "record" && v == "id");
    Ok(SaveRecordOutput {
      path: PathBuf::from(uri.path()),
      record: Record::new(label_with_name),
    })
  }
}

#[cfg(feature = "save_record_file")]
impl SaveRecordOutput {
  pub fn with_config(mut self, config: &NetworkConfig) -> Self {
    self.record = self.record.with_config(config);
    self
  }
}

#[cfg(feature = "save_record_file")]
impl Render<Frame, Vec<Detection>> for SaveRecordOutput {
  type Error = RecordError;

  fn render_result(&self, _frame: &Frame, result: &Vec<Detection>) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    self.record.record(result, &self.path)?;
    info!("保存 {} 个实例记录到: {}", result.len(), self.path.display());
    Ok(())
  }
}
