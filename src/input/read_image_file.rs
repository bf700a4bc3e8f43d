// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::Frame};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("目录 {} 中没有图像文件", .0.display())]
  NoImages(PathBuf),
}

/// 读取并解码单个图像文件为 RGB 帧
pub fn load_frame(path: &Path) -> Result<Frame, ImageFileInputError> {
  let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
  Ok(Frame::from(image.to_rgb8()))
}

fn is_image_file(path: &Path) -> bool {
  path.is_file()
    && path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(|ext| {
        IMAGE_EXTENSIONS
          .iter()
          .any(|known| ext.eq_ignore_ascii_case(known))
      })
      .unwrap_or(false)
}

/// 单个图像文件，或目录下按路径排序的全部图像文件
///
/// 单个文件在构造时即解码，目录中的文件在迭代时逐个解码，
/// 解码失败的文件记录错误后跳过。
pub struct ImageFileInput {
  first: Option<Frame>,
  pending: std::vec::IntoIter<PathBuf>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: url.scheme().to_string(),
      });
    }

    Self::open(Path::new(url.path()))
  }
}

impl ImageFileInput {
  pub fn open(path: &Path) -> Result<Self, ImageFileInputError> {
    if !path.is_dir() {
      info!("读取图像文件: {}", path.display());
      return Ok(Self {
        first: Some(load_frame(path)?),
        pending: Vec::new().into_iter(),
      });
    }

    let mut files = std::fs::read_dir(path)?
      .map(|entry| entry.map(|entry| entry.path()))
      .collect::<Result<Vec<_>, _>>()?;
    files.retain(|file| is_image_file(file));
    files.sort();

    if files.is_empty() {
      return Err(ImageFileInputError::NoImages(path.to_path_buf()));
    }
    info!("目录 {} 中共 {} 个图像文件", path.display(), files.len());

    Ok(Self {
      first: None,
      pending: files.into_iter(),
    })
  }
}

impl Iterator for ImageFileInput {
  type Item = Frame;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(frame) = self.first.take() {
      return Some(frame);
    }

    for path in self.pending.by_ref() {
      match load_frame(&path) {
        Ok(frame) => {
          debug!(
            "读取图像 {}: {}x{}",
            path.display(),
            frame.width(),
            frame.height()
          );
          return Some(frame);
        }
        Err(e) => error!("读取图像 {} 失败: {}, 跳过", path.display(), e),
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn write_image(path: &Path, width: u32, value: u8) {
    RgbImage::from_pixel(width, 2, Rgb([value, 0, 0]))
      .save(path)
      .unwrap();
  }

  #[test]
  fn reads_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.png");
    write_image(&path, 3, 7);

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap();
    let frame = input.next().unwrap();
    assert_eq!((frame.width(), frame.height()), (3, 2));
    assert_eq!(frame.to_rgb_image().unwrap().get_pixel(0, 0), &Rgb([7, 0, 0]));
    assert!(input.next().is_none());
  }

  #[test]
  fn reads_directory_in_path_order() {
    let dir = tempfile::tempdir().unwrap();
    write_image(&dir.path().join("b.png"), 2, 2);
    write_image(&dir.path().join("a.png"), 1, 1);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
    // 扩展名正确但内容损坏的文件会被跳过
    std::fs::write(dir.path().join("c.png"), "broken").unwrap();
    write_image(&dir.path().join("d.png"), 4, 4);

    let widths: Vec<u32> = ImageFileInput::open(dir.path())
      .unwrap()
      .map(|frame| frame.width())
      .collect();
    assert_eq!(widths, vec![1, 2, 4]);
  }

  #[test]
  fn empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      ImageFileInput::open(dir.path()),
      Err(ImageFileInputError::NoImages(_))
    ));
  }

  #[test]
  fn rejects_other_scheme() {
    let url = Url::parse("file:///tmp/a.png").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemeMismatch { .. })
    ));
  }
}
