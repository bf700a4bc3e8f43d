// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/bin/simple.rs - 单帧推理
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use yanmo::{
  FromUrl,
  config::NetworkConfig,
  engine::ReplayEngineBuilder,
  input::InputWrapper,
  model::MaskRcnn,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};

/// Yanmo 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理引擎地址，例如 replay:///path/to/capture
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源，例如 image:///path/to/image.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，例如 record:///path/to/result 或 folder:///path/to/dir?always
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型地址: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = NetworkConfig::coco();
  let input = InputWrapper::from_url(&args.input)?;
  let output = OutputWrapper::from_url(&args.output)?.with_config(&config);
  let mut model = MaskRcnn::new(config, ReplayEngineBuilder::from_url(&args.model)?);
  model.build()?;

  OneShotTask.run_task(input, model, output)?;

  Ok(())
}
