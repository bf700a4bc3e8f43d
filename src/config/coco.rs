// 该文件是 Yanmo （掩膜） 项目的一部分。
// src/config/coco.rs - COCO 类别表
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

/// COCO 数据集类别名称，下标 0 为背景类
pub const COCO_CLASS_NAMES: [&str; 81] = [
  "BG",
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// 各类别的显示颜色 (R, G, B)
pub const COCO_CLASS_COLOURS: [[u8; 3]; 81] = [
  [0x00, 0x00, 0x00],
  [0xae, 0xc7, 0xe8],
  [0x70, 0x80, 0x90],
  [0x98, 0xdf, 0x8a],
  [0xc5, 0xb0, 0xd5],
  [0xff, 0x7f, 0x0e],
  [0xd6, 0x27, 0x28],
  [0x1f, 0x77, 0xb4],
  [0xbc, 0xbd, 0x22],
  [0xff, 0x98, 0x96],
  [0x2c, 0xa0, 0x2c],
  [0xe3, 0x77, 0xc2],
  [0xde, 0x9e, 0xd6],
  [0x94, 0x67, 0xbd],
  [0x8c, 0xa2, 0x52],
  [0x84, 0x3c, 0x39],
  [0x9e, 0xda, 0xe5],
  [0x9c, 0x9e, 0xde],
  [0xe7, 0x96, 0x9c],
  [0x63, 0x79, 0x39],
  [0x8c, 0x56, 0x4b],
  [0xdb, 0xdb, 0x8d],
  [0xd6, 0x61, 0x6b],
  [0xce, 0xdb, 0x9c],
  [0xe7, 0xba, 0x52],
  [0x39, 0x3b, 0x79],
  [0xa5, 0x51, 0x94],
  [0xad, 0x49, 0x4a],
  [0xb5, 0xcf, 0x6b],
  [0x52, 0x54, 0xa3],
  [0xbd, 0x9e, 0x39],
  [0xc4, 0x9c, 0x94],
  [0xf7, 0xb6, 0xd2],
  [0x6b, 0x6e, 0xcf],
  [0xff, 0xbb, 0x78],
  [0xc7, 0xc7, 0xc7],
  [0x8c, 0x6d, 0x31],
  [0xe7, 0xcb, 0x94],
  [0xce, 0x6d, 0xbd],
  [0x17, 0xbe, 0xcf],
  [0xae, 0xc7, 0xe8],
  [0x70, 0x80, 0x90],
  [0x98, 0xdf, 0x8a],
  [0xc5, 0xb0, 0xd5],
  [0xff, 0x7f, 0x0e],
  [0xd6, 0x27, 0x28],
  [0x1f, 0x77, 0xb4],
  [0xbc, 0xbd, 0x22],
  [0xff, 0x98, 0x96],
  [0x2c, 0xa0, 0x2c],
  [0xe3, 0x77, 0xc2],
  [0xde, 0x9e, 0xd6],
  [0x94, 0x67, 0xbd],
  [0x8c, 0xa2, 0x52],
  [0x84, 0x3c, 0x39],
  [0x9e, 0xda, 0xe5],
  [0x9c, 0x9e, 0xde],
  [0xe7, 0x96, 0x9c],
  [0x63, 0x79, 0x39],
  [0x8c, 0x56, 0x4b],
  [0xdb, 0xdb, 0x8d],
  [0xd6, 0x61, 0x6b],
  [0xce, 0xdb, 0x9c],
  [0xe7, 0xba, 0x52],
  [0x39, 0x3b, 0x79],
  [0xa5, 0x51, 0x94],
  [0xad, 0x49, 0x4a],
  [0xb5, 0xcf, 0x6b],
  [0x52, 0x54, 0xa3],
  [0xbd, 0x9e, 0x39],
  [0xc4, 0x9c, 0x94],
  [0xf7, 0xb6, 0xd2],
  [0x6b, 0x6e, 0xcf],
  [0xff, 0xbb, 0x78],
  [0xc7, 0xc7, 0xc7],
  [0x8c, 0x6d, 0x31],
  [0xe7, 0xcb, 0x94],
  [0xce, 0x6d, 0xbd],
  [0x17, 0xbe, 0xcf],
  [0xae, 0xc7, 0xe8],
  [0x70, 0x80, 0x90],
];
