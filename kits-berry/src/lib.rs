#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对 KiTS 格式的 3D 肾脏 CT 分割结果 (预测) 与真值标注进行比较,
//! 按层级评估类 (Hierarchical Evaluation Class, HEC) 计算 Dice 系数与表面 Dice.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 只负责 **评估**, 不负责生成或改进分割结果.
//! 2. 在非期望情况下 (例如向逐类计算函数传入形状不一致的数组), 程序会直接 panic,
//!   而不会导致内存错误. 文件读取失败等可预期错误以 [`EvalError`] 返回.
//!
//! # 模块概览
//!
//! ### HEC 掩码构建 ✅
//!
//! 将整数标签图按单个标签或标签集合转换为布尔掩码.
//!
//! 实现位于 `kits-berry/src/hec`.
//!
//! ### 表面距离 ✅
//!
//! 边界体素提取, 各向异性欧氏距离变换, 以及基于给定容差的表面 Dice,
//! 平均表面距离, 鲁棒 Hausdorff 距离.
//!
//! 实现位于 `kits-berry/src/surface`.
//!
//! ### 逐类 / 逐病例指标 ✅
//!
//! 1. 对单个 HEC 计算 `(Dice, 表面 Dice)`, 并处理空掩码的边界情况.
//! 2. 对整个病例计算 `HEC 个数 x 2` 的指标表.
//! 3. 多病例批量评估与汇总.
//!
//! 实现位于 `kits-berry/src/metrics`.
//!
//! ### 数据集加载 ✅
//!
//! 按 KiTS 命名规则 (`case_XXXXX`) 生成预测/真值文件路径的迭代器式加载器.
//!
//! 实现位于 `kits-berry/src/dataset`.
//!
//! ### 体素间距的轴序
//!
//! nifti 文件头按 `(x, y, z)` (最快变化轴在前) 存储体素间距,
//! 而本 crate 内部按 `(z, y, x)` 访问体数据. 因此从文件头读取的间距会被逆序,
//! 使之与数组索引顺序一致. 见 [`NiftiHeaderAttr::spacing`].

/// 三维索引, 按 `(z, y, x)` 顺序.
pub type Idx3d = (usize, usize, usize);

/// 三维体素间距 (毫米), 与数组索引顺序一致, 即 `[z, y, x]`.
pub type Spacing3d = [f64; 3];

/// 3D nii 分割文件基础数据结构.
mod data;

pub use data::{NiftiHeaderAttr, SegVolume, VolumeSource};

pub mod consts;

mod error;

pub use error::{EvalError, EvalResult};

pub mod hec;

pub mod surface;

pub mod metrics;

pub mod dataset;
pub mod prelude;
