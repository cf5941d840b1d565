//! 模型层模块
//!
//! 本模块提供倒立摆小车（cart-pole）系统的纯数据定义，包括：
//! - 物理参数（质量、摆长、重力加速度）及其校验
//! - 在竖直平衡点线性化的状态空间矩阵 A/B
//! - LQR 代价权重 Q/R
//! - 关节观测记录（名称 + 位置/速度并行数组）
//!
//! # 依赖原则
//!
//! 本 crate 是叶子 crate：只包含数据结构和确定性计算，
//! 不包含线程、通道或任何 IO。上层 crate（`cartpole-lqr`、
//! `cartpole-controller`）在此之上构建增益综合与实时控制。

mod error;
mod linear;
mod observation;
mod params;

pub use error::ModelError;
pub use linear::SystemMatrices;
pub use observation::{CART_JOINT, JointStateSample, POLE_JOINT};
pub use params::{CostWeights, PhysicalParameters};

use nalgebra::Vector4;

/// 状态向量 [小车位置, 小车速度, 摆角, 摆角速度]
///
/// 单位：m, m/s, rad, rad/s。摆角以竖直向上为零点。
pub type StateVector = Vector4<f64>;
