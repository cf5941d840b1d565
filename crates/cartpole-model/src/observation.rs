//! 关节观测记录
//!
//! 传感侧每个采样周期投递一条 [`JointStateSample`]：关节名称序列
//! 加上与之并行的位置/速度数组（顺序不保证）。状态估计器按名称
//! 查找小车关节和摆杆关节，抽取 4 维状态向量。

use serde::{Deserialize, Serialize};

/// 小车平移关节名称
pub const CART_JOINT: &str = "cart_to_base";

/// 摆杆转动关节名称
pub const POLE_JOINT: &str = "pole_joint";

/// 一次关节状态观测
///
/// `positions` 和 `velocities` 与 `names` 并行；传输层不保证
/// 关节顺序，也不保证数组长度一致（不完整采样按错误处理）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointStateSample {
    /// 关节名称序列
    pub names: Vec<String>,
    /// 关节位置（与 `names` 并行），单位 m 或 rad
    pub positions: Vec<f64>,
    /// 关节速度（与 `names` 并行），单位 m/s 或 rad/s
    pub velocities: Vec<f64>,
}

impl JointStateSample {
    /// 构造一条完整的小车 + 摆杆观测（主要用于测试和模拟器）
    pub fn cart_pole(
        cart_position: f64,
        cart_velocity: f64,
        pole_angle: f64,
        pole_velocity: f64,
    ) -> Self {
        Self {
            names: vec![CART_JOINT.to_string(), POLE_JOINT.to_string()],
            positions: vec![cart_position, pole_angle],
            velocities: vec![cart_velocity, pole_velocity],
        }
    }

    /// 按名称查找关节下标
    pub fn index_of(&self, joint: &str) -> Option<usize> {
        self.names.iter().position(|n| n == joint)
    }
}
