//! 增益综合模块
//!
//! 本模块求解连续时间代数 Riccati 方程（CARE）并生成 LQR 反馈增益：
//! - [`solve_care`]：矩阵符号函数迭代求解 AᵗP + PA − PBR⁻¹BᵗP + Q = 0
//! - [`LqrGain`]：K = R⁻¹BᵗP，附带闭环 Hurwitz 校验
//!
//! # 使用场景
//!
//! 增益综合在控制循环启动之前同步执行一次，结果在控制器生命周期内
//! 不变。综合失败（不可镇定 / 迭代不收敛 / 闭环不稳定）是致命的
//! 初始化错误，上层必须拒绝启动控制循环。

mod care;
mod error;
mod gain;

pub use care::solve_care;
pub use error::SynthesisError;
pub use gain::LqrGain;
