//! 物理参数与代价权重
//!
//! 两者均为启动期常量：构造时校验，此后不可变。

use crate::ModelError;
use nalgebra::{Matrix4, Vector4};
use serde::{Deserialize, Serialize};

/// 倒立摆小车的物理参数
///
/// 所有参数必须严格为正，通过 [`PhysicalParameters::new`] 校验后不可变。
///
/// # Example
///
/// ```
/// use cartpole_model::PhysicalParameters;
///
/// let params = PhysicalParameters::new(1.0, 1.0, 1.0, 9.81).unwrap();
/// assert_eq!(params.cart_mass(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    /// 小车质量（kg）
    cart_mass: f64,
    /// 摆杆质量（kg）
    pole_mass: f64,
    /// 摆杆长度（m）
    pole_length: f64,
    /// 重力加速度（m/s²）
    gravity: f64,
}

impl PhysicalParameters {
    /// 创建并校验物理参数
    ///
    /// # Errors
    /// - `ModelError::NonPositiveParameter`: 任一参数 ≤ 0 或非有限值
    pub fn new(
        cart_mass: f64,
        pole_mass: f64,
        pole_length: f64,
        gravity: f64,
    ) -> Result<Self, ModelError> {
        for (name, value) in [
            ("cart_mass", cart_mass),
            ("pole_mass", pole_mass),
            ("pole_length", pole_length),
            ("gravity", gravity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::NonPositiveParameter { name, value });
            }
        }

        Ok(Self {
            cart_mass,
            pole_mass,
            pole_length,
            gravity,
        })
    }

    /// 小车质量（kg）
    pub fn cart_mass(&self) -> f64 {
        self.cart_mass
    }

    /// 摆杆质量（kg）
    pub fn pole_mass(&self) -> f64 {
        self.pole_mass
    }

    /// 摆杆长度（m）
    pub fn pole_length(&self) -> f64 {
        self.pole_length
    }

    /// 重力加速度（m/s²）
    pub fn gravity(&self) -> f64 {
        self.gravity
    }
}

/// LQR 代价权重
///
/// Q 为对角阵（状态代价），R 为标量（控制代价）。
/// 对角权重必须非负，控制权重必须严格为正（否则 R⁻¹ 不存在）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Q 矩阵对角元素 [位置, 速度, 摆角, 摆角速度]
    q_diag: [f64; 4],
    /// 控制代价 R（标量）
    r: f64,
}

impl CostWeights {
    /// 创建并校验代价权重
    ///
    /// # Errors
    /// - `ModelError::NegativeStateWeight`: 对角权重为负或非有限值
    /// - `ModelError::NonPositiveControlWeight`: 控制权重 ≤ 0 或非有限值
    pub fn new(q_diag: [f64; 4], r: f64) -> Result<Self, ModelError> {
        for (index, &value) in q_diag.iter().enumerate() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ModelError::NegativeStateWeight { index, value });
            }
        }
        if !(r.is_finite() && r > 0.0) {
            return Err(ModelError::NonPositiveControlWeight { value: r });
        }

        Ok(Self { q_diag, r })
    }

    /// 状态代价矩阵 Q（4×4 对角阵）
    pub fn q_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_diagonal(&Vector4::from(self.q_diag))
    }

    /// 对角权重
    pub fn q_diag(&self) -> [f64; 4] {
        self.q_diag
    }

    /// 控制代价标量 R
    pub fn r(&self) -> f64 {
        self.r
    }
}
