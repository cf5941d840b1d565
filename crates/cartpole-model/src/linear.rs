//! 线性化状态空间模型
//!
//! 在竖直平衡点（摆角 θ = 0）线性化的倒立摆小车动力学：
//!
//! ```text
//! ẋ = A·x + B·u
//!
//!     ┌ 0  1     0        0 ┐        ┌    0     ┐
//! A = │ 0  0   m·g/M      0 │    B = │   1/M    │
//!     │ 0  0     0        1 │        │    0     │
//!     └ 0  0 (M+m)g/(M·L) 0 ┘        └ -1/(M·L) ┘
//! ```
//!
//! 其中 M 为小车质量，m 为摆杆质量，L 为摆长，g 为重力加速度，
//! u 为施加在小车上的水平力（N）。线性化点不变，矩阵只计算一次。

use crate::PhysicalParameters;
use nalgebra::{Matrix4, Vector4};

/// 线性化系统矩阵 A（4×4）与 B（4×1）
///
/// 由 [`PhysicalParameters`] 的纯函数导出，构造后不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemMatrices {
    a: Matrix4<f64>,
    b: Vector4<f64>,
}

impl SystemMatrices {
    /// 由物理参数导出线性化矩阵
    pub fn from_parameters(params: &PhysicalParameters) -> Self {
        let m_cart = params.cart_mass();
        let m_pole = params.pole_mass();
        let length = params.pole_length();
        let g = params.gravity();

        let a = Matrix4::new(
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, m_pole * g / m_cart, 0.0,
            0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, (m_cart + m_pole) * g / (m_cart * length), 0.0,
        );

        let b = Vector4::new(0.0, 1.0 / m_cart, 0.0, -1.0 / (m_cart * length));

        Self { a, b }
    }

    /// 状态矩阵 A
    pub fn a(&self) -> &Matrix4<f64> {
        &self.a
    }

    /// 输入矩阵 B（4×1 列向量）
    pub fn b(&self) -> &Vector4<f64> {
        &self.b
    }
}
