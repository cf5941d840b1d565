//! LQR 反馈增益
//!
//! 在 Riccati 解 P 的基础上计算 K = R⁻¹BᵗP，并验证闭环矩阵
//! A − BK 的全部特征值实部为负（Hurwitz）。校验失败按致命
//! 错误处理：不稳定的增益绝不能交给控制循环。

use crate::care::solve_care;
use crate::SynthesisError;
use cartpole_model::{CostWeights, StateVector, SystemMatrices};
use nalgebra::{Matrix1x4, Matrix4};
use tracing::debug;

/// LQR 反馈增益
///
/// 综合一次，整个控制器生命周期内只读。控制律为 u = −K·x。
#[derive(Debug, Clone, PartialEq)]
pub struct LqrGain {
    /// 反馈增益行向量 K（1×4）
    k: Matrix1x4<f64>,
    /// Riccati 方程解 P（对称半正定）
    p: Matrix4<f64>,
}

impl LqrGain {
    /// 从线性化模型和代价权重综合增益
    ///
    /// 流程：求解 CARE → K = R⁻¹BᵗP → 闭环 Hurwitz 校验。
    ///
    /// # Errors
    /// Riccati 求解失败或闭环不稳定时返回 [`SynthesisError`]。
    pub fn synthesize(
        system: &SystemMatrices,
        weights: &CostWeights,
    ) -> Result<Self, SynthesisError> {
        let a = system.a();
        let b = system.b();
        let q = weights.q_matrix();
        let r = weights.r();

        let p = solve_care(a, b, &q, r)?;
        let k = (b.transpose() * p) / r;

        // 闭环稳定性校验：A − BK 必须是 Hurwitz 矩阵
        let closed_loop = a - b * k;
        let max_real_part = closed_loop
            .complex_eigenvalues()
            .iter()
            .map(|ev| ev.re)
            .fold(f64::NEG_INFINITY, f64::max);

        if !max_real_part.is_finite() || max_real_part >= 0.0 {
            return Err(SynthesisError::UnstableClosedLoop { max_real_part });
        }

        debug!(
            k = ?k.as_slice(),
            max_real_part,
            "LQR gain synthesized"
        );

        Ok(Self { k, p })
    }

    /// 按控制律 u = −K·x 计算控制力
    #[inline]
    pub fn force(&self, state: &StateVector) -> f64 {
        -(self.k * state)[(0, 0)]
    }

    /// 反馈增益 K
    pub fn k(&self) -> &Matrix1x4<f64> {
        &self.k
    }

    /// Riccati 解 P
    pub fn p(&self) -> &Matrix4<f64> {
        &self.p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cartpole_model::PhysicalParameters;
    use nalgebra::Vector4;

    fn reference_gain() -> LqrGain {
        let params = PhysicalParameters::new(1.0, 1.0, 1.0, 9.81).unwrap();
        let system = SystemMatrices::from_parameters(&params);
        let weights = CostWeights::new([5.0, 5.0, 200.0, 20.0], 0.1).unwrap();
        LqrGain::synthesize(&system, &weights).unwrap()
    }

    #[test]
    fn test_closed_loop_is_hurwitz() {
        let params = PhysicalParameters::new(1.0, 1.0, 1.0, 9.81).unwrap();
        let system = SystemMatrices::from_parameters(&params);
        let gain = reference_gain();

        let closed_loop = system.a() - system.b() * gain.k();
        for ev in closed_loop.complex_eigenvalues().iter() {
            assert!(ev.re < 0.0, "eigenvalue with re >= 0: {}", ev);
        }
    }

    /// 默认参数下的增益与独立实现求得的参考值逐元素一致
    ///
    /// 参考值来自同一 CARE 的独立求解（残差 < 1e-8），
    /// 求解器回归会直接破坏这组数字。
    #[test]
    fn test_gain_matches_reference_values() {
        let gain = reference_gain();
        let k = gain.k();
        assert_relative_eq!(k[(0, 0)], -7.071067812, epsilon = 1e-6);
        assert_relative_eq!(k[(0, 1)], -11.061262519, epsilon = 1e-6);
        assert_relative_eq!(k[(0, 2)], -170.184634722, epsilon = 1e-6);
        assert_relative_eq!(k[(0, 3)], -35.065994008, epsilon = 1e-6);
    }

    /// 同一输入两次综合必须产生完全相同的增益
    #[test]
    fn test_synthesis_deterministic() {
        let g1 = reference_gain();
        let g2 = reference_gain();
        assert_eq!(g1.k(), g2.k());
        assert_eq!(g1.p(), g2.p());
    }

    #[test]
    fn test_force_sign_convention() {
        let gain = reference_gain();

        // 零状态下控制力为零
        assert_eq!(gain.force(&Vector4::zeros()), 0.0);

        // u = −K·x：逐元素验证
        let x = Vector4::new(0.3, -0.1, 0.05, 0.2);
        let expected = -(gain.k() * x)[(0, 0)];
        assert_relative_eq!(gain.force(&x), expected);
    }

    /// 摆杆权重远高于小车位置权重时，摆角分量的增益也应显著更大
    #[test]
    fn test_gain_reflects_weighting() {
        let gain = reference_gain();
        let k = gain.k();
        assert!(
            k[(0, 2)].abs() > k[(0, 0)].abs(),
            "pole-angle gain {} should dominate cart-position gain {}",
            k[(0, 2)],
            k[(0, 0)]
        );
    }

    /// 闭环仿真：从倾斜初始状态出发摆角必须收敛
    #[test]
    fn test_closed_loop_simulation_converges() {
        let params = PhysicalParameters::new(1.0, 1.0, 1.0, 9.81).unwrap();
        let system = SystemMatrices::from_parameters(&params);
        let gain = reference_gain();

        let a = *system.a();
        let b = *system.b();
        let dt = 0.001;
        let mut x = Vector4::new(0.0, 0.0, 0.1, 0.0);

        // RK4 积分线性闭环动力学 ẋ = (A − BK)x
        let deriv = |x: &Vector4<f64>| {
            let u = gain.force(x);
            a * x + b * u
        };
        for _ in 0..5000 {
            let k1 = deriv(&x);
            let k2 = deriv(&(x + k1 * (dt / 2.0)));
            let k3 = deriv(&(x + k2 * (dt / 2.0)));
            let k4 = deriv(&(x + k3 * dt));
            x += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
        }

        // 5 秒后摆角应远小于初始的 0.1 rad
        assert!(
            x[2].abs() < 0.01,
            "pole angle did not converge: {}",
            x[2]
        );
        assert!(x.iter().all(|v| v.is_finite()));
    }
}
