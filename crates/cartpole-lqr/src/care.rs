//! 连续时间代数 Riccati 方程求解
//!
//! 采用 Hamiltonian 矩阵的符号函数（matrix sign function）迭代：
//!
//! ```text
//!     ┌  A   −B·R⁻¹·Bᵗ ┐
//! H = │                │      Z₀ = H,  Zₖ₊₁ = (c·Zₖ + (c·Zₖ)⁻¹) / 2
//!     └ −Q     −Aᵗ     ┘
//! ```
//!
//! 其中 c = |det Zₖ|^(−1/8) 为行列式缩放因子（加速收敛）。
//! 迭代二次收敛到 sign(H)。H 的稳定不变子空间由 [I; P] 的列张成，
//! 因而 (sign(H) + I)·[I; P] = 0，P 通过堆叠方程的最小二乘解恢复：
//!
//! ```text
//! ┌ S₁₂     ┐       ┌ −(S₁₁ + I) ┐
//! │         │ · P = │            │
//! └ S₂₂ + I ┘       └   −S₂₁     ┘
//! ```
//!
//! 解按 (P + Pᵗ)/2 对称化后返回。

use crate::SynthesisError;
use nalgebra::{Matrix4, SMatrix, Vector4};
use tracing::{debug, trace};

/// 符号函数迭代次数上限
///
/// 二次收敛下 4×4 问题通常 10 次以内收敛，上限留出充分余量。
const MAX_ITERATIONS: usize = 120;

/// 收敛判据：相对 Frobenius 范数变化
const CONVERGENCE_TOL: f64 = 1e-12;

/// 回代验证容差（相对于 1 + ‖P‖ 的 Riccati 残差范数）
///
/// 不可镇定系统下符号迭代仍可能收敛，但堆叠方程组秩亏，
/// 最小二乘返回的最小范数 P 并不满足方程。回代是唯一可靠的
/// 正确性判据。
const RESIDUAL_TOL: f64 = 1e-6;

/// 求解连续时间代数 Riccati 方程
///
/// AᵗP + PA − PBR⁻¹BᵗP + Q = 0
///
/// # 参数
/// - `a`: 状态矩阵（4×4）
/// - `b`: 输入矩阵（4×1 列向量）
/// - `q`: 状态代价矩阵（对称半正定）
/// - `r`: 控制代价标量（> 0，调用方负责校验）
///
/// # 返回
/// 唯一的对称半正定镇定解 P。
///
/// # Errors
/// - `SynthesisError::NotConverged`: 迭代未在上限内收敛（系统不可镇定时的典型表现）
/// - `SynthesisError::SingularIteration`: 迭代中出现奇异/非有限矩阵
/// - `SynthesisError::SubspaceExtraction`: 稳定子空间最小二乘求解失败
/// - `SynthesisError::NonFiniteSolution`: 解含 NaN/Inf
/// - `SynthesisError::ResidualTooLarge`: 回代验证失败，候选解不满足方程
///   （不可镇定系统下堆叠方程组秩亏时的典型表现）
pub fn solve_care(
    a: &Matrix4<f64>,
    b: &Vector4<f64>,
    q: &Matrix4<f64>,
    r: f64,
) -> Result<Matrix4<f64>, SynthesisError> {
    // === 构造 8×8 Hamiltonian 矩阵 ===
    let rinv_bbt = (b * b.transpose()) / r;

    let mut h = SMatrix::<f64, 8, 8>::zeros();
    h.fixed_view_mut::<4, 4>(0, 0).copy_from(a);
    h.fixed_view_mut::<4, 4>(0, 4).copy_from(&(-rinv_bbt));
    h.fixed_view_mut::<4, 4>(4, 0).copy_from(&(-q));
    h.fixed_view_mut::<4, 4>(4, 4).copy_from(&(-a.transpose()));

    // === 符号函数迭代 ===
    let mut z = h;
    let mut converged = false;

    for iteration in 0..MAX_ITERATIONS {
        let det = z.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(SynthesisError::SingularIteration { iteration });
        }

        // 行列式缩放：收敛后 det → ±1，c → 1
        let scale = det.abs().powf(-1.0 / 8.0);
        let scaled = z * scale;

        let inverse = scaled
            .try_inverse()
            .ok_or(SynthesisError::SingularIteration { iteration })?;
        let next = (scaled + inverse) * 0.5;

        let delta = (next - scaled).norm();
        let magnitude = next.norm();
        z = next;

        trace!(iteration, delta, "sign iteration step");

        if delta <= CONVERGENCE_TOL * magnitude.max(1.0) {
            debug!(iterations = iteration + 1, "sign iteration converged");
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(SynthesisError::NotConverged {
            iterations: MAX_ITERATIONS,
        });
    }

    // === 从稳定不变子空间恢复 P ===
    let s11 = z.fixed_view::<4, 4>(0, 0).into_owned();
    let s12 = z.fixed_view::<4, 4>(0, 4).into_owned();
    let s21 = z.fixed_view::<4, 4>(4, 0).into_owned();
    let s22 = z.fixed_view::<4, 4>(4, 4).into_owned();

    let identity = Matrix4::<f64>::identity();

    let mut lhs = SMatrix::<f64, 8, 4>::zeros();
    lhs.fixed_view_mut::<4, 4>(0, 0).copy_from(&s12);
    lhs.fixed_view_mut::<4, 4>(4, 0).copy_from(&(s22 + identity));

    let mut rhs = SMatrix::<f64, 8, 4>::zeros();
    rhs.fixed_view_mut::<4, 4>(0, 0).copy_from(&(-(s11 + identity)));
    rhs.fixed_view_mut::<4, 4>(4, 0).copy_from(&(-s21));

    let p = lhs
        .svd(true, true)
        .solve(&rhs, 1e-14)
        .map_err(|reason| SynthesisError::SubspaceExtraction { reason })?;

    // 对称化（数值误差会引入微小的非对称分量）
    let p = (p + p.transpose()) * 0.5;

    if p.iter().any(|v| !v.is_finite()) {
        return Err(SynthesisError::NonFiniteSolution);
    }

    // === 回代验证 ===
    let residual = (a.transpose() * p + p * a - p * rinv_bbt * p + q).norm();
    if !residual.is_finite() || residual > RESIDUAL_TOL * (1.0 + p.norm()) {
        return Err(SynthesisError::ResidualTooLarge { residual });
    }

    Ok(p)
}
