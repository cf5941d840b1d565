//! 增益综合错误类型定义

use thiserror::Error;

/// 增益综合错误类型
///
/// 所有变体都属于致命初始化错误：出现任何一种都意味着不存在
/// 可用的镇定增益，控制循环不得启动。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// 符号函数迭代在限定次数内未收敛
    #[error("Riccati sign-function iteration did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// 迭代过程中矩阵奇异或出现非有限值
    #[error("Riccati iteration produced a singular or non-finite matrix at iteration {iteration}")]
    SingularIteration { iteration: usize },

    /// 从稳定不变子空间恢复 P 的最小二乘求解失败
    #[error("Failed to recover the Riccati solution from the stable subspace: {reason}")]
    SubspaceExtraction { reason: &'static str },

    /// Riccati 解包含非有限元素
    #[error("Riccati solution contains non-finite entries")]
    NonFiniteSolution,

    /// 回代验证失败：候选解不满足 Riccati 方程
    ///
    /// 不可镇定系统的典型表现：堆叠方程组秩亏，最小二乘给出的
    /// 最小范数解不是方程的解。
    #[error("Riccati solution failed residual verification (residual norm: {residual})")]
    ResidualTooLarge { residual: f64 },

    /// 闭环矩阵 A − BK 不是 Hurwitz 矩阵（存在实部 ≥ 0 的特征值）
    ///
    /// 这是综合结果的正确性契约，不是可选检查。
    #[error("Closed-loop matrix A - BK is not Hurwitz (max eigenvalue real part: {max_real_part})")]
    UnstableClosedLoop { max_real_part: f64 },
}
