//! 共享状态上下文
//!
//! 估计线程与控制线程之间的唯一共享点。状态快照放在
//! [`ArcSwap`] 插槽中：写者整体替换 `Arc`，读者无锁加载，
//! 绝不对字段做原地修改，因此不存在半更新的撕裂快照。

use crate::metrics::ControllerMetrics;
use crate::recorder::Recorder;
use arc_swap::ArcSwap;
use cartpole_model::StateVector;
use std::sync::Arc;

/// 状态估计快照
///
/// 单写者（估计线程）/单读者（控制线程）。`seq` 单调递增，
/// 用于测试和诊断时区分"同一快照"与"数值恰好相同的新快照"。
#[derive(Debug, Clone, PartialEq)]
pub struct StateEstimate {
    /// 状态向量 [小车位置, 小车速度, 摆角, 摆角速度]
    pub x: StateVector,
    /// 是否已收到过至少一条有效观测
    ///
    /// 为 `false` 时控制循环不得输出控制力（全零初始状态不是
    /// 有效的平衡点附近状态）。
    pub initialized: bool,
    /// 快照序号（每次发布递增）
    pub seq: u64,
}

impl Default for StateEstimate {
    fn default() -> Self {
        Self { x: StateVector::zeros(), initialized: false, seq: 0 }
    }
}

/// 控制器共享上下文
///
/// 由两条后台线程和对外 API 共同持有（`Arc<ControllerContext>`）。
pub struct ControllerContext {
    /// 最新状态快照（无锁读取）
    pub estimate: ArcSwap<StateEstimate>,
    /// 原子计数器指标
    pub metrics: ControllerMetrics,
    /// 历史记录器（可禁用）
    pub recorder: Recorder,
}

impl ControllerContext {
    /// 创建上下文，初始快照为未初始化的全零状态
    pub fn new(record_history: bool) -> Self {
        Self {
            estimate: ArcSwap::from_pointee(StateEstimate::default()),
            metrics: ControllerMetrics::new(),
            recorder: Recorder::new(record_history),
        }
    }

    /// 读取最新快照副本（无锁）
    pub fn latest(&self) -> StateEstimate {
        self.estimate.load().as_ref().clone()
    }

    /// 发布新的状态快照（整体替换，仅估计线程调用）
    pub fn publish(&self, x: StateVector) {
        let seq = self.estimate.load().seq + 1;
        self.estimate.store(Arc::new(StateEstimate { x, initialized: true, seq }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_initial_estimate_not_initialized() {
        let ctx = ControllerContext::new(false);
        let estimate = ctx.latest();
        assert!(!estimate.initialized);
        assert_eq!(estimate.seq, 0);
        assert_eq!(estimate.x, Vector4::zeros());
    }

    #[test]
    fn test_publish_replaces_whole_snapshot() {
        let ctx = ControllerContext::new(false);

        ctx.publish(Vector4::new(0.1, 0.2, 0.3, 0.4));
        let first = ctx.latest();
        assert!(first.initialized);
        assert_eq!(first.seq, 1);
        assert_eq!(first.x, Vector4::new(0.1, 0.2, 0.3, 0.4));

        ctx.publish(Vector4::new(0.5, 0.6, 0.7, 0.8));
        let second = ctx.latest();
        assert_eq!(second.seq, 2);
        assert_eq!(second.x, Vector4::new(0.5, 0.6, 0.7, 0.8));

        // 旧副本不受新发布影响（快照语义）
        assert_eq!(first.x, Vector4::new(0.1, 0.2, 0.3, 0.4));
    }
}
