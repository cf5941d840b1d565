//! 性能指标（原子计数器）
//!
//! 所有计数器使用 `Relaxed` 序：指标只用于监控，不承担同步职责。

use std::sync::atomic::{AtomicU64, Ordering};

/// 控制器运行指标
#[derive(Debug, Default)]
pub struct ControllerMetrics {
    /// 成功处理的观测条数
    pub observations_total: AtomicU64,
    /// 因数据错误被丢弃的观测条数
    pub observations_rejected: AtomicU64,
    /// 完整执行的控制周期数
    pub ticks_total: AtomicU64,
    /// 因状态未初始化而跳过的周期数
    pub ticks_skipped: AtomicU64,
    /// 周期超限次数（本周期工作耗时超过控制周期）
    pub overruns: AtomicU64,
    /// 成功输出的控制力条数
    pub forces_emitted: AtomicU64,
    /// 因输出队列满被丢弃的控制力条数
    pub force_drops: AtomicU64,
    /// 计算出非有限控制力的次数
    pub nonfinite_forces: AtomicU64,
}

/// 指标快照（普通整数，便于日志和断言）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub observations_total: u64,
    pub observations_rejected: u64,
    pub ticks_total: u64,
    pub ticks_skipped: u64,
    pub overruns: u64,
    pub forces_emitted: u64,
    pub force_drops: u64,
    pub nonfinite_forces: u64,
}

impl ControllerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前所有计数器的快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            observations_total: self.observations_total.load(Ordering::Relaxed),
            observations_rejected: self.observations_rejected.load(Ordering::Relaxed),
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            forces_emitted: self.forces_emitted.load(Ordering::Relaxed),
            force_drops: self.force_drops.load(Ordering::Relaxed),
            nonfinite_forces: self.nonfinite_forces.load(Ordering::Relaxed),
        }
    }
}
