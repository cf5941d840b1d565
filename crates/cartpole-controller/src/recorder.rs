//! 历史记录器
//!
//! 控制线程每个完整周期追加一条样本（禁用时为空操作）。
//! 样本量按周期线性增长，长时运行请自行评估内存占用或关闭记录。

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// 一条控制历史样本
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// 自控制器启动以来的时间（s）
    pub elapsed_s: f64,
    /// 小车位置（m）
    pub cart_position: f64,
    /// 小车速度（m/s）
    pub cart_velocity: f64,
    /// 摆角（rad）
    pub pole_angle: f64,
    /// 本周期输出的控制力（N）
    pub force: f64,
}

/// 历史记录器
///
/// 写入只发生在控制线程，读取发生在对外 API；用 [`Mutex`] 保护
/// 即可，不在无锁热路径上。
pub struct Recorder {
    enabled: bool,
    start: Instant,
    samples: Mutex<Vec<HistorySample>>,
}

impl Recorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start: Instant::now(),
            samples: Mutex::new(Vec::new()),
        }
    }

    /// 是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 追加一条样本（禁用时为空操作）
    pub fn append(&self, cart_position: f64, cart_velocity: f64, pole_angle: f64, force: f64) {
        if !self.enabled {
            return;
        }
        let sample = HistorySample {
            elapsed_s: self.start.elapsed().as_secs_f64(),
            cart_position,
            cart_velocity,
            pole_angle,
            force,
        };
        self.samples.lock().push(sample);
    }

    /// 当前样本数
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// 复制全部历史样本
    pub fn samples(&self) -> Vec<HistorySample> {
        self.samples.lock().clone()
    }
}
