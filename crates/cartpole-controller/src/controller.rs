//! Controller API 模块
//!
//! 对外的 [`Controller`] 结构体，封装后台线程与状态同步细节。
//! Drop 时执行优雅关闭：清运行标志 → 关闭观测通道 → 限时 join
//! 两条线程。

use crate::config::ControllerConfig;
use crate::context::{ControllerContext, StateEstimate};
use crate::error::ControllerError;
use crate::metrics::MetricsSnapshot;
use crate::recorder::HistorySample;
use cartpole_lqr::LqrGain;
use cartpole_model::JointStateSample;
use crossbeam_channel::Sender;
use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::error;

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        use std::sync::mpsc;

        let (tx, rx) = mpsc::channel();

        // 看门狗线程代为 join，主线程带超时等待结果
        spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // 超时：看门狗线程继续等待，进程退出时由 OS 回收
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Thread join timeout",
                )))
            },
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// 倒立摆平衡控制器（对外 API）
///
/// 持有估计线程与控制线程；增益在构建时综合一次，此后只读。
pub struct Controller {
    /// 观测投递通道
    ///
    /// 需要在 Drop 时**提前关闭通道**（在 join 估计线程之前），
    /// 否则 `estimator_loop` 可能收不到 `Disconnected` 而延迟退出。
    obs_tx: ManuallyDrop<Sender<JointStateSample>>,
    /// 共享状态上下文
    ctx: Arc<ControllerContext>,
    /// 综合出的反馈增益（只读）
    gain: LqrGain,
    /// 生效中的配置副本
    config: ControllerConfig,
    /// 估计线程句柄（Drop 时 join）
    estimator_thread: Option<JoinHandle<()>>,
    /// 控制线程句柄（Drop 时 join）
    control_thread: Option<JoinHandle<()>>,
    /// 运行标志（线程生命周期联动）
    is_running: Arc<AtomicBool>,
}

impl Controller {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        obs_tx: Sender<JointStateSample>,
        ctx: Arc<ControllerContext>,
        gain: LqrGain,
        config: ControllerConfig,
        estimator_thread: JoinHandle<()>,
        control_thread: JoinHandle<()>,
        is_running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            obs_tx: ManuallyDrop::new(obs_tx),
            ctx,
            gain,
            config,
            estimator_thread: Some(estimator_thread),
            control_thread: Some(control_thread),
            is_running,
        }
    }

    /// 投递一条关节观测（非阻塞）
    ///
    /// # Errors
    /// - [`ControllerError::ObservationQueueFull`]: 队列满
    /// - [`ControllerError::ObservationChannelClosed`]: 估计线程已退出
    pub fn send_observation(&self, sample: JointStateSample) -> Result<(), ControllerError> {
        self.obs_tx.try_send(sample).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => ControllerError::ObservationQueueFull,
            crossbeam_channel::TrySendError::Disconnected(_) => {
                ControllerError::ObservationChannelClosed
            },
        })
    }

    /// 获取观测发送端的克隆（供传感线程长期持有）
    pub fn observation_sender(&self) -> Sender<JointStateSample> {
        (*self.obs_tx).clone()
    }

    /// 综合出的反馈增益
    pub fn gain(&self) -> &LqrGain {
        &self.gain
    }

    /// 生效中的配置
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// 最新状态快照副本（无锁）
    pub fn latest_estimate(&self) -> StateEstimate {
        self.ctx.latest()
    }

    /// 当前指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 复制全部控制历史（未启用记录时为空）
    pub fn history(&self) -> Vec<HistorySample> {
        self.ctx.recorder.samples()
    }

    /// 两条后台线程是否都还存活
    pub fn is_healthy(&self) -> bool {
        let estimator_alive =
            self.estimator_thread.as_ref().map(|h| !h.is_finished()).unwrap_or(false);
        let control_alive =
            self.control_thread.as_ref().map(|h| !h.is_finished()).unwrap_or(false);
        estimator_alive && control_alive
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // 清运行标志，通知两条线程退出
        // Release 保证此前的写入对线程可见
        self.is_running.store(false, Ordering::Release);

        // 关闭观测通道（必须在 join 估计线程之前真正 drop 掉 Sender）
        unsafe {
            ManuallyDrop::drop(&mut self.obs_tx);
        }

        let join_timeout = Duration::from_secs(2);

        if let Some(handle) = self.estimator_thread.take()
            && let Err(_e) = handle.join_timeout(join_timeout)
        {
            error!(
                "Estimator thread panicked or failed to shut down within {:?}",
                join_timeout
            );
        }

        if let Some(handle) = self.control_thread.take()
            && let Err(_e) = handle.join_timeout(join_timeout)
        {
            error!(
                "Control thread panicked or failed to shut down within {:?}",
                join_timeout
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControllerBuilder;

    #[test]
    fn test_controller_build_and_drop() {
        let (controller, _force_rx) = ControllerBuilder::new().build_with_channel().unwrap();
        assert!(controller.is_healthy());
        // drop 应在超时内 join 两条线程
        drop(controller);
    }

    #[test]
    fn test_initial_estimate_is_uninitialized() {
        let (controller, _force_rx) = ControllerBuilder::new().build_with_channel().unwrap();
        let estimate = controller.latest_estimate();
        assert!(!estimate.initialized);
        assert_eq!(estimate.seq, 0);
    }

    #[test]
    fn test_send_observation_updates_estimate() {
        let (controller, _force_rx) = ControllerBuilder::new().build_with_channel().unwrap();

        controller
            .send_observation(JointStateSample::cart_pole(0.5, -0.2, 0.1, 0.05))
            .unwrap();

        // 等待估计线程消费（轮询而不是固定 sleep，降低脆弱性）
        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while !controller.latest_estimate().initialized {
            assert!(std::time::Instant::now() < deadline, "estimate never initialized");
            std::thread::sleep(Duration::from_millis(1));
        }

        let estimate = controller.latest_estimate();
        assert_eq!(estimate.x[0], 0.5);
        assert_eq!(estimate.x[2], 0.1);
        assert_eq!(controller.metrics().observations_total, 1);
    }

    #[test]
    fn test_bad_observation_is_recoverable() {
        let (controller, _force_rx) = ControllerBuilder::new().build_with_channel().unwrap();

        // 缺少摆杆关节的观测被丢弃，线程继续运行
        controller
            .send_observation(JointStateSample {
                names: vec!["cart_to_base".to_string()],
                positions: vec![0.5],
                velocities: vec![-0.2],
            })
            .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while controller.metrics().observations_rejected == 0 {
            assert!(std::time::Instant::now() < deadline, "observation never rejected");
            std::thread::sleep(Duration::from_millis(1));
        }

        assert!(!controller.latest_estimate().initialized);
        assert!(controller.is_healthy());
    }
}
