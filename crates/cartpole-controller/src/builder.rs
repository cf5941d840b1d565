//! Builder 模式实现
//!
//! 链式构造 [`Controller`]：校验配置 → 离线综合增益 → 启动估计
//! 线程与控制线程。任何一步失败都不会留下半启动的线程。

use crate::config::ControllerConfig;
use crate::context::ControllerContext;
use crate::control::control_loop;
use crate::controller::Controller;
use crate::error::ControllerError;
use crate::estimator::estimator_loop;
use crate::sink::{ChannelForceSink, ForceSink};
use cartpole_lqr::LqrGain;
use cartpole_model::SystemMatrices;
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::spawn;
use tracing::info;

/// Controller Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use cartpole_controller::{ControllerBuilder, ControllerConfig};
///
/// let (controller, force_rx) = ControllerBuilder::new()
///     .config(ControllerConfig { record_history: true, ..Default::default() })
///     .build_with_channel()
///     .unwrap();
/// ```
pub struct ControllerBuilder {
    config: ControllerConfig,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self { config: ControllerConfig::default() }
    }

    /// 设置配置（可选，默认 [`ControllerConfig::default`]）
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// 使用自定义输出端构建
    ///
    /// 流程：校验配置 → 线性化模型 → 求解 Riccati 方程并校验闭环
    /// 稳定性 → 启动估计/控制线程。
    ///
    /// # Errors
    /// - [`ControllerError::InvalidConfig`] / [`ControllerError::Model`]:
    ///   配置或物理参数非法
    /// - [`ControllerError::Synthesis`]: 增益综合失败（含闭环不稳定）
    pub fn build_with_sink(
        self,
        sink: impl ForceSink + 'static,
    ) -> Result<Controller, ControllerError> {
        let config = self.config;
        config.validate()?;

        // === 离线阶段：模型线性化 + 增益综合 ===
        let params = config.physical_parameters()?;
        let weights = config.cost_weights()?;
        let system = SystemMatrices::from_parameters(&params);
        let gain = LqrGain::synthesize(&system, &weights)?;

        info!(
            k = ?gain.k().as_slice(),
            period_ms = config.control_period_ms,
            "LQR gain synthesized, starting controller threads"
        );

        // === 在线阶段：启动两条后台线程 ===
        let (obs_tx, obs_rx) = bounded(config.observation_queue_capacity);
        let ctx = Arc::new(ControllerContext::new(config.record_history));
        let is_running = Arc::new(AtomicBool::new(true));

        let estimator_ctx = ctx.clone();
        let estimator_running = is_running.clone();
        let estimator_thread = spawn(move || {
            estimator_loop(obs_rx, estimator_ctx, estimator_running);
        });

        let control_ctx = ctx.clone();
        let control_running = is_running.clone();
        let control_gain = gain.clone();
        let control_config = config.clone();
        let boxed_sink: Box<dyn ForceSink> = Box::new(sink);
        let control_thread = spawn(move || {
            control_loop(
                control_gain,
                control_ctx,
                boxed_sink,
                control_config,
                control_running,
            );
        });

        Ok(Controller::new(
            obs_tx,
            ctx,
            gain,
            config,
            estimator_thread,
            control_thread,
            is_running,
        ))
    }

    /// 使用内置有界通道作为输出端构建
    ///
    /// 返回控制器和控制力接收端，通道容量取
    /// `config.force_queue_capacity`。
    pub fn build_with_channel(self) -> Result<(Controller, Receiver<f64>), ControllerError> {
        let (sink, rx) = ChannelForceSink::new(self.config.force_queue_capacity);
        let controller = self.build_with_sink(sink)?;
        Ok((controller, rx))
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
