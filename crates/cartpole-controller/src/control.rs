//! 实时控制线程
//!
//! 固定周期读取最新状态快照，计算 u = −K·x 并输出。定时采用
//! 绝对锚点：每个周期在上一个锚点上加周期得到下一个唤醒时刻，
//! 避免相对休眠的漂移累积。单周期超限时告警并重置锚点（跳过
//! 落后的节拍，不追赶补发）。

use crate::config::ControllerConfig;
use crate::context::ControllerContext;
use crate::error::SinkError;
use crate::sink::ForceSink;
use cartpole_lqr::LqrGain;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

/// 连续非有限控制力升级为 error 日志的阈值
///
/// 偶发的非有限值跳过当周期即可；连续出现说明状态源或增益
/// 本身已经异常。
const NONFINITE_ESCALATION_THRESHOLD: u32 = 10;

/// 控制线程主循环
///
/// 退出条件：运行标志清零，或输出端断开。
pub(crate) fn control_loop(
    gain: LqrGain,
    ctx: Arc<ControllerContext>,
    sink: Box<dyn ForceSink>,
    config: ControllerConfig,
    is_running: Arc<AtomicBool>,
) {
    #[cfg(feature = "realtime")]
    {
        use thread_priority::{ThreadPriority, set_current_thread_priority};
        if let Err(e) = set_current_thread_priority(ThreadPriority::Max) {
            warn!("Failed to raise control thread priority: {:?}", e);
        }
    }

    let period = config.control_period();
    info!(period_ms = config.control_period_ms, "Control thread started");

    let mut next_tick = Instant::now() + period;
    let mut tick_count: u64 = 0;
    let mut skipped_count: u64 = 0;
    let mut previous_force: f64 = 0.0;
    let mut consecutive_nonfinite: u32 = 0;

    while is_running.load(Ordering::Acquire) {
        let estimate = ctx.estimate.load();

        if !estimate.initialized {
            // 尚未收到首条观测：不输出任何控制力
            if skipped_count.is_multiple_of(config.status_log_interval) {
                warn!("State not initialized yet, skipping control tick");
            }
            skipped_count += 1;
            ctx.metrics.ticks_skipped.fetch_add(1, Ordering::Relaxed);
        } else {
            let x = estimate.x;
            let force = gain.force(&x);

            if !force.is_finite() {
                // 可恢复：跳过本周期的输出，不更新 previous_force
                consecutive_nonfinite += 1;
                ctx.metrics.nonfinite_forces.fetch_add(1, Ordering::Relaxed);
                if consecutive_nonfinite >= NONFINITE_ESCALATION_THRESHOLD {
                    error!(
                        consecutive = consecutive_nonfinite,
                        "Control force is persistently non-finite, state source may be corrupted"
                    );
                } else {
                    warn!(force, "Non-finite control force, skipping tick");
                }
            } else {
                consecutive_nonfinite = 0;

                // 诊断日志：力跳变超阈值立即输出，否则按节拍间隔输出
                let jump = (force - previous_force).abs();
                if jump > config.force_jump_threshold
                    || tick_count.is_multiple_of(config.status_log_interval)
                {
                    info!(
                        force,
                        cart_position = x[0],
                        cart_velocity = x[1],
                        pole_angle = x[2],
                        pole_velocity = x[3],
                        "Control status"
                    );
                }

                match sink.emit(force) {
                    Ok(()) => {
                        ctx.metrics.forces_emitted.fetch_add(1, Ordering::Relaxed);
                    },
                    Err(SinkError::Full) => {
                        ctx.metrics.force_drops.fetch_add(1, Ordering::Relaxed);
                        warn!(force, "Force sink full, dropping command");
                    },
                    Err(SinkError::Disconnected) => {
                        info!("Force sink disconnected, control thread exiting");
                        break;
                    },
                }

                ctx.recorder.append(x[0], x[1], x[2], force);
                previous_force = force;
                tick_count = tick_count.wrapping_add(1);
                ctx.metrics.ticks_total.fetch_add(1, Ordering::Relaxed);
            }
        }

        // === 绝对锚点定时 ===
        let now = Instant::now();
        if now >= next_tick {
            // 超限：重置锚点，跳过落后的节拍
            ctx.metrics.overruns.fetch_add(1, Ordering::Relaxed);
            warn!(
                late_us = (now - next_tick).as_micros() as u64,
                "Control tick overrun, resetting schedule"
            );
            next_tick = now + period;
        } else {
            spin_sleep::sleep(next_tick - now);
            next_tick += period;
        }
    }

    info!("Control thread stopped");
}
