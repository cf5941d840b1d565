//! 线性化对象仿真器
//!
//! 对 ẋ = A·x + B·u 做定步长 RK4 积分，按传感周期把状态封装成
//! 关节观测投递给控制器，并消费控制器输出的最新力作为下一段
//! 积分的输入（零阶保持）。

use anyhow::Result;
use cartpole_controller::Controller;
use cartpole_model::{JointStateSample, StateVector, SystemMatrices};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// 仿真参数
pub struct SimOptions {
    /// 仿真时长（s）
    pub duration: f64,
    /// 初始摆角（rad）
    pub initial_angle: f64,
    /// 传感器采样频率（Hz）
    pub sensor_rate: f64,
}

/// 仿真结果
pub struct SimOutcome {
    /// 实际仿真时长（s）
    pub elapsed_s: f64,
    /// 终止时刻的状态
    pub final_state: StateVector,
}

/// 运行闭环仿真直到时长耗尽或收到停止信号
pub fn run(
    system: &SystemMatrices,
    controller: &Controller,
    force_rx: &Receiver<f64>,
    options: SimOptions,
    stop: &Arc<AtomicBool>,
) -> Result<SimOutcome> {
    let a = *system.a();
    let b = *system.b();
    let dt = 1.0 / options.sensor_rate;
    let sensor_period = Duration::from_secs_f64(dt);

    let mut x = StateVector::new(0.0, 0.0, options.initial_angle, 0.0);
    let mut force = 0.0;
    let start = Instant::now();
    let mut next_tick = start + sensor_period;

    while start.elapsed().as_secs_f64() < options.duration && !stop.load(Ordering::Acquire) {
        // 消费队列中积压的力，只保留最新值（零阶保持）
        while let Ok(f) = force_rx.try_recv() {
            force = f;
        }

        x = rk4_step(&a, &b, &x, force, dt);

        let sample = JointStateSample::cart_pole(x[0], x[1], x[2], x[3]);
        if controller.send_observation(sample).is_err() {
            warn!("Failed to deliver observation, controller may be shutting down");
            break;
        }

        let now = Instant::now();
        if now < next_tick {
            spin_sleep::sleep(next_tick - now);
        }
        next_tick += sensor_period;
    }

    Ok(SimOutcome {
        elapsed_s: start.elapsed().as_secs_f64(),
        final_state: x,
    })
}

/// 单步 RK4 积分
fn rk4_step(
    a: &nalgebra::Matrix4<f64>,
    b: &StateVector,
    x: &StateVector,
    force: f64,
    dt: f64,
) -> StateVector {
    let deriv = |x: &StateVector| a * x + b * force;
    let k1 = deriv(x);
    let k2 = deriv(&(x + k1 * (dt / 2.0)));
    let k3 = deriv(&(x + k2 * (dt / 2.0)));
    let k4 = deriv(&(x + k3 * dt));
    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}
