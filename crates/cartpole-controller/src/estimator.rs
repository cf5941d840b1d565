//! 状态估计线程
//!
//! 消费观测队列中的 [`JointStateSample`]，按名称抽取
//! [小车位置, 小车速度, 摆角, 摆角速度]，整体替换共享快照。
//! 单条观测的数据错误是可恢复的：丢弃该条、记录警告并保留
//! 上一次有效快照，线程继续运行。

use crate::context::ControllerContext;
use crate::error::DataError;
use cartpole_model::{CART_JOINT, JointStateSample, POLE_JOINT, StateVector};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, trace, warn};

/// 观测队列空闲时的轮询超时（用于周期性检查运行标志）
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// 从一条观测中抽取 4 维状态向量
///
/// 关节按名称查找，与观测中的顺序无关。
///
/// # Errors
/// - [`DataError::MissingJoint`]: 缺少小车或摆杆关节
/// - [`DataError::IncompleteSample`]: 关节存在但位置/速度数组长度不足
pub fn extract_state(sample: &JointStateSample) -> Result<StateVector, DataError> {
    let cart = joint_values(sample, CART_JOINT)?;
    let pole = joint_values(sample, POLE_JOINT)?;
    Ok(StateVector::new(cart.0, cart.1, pole.0, pole.1))
}

/// 按名称取出某个关节的 (位置, 速度)
fn joint_values(sample: &JointStateSample, joint: &'static str) -> Result<(f64, f64), DataError> {
    let index = sample
        .index_of(joint)
        .ok_or(DataError::MissingJoint { joint })?;

    let position = *sample
        .positions
        .get(index)
        .ok_or(DataError::IncompleteSample { joint, field: "position" })?;
    let velocity = *sample
        .velocities
        .get(index)
        .ok_or(DataError::IncompleteSample { joint, field: "velocity" })?;

    Ok((position, velocity))
}

/// 估计线程主循环
///
/// 退出条件：运行标志清零，或观测通道全部发送端被 drop。
pub(crate) fn estimator_loop(
    rx: Receiver<JointStateSample>,
    ctx: Arc<ControllerContext>,
    is_running: Arc<AtomicBool>,
) {
    info!("Estimator thread started");

    while is_running.load(Ordering::Acquire) {
        let sample = match rx.recv_timeout(RECV_TIMEOUT) {
            Ok(sample) => sample,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Observation channel closed, estimator thread exiting");
                break;
            },
        };

        match extract_state(&sample) {
            Ok(x) => {
                let first = !ctx.estimate.load().initialized;
                ctx.publish(x);
                ctx.metrics.observations_total.fetch_add(1, Ordering::Relaxed);

                if first {
                    info!(
                        cart_position = x[0],
                        cart_velocity = x[1],
                        pole_angle = x[2],
                        pole_velocity = x[3],
                        "Initial state received"
                    );
                } else {
                    trace!(seq = ctx.estimate.load().seq, "State estimate updated");
                }
            },
            Err(e) => {
                // 可恢复：丢弃该条观测，保留上一次有效快照
                ctx.metrics.observations_rejected.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping observation: {}", e);
            },
        }
    }

    info!("Estimator thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_state_ordered() {
        let sample = JointStateSample::cart_pole(0.5, -0.2, 0.1, 0.05);
        let x = extract_state(&sample).unwrap();
        assert_eq!(x, StateVector::new(0.5, -0.2, 0.1, 0.05));
    }

    #[test]
    fn test_extract_state_reordered_joints() {
        // 传输层不保证关节顺序
        let sample = JointStateSample {
            names: vec![POLE_JOINT.to_string(), CART_JOINT.to_string()],
            positions: vec![0.1, 0.5],
            velocities: vec![0.05, -0.2],
        };
        let x = extract_state(&sample).unwrap();
        assert_eq!(x, StateVector::new(0.5, -0.2, 0.1, 0.05));
    }

    #[test]
    fn test_extract_state_missing_joint() {
        let sample = JointStateSample {
            names: vec![CART_JOINT.to_string()],
            positions: vec![0.5],
            velocities: vec![-0.2],
        };
        assert_eq!(
            extract_state(&sample),
            Err(DataError::MissingJoint { joint: POLE_JOINT })
        );
    }

    #[test]
    fn test_extract_state_truncated_arrays() {
        // 关节名存在但速度数组缺最后一项
        let sample = JointStateSample {
            names: vec![CART_JOINT.to_string(), POLE_JOINT.to_string()],
            positions: vec![0.5, 0.1],
            velocities: vec![-0.2],
        };
        assert_eq!(
            extract_state(&sample),
            Err(DataError::IncompleteSample { joint: POLE_JOINT, field: "velocity" })
        );
    }

    #[test]
    fn test_extract_state_ignores_extra_joints() {
        let sample = JointStateSample {
            names: vec![
                "wheel_joint".to_string(),
                CART_JOINT.to_string(),
                POLE_JOINT.to_string(),
            ],
            positions: vec![9.9, 0.5, 0.1],
            velocities: vec![9.9, -0.2, 0.05],
        };
        let x = extract_state(&sample).unwrap();
        assert_eq!(x, StateVector::new(0.5, -0.2, 0.1, 0.05));
    }
}
