//! 错误类型定义
//!
//! 分为三类：
//! - [`ControllerError`]：致命初始化错误与输入通道错误，构建阶段出现
//!   任何一种都必须拒绝启动
//! - [`DataError`]：单条观测的可恢复错误，丢弃该条观测并保留上一次
//!   有效状态，不终止任何线程
//! - [`SinkError`]：控制力输出失败，由输出端实现上报

use cartpole_lqr::SynthesisError;
use cartpole_model::ModelError;
use thiserror::Error;

/// 控制器错误类型
#[derive(Error, Debug)]
pub enum ControllerError {
    /// 配置字段校验失败（致命）
    #[error("Invalid configuration field '{field}': {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// 物理参数或代价权重非法（致命）
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// 增益综合失败（致命）
    #[error("Gain synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// 观测队列已满（非阻塞投递，调用方可丢弃或重试）
    #[error("Observation queue is full")]
    ObservationQueueFull,

    /// 观测通道已关闭（估计线程已退出）
    #[error("Observation channel is closed")]
    ObservationChannelClosed,
}

/// 单条观测的可恢复错误
///
/// 出现时丢弃该条观测并记录警告，状态插槽保持上一次有效快照。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// 观测中缺少所需关节
    #[error("Joint '{joint}' not found in observation")]
    MissingJoint { joint: &'static str },

    /// 关节存在但对应的数据数组长度不足
    #[error("Observation is missing {field} data for joint '{joint}'")]
    IncompleteSample {
        joint: &'static str,
        field: &'static str,
    },
}

/// 控制力输出错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// 输出队列已满（本周期的控制力被丢弃）
    #[error("Force sink is full")]
    Full,

    /// 输出端已断开（执行侧消失，控制循环应退出）
    #[error("Force sink is disconnected")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_error_display() {
        let err = ControllerError::InvalidConfig {
            field: "control_period_ms",
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration field 'control_period_ms': must be positive"
        );

        assert_eq!(
            ControllerError::ObservationQueueFull.to_string(),
            "Observation queue is full"
        );
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::MissingJoint { joint: "pole_joint" };
        assert_eq!(
            err.to_string(),
            "Joint 'pole_joint' not found in observation"
        );

        let err = DataError::IncompleteSample {
            joint: "cart_to_base",
            field: "velocity",
        };
        assert_eq!(
            err.to_string(),
            "Observation is missing velocity data for joint 'cart_to_base'"
        );
    }

    #[test]
    fn test_error_conversion_from_model() {
        let model_err = ModelError::NonPositiveParameter {
            name: "cart_mass",
            value: 0.0,
        };
        let err: ControllerError = model_err.into();
        assert!(matches!(err, ControllerError::Model(_)));
    }

    #[test]
    fn test_error_conversion_from_synthesis() {
        let err: ControllerError = SynthesisError::NonFiniteSolution.into();
        assert!(matches!(err, ControllerError::Synthesis(_)));
    }
}
