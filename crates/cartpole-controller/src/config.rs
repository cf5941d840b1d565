//! 控制器配置
//!
//! 所有字段均为启动期常量，`validate()` 在构建阶段一次性校验，
//! 线程启动后不再变更。

use crate::ControllerError;
use cartpole_model::{CostWeights, ModelError, PhysicalParameters};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 控制器配置
///
/// 物理参数、代价权重加上运行时参数（周期、队列容量、日志节流）。
/// 支持通过 serde 从 TOML/JSON 反序列化，缺省字段取 [`Default`] 值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// 小车质量（kg）
    pub cart_mass: f64,
    /// 摆杆质量（kg）
    pub pole_mass: f64,
    /// 摆杆长度（m）
    pub pole_length: f64,
    /// 重力加速度（m/s²）
    pub gravity: f64,

    /// Q 矩阵对角元素 [位置, 速度, 摆角, 摆角速度]
    pub q_diag: [f64; 4],
    /// 控制代价 R（标量）
    pub r: f64,

    /// 控制周期（ms）
    pub control_period_ms: u64,
    /// 诊断日志的力跳变阈值（N）：本周期与上周期控制力之差超过
    /// 该值时立即输出一条状态日志
    pub force_jump_threshold: f64,
    /// 周期性状态日志的节拍间隔（每 N 个控制周期输出一条）
    pub status_log_interval: u64,

    /// 观测队列容量（有界，非阻塞投递）
    pub observation_queue_capacity: usize,
    /// 控制力输出队列容量（使用内置通道输出时生效）
    pub force_queue_capacity: usize,

    /// 是否启用历史记录（时间、位置、速度、摆角、控制力）
    pub record_history: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cart_mass: 1.0,
            pole_mass: 1.0,
            pole_length: 1.0,
            gravity: 9.81,
            q_diag: [5.0, 5.0, 200.0, 20.0],
            r: 0.1,
            control_period_ms: 10,
            force_jump_threshold: 0.1,
            status_log_interval: 100,
            observation_queue_capacity: 64,
            force_queue_capacity: 64,
            record_history: false,
        }
    }
}

impl ControllerConfig {
    /// 校验全部配置字段
    ///
    /// # Errors
    /// 任一字段非法时返回 [`ControllerError::InvalidConfig`] 或
    /// 对应的模型校验错误。
    pub fn validate(&self) -> Result<(), ControllerError> {
        // 物理参数与权重交给模型层校验
        self.physical_parameters()?;
        self.cost_weights()?;

        if self.control_period_ms == 0 {
            return Err(ControllerError::InvalidConfig {
                field: "control_period_ms",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.force_jump_threshold.is_finite() && self.force_jump_threshold >= 0.0) {
            return Err(ControllerError::InvalidConfig {
                field: "force_jump_threshold",
                reason: format!("must be finite and non-negative, got {}", self.force_jump_threshold),
            });
        }
        if self.status_log_interval == 0 {
            return Err(ControllerError::InvalidConfig {
                field: "status_log_interval",
                reason: "must be positive".to_string(),
            });
        }
        if self.observation_queue_capacity == 0 {
            return Err(ControllerError::InvalidConfig {
                field: "observation_queue_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.force_queue_capacity == 0 {
            return Err(ControllerError::InvalidConfig {
                field: "force_queue_capacity",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// 构造并校验物理参数
    pub fn physical_parameters(&self) -> Result<PhysicalParameters, ModelError> {
        PhysicalParameters::new(self.cart_mass, self.pole_mass, self.pole_length, self.gravity)
    }

    /// 构造并校验代价权重
    pub fn cost_weights(&self) -> Result<CostWeights, ModelError> {
        CostWeights::new(self.q_diag, self.r)
    }

    /// 控制周期
    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control_period(), Duration::from_millis(10));
        assert_eq!(config.q_diag, [5.0, 5.0, 200.0, 20.0]);
        assert_eq!(config.r, 0.1);
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = ControllerConfig { control_period_ms: 0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ControllerError::InvalidConfig { field: "control_period_ms", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_physics() {
        let config = ControllerConfig { cart_mass: -1.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ControllerError::Model(_))));

        let config = ControllerConfig { r: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ControllerError::Model(_))));
    }

    #[test]
    fn test_validate_rejects_bad_runtime_fields() {
        let config = ControllerConfig {
            force_jump_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ControllerConfig { status_log_interval: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = ControllerConfig {
            observation_queue_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        // 缺省字段取默认值
        let config: ControllerConfig =
            serde_json::from_str(r#"{ "r": 0.5, "control_period_ms": 20 }"#).unwrap();
        assert_eq!(config.r, 0.5);
        assert_eq!(config.control_period_ms, 20);
        assert_eq!(config.cart_mass, 1.0);
        assert_eq!(config.q_diag, [5.0, 5.0, 200.0, 20.0]);
    }
}
