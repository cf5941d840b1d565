//! 模型层错误类型定义

use thiserror::Error;

/// 模型层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// 物理参数必须严格为正
    #[error("Physical parameter '{name}' must be strictly positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    /// 状态代价权重必须非负
    #[error("State cost weight q[{index}] must be non-negative, got {value}")]
    NegativeStateWeight { index: usize, value: f64 },

    /// 控制代价权重必须严格为正（R⁻¹ 才存在）
    #[error("Control cost weight must be strictly positive, got {value}")]
    NonPositiveControlWeight { value: f64 },
}

#[cfg(test)]
mod tests {
    use super::ModelError;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::NonPositiveParameter {
            name: "cart_mass",
            value: -1.0,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("cart_mass") && msg.contains("-1"));

        let err = ModelError::NegativeStateWeight {
            index: 2,
            value: -0.5,
        };
        assert!(format!("{}", err).contains("q[2]"));

        let err = ModelError::NonPositiveControlWeight { value: 0.0 };
        assert!(format!("{}", err).contains("strictly positive"));
    }
}
