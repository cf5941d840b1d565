//! 倒立摆小车实时平衡控制器
//!
//! 运行时由两条后台线程组成：
//! - 估计线程：消费关节观测，按名称抽取 4 维状态并原子发布快照
//! - 控制线程：固定周期读取最新快照，计算 u = −K·x 并输出控制力
//!
//! 两条线程通过 [`ArcSwap`](arc_swap::ArcSwap) 单写者/单读者状态插槽
//! 解耦：估计线程整体替换快照，控制线程无锁读取，永不阻塞、永不撕裂。
//!
//! # 快速上手
//!
//! ```no_run
//! use cartpole_controller::{ControllerBuilder, ControllerConfig};
//! use cartpole_model::JointStateSample;
//!
//! let (controller, force_rx) = ControllerBuilder::new()
//!     .config(ControllerConfig::default())
//!     .build_with_channel()
//!     .unwrap();
//!
//! // 传感侧投递观测
//! controller
//!     .send_observation(JointStateSample::cart_pole(0.0, 0.0, 0.05, 0.0))
//!     .unwrap();
//!
//! // 执行侧消费控制力
//! if let Ok(force) = force_rx.recv() {
//!     println!("force = {force} N");
//! }
//! // drop(controller) 时两条线程在超时内被 join
//! ```

mod builder;
mod config;
mod context;
mod control;
mod controller;
mod error;
mod estimator;
mod metrics;
mod recorder;
mod sink;

pub use builder::ControllerBuilder;
pub use config::ControllerConfig;
pub use context::{ControllerContext, StateEstimate};
pub use controller::Controller;
pub use error::{ControllerError, DataError, SinkError};
pub use estimator::extract_state;
pub use metrics::{ControllerMetrics, MetricsSnapshot};
pub use recorder::{HistorySample, Recorder};
pub use sink::{ChannelForceSink, ForceSink};
