//! 控制力输出端
//!
//! 控制线程每个周期产出一个标量力，通过 [`ForceSink`] 抽象投递给
//! 执行侧。内置 [`ChannelForceSink`] 用有界通道非阻塞投递；测试和
//! 仿真可以提供自定义实现。

use crate::SinkError;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// 控制力输出抽象
///
/// 实现必须是非阻塞的：控制线程处于实时路径上，任何阻塞都会
/// 直接转化为周期超限。
pub trait ForceSink: Send {
    /// 投递一个控制力（N）
    ///
    /// # Errors
    /// - [`SinkError::Full`]: 输出队列满，本周期的力被丢弃
    /// - [`SinkError::Disconnected`]: 执行侧消失，控制循环应退出
    fn emit(&self, force: f64) -> Result<(), SinkError>;
}

/// 基于有界通道的输出端
pub struct ChannelForceSink {
    tx: Sender<f64>,
}

impl ChannelForceSink {
    /// 创建输出端及其接收端
    pub fn new(capacity: usize) -> (Self, Receiver<f64>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl ForceSink for ChannelForceSink {
    fn emit(&self, force: f64) -> Result<(), SinkError> {
        self.tx.try_send(force).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_emits() {
        let (sink, rx) = ChannelForceSink::new(4);
        sink.emit(1.25).unwrap();
        sink.emit(-0.5).unwrap();
        assert_eq!(rx.recv().unwrap(), 1.25);
        assert_eq!(rx.recv().unwrap(), -0.5);
    }

    #[test]
    fn test_channel_sink_full() {
        let (sink, _rx) = ChannelForceSink::new(1);
        sink.emit(1.0).unwrap();
        assert_eq!(sink.emit(2.0), Err(SinkError::Full));
    }

    #[test]
    fn test_channel_sink_disconnected() {
        let (sink, rx) = ChannelForceSink::new(1);
        drop(rx);
        assert_eq!(sink.emit(1.0), Err(SinkError::Disconnected));
    }
}
