//! Engine → writer callbacks
//!
//! 引擎 → 写入器回调
//!
//! The engine drives the writer through this capability set. It is object safe
//! so an engine can hold `&mut dyn Platform` without knowing the backing type.
//!
//! 引擎通过这组能力驱动写入器。该 trait 是对象安全的，
//! 引擎可以持有 `&mut dyn Platform` 而无需了解存储后端类型。

use super::clock::ClockSource;
use super::engine::TraceEngine;
use super::mapped_file::PacketBacking;
use super::writer::PacketWriter;

/// The four callbacks a trace engine issues
///
/// 追踪引擎发出的四个回调
pub trait Platform {
    /// Current time in 100 ns ticks
    ///
    /// 当前时间（100 纳秒刻度）
    fn clock_value(&mut self) -> u64;

    /// Whether there is no room for the next packet
    ///
    /// 是否没有空间容纳下一个数据包
    ///
    /// Only issued between packets. Returning `false` means the next packet is
    /// already reserved and mapped.
    ///
    /// 仅在数据包之间调用。返回 `false` 表示下一个数据包已被预留并映射。
    fn is_backend_full(&mut self) -> bool;

    /// Register the reserved packet with `engine` and open it
    ///
    /// 将预留的数据包注册给 `engine` 并打开
    fn open_packet(&mut self, engine: &mut dyn TraceEngine);

    /// Close the open packet and release its mapping
    ///
    /// 关闭当前数据包并释放其映射
    ///
    /// Flush failures are logged, never reported to the engine.
    ///
    /// 刷新失败只记录日志，不会报告给引擎。
    fn close_packet(&mut self, engine: &mut dyn TraceEngine);
}

impl<B: PacketBacking, C: ClockSource> Platform for PacketWriter<B, C> {
    #[inline]
    fn clock_value(&mut self) -> u64 {
        PacketWriter::clock_value(self)
    }

    fn is_backend_full(&mut self) -> bool {
        // Mid-stream failures are backpressure for the engine, not errors
        // 流中途的失败对引擎而言是背压信号，而不是错误
        match self.try_reserve_next() {
            Ok(()) => false,
            Err(err) => {
                log::warn!("backend full at {} bytes: {}", self.file_len(), err);
                true
            }
        }
    }

    #[inline]
    fn open_packet(&mut self, engine: &mut dyn TraceEngine) {
        PacketWriter::open_packet(self, engine)
    }

    fn close_packet(&mut self, engine: &mut dyn TraceEngine) {
        let offset = self.current_offset().unwrap_or_default();
        // The packet is closed either way; a failed flush only leaves write-back to the OS
        // 无论如何数据包都已关闭；刷新失败只意味着交由操作系统回写
        if let Err(err) = PacketWriter::close_packet(self, engine) {
            log::warn!("failed to flush packet at offset {}: {}", offset, err);
        }
    }
}
