//! Engine and writer bound together for one trace stream
//!
//! 为单个追踪流绑定在一起的引擎与写入器

use super::clock::{ClockSource, SystemClock};
use super::config::WriterConfig;
use super::engine::TraceEngine;
use super::error::Result;
use super::mapped_file::{MappedFile, PacketBacking};
use super::platform::Platform;
use super::writer::{PacketState, PacketWriter, WriterStats};

/// A trace stream ready for events
///
/// 可接收事件的追踪流
///
/// Construction always leaves a packet open, because the engine assumes one is
/// open as soon as the stream is usable. Dropping the tracer closes the open
/// packet (the engine's close hook runs once) before the mapping and the file
/// are released.
///
/// 构造完成时总有一个打开的数据包，因为引擎假定流可用时就已有打开的数据包。
/// 丢弃追踪器时会先关闭打开的数据包（引擎的关闭钩子执行一次），再释放映射和文件。
///
/// # Examples
///
/// ```
/// # use packet_mmap::{Tracer, WriterConfig, PacketBuf, PacketState, TraceEngine, Platform, Result};
/// # use tempfile::tempdir;
/// # use std::num::NonZeroUsize;
/// # #[derive(Default)]
/// # struct Nop;
/// # impl TraceEngine for Nop {
/// #     fn set_packet_buffer(&mut self, _: Option<PacketBuf>) {}
/// #     fn open_packet(&mut self, _: u64) {}
/// #     fn close_packet(&mut self, _: u64) {}
/// # }
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// let config = WriterConfig::new(dir.path()).packet_size(NonZeroUsize::new(4096).unwrap());
/// let mut tracer = Tracer::create(&config, Nop)?;
/// assert_eq!(tracer.state(), PacketState::PacketOpen);
///
/// // The engine rolls over to a new packet through the platform callbacks
/// // 引擎通过平台回调切换到新的数据包
/// tracer.trace(|engine, platform| {
///     platform.close_packet(engine);
///     if !platform.is_backend_full() {
///         platform.open_packet(engine);
///     }
/// });
/// assert_eq!(tracer.stats().file_len, 8192);
/// # Ok(())
/// # }
/// ```
pub struct Tracer<E: TraceEngine, B: PacketBacking = MappedFile, C: ClockSource = SystemClock> {
    engine: E,
    writer: PacketWriter<B, C>,
}

impl<E: TraceEngine> Tracer<E> {
    /// Create the stream file described by `config` and open its first packet
    ///
    /// 创建 `config` 描述的流文件并打开第一个数据包
    ///
    /// # Errors
    /// - [`Error::Granularity`](super::Error::Granularity) if the packet size cannot be determined
    /// - [`Error::DestinationInvalid`](super::Error::DestinationInvalid) / [`Error::FileCreateFailed`](super::Error::FileCreateFailed)
    ///   if the stream file cannot be created
    /// - [`Error::GrowFailed`](super::Error::GrowFailed) / [`Error::MapFailed`](super::Error::MapFailed)
    ///   if the first packet cannot be mapped
    ///
    /// # Errors
    /// - 无法确定数据包大小时返回 [`Error::Granularity`](super::Error::Granularity)
    /// - 无法创建流文件时返回 [`Error::DestinationInvalid`](super::Error::DestinationInvalid) / [`Error::FileCreateFailed`](super::Error::FileCreateFailed)
    /// - 无法映射第一个数据包时返回 [`Error::GrowFailed`](super::Error::GrowFailed) / [`Error::MapFailed`](super::Error::MapFailed)
    pub fn create(config: &WriterConfig, engine: E) -> Result<Self> {
        let packet_size = config
            .resolve_packet_size()
            .inspect_err(|err| log::error!("failed to determine packet size: {}", err))?;
        let file = MappedFile::create(config.destination(), config.name(), packet_size)
            .inspect_err(|err| log::error!("failed to create stream file: {}", err))?;
        let writer = PacketWriter::new(file, SystemClock::new()).with_flush_on_close(config.flushes_on_close());
        Self::start(engine, writer)
    }
}

impl<E: TraceEngine, B: PacketBacking, C: ClockSource> Tracer<E, B, C> {
    /// Reserve and open the first packet of a fresh writer
    ///
    /// 为新写入器预留并打开第一个数据包
    ///
    /// # Panics
    /// If `writer` has already mapped a packet
    ///
    /// # Panics
    /// 如果 `writer` 已映射过数据包
    pub fn start(engine: E, mut writer: PacketWriter<B, C>) -> Result<Self> {
        assert_eq!(
            writer.state(),
            PacketState::Uninitialized,
            "a tracer must start from a fresh writer"
        );

        writer
            .try_reserve_next()
            .inspect_err(|err| log::error!("failed to map the first packet: {}", err))?;

        let mut tracer = Self { engine, writer };
        tracer.writer.open_packet(&mut tracer.engine);
        Ok(tracer)
    }

    /// Lend the engine and the platform callbacks to one producer call
    ///
    /// 将引擎与平台回调借给一次生产者调用
    #[inline]
    pub fn trace<R>(&mut self, f: impl FnOnce(&mut E, &mut dyn Platform) -> R) -> R {
        f(&mut self.engine, &mut self.writer)
    }

    /// See [`Platform::clock_value`]
    #[inline]
    pub fn clock_value(&mut self) -> u64 {
        self.writer.clock_value()
    }

    /// See [`Platform::is_backend_full`]
    #[inline]
    pub fn is_backend_full(&mut self) -> bool {
        Platform::is_backend_full(&mut self.writer)
    }

    /// See [`PacketWriter::open_packet`]
    #[inline]
    pub fn open_packet(&mut self) {
        self.writer.open_packet(&mut self.engine)
    }

    /// See [`Platform::close_packet`]
    #[inline]
    pub fn close_packet(&mut self) {
        Platform::close_packet(&mut self.writer, &mut self.engine)
    }

    /// Current protocol state
    ///
    /// 当前协议状态
    #[inline]
    pub fn state(&self) -> PacketState {
        self.writer.state()
    }

    /// Snapshot of the writer's counters
    ///
    /// 写入器计数器快照
    #[inline]
    pub fn stats(&self) -> WriterStats {
        self.writer.stats()
    }

    /// The engine fed by this stream
    ///
    /// 由该流驱动的引擎
    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The underlying packet writer
    ///
    /// 底层的数据包写入器
    #[inline]
    pub fn writer(&self) -> &PacketWriter<B, C> {
        &self.writer
    }
}

impl<E: TraceEngine, B: PacketBacking, C: ClockSource> Drop for Tracer<E, B, C> {
    fn drop(&mut self) {
        if self.writer.state() == PacketState::PacketOpen {
            Platform::close_packet(&mut self.writer, &mut self.engine);
        }
    }
}
