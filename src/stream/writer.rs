//! Packet lifecycle and backend-full policy
//!
//! 数据包生命周期与后端满策略

use super::clock::{ClockSource, SystemClock};
use super::engine::TraceEngine;
use super::error::Result;
use super::mapped_file::{MappedFile, PacketBacking, PacketView};

/// Where the writer is in the packet protocol
///
/// 写入器在数据包协议中的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketState {
    /// Nothing mapped yet
    ///
    /// 尚未映射任何内容
    Uninitialized,

    /// File open, no packet handed to the engine
    ///
    /// 文件已打开，没有数据包交给引擎
    PacketClosed,

    /// A mapped packet is registered with the engine
    ///
    /// 一个已映射的数据包已注册给引擎
    PacketOpen,
}

/// Snapshot of a writer's counters
///
/// 写入器计数器快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterStats {
    /// Protocol state
    ///
    /// 协议状态
    pub state: PacketState,

    /// Stream length in bytes
    ///
    /// 流长度（字节）
    pub file_len: u64,

    /// Fixed packet size in bytes
    ///
    /// 固定的数据包大小（字节）
    pub packet_size: usize,

    /// Packets handed to the engine
    ///
    /// 已交给引擎的数据包数量
    pub packets_opened: u64,

    /// Packets closed and unmapped
    ///
    /// 已关闭并解除映射的数据包数量
    pub packets_closed: u64,

    /// Closes whose flush to disk failed
    ///
    /// 关闭时刷新到磁盘失败的次数
    pub flush_failures: u64,
}

/// Packet-mapped writer
///
/// 数据包映射写入器
///
/// Drives the open/close protocol over a [`PacketBacking`] and owns the single
/// mapped view that may exist at any time. Protocol violations (opening without
/// a reserved packet, closing without an open packet, probing while a packet is
/// open) panic: they are caller bugs, and continuing would corrupt the stream.
///
/// 在 [`PacketBacking`] 上驱动打开/关闭协议，并持有任意时刻唯一可能存在的映射视图。
/// 协议违规（没有预留数据包就打开、没有打开的数据包就关闭、在数据包打开时探测）会 panic：
/// 这些是调用方的错误，继续执行会破坏流。
///
/// # Examples
///
/// ```
/// # use packet_mmap::{MappedFile, PacketWriter, PacketState, PacketBuf, TraceEngine, SystemClock, Result};
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
/// let file = MappedFile::create(dir.path(), "stream", NonZeroUsize::new(4096).unwrap())?;
/// let mut writer = PacketWriter::new(file, SystemClock::new());
/// let mut engine = Nop;
///
/// writer.try_reserve_next()?;
/// writer.open_packet(&mut engine);
/// assert_eq!(writer.state(), PacketState::PacketOpen);
///
/// writer.close_packet(&mut engine)?;
/// assert_eq!(writer.file_len(), 4096);
/// # Ok(())
/// # }
/// ```
pub struct PacketWriter<B: PacketBacking = MappedFile, C: ClockSource = SystemClock> {
    /// Reserved or open packet; dropped before the backing
    ///
    /// 已预留或已打开的数据包；先于存储后端被丢弃
    view: Option<B::View>,
    backing: B,
    clock: C,
    state: PacketState,
    flush_on_close: bool,
    packets_opened: u64,
    packets_closed: u64,
    flush_failures: u64,
}

impl<B: PacketBacking, C: ClockSource> PacketWriter<B, C> {
    /// Create a writer over `backing`; no packet is mapped yet
    ///
    /// 基于 `backing` 创建写入器；此时尚未映射任何数据包
    pub fn new(backing: B, clock: C) -> Self {
        Self {
            view: None,
            backing,
            clock,
            state: PacketState::Uninitialized,
            flush_on_close: false,
            packets_opened: 0,
            packets_closed: 0,
            flush_failures: 0,
        }
    }

    /// Flush each packet synchronously before unmapping it on close
    ///
    /// 关闭时在解除映射前同步刷新每个数据包
    pub fn with_flush_on_close(mut self, enabled: bool) -> Self {
        self.flush_on_close = enabled;
        self
    }

    /// Sample the clock in 100 ns ticks
    ///
    /// 以 100 纳秒刻度采样时钟
    #[inline]
    pub fn clock_value(&mut self) -> u64 {
        self.clock.now_ticks()
    }

    /// Reserve and map the next packet
    ///
    /// 预留并映射下一个数据包
    ///
    /// On success the new view is held until the next [`open_packet`](Self::open_packet).
    /// A reservation that is already held is reused without growing the file.
    ///
    /// 成功时新视图会一直保留到下一次 [`open_packet`](Self::open_packet)。
    /// 若已持有预留，则直接复用而不扩展文件。
    ///
    /// # Panics
    /// If a packet is currently open
    ///
    /// # Panics
    /// 如果当前有打开的数据包
    ///
    /// # Errors
    /// Propagates [`Error::GrowFailed`](super::Error::GrowFailed) and
    /// [`Error::MapFailed`](super::Error::MapFailed) from the backing
    ///
    /// # Errors
    /// 透传存储后端的 [`Error::GrowFailed`](super::Error::GrowFailed) 和
    /// [`Error::MapFailed`](super::Error::MapFailed)
    pub fn try_reserve_next(&mut self) -> Result<()> {
        assert!(
            self.state != PacketState::PacketOpen,
            "backend-full probe issued while a packet is open"
        );

        if self.view.is_some() {
            log::debug!("packet already reserved at {} bytes, reusing it", self.backing.len());
            return Ok(());
        }

        let view = self.backing.map_next_packet()?;
        self.view = Some(view);
        if self.state == PacketState::Uninitialized {
            self.state = PacketState::PacketClosed;
        }
        Ok(())
    }

    /// Hand the reserved packet to the engine and run its open hook
    ///
    /// 将预留的数据包交给引擎并执行其打开钩子
    ///
    /// # Panics
    /// If no packet is reserved or a packet is already open
    ///
    /// # Panics
    /// 如果没有预留的数据包或已有打开的数据包
    pub fn open_packet(&mut self, engine: &mut dyn TraceEngine) {
        assert!(
            self.state != PacketState::PacketOpen,
            "open-packet issued while a packet is already open"
        );
        let Some(view) = self.view.as_mut() else {
            panic!("open-packet issued without a mapped packet; the backend-full check must come first");
        };

        let buf = view.packet_buf();
        let offset = view.offset();
        engine.set_packet_buffer(Some(buf));
        let timestamp = self.clock.now_ticks();
        engine.open_packet(timestamp);

        self.state = PacketState::PacketOpen;
        self.packets_opened += 1;
        log::debug!("opened packet at offset {} ({} bytes)", offset, buf.len());
    }

    /// Run the engine's close hook, then clear its buffer and unmap the packet
    ///
    /// 执行引擎的关闭钩子，然后清除其缓冲区并解除数据包映射
    ///
    /// The file keeps its grown length. The packet is closed even when the
    /// flush fails; the failure is counted in [`WriterStats::flush_failures`].
    ///
    /// 文件保持已扩展的长度。即使刷新失败数据包也会被关闭；失败次数计入
    /// [`WriterStats::flush_failures`]。
    ///
    /// # Panics
    /// If no packet is open
    ///
    /// # Panics
    /// 如果没有打开的数据包
    ///
    /// # Errors
    /// Returns the flush error when flushing on close is enabled and fails
    ///
    /// # Errors
    /// 启用关闭时刷新且刷新失败时返回该错误
    pub fn close_packet(&mut self, engine: &mut dyn TraceEngine) -> Result<()> {
        assert!(
            self.state == PacketState::PacketOpen,
            "close-packet issued without an open packet"
        );

        let timestamp = self.clock.now_ticks();
        engine.close_packet(timestamp);
        // The hook may still touch the buffer, so it is cleared only afterwards
        // 钩子可能仍会访问缓冲区，因此只能在其返回后清除
        engine.set_packet_buffer(None);

        let mut flushed = Ok(());
        if let Some(view) = self.view.take() {
            if self.flush_on_close {
                flushed = view.flush();
            }
            log::debug!("closed packet at offset {}", view.offset());
        }

        self.state = PacketState::PacketClosed;
        self.packets_closed += 1;
        if flushed.is_err() {
            self.flush_failures += 1;
        }
        flushed
    }

    /// Current protocol state
    ///
    /// 当前协议状态
    #[inline]
    pub fn state(&self) -> PacketState {
        self.state
    }

    /// Whether a mapped packet is waiting for [`open_packet`](Self::open_packet)
    ///
    /// 是否有已映射的数据包等待 [`open_packet`](Self::open_packet)
    #[inline]
    pub fn has_reserved_packet(&self) -> bool {
        self.state != PacketState::PacketOpen && self.view.is_some()
    }

    /// Offset of the held packet, reserved or open
    ///
    /// 当前持有的数据包（已预留或已打开）的偏移
    #[inline]
    pub fn current_offset(&self) -> Option<u64> {
        self.view.as_ref().map(|view| view.offset())
    }

    /// Stream length in bytes
    ///
    /// 流长度（字节）
    #[inline]
    pub fn file_len(&self) -> u64 {
        self.backing.len()
    }

    /// Fixed packet size in bytes
    ///
    /// 固定的数据包大小（字节）
    #[inline]
    pub fn packet_size(&self) -> usize {
        self.backing.packet_size()
    }

    /// Storage the packets are mapped from
    ///
    /// 数据包映射所用的存储后端
    #[inline]
    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Snapshot of the writer's counters
    ///
    /// 写入器计数器快照
    pub fn stats(&self) -> WriterStats {
        WriterStats {
            state: self.state,
            file_len: self.backing.len(),
            packet_size: self.backing.packet_size(),
            packets_opened: self.packets_opened,
            packets_closed: self.packets_closed,
            flush_failures: self.flush_failures,
        }
    }
}

impl<B: PacketBacking + std::fmt::Debug, C: ClockSource> std::fmt::Debug for PacketWriter<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketWriter")
            .field("backing", &self.backing)
            .field("state", &self.state)
            .field("current_offset", &self.current_offset())
            .finish()
    }
}
