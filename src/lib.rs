//! Packet-mapped trace stream writer
//!
//! 数据包映射追踪流写入器
//!
//! This library is the platform backend of a trace-event producer. It persists the
//! packets of an external trace-serialization engine to a growable stream file by
//! memory-mapping one fixed-size packet at a time, and it answers the engine's
//! clock, backend-full and packet boundary callbacks.
//!
//! 本库是追踪事件生产者的平台后端。它通过每次内存映射一个固定大小的数据包，
//! 将外部追踪序列化引擎的数据包持久化到可增长的流文件中，并响应引擎的时钟、
//! 后端满以及数据包边界回调。
//!
//! # Features
//!
//! - **Zero-copy packets**: The engine serializes directly into mapped file memory
//! - **Append-only growth**: The file grows by exactly one packet per reservation
//! - **Backpressure, not errors**: Failed reservations surface as "backend full"
//! - **Scoped resources**: File and mapping are released on every exit path
//!
//! # 特性
//!
//! - **零拷贝数据包**：引擎直接序列化到映射的文件内存中
//! - **仅追加增长**：每次预留文件恰好增长一个数据包
//! - **背压而非错误**：预留失败表现为"后端已满"
//! - **作用域资源**：文件与映射在所有退出路径上都会释放
//!
//! # Quick Start
//!
//! ## 快速开始
//!
//! ```
//! use packet_mmap::{PacketBuf, Platform, Result, TraceEngine, Tracer, WriterConfig};
//! # use tempfile::tempdir;
//! # use std::num::NonZeroUsize;
//!
//! // A minimal engine: writes a sequence number at the start of every packet
//! // 最小引擎：在每个数据包开头写入序号
//! #[derive(Default)]
//! struct SeqEngine {
//!     buf: Option<PacketBuf>,
//!     seq: u64,
//! }
//!
//! impl TraceEngine for SeqEngine {
//!     fn set_packet_buffer(&mut self, buf: Option<PacketBuf>) {
//!         self.buf = buf;
//!     }
//!
//!     fn open_packet(&mut self, _timestamp: u64) {
//!         if let Some(buf) = self.buf {
//!             // Safety: the buffer is registered until close-packet clears it
//!             // Safety: 缓冲区在关闭数据包清除之前一直处于注册状态
//!             let packet = unsafe { buf.as_mut_slice() };
//!             packet[..8].copy_from_slice(&self.seq.to_le_bytes());
//!         }
//!         self.seq += 1;
//!     }
//!
//!     fn close_packet(&mut self, _timestamp: u64) {}
//! }
//!
//! # fn main() -> Result<()> {
//! # let dir = tempdir()?;
//! let config = WriterConfig::new(dir.path()).packet_size(NonZeroUsize::new(4096).unwrap());
//! let mut tracer = Tracer::create(&config, SeqEngine::default())?;
//!
//! // Roll over to the next packet, as the engine does when one fills up
//! // 像引擎在数据包写满时那样切换到下一个数据包
//! tracer.trace(|engine, platform| {
//!     platform.close_packet(engine);
//!     if !platform.is_backend_full() {
//!         platform.open_packet(engine);
//!     }
//! });
//!
//! assert_eq!(tracer.engine().seq, 2);
//! assert_eq!(tracer.stats().file_len, 8192);
//! # Ok(())
//! # }
//! ```
//!
//! # Main Types
//!
//! - [`Tracer`]: Engine and writer bound to one stream file
//! - [`PacketWriter`]: Packet open/close protocol and backend-full policy
//! - [`MappedFile`]: Growable stream file mapped one packet at a time
//! - [`Platform`]: Callbacks the engine issues
//! - [`TraceEngine`]: Calls the writer makes into the engine
//! - [`ClockSource`]: 100 ns timestamps for the engine
//!
//! # 主要类型
//!
//! - [`Tracer`]：绑定到一个流文件的引擎与写入器
//! - [`PacketWriter`]：数据包打开/关闭协议与后端满策略
//! - [`MappedFile`]：按数据包逐个映射的可增长流文件
//! - [`Platform`]：引擎发出的回调
//! - [`TraceEngine`]：写入器对引擎的调用
//! - [`ClockSource`]：提供给引擎的 100 纳秒时间戳

mod stream;

pub use stream::{
    ClockSource, DEFAULT_STREAM_NAME, Error, MappedFile, MappedView, PacketBacking, PacketBuf, PacketState,
    PacketView, PacketWriter, Platform, Result, SystemClock, TICKS_PER_SECOND, TraceEngine, Tracer,
    WINDOWS_TO_UNIX_EPOCH_TICKS, WriterConfig, WriterStats, allocation_granularity, ticks_from_duration,
};
