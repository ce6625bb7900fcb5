//! Packet-mapped trace stream based on memmap2
//!
//! 基于 memmap2 的数据包映射追踪流
//!
//! The stream file grows one packet at a time. Each packet is mapped read+write,
//! handed to the trace engine as a raw buffer, and unmapped when the engine
//! closes it:
//!
//! 流文件按数据包逐个增长。每个数据包以读写方式映射，作为原始缓冲区交给追踪引擎，
//! 并在引擎关闭它时解除映射：
//!
//! ```text
//!  Tracer::create ──► map packet 0 ──► open ─┐
//!                                            │ engine writes events
//!            ┌──────────── close ◄───────────┘
//!            ▼
//!   is_backend_full ── map fails ──► true (engine drops or stalls)
//!            │
//!       map succeeds
//!            ▼
//!          false ──► open packet N+1 ...
//! ```
//!
//! - [`MappedFile`]: owns the stream file and maps the newly appended packet
//! - [`PacketWriter`]: open/close protocol and backend-full policy
//! - [`Platform`]: the callback set the engine calls into
//! - [`Tracer`]: engine + writer, opens the first packet and closes the last one
//!
//! - [`MappedFile`]：持有流文件并映射新追加的数据包
//! - [`PacketWriter`]：打开/关闭协议与后端满策略
//! - [`Platform`]：引擎调用的回调集合
//! - [`Tracer`]：引擎 + 写入器，负责打开第一个数据包并关闭最后一个

mod clock;
mod config;
mod engine;
mod error;
mod granularity;
mod mapped_file;
mod platform;
mod tracer;
mod writer;


// Re-export public API
// 重新导出公共 API
pub use clock::{ClockSource, SystemClock, TICKS_PER_SECOND, WINDOWS_TO_UNIX_EPOCH_TICKS, ticks_from_duration};
pub use config::{DEFAULT_STREAM_NAME, WriterConfig};
pub use engine::{PacketBuf, TraceEngine};
pub use error::{Error, Result};
pub use granularity::allocation_granularity;
pub use mapped_file::{MappedFile, MappedView, PacketBacking, PacketView};
pub use platform::Platform;
pub use tracer::Tracer;
pub use writer::{PacketState, PacketWriter, WriterStats};
