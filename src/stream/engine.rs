//! Contract with the external trace engine
//!
//! 与外部追踪引擎的约定
//!
//! The writer never interprets packet contents. It only hands the engine a buffer
//! and tells it when a packet starts and ends.
//!
//! 写入器从不解析数据包内容，只负责向引擎提供缓冲区并通知数据包的开始与结束。

use std::fmt;
use std::ptr::NonNull;

/// Packet buffer registered with the engine
///
/// 注册给引擎的数据包缓冲区
///
/// Points into the mapped view of the current packet. It stays valid from
/// registration until the writer clears the engine's buffer during close-packet;
/// writes through it land in the stream file.
///
/// 指向当前数据包的映射视图。从注册起直到写入器在关闭数据包时清除引擎缓冲区之前
/// 一直有效；通过它写入的数据会落到流文件中。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PacketBuf {
    ptr: NonNull<u8>,
    len: usize,
}

impl PacketBuf {
    #[inline]
    pub(crate) fn new(ptr: NonNull<u8>, len: usize) -> Self {
        Self { ptr, len }
    }

    /// Base address of the packet
    ///
    /// 数据包基地址
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Packet length in bytes
    ///
    /// 数据包长度（字节）
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for a registered packet
    ///
    /// 已注册的数据包始终为 false
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the packet as a mutable byte slice
    ///
    /// 以可变字节切片访问数据包
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - The buffer is still registered (close-packet has not cleared it yet)
    /// - No other slice over the same packet is alive
    ///
    /// # Safety
    ///
    /// 调用者必须确保：
    /// - 缓冲区仍处于注册状态（关闭数据包尚未清除它）
    /// - 同一数据包上没有其他存活的切片
    #[inline]
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl fmt::Debug for PacketBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuf")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

/// Writer → engine calls
///
/// 写入器 → 引擎的调用
///
/// Implemented by the trace-serialization engine. All calls are synchronous and
/// arrive on the producer's own call stack.
///
/// 由追踪序列化引擎实现。所有调用都是同步的，并发生在生产者自己的调用栈上。
pub trait TraceEngine {
    /// Register (`Some`) or clear (`None`) the packet buffer
    ///
    /// 注册（`Some`）或清除（`None`）数据包缓冲区
    fn set_packet_buffer(&mut self, buf: Option<PacketBuf>);

    /// Open-packet hook: write the packet header into the registered buffer
    ///
    /// 打开数据包钩子：将包头写入已注册的缓冲区
    fn open_packet(&mut self, timestamp: u64);

    /// Close-packet hook: finalize the packet in place
    ///
    /// 关闭数据包钩子：就地完成数据包
    fn close_packet(&mut self, timestamp: u64);
}
