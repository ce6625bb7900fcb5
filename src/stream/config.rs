//! Writer configuration
//!
//! 写入器配置

use super::error::Result;
use super::granularity::allocation_granularity;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default name of the stream file inside the trace directory
///
/// 追踪目录中流文件的默认名称
pub const DEFAULT_STREAM_NAME: &str = "stream";

/// Where and how a trace stream is written
///
/// 追踪流的写入位置与方式
///
/// # Examples
///
/// ```
/// # use packet_mmap::WriterConfig;
/// # use std::num::NonZeroUsize;
/// let config = WriterConfig::new("/tmp/trace")
///     .packet_size(NonZeroUsize::new(4096).unwrap())
///     .flush_on_close(true);
///
/// assert_eq!(config.stream_path(), std::path::Path::new("/tmp/trace/stream"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterConfig {
    /// Existing directory receiving the stream file
    ///
    /// 存放流文件的已存在目录
    destination: PathBuf,

    /// Stream file name
    ///
    /// 流文件名
    #[cfg_attr(feature = "serde", serde(default = "default_stream_name"))]
    stream_name: String,

    /// Packet size override; the platform granularity is used when absent
    ///
    /// 数据包大小覆盖值；未设置时使用平台粒度
    #[cfg_attr(feature = "serde", serde(default))]
    packet_size: Option<NonZeroUsize>,

    /// Flush each packet to disk before unmapping it
    ///
    /// 在解除映射前将每个数据包刷新到磁盘
    #[cfg_attr(feature = "serde", serde(default))]
    flush_on_close: bool,
}

#[cfg(feature = "serde")]
fn default_stream_name() -> String {
    DEFAULT_STREAM_NAME.to_owned()
}

impl WriterConfig {
    /// Configuration writing `stream` into `destination` with platform-sized packets
    ///
    /// 以平台粒度大小的数据包写入 `destination/stream` 的配置
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            stream_name: DEFAULT_STREAM_NAME.to_owned(),
            packet_size: None,
            flush_on_close: false,
        }
    }

    /// Set the stream file name
    ///
    /// 设置流文件名
    pub fn stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = name.into();
        self
    }

    /// Override the packet size
    ///
    /// 覆盖数据包大小
    ///
    /// Sizes that are not a multiple of the platform granularity still work but
    /// map slightly more than one packet per view.
    ///
    /// 非平台粒度整数倍的大小仍然可用，但每个视图会映射略多于一个数据包的内存。
    pub fn packet_size(mut self, size: NonZeroUsize) -> Self {
        self.packet_size = Some(size);
        self
    }

    /// Flush every packet synchronously when it is closed
    ///
    /// 在关闭数据包时同步刷新
    pub fn flush_on_close(mut self, enabled: bool) -> Self {
        self.flush_on_close = enabled;
        self
    }

    /// Directory receiving the stream file
    ///
    /// 存放流文件的目录
    #[inline]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Stream file name
    ///
    /// 流文件名
    #[inline]
    pub fn name(&self) -> &str {
        &self.stream_name
    }

    /// Whether packets are flushed when closed
    ///
    /// 关闭数据包时是否刷新
    #[inline]
    pub fn flushes_on_close(&self) -> bool {
        self.flush_on_close
    }

    /// Full path of the stream file
    ///
    /// 流文件完整路径
    pub fn stream_path(&self) -> PathBuf {
        self.destination.join(&self.stream_name)
    }

    /// Packet size to use: the override, else the platform granularity
    ///
    /// 实际使用的数据包大小：优先使用覆盖值，否则使用平台粒度
    ///
    /// # Errors
    /// Returns [`Error::Granularity`](super::Error::Granularity) if the platform query fails
    ///
    /// # Errors
    /// 如果平台查询失败，返回 [`Error::Granularity`](super::Error::Granularity)
    pub fn resolve_packet_size(&self) -> Result<NonZeroUsize> {
        match self.packet_size {
            Some(size) => Ok(size),
            None => allocation_granularity(),
        }
    }
}
