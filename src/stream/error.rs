//! Error types for packet-mmap
//!
//! packet-mmap 的错误类型

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for packet-mmap operations
///
/// packet-mmap 操作的错误类型
#[derive(Debug)]
pub enum Error {
    /// I/O error
    ///
    /// I/O 错误
    Io(io::Error),

    /// Trace destination does not exist or is not a directory
    ///
    /// 追踪目标路径不存在或不是目录
    DestinationInvalid {
        path: PathBuf,
    },

    /// Stream file could not be created
    ///
    /// 无法创建流文件
    FileCreateFailed {
        path: PathBuf,
        source: io::Error,
    },

    /// Stream file could not be extended by one packet
    ///
    /// 无法将流文件扩展一个数据包
    GrowFailed {
        len: u64,
        source: io::Error,
    },

    /// Newly appended packet range could not be mapped
    ///
    /// 无法映射新追加的数据包范围
    MapFailed {
        offset: u64,
        len: usize,
        source: io::Error,
    },

    /// Platform allocation granularity query failed
    ///
    /// 查询平台分配粒度失败
    Granularity(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::DestinationInvalid { path } => {
                write!(
                    f,
                    "Trace destination '{}' is not a directory / 追踪目标 '{}' 不是目录",
                    path.display(),
                    path.display()
                )
            }
            Error::FileCreateFailed { path, source } => {
                write!(
                    f,
                    "Failed to create stream file '{}': {} / 创建流文件 '{}' 失败",
                    path.display(),
                    source,
                    path.display()
                )
            }
            Error::GrowFailed { len, source } => {
                write!(
                    f,
                    "Failed to grow stream file to {} bytes: {} / 流文件扩展到 {} 字节失败",
                    len, source, len
                )
            }
            Error::MapFailed { offset, len, source } => {
                write!(
                    f,
                    "Failed to map {} bytes at offset {}: {} / 映射偏移 {} 处的 {} 字节失败",
                    len, offset, source, offset, len
                )
            }
            Error::Granularity(err) => {
                write!(f, "Failed to query allocation granularity: {} / 查询分配粒度失败", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) | Error::Granularity(err) => Some(err),
            Error::FileCreateFailed { source, .. }
            | Error::GrowFailed { source, .. }
            | Error::MapFailed { source, .. } => Some(source),
            Error::DestinationInvalid { .. } => None,
        }
    }
}

/// Convert from io::Error to Error
///
/// 从 io::Error 转换到 Error
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Convert from Error to io::Error for compatibility
///
/// 从 Error 转换到 io::Error 以保持兼容性
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) | Error::Granularity(io_err) => io_err,
            Error::DestinationInvalid { .. } => io::Error::new(io::ErrorKind::NotADirectory, err.to_string()),
            Error::FileCreateFailed { ref source, .. }
            | Error::GrowFailed { ref source, .. }
            | Error::MapFailed { ref source, .. } => io::Error::new(source.kind(), err.to_string()),
        }
    }
}

/// Result type alias using our custom Error type
///
/// 使用自定义 Error 类型的 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;
