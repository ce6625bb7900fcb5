//! Growable stream file mapped one packet at a time
//!
//! 按数据包逐个映射的可增长流文件

use super::engine::PacketBuf;
use super::error::{Error, Result};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// A live mapping of exactly one packet
///
/// 恰好覆盖一个数据包的存活映射
///
/// Dropping the view unmaps it.
///
/// 丢弃视图即解除映射。
pub trait PacketView {
    /// Buffer to register with the engine
    ///
    /// 要注册给引擎的缓冲区
    fn packet_buf(&mut self) -> PacketBuf;

    /// Byte offset of the packet within the stream file
    ///
    /// 数据包在流文件中的字节偏移
    fn offset(&self) -> u64;

    /// Flush the packet's bytes to disk
    ///
    /// 将数据包内容刷新到磁盘
    fn flush(&self) -> Result<()>;
}

/// Append-only storage that hands out one packet mapping at a time
///
/// 一次提供一个数据包映射的仅追加存储
///
/// [`MappedFile`] is the real implementation. The trait exists so the packet
/// protocol can be driven over any mapping primitive.
///
/// [`MappedFile`] 是真实实现。该 trait 使数据包协议可以基于任意映射原语驱动。
pub trait PacketBacking {
    type View: PacketView;

    /// Fixed packet size in bytes
    ///
    /// 固定的数据包大小（字节）
    fn packet_size(&self) -> usize;

    /// Current length of the stream in bytes
    ///
    /// 流当前长度（字节）
    fn len(&self) -> u64;

    /// Grow the stream by one packet and map the new range read+write
    ///
    /// 将流扩展一个数据包并以读写方式映射新范围
    fn map_next_packet(&mut self) -> Result<Self::View>;

    /// Whether nothing has been mapped yet
    ///
    /// 是否尚未映射任何内容
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stream file backing the trace
///
/// 承载追踪数据的流文件
///
/// Owns the file handle exclusively. The length is always a multiple of the
/// packet size and only ever grows.
///
/// 独占文件句柄。文件长度始终是数据包大小的整数倍，且只增不减。
///
/// # Examples
///
/// ```
/// # use packet_mmap::{MappedFile, PacketBacking, PacketView, Result};
/// # use tempfile::tempdir;
/// # use std::num::NonZeroUsize;
/// # fn main() -> Result<()> {
/// # let dir = tempdir()?;
/// let mut file = MappedFile::create(dir.path(), "stream", NonZeroUsize::new(4096).unwrap())?;
/// assert_eq!(file.len(), 0);
///
/// let view = file.map_next_packet()?;
/// assert_eq!(view.offset(), 0);
/// assert_eq!(file.len(), 4096);
/// # Ok(())
/// # }
/// ```
pub struct MappedFile {
    file: File,
    path: PathBuf,
    len: u64,
    packet_size: NonZeroUsize,
}

impl MappedFile {
    /// Create the stream file inside `destination`
    ///
    /// 在 `destination` 目录中创建流文件
    ///
    /// Any existing file with the same name is truncated.
    ///
    /// 同名的已有文件会被截断。
    ///
    /// # Parameters
    /// - `destination`: Existing directory that receives the stream file
    /// - `stream_name`: File name of the stream inside `destination`
    /// - `packet_size`: Size of every packet, fixed for the file's lifetime
    ///
    /// # 参数
    /// - `destination`: 用于存放流文件的已存在目录
    /// - `stream_name`: 流文件在 `destination` 中的文件名
    /// - `packet_size`: 每个数据包的大小，在文件生命周期内固定
    ///
    /// # Errors
    /// - [`Error::DestinationInvalid`] if `destination` is missing or not a directory
    /// - [`Error::FileCreateFailed`] if the file cannot be created
    ///
    /// # Errors
    /// - 如果 `destination` 不存在或不是目录，返回 [`Error::DestinationInvalid`]
    /// - 如果无法创建文件，返回 [`Error::FileCreateFailed`]
    pub fn create(destination: impl AsRef<Path>, stream_name: &str, packet_size: NonZeroUsize) -> Result<Self> {
        let destination = destination.as_ref();

        match fs::metadata(destination) {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(Error::DestinationInvalid {
                    path: destination.to_path_buf(),
                });
            }
        }

        let path = destination.join(stream_name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| Error::FileCreateFailed {
                path: path.clone(),
                source,
            })?;

        log::info!("created stream file {} (packet size {})", path.display(), packet_size);

        Ok(Self {
            file,
            path,
            len: 0,
            packet_size,
        })
    }

    /// Path of the stream file
    ///
    /// 流文件路径
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of packets the file holds
    ///
    /// 文件包含的数据包数量
    #[inline]
    pub fn packet_count(&self) -> u64 {
        self.len / self.packet_size.get() as u64
    }
}

impl PacketBacking for MappedFile {
    type View = MappedView;

    #[inline]
    fn packet_size(&self) -> usize {
        self.packet_size.get()
    }

    #[inline]
    fn len(&self) -> u64 {
        self.len
    }

    fn map_next_packet(&mut self) -> Result<MappedView> {
        let offset = self.len;
        let size = self.packet_size.get();

        let new_len = offset.checked_add(size as u64).ok_or_else(|| Error::GrowFailed {
            len: offset,
            source: io::Error::new(io::ErrorKind::FileTooLarge, "stream length overflows u64"),
        })?;

        // The extension reads back as zeroes; no data is written here
        // 扩展部分读出为零，这里不写入任何数据
        self.file
            .set_len(new_len)
            .map_err(|source| Error::GrowFailed { len: new_len, source })?;
        self.len = new_len;

        // Safety: the file is owned exclusively by this writer and the range
        // [offset, new_len) was just appended, so nothing else aliases it
        // Safety: 文件由本写入器独占，且 [offset, new_len) 刚刚追加，不存在其他别名
        let mapped = unsafe { MmapOptions::new().offset(offset).len(size).map_mut(&self.file) };

        let mmap = match mapped {
            Ok(mmap) => mmap,
            Err(source) => {
                // Best-effort rollback keeps the recorded length equal to the file's
                // 尽力回滚，使记录的长度与文件一致
                if self.file.set_len(offset).is_ok() {
                    self.len = offset;
                }
                return Err(Error::MapFailed { offset, len: size, source });
            }
        };

        let index = offset / size as u64;
        log::debug!("mapped packet {} at offset {} ({} bytes)", index, offset, size);

        Ok(MappedView { mmap, offset, index })
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len)
            .field("packet_size", &self.packet_size)
            .finish()
    }
}

/// Read+write mapping of one packet of a [`MappedFile`]
///
/// [`MappedFile`] 中一个数据包的读写映射
pub struct MappedView {
    mmap: MmapMut,
    offset: u64,
    index: u64,
}

impl MappedView {
    /// Sequence number of the packet in the stream
    ///
    /// 数据包在流中的序号
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Packet length in bytes
    ///
    /// 数据包长度（字节）
    #[inline]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Whether the packet is zero-sized
    ///
    /// 数据包是否为零长度
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

impl PacketView for MappedView {
    #[inline]
    fn packet_buf(&mut self) -> PacketBuf {
        let len = self.mmap.len();
        let ptr = NonNull::from(&mut self.mmap[..]).cast::<u8>();
        PacketBuf::new(ptr, len)
    }

    #[inline]
    fn offset(&self) -> u64 {
        self.offset
    }

    fn flush(&self) -> Result<()> {
        Ok(self.mmap.flush()?)
    }
}

impl std::fmt::Debug for MappedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedView")
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("len", &self.mmap.len())
            .finish()
    }
}
