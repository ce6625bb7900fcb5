//! Platform allocation granularity
//!
//! 平台分配粒度
//!
//! Mapping offsets must be multiples of this value, so it is the default packet size.
//!
//! 映射偏移必须是该值的整数倍，因此它是默认的数据包大小。

use super::error::{Error, Result};
use std::io;
use std::num::NonZeroUsize;

/// Query the granularity at which the platform can map file regions
///
/// 查询平台映射文件区域的粒度
///
/// On Unix this is the page size, on Windows the allocation granularity
/// reported by `GetSystemInfo` (usually 64 KiB).
///
/// 在 Unix 上为页大小，在 Windows 上为 `GetSystemInfo` 报告的分配粒度（通常为 64 KiB）。
///
/// # Errors
/// Returns [`Error::Granularity`] if the platform query fails
///
/// # Errors
/// 如果平台查询失败，返回 [`Error::Granularity`]
#[cfg(unix)]
pub fn allocation_granularity() -> Result<NonZeroUsize> {
    // Safety: sysconf has no preconditions
    // Safety: sysconf 没有前置条件
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        return Err(Error::Granularity(io::Error::last_os_error()));
    }

    usize::try_from(size)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| Error::Granularity(io::Error::new(io::ErrorKind::InvalidData, "page size out of range")))
}

#[cfg(windows)]
pub fn allocation_granularity() -> Result<NonZeroUsize> {
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    // Safety: GetSystemInfo only writes into the provided struct
    // Safety: GetSystemInfo 只会写入传入的结构体
    let info = unsafe {
        let mut info: SYSTEM_INFO = std::mem::zeroed();
        GetSystemInfo(&mut info);
        info
    };

    NonZeroUsize::new(info.dwAllocationGranularity as usize)
        .ok_or_else(|| Error::Granularity(io::Error::new(io::ErrorKind::InvalidData, "zero allocation granularity")))
}
