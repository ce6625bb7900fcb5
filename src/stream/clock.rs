//! Trace clock source
//!
//! 追踪时钟源
//!
//! The engine serializes clock values verbatim, so the tick unit (100 ns) and the
//! epoch conversion below are part of the on-disk contract.
//!
//! 引擎会原样序列化时钟值，因此刻度单位（100 纳秒）和下面的纪元换算属于磁盘格式约定。

use std::time::Duration;
#[cfg(any(not(windows), test))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock ticks per second (100 ns resolution)
///
/// 每秒时钟刻度数（100 纳秒精度）
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Offset between 1601-01-01 UTC and the Unix epoch, in 100 ns ticks
///
/// 1601-01-01 UTC 与 Unix 纪元之间的偏移（100 纳秒刻度）
pub const WINDOWS_TO_UNIX_EPOCH_TICKS: u64 = 11_644_473_600_000 * 10_000;

/// Source of timestamps handed to the trace engine
///
/// 提供给追踪引擎的时间戳来源
pub trait ClockSource {
    /// Current time in 100 ns ticks
    ///
    /// 当前时间（100 纳秒刻度）
    fn now_ticks(&mut self) -> u64;
}

/// Any `FnMut() -> u64` can act as a clock, which keeps tests deterministic
///
/// 任何 `FnMut() -> u64` 都可以作为时钟，便于测试保持确定性
impl<F> ClockSource for F
where
    F: FnMut() -> u64,
{
    #[inline]
    fn now_ticks(&mut self) -> u64 {
        self()
    }
}

/// Wall clock sampled at the highest precision the platform offers
///
/// 以平台最高精度采样的挂钟时间
///
/// The native sample is expressed in 100 ns ticks since 1601-01-01 UTC and the
/// fixed [`WINDOWS_TO_UNIX_EPOCH_TICKS`] offset is subtracted from it. On
/// Windows the sample comes from `GetSystemTimePreciseAsFileTime`; elsewhere
/// it is derived from [`SystemTime`](std::time::SystemTime), which already counts from 1970.
///
/// 原始采样以 1601-01-01 UTC 起的 100 纳秒刻度表示，再减去固定偏移
/// [`WINDOWS_TO_UNIX_EPOCH_TICKS`]。在 Windows 上采样来自
/// `GetSystemTimePreciseAsFileTime`；其他平台由已从 1970 年起计的 [`SystemTime`](std::time::SystemTime) 推算。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock
    ///
    /// 创建系统时钟
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Native sample: 100 ns ticks since 1601-01-01 UTC
    ///
    /// 原始采样：1601-01-01 UTC 起的 100 纳秒刻度
    #[cfg(windows)]
    pub fn native_ticks(&self) -> u64 {
        use windows_sys::Win32::Foundation::FILETIME;
        use windows_sys::Win32::System::SystemInformation::GetSystemTimePreciseAsFileTime;

        let mut ft = FILETIME {
            dwLowDateTime: 0,
            dwHighDateTime: 0,
        };
        // Safety: the call only writes into the provided struct
        // Safety: 该调用只会写入传入的结构体
        unsafe { GetSystemTimePreciseAsFileTime(&mut ft) };
        (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
    }

    /// Native sample: 100 ns ticks since 1601-01-01 UTC
    ///
    /// 原始采样：1601-01-01 UTC 起的 100 纳秒刻度
    #[cfg(not(windows))]
    pub fn native_ticks(&self) -> u64 {
        // A wall clock set before 1970 saturates to the epoch itself.
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        ticks_from_duration(since_unix).saturating_add(WINDOWS_TO_UNIX_EPOCH_TICKS)
    }
}

impl ClockSource for SystemClock {
    #[inline]
    fn now_ticks(&mut self) -> u64 {
        self.native_ticks().saturating_sub(WINDOWS_TO_UNIX_EPOCH_TICKS)
    }
}

/// Convert a duration to 100 ns ticks, saturating at `u64::MAX`
///
/// 将时长转换为 100 纳秒刻度，溢出时饱和到 `u64::MAX`
#[inline]
pub fn ticks_from_duration(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos() / 100).unwrap_or(u64::MAX)
}
