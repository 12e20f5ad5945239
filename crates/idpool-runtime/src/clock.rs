//! Local wall-clock time for log records

use idpool_core::Timestamp;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Current local time, or `None` if the C library cannot resolve it
        pub fn local_now() -> Option<Timestamp> {
            let now = unsafe { libc::time(std::ptr::null_mut()) };
            if now == -1 {
                return None;
            }
            let mut tm: libc::tm = unsafe { std::mem::zeroed() };
            // localtime_r is the reentrant form; workers call this concurrently.
            let res = unsafe { libc::localtime_r(&now, &mut tm) };
            if res.is_null() {
                return None;
            }
            Some(Timestamp {
                year: tm.tm_year + 1900,
                month: (tm.tm_mon + 1) as u8,
                day: tm.tm_mday as u8,
                hour: tm.tm_hour as u8,
                minute: tm.tm_min as u8,
                second: tm.tm_sec as u8,
            })
        }
    } else {
        /// Local time is not resolved on this platform; records carry the
        /// placeholder timestamp
        pub fn local_now() -> Option<Timestamp> {
            None
        }
    }
}
