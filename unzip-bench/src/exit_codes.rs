#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// The smoke check failed (bad status, transport error, or unexpected response shape).
    SmokeFailed = 10,

    /// Invalid CLI/config/options (bad flags, invalid durations, malformed scenario file, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (fixture I/O, cleanup failures, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
