//! Monotonic time source

/// Millisecond clock, typically backed by the SDK's `millis()`
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
