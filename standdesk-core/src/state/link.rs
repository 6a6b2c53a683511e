//! Link monitor
//!
//! The control box streams display frames continuously while powered, so
//! silence on the bus is the only disconnect signal there is.

/// Default time without a valid frame before the link counts as lost (ms)
pub const DEFAULT_LINK_TIMEOUT_MS: u32 = 1000;

/// Tracks when the last valid frame arrived
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    timeout_ms: u32,
    /// Time of last valid frame, None before the first one
    last_frame_ms: Option<u32>,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_TIMEOUT_MS)
    }
}

impl LinkMonitor {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            last_frame_ms: None,
        }
    }

    /// Record a valid frame
    pub fn frame_received(&mut self, now_ms: u32) {
        self.last_frame_ms = Some(now_ms);
    }

    /// Milliseconds since the last valid frame
    pub fn silence_ms(&self, now_ms: u32) -> Option<u32> {
        self.last_frame_ms.map(|t| now_ms.wrapping_sub(t))
    }

    /// Check if the link is healthy
    ///
    /// A link that never carried a frame is not healthy.
    pub fn is_healthy(&self, now_ms: u32) -> bool {
        match self.silence_ms(now_ms) {
            Some(silence) => silence < self.timeout_ms,
            None => false,
        }
    }
}
