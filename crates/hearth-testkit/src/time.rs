//! Controllable clock

use async_trait::async_trait;
use hearth_core::effects::PhysicalTimeEffects;
use hearth_core::{PhysicalTime, Result};
use std::sync::{Arc, Mutex};

/// 2022-01-01T00:00:00Z
pub const DEFAULT_START_MS: u64 = 1_640_995_200_000;

/// Clock that only moves when a test moves it. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ControllableClock {
    now_ms: Arc<Mutex<u64>>,
}

impl Default for ControllableClock {
    fn default() -> Self {
        Self::new(DEFAULT_START_MS)
    }
}

impl ControllableClock {
    /// Clock starting at `start_ms`
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Current time
    pub fn now(&self) -> PhysicalTime {
        PhysicalTime::from_millis(*self.now_ms.lock().unwrap())
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        *self.now_ms.lock().unwrap() += ms;
    }

    /// Jump to an absolute time
    pub fn set(&self, time: PhysicalTime) {
        *self.now_ms.lock().unwrap() = time.ts_ms;
    }
}

#[async_trait]
impl PhysicalTimeEffects for ControllableClock {
    async fn physical_time(&self) -> Result<PhysicalTime> {
        Ok(self.now())
    }
}
