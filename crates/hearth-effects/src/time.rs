//! Time effect handler

use async_trait::async_trait;
use hearth_core::effects::PhysicalTimeEffects;
use hearth_core::{HearthError, PhysicalTime, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Real time handler for production use. Stateless; reads the system clock.
#[derive(Debug, Clone, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| HearthError::invalid(format!("system clock before epoch: {e}")))?;
        let ts_ms = u64::try_from(elapsed.as_millis())
            .map_err(|_| HearthError::invalid("system clock out of range"))?;
        Ok(PhysicalTime::from_millis(ts_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_physical_time_is_recent_and_monotone_enough() {
        let handler = RealTimeHandler::new();
        let first = handler.physical_time().await.unwrap();
        let second = handler.physical_time().await.unwrap();
        // 2020-01-01T00:00:00Z
        assert!(first.ts_ms > 1_577_836_800_000);
        assert!(second >= first);
    }
}
