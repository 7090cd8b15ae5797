//! Wall-clock effect

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;
use crate::time::PhysicalTime;

/// Source of wall-clock time for deadlines and creation stamps
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current wall-clock time
    async fn physical_time(&self) -> Result<PhysicalTime>;
}

#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    async fn physical_time(&self) -> Result<PhysicalTime> {
        (**self).physical_time().await
    }
}
