// File: src/platforms/mod.rs

use async_trait::async_trait;
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
    Error(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformIntegration {
    async fn connect(&mut self) -> Result<(), Error>;
    async fn disconnect(&mut self) -> Result<(), Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
}

pub mod discord;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_platform_connect_lifecycle() -> Result<(), Error> {
        let mut platform = MockPlatformIntegration::new();
        platform
            .expect_get_connection_status()
            .times(1)
            .returning(|| Ok(ConnectionStatus::Disconnected));
        platform.expect_connect().times(1).returning(|| Ok(()));
        platform
            .expect_get_connection_status()
            .times(1)
            .returning(|| Ok(ConnectionStatus::Connected));
        platform.expect_disconnect().times(1).returning(|| Ok(()));

        let status = platform.get_connection_status().await?;
        assert_eq!(status, ConnectionStatus::Disconnected);

        platform.connect().await?;
        let status = platform.get_connection_status().await?;
        assert_eq!(status, ConnectionStatus::Connected);

        platform.disconnect().await?;
        Ok(())
    }
}
