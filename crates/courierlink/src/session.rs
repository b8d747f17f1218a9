// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session for one CLI invocation, taken from the `--as` flag.

use async_trait::async_trait;
use courierlink_core::{CourierlinkError, Identity, SessionProvider};

/// Identity fixed for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct CliSession {
    identity: Option<Identity>,
}

impl CliSession {
    pub fn new(acting_as: Option<&str>) -> Self {
        let identity = acting_as
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(Identity::new);
        Self { identity }
    }
}

#[async_trait]
impl SessionProvider for CliSession {
    async fn current_user(&self) -> Result<Option<Identity>, CourierlinkError> {
        Ok(self.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_core::UserId;

    #[tokio::test]
    async fn as_flag_becomes_identity() {
        let session = CliSession::new(Some("biz-1"));
        let identity = session.current_user().await.unwrap().unwrap();
        assert_eq!(identity.user_id, UserId::from("biz-1"));
    }

    #[tokio::test]
    async fn blank_or_missing_flag_is_signed_out() {
        assert!(CliSession::new(None).current_user().await.unwrap().is_none());
        assert!(CliSession::new(Some("  ")).current_user().await.unwrap().is_none());
    }
}
