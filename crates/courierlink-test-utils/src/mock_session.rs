// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session collaborator with a switchable signed-in identity.

use async_trait::async_trait;
use tokio::sync::Mutex;

use courierlink_core::{CourierlinkError, Identity, SessionProvider};

/// A session whose current user is set by the test.
#[derive(Default)]
pub struct MockSession {
    identity: Mutex<Option<Identity>>,
}

impl MockSession {
    /// A session with nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A session signed in as `user`.
    pub fn signed_in(user: &str) -> Self {
        Self {
            identity: Mutex::new(Some(Identity::new(user))),
        }
    }

    pub async fn sign_in(&self, user: &str) {
        *self.identity.lock().await = Some(Identity::new(user));
    }

    pub async fn sign_out(&self) {
        *self.identity.lock().await = None;
    }
}

#[async_trait]
impl SessionProvider for MockSession {
    async fn current_user(&self) -> Result<Option<Identity>, CourierlinkError> {
        Ok(self.identity.lock().await.clone())
    }
}
