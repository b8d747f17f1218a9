// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session collaborator trait.

use async_trait::async_trait;

use crate::error::CourierlinkError;
use crate::types::Identity;

/// Resolves the currently signed-in user.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the current identity, or `None` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<Identity>, CourierlinkError>;
}
