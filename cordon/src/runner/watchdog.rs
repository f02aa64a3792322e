// Copyright (c) The cordon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watchdog racing a child's completion against a deadline.

use std::pin::Pin;
use std::time::Duration;
use tokio::time::Sleep;

/// Supervises one isolated child process.
///
/// The executor races the protocol read against [`Watchdog::expired`];
/// when the deadline passes first, the child is force-terminated and the
/// fired flag decides between `TimedOut` and `Crashed` for a byteless
/// stream. A decodable protocol line always takes precedence over the
/// flag.
pub(super) struct Watchdog {
    sleep: Option<Pin<Box<Sleep>>>,
    fired: bool,
}

impl Watchdog {
    /// Creates a watchdog with the given deadline. A zero timeout
    /// disables supervision entirely: the child runs unsupervised.
    pub(super) fn new(timeout: Duration) -> Self {
        let sleep = (!timeout.is_zero()).then(|| Box::pin(tokio::time::sleep(timeout)));
        Self {
            sleep,
            fired: false,
        }
    }

    /// Resolves once when the deadline passes. Pending forever when
    /// supervision is disabled or the deadline already fired.
    pub(super) async fn expired(&mut self) {
        match &mut self.sleep {
            Some(sleep) if !self.fired => {
                sleep.as_mut().await;
                self.fired = true;
            }
            _ => std::future::pending().await,
        }
    }

    /// Returns true if the deadline passed and the child was killed.
    pub(super) fn fired(&self) -> bool {
        self.fired
    }
}
