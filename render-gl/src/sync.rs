//! Fence sync objects.

use std::time::Duration;

use crate::api::{ClientWaitStatus, GlApi, SyncObj};

/// A fence inserted into the command stream. All GPU work submitted before
/// the fence is complete once it signals.
pub struct FenceSync {
    pub(crate) sync: SyncObj,
}

impl FenceSync {
    pub(crate) fn new(gl: &dyn GlApi) -> FenceSync {
        FenceSync {
            sync: gl.fence_sync(),
        }
    }

    /// Blocks the client until the fence signals or `timeout` elapses.
    pub fn client_wait(&self, gl: &dyn GlApi, timeout: Duration, flush: bool) -> ClientWaitStatus {
        let timeout_ns = timeout.as_nanos().min(u128::from(u64::max_value())) as u64;
        gl.client_wait_sync(self.sync, flush, timeout_ns)
    }

    /// Makes the GPU wait for the fence without stalling the client.
    pub fn server_wait(&self, gl: &dyn GlApi) {
        gl.wait_sync(self.sync);
    }

    pub fn is_signaled(&self, gl: &dyn GlApi) -> bool {
        gl.sync_is_signaled(self.sync)
    }

    pub fn destroy(self, gl: &dyn GlApi) {
        gl.delete_sync(self.sync);
    }
}
