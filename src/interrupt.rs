//! User-initiated cancellation.
//!
//! A Ctrl-C listener raises a shared flag; long-running commands poll it and
//! bail out with [`crate::commands::CommandFailure::Interrupted`], which the
//! invoke boundary swallows so the console stays alive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Cloneable handle to the process-wide interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the current operation as cancelled.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.raised.store(false, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Spawns a background thread that raises the flag on every Ctrl-C.
    ///
    /// Once installed, SIGINT no longer terminates the process.
    pub fn install_ctrl_c_listener(&self) -> std::io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let flag = self.clone();
        std::thread::Builder::new()
            .name("ctrl-c".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    loop {
                        match tokio::signal::ctrl_c().await {
                            Ok(()) => {
                                debug!("Interrupt received");
                                flag.raise();
                            }
                            Err(e) => {
                                warn!("Ctrl-C listener stopped: {e}");
                                break;
                            }
                        }
                    }
                });
            })?;
        Ok(())
    }
}
