//! Console output for page scripts.
//!
//! Everything a page interaction would print to the browser console goes
//! through here, so the embedder decides where it lands via the `log` crate.

use log::info;

/// Routes console messages emitted by page scripts to the `log` facade.
pub struct Console;

impl Console {
    /// Print a generic log line.
    #[inline]
    pub fn log<M: AsRef<str>>(message: M) {
        info!("[console]: {}", message.as_ref());
    }
}
