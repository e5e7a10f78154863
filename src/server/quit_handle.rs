use super::*;
use mio::{Ready, SetReadiness};

/// Stops a running EventLoop from any thread
#[derive(Clone)]
pub struct QuitHandle {
    should_quit: Arc<AtomicBool>,
    set_readiness: SetReadiness,
}

impl QuitHandle {
    pub fn new(should_quit: Arc<AtomicBool>, set_readiness: SetReadiness) -> Self {
        Self {
            should_quit,
            set_readiness,
        }
    }

    /// The loop finishes the events it is handling and returns from run()
    pub fn quit(&self) {
        self.should_quit.store(true, SeqCst);
        self.set_readiness
            .set_readiness(Ready::readable())
            .or_log_error("waking event loop to quit");
    }
}

impl Debug for QuitHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "QuitHandle(should_quit: {})", self.should_quit.load(SeqCst))
    }
}
