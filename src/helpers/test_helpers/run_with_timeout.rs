use super::*;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs f on its own thread and returns its result, panicking if it panics or takes longer than limit
pub fn run_with_specific_timeout<T, F>(limit: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (done_tx, done_rx) = channel();
    let handle = thread::spawn(move || {
        let result = f();
        // The receiver is gone if we already timed out
        let _ = done_tx.send(());
        result
    });
    match done_rx.recv_timeout(limit) {
        Ok(()) | Err(Disconnected) => match handle.join() {
            Ok(result) => result,
            Err(e) => panic!("thread panicked: {}", attempt_any_to_string(&*e)),
        },
        Err(Timeout) => panic!("thread timed out after {:?}", limit),
    }
}

/// run_with_specific_timeout() with DEFAULT_TIMEOUT
pub fn run_with_timeout<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    run_with_specific_timeout(DEFAULT_TIMEOUT, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_value() {
        let result = run_with_timeout(|| {
            thread::sleep(Duration::from_millis(20));
            12
        });
        assert_eq!(result, 12);
    }

    #[test]
    fn side_effects_are_visible_after() {
        let flag = Arc::new(AtomicBool::new(false));
        let set = flag.clone();
        run_with_timeout(move || set.store(true, SeqCst));
        assert!(flag.load(SeqCst));
    }

    #[test]
    #[should_panic(expected = "timed out")]
    fn times_out() {
        run_with_specific_timeout(Duration::from_millis(50), || {
            thread::sleep(Duration::from_secs(5));
        });
    }

    #[test]
    #[should_panic(expected = "this is fine")]
    fn shows_panic_message() {
        run_with_timeout(|| {
            panic!("this is fine");
        });
    }
}
