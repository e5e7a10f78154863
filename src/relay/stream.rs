use super::*;

/// A non-blocking bidirectional byte stream, usually with encryption underneath. read() and write() follow
/// std::io conventions: an error of kind WouldBlock means nothing can be done until the next readiness
/// notification, and a read of zero bytes means the peer has closed the stream.
pub trait ByteStream: Debug {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// May accept fewer bytes than given (including none, reported as WouldBlock)
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Pushes anything buffered below the plaintext layer (such as encrypted records) out to the transport.
    /// Returns true once nothing is left pending.
    fn flush_pending(&mut self) -> io::Result<bool>;

    /// True while the transport-level handshake has not completed
    fn is_handshaking(&self) -> bool;

    /// Best-effort orderly close. Called once, right before the stream is released.
    fn shutdown(&mut self);
}
