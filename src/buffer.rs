/// Initial capacity of the output buffer in bytes.
pub const INITIAL_CAPACITY: usize = 256;

/// Capacity above which the buffer is dropped instead of reused.
pub const MAX_RETAINED_CAPACITY: usize = 4 * INITIAL_CAPACITY;

/// Reusable output buffer for one layout instance.
///
/// One abnormally large line (a huge stack trace, say) must not pin its
/// allocation for the lifetime of the layout, so [`OutputBuffer::prepare`]
/// reallocates once capacity exceeds [`MAX_RETAINED_CAPACITY`].
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer { buf: Vec::with_capacity(INITIAL_CAPACITY) }
    }

    /// Reset for the next line and hand out the writable storage.
    pub fn prepare(&mut self) -> &mut Vec<u8> {
        if self.buf.capacity() > MAX_RETAINED_CAPACITY {
            self.buf = Vec::with_capacity(INITIAL_CAPACITY);
        } else {
            self.buf.clear();
        }
        &mut self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
