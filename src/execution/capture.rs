//! Concurrent draining of child output pipes.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::trace;

use crate::error::ShellExecError;
use crate::Result;

/// Buffer size for reading pipe output.
const READ_BUFFER_SIZE: usize = 8192;

/// Output of one child stream, drained on its own thread.
///
/// The reader thread appends every chunk to a shared buffer until the pipe
/// reaches end of stream. The buffer is only turned into text by
/// [`CapturedStream::finish`], after the reader has stopped.
pub(crate) struct CapturedStream {
    name: &'static str,
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<std::io::Result<()>>>,
}

impl CapturedStream {
    /// Start draining `source`. A missing source yields an empty capture.
    pub(crate) fn drain<R>(name: &'static str, source: Option<R>) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let reader = match source {
            Some(source) => {
                let sink = Arc::clone(&buffer);
                let handle = thread::Builder::new()
                    .name(format!("shell-exec-{name}"))
                    .spawn(move || pump(name, source, &sink))?;
                Some(handle)
            }
            None => None,
        };

        Ok(Self {
            name,
            buffer,
            reader,
        })
    }

    /// Wait for the reader to hit end of stream and decode what it collected.
    ///
    /// Invalid UTF-8 is replaced rather than reported.
    pub(crate) fn finish(mut self) -> Result<String> {
        if let Some(reader) = self.reader.take() {
            reader
                .join()
                .map_err(|_| ShellExecError::Drain(self.name))??;
        }

        let bytes = self
            .buffer
            .lock()
            .map_err(|_| ShellExecError::LockPoisoned)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Stop waiting on the reader. It exits on its own at end of stream.
    pub(crate) fn detach(mut self) {
        if self.reader.take().is_some() {
            trace!(stream = self.name, "detached reader");
        }
    }
}

fn pump<R: Read>(name: &'static str, mut source: R, sink: &Mutex<Vec<u8>>) -> std::io::Result<()> {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        trace!(stream = name, bytes = n, "drained chunk");
        let mut bytes = sink
            .lock()
            .map_err(|_| std::io::Error::other("capture buffer poisoned"))?;
        bytes.extend_from_slice(&buf[..n]);
    }
}
