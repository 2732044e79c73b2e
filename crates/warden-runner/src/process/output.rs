//! In-memory capture of the server's standard streams.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::warn;

use super::PROCESS_TARGET;

/// Diagnostic copy of everything the server wrote to stdout and stderr.
///
/// Background threads drain the pipes so a chatty server never blocks on a
/// full pipe buffer. Clones share the same buffers.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    stdout: SharedBuffer,
    stderr: SharedBuffer,
}

impl CapturedOutput {
    /// Standard output captured so far, decoded lossily as UTF-8.
    #[must_use]
    pub fn stdout(&self) -> String {
        self.stdout.contents()
    }

    /// Standard error captured so far, decoded lossily as UTF-8.
    #[must_use]
    pub fn stderr(&self) -> String {
        self.stderr.contents()
    }

    /// Starts draining the given pipes into the shared buffers.
    pub(crate) fn capture<O, E>(&self, stdout: Option<O>, stderr: Option<E>)
    where
        O: Read + Send + 'static,
        E: Read + Send + 'static,
    {
        if let Some(reader) = stdout {
            drain("stdout", reader, self.stdout.clone());
        }
        if let Some(reader) = stderr {
            drain("stderr", reader, self.stderr.clone());
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn drain<R>(stream: &'static str, mut reader: R, mut sink: SharedBuffer)
where
    R: Read + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name(format!("warden-{stream}"))
        .spawn(move || io::copy(&mut reader, &mut sink));
    if let Err(error) = spawned {
        warn!(
            target: PROCESS_TARGET,
            stream,
            error = %error,
            "failed to start output capture thread"
        );
    }
}
