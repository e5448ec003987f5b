//! Virtual scanner stream task
//!
//! Serves a [`VirtualScanner`] over any async byte stream: each `\r`
//! terminated line read from the stream is answered with one `\r`
//! terminated reply. The task ends when the peer closes its side and hands
//! the scanner back so callers can inspect what it received.

use std::io;

use bearcat_protocol::TERMINATOR;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::VirtualScanner;

/// Buffer size for the in-memory link created by [`spawn_virtual_scanner`]
const DUPLEX_CAPACITY: usize = 1024;

/// Run the virtual scanner until the stream is closed
pub async fn run_virtual_scanner_task<S>(
    stream: S,
    mut scanner: VirtualScanner,
) -> io::Result<VirtualScanner>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    info!(
        "Starting virtual scanner task for {} ({})",
        scanner.model(),
        scanner.version()
    );

    let (read, mut write) = tokio::io::split(stream);
    let mut reader = BufReader::new(read);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(TERMINATOR, &mut line).await? == 0 {
            debug!("Virtual scanner stream closed");
            break;
        }
        if line.last() != Some(&TERMINATOR) {
            debug!("Virtual scanner dropping unterminated tail {:?}", line);
            break;
        }
        line.pop();

        let received = String::from_utf8_lossy(&line).into_owned();
        let mut reply = scanner.respond(&received).into_bytes();
        reply.push(TERMINATOR);
        write.write_all(&reply).await?;
        write.flush().await?;
    }

    info!("Virtual scanner task ended for {}", scanner.model());
    Ok(scanner)
}

/// Spawn a virtual scanner on an in-memory link
///
/// Returns the client end of the link and the task handle.
pub fn spawn_virtual_scanner(
    scanner: VirtualScanner,
) -> (DuplexStream, JoinHandle<io::Result<VirtualScanner>>) {
    let (client, device) = tokio::io::duplex(DUPLEX_CAPACITY);
    let handle = tokio::spawn(run_virtual_scanner_task(device, scanner));
    (client, handle)
}
