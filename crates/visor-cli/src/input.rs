//! Console input shell.
//!
//! The console task polls a [`CommandStream`] instead of reading stdin
//! directly: on the cooperative scheduler a blocking read would park the
//! whole device, so the production stream moves the blocking read onto a
//! detached thread and hands completed lines over a channel.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::debug;

/// Source of operator input lines.
///
/// `poll_line` must never block: it returns a pending line if one is
/// available and `None` otherwise, letting the console task yield while it
/// waits.
pub trait CommandStream {
    fn poll_line(&mut self) -> Option<String>;
}

/// Reads stdin line-by-line on a detached reader thread.
pub struct StdinCommandStream {
    rx: Receiver<String>,
}

impl StdinCommandStream {
    /// Spawn the reader thread and return the polling end.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(text) => {
                        if tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            debug!("stdin closed, console input finished");
        });
        Self { rx }
    }
}

impl CommandStream for StdinCommandStream {
    fn poll_line(&mut self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_backed_stream_drains_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut stream = StdinCommandStream { rx };
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();

        assert_eq!(stream.poll_line().as_deref(), Some("first"));
        assert_eq!(stream.poll_line().as_deref(), Some("second"));
        assert_eq!(stream.poll_line(), None);
    }

    #[test]
    fn disconnected_sender_polls_as_empty() {
        let (tx, rx) = mpsc::channel::<String>();
        drop(tx);
        let mut stream = StdinCommandStream { rx };
        assert_eq!(stream.poll_line(), None);
    }
}
