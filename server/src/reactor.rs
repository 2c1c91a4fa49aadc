//! The single-threaded event demultiplexer.
//!
//! One thread owns an `mio::Poll` registered for readability on the
//! listening socket and every accepted client socket, mirroring the raw
//! `epoll_ctl` use of bare file descriptors in the system this was modeled
//! on — except the sockets themselves are plain `std::net::TcpListener`/
//! `TcpStream`, registered via `mio::unix::SourceFd` purely for readiness
//! notification. That split is what lets a worker thread hold an
//! `Arc<TcpStream>` clone and write a reply to the very socket this thread
//! is reading from, with no extra lock: `Read`/`Write` are implemented for
//! `&TcpStream`, so the kernel — not a mutex — mediates the concurrent
//! access.
//!
//! This reactor never parses or executes a command, and never writes a
//! reply. It is the sole producer on the task queue.

use std::collections::HashMap;
use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

use bank_core::config;
use bank_core::control::ServerControl;
use crossbeam_channel::Sender;

use crate::metrics::SharedMetrics;
use crate::task_queue::Task;

const LISTENER_TOKEN: Token = Token(0);

/// Owns the listening socket and drives the accept/read loop. Construct
/// with [`Reactor::bind`], then hand it to [`Reactor::run`] — `run` takes
/// `self` by value so that the task queue's `Sender` (held internally)
/// drops when the loop exits, signaling workers to drain and stop.
pub struct Reactor {
    listener: TcpListener,
    control: Arc<ServerControl>,
    sender: Sender<Task>,
    metrics: SharedMetrics,
}

impl Reactor {
    pub fn bind(
        addr: &str,
        control: Arc<ServerControl>,
        sender: Sender<Task>,
        metrics: SharedMetrics,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            control,
            sender,
            metrics,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept/read loop until `control.is_running()` goes false.
    /// Polls with a bounded timeout so shutdown latency stays bounded even
    /// with no socket activity.
    pub fn run(self) -> io::Result<()> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(config::MAX_POLL_EVENTS);

        let listener_fd = self.listener.as_raw_fd();
        poll.registry().register(
            &mut SourceFd(&listener_fd),
            LISTENER_TOKEN,
            Interest::READABLE,
        )?;

        let mut clients: HashMap<Token, Arc<TcpStream>> = HashMap::new();
        let mut next_token = 1usize;

        while self.control.is_running() {
            match poll.poll(&mut events, Some(config::REACTOR_POLL_TIMEOUT)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            for event in events.iter() {
                if event.token() == LISTENER_TOKEN {
                    self.accept_pending(&poll, &mut clients, &mut next_token)?;
                } else if let Some(client) = clients.get(&event.token()).cloned() {
                    if !self.handle_readable(&client) {
                        let fd = client.as_raw_fd();
                        let _ = poll.registry().deregister(&mut SourceFd(&fd));
                        clients.remove(&event.token());
                    }
                }
            }
        }

        let _ = poll.registry().deregister(&mut SourceFd(&listener_fd));
        for client in clients.values() {
            let fd = client.as_raw_fd();
            let _ = poll.registry().deregister(&mut SourceFd(&fd));
        }
        Ok(())
    }

    fn accept_pending(
        &self,
        poll: &Poll,
        clients: &mut HashMap<Token, Arc<TcpStream>>,
        next_token: &mut usize,
    ) -> io::Result<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    stream.set_nonblocking(true)?;
                    let fd = stream.as_raw_fd();
                    let token = Token(*next_token);
                    *next_token += 1;
                    poll.registry()
                        .register(&mut SourceFd(&fd), token, Interest::READABLE)?;
                    clients.insert(token, Arc::new(stream));
                    self.metrics.connections_accepted_total.inc();
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                    return Ok(());
                }
            }
        }
    }

    /// Reads one chunk from `client` and, if it holds a complete command,
    /// submits it to the queue. Returns `false` when the socket should be
    /// deregistered and dropped (closed or errored).
    fn handle_readable(&self, client: &Arc<TcpStream>) -> bool {
        let mut buf = [0u8; config::READ_BUFFER_SIZE];
        match (&**client).read(&mut buf) {
            Ok(0) => false,
            Ok(n) => {
                let line = String::from_utf8_lossy(&buf[..n]);
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if !line.is_empty() {
                    let task = Task {
                        client: Arc::clone(client),
                        command_line: line,
                    };
                    if self.sender.send(task).is_err() {
                        // Queue disconnected — only happens while shutting
                        // down, since the reactor itself owns the sender.
                        return false;
                    }
                    self.metrics.queue_depth.inc();
                }
                true
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => true,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => true,
            Err(_) => false,
        }
    }
}
