//! Event delivery channels.
//!
//! The engine side of the wire protocol is a [`Channel`]: gestures go out
//! fire-and-forget and inbound commands are drained without blocking once per
//! frame. [`IpcClient`] is the TCP implementation. [`GestureListener`] is the
//! consumer end of the same socket.

use crate::{
    constants::{CONNECT_TIMEOUT_MS, READ_CHUNK_SIZE, RECONNECT_INTERVAL_MS},
    protocol::{commands, decode_lines, Command, LineBuffer, Message},
    Error, Result,
};
use log::{debug, info, warn};
use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

/// Outbound messages and inbound commands, seen from the engine
pub trait Channel {
    /// Deliver one message; failures drop the message
    fn send(&mut self, message: &Message);

    /// Drain every complete inbound command without blocking
    fn poll_commands(&mut self) -> Vec<Command>;
}

/// TCP client channel with lazy reconnect
///
/// While disconnected, `send` retries at most once per reconnect interval
/// and drops the message otherwise.
pub struct IpcClient {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    inbox: LineBuffer,
    reconnect_interval: Duration,
    last_attempt: Option<Instant>,
}

impl IpcClient {
    /// Create a client and try to connect once
    ///
    /// A failed initial connection is not an error; the next send retries.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let mut client = Self {
            host: host.into(),
            port,
            stream: None,
            inbox: LineBuffer::new(),
            reconnect_interval: Duration::from_millis(RECONNECT_INTERVAL_MS),
            last_attempt: None,
        };
        if let Err(e) = client.connect() {
            warn!("Failed to connect to consumer at {}:{}: {}", client.host, client.port, e);
        }
        client
    }

    /// Connect to the consumer, replacing any previous connection
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not resolve or the connection is refused
    pub fn connect(&mut self) -> Result<()> {
        self.disconnect();
        self.last_attempt = Some(Instant::now());

        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();
        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, Duration::from_millis(CONNECT_TIMEOUT_MS)) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!("Connected to consumer on {addr}");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.map_or_else(
            || Error::InvalidInput(format!("No address for {}:{}", self.host, self.port)),
            Error::Io,
        ))
    }

    fn disconnect(&mut self) {
        self.stream = None;
        self.inbox.clear();
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Minimum time between reconnect attempts made by `send`
    pub fn set_reconnect_interval(&mut self, interval: Duration) {
        self.reconnect_interval = interval;
    }

    fn reconnect_due(&self) -> bool {
        self.last_attempt
            .map_or(true, |last| last.elapsed() >= self.reconnect_interval)
    }

    /// Read whatever is available without blocking
    fn read_available(stream: &mut TcpStream, inbox: &mut LineBuffer) -> io::Result<bool> {
        stream.set_nonblocking(true)?;
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let result = loop {
            match stream.read(&mut chunk) {
                Ok(0) => break Ok(false),
                Ok(n) => inbox.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(true),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        stream.set_nonblocking(false)?;
        result
    }
}

impl Channel for IpcClient {
    fn send(&mut self, message: &Message) {
        if self.stream.is_none() {
            if !self.reconnect_due() {
                debug!("Dropping {message:?}: consumer not connected");
                return;
            }
            if let Err(e) = self.connect() {
                debug!("Dropping {message:?}: consumer not connected ({e})");
                return;
            }
        }

        let line = match message.to_line() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode {message:?}: {e}");
                return;
            }
        };

        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.write_all(line.as_bytes()) {
                warn!("Error sending data: {e}");
                self.disconnect();
            }
        }
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        let Some(stream) = self.stream.as_mut() else {
            return Vec::new();
        };

        match Self::read_available(stream, &mut self.inbox) {
            Ok(true) => {}
            Ok(false) => {
                info!("Consumer closed the connection");
                let lines = self.inbox.drain_lines();
                self.disconnect();
                return commands(decode_lines(lines));
            }
            Err(e) => {
                warn!("Error receiving data: {e}");
                self.disconnect();
                return Vec::new();
            }
        }

        commands(decode_lines(self.inbox.drain_lines()))
    }
}

/// Channel writing messages to any `Write`, with no inbound side
pub struct WriterChannel<W: Write> {
    writer: W,
}

impl<W: Write> WriterChannel<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Channel for WriterChannel<W> {
    fn send(&mut self, message: &Message) {
        let result = message
            .to_line()
            .and_then(|line| Ok(self.writer.write_all(line.as_bytes())?))
            .and_then(|()| Ok(self.writer.flush()?));
        if let Err(e) = result {
            warn!("Dropping {message:?}: {e}");
        }
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        Vec::new()
    }
}

/// Consumer-side listener for engine connections
pub struct GestureListener {
    listener: TcpListener,
}

impl GestureListener {
    /// Bind a listener; port 0 picks a free port
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port))?;
        info!("Gesture listener on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// Address the listener is bound to
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Block until an engine connects
    ///
    /// # Errors
    ///
    /// Returns an error if accepting the connection fails
    pub fn accept(&self) -> Result<ConsumerConnection> {
        let (stream, addr) = self.listener.accept()?;
        info!("Connected by {addr}");
        Ok(ConsumerConnection {
            stream,
            inbox: LineBuffer::new(),
        })
    }
}

/// One accepted engine connection
pub struct ConsumerConnection {
    stream: TcpStream,
    inbox: LineBuffer,
}

impl ConsumerConnection {
    /// Block until at least one message arrives
    ///
    /// Returns an empty list once the engine has closed the connection.
    /// Malformed lines are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the socket fails
    pub fn recv(&mut self) -> Result<Vec<Message>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let messages = decode_lines(self.inbox.drain_lines());
            if !messages.is_empty() {
                return Ok(messages);
            }

            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(decode_lines(self.inbox.drain_lines())),
                Ok(n) => self.inbox.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Send a command to the engine
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub fn send_command(&mut self, command: Command) -> Result<()> {
        let line = Message::command(command).to_line()?;
        self.stream.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Bound how long [`recv`](Self::recv) may block
    ///
    /// # Errors
    ///
    /// Returns an error if the socket option cannot be set
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }
}
