//! The client: connection lifecycle and request multiplexer.
//!
//! A [`Client`] is created configured but disconnected. [`Client::connect`]
//! spawns the lifecycle task, which loops through
//! dial → authenticate → identify → serve until the client is closed; any
//! error returns it to the dialing step after the retry interval.
//!
//! While serving, two tasks share the connection:
//!
//! - the **receiver** owns the read half, splits the stream into frames
//!   and pushes them onto an internal channel; it exits by closing that
//!   channel.
//! - the **multiplexer** owns the write half. It allocates request tags,
//!   patches them into outgoing frames, keeps the pending table, pairs
//!   replies with waiters by tag, and fans subscription events into the
//!   single-slot update channel.
//!
//! Caller tasks never touch the socket: they submit requests through a
//! bounded queue and await a one-shot response slot. Replies are paired by
//! tag, not by order, so out-of-order replies are valid.

use std::{
    collections::{BTreeMap, HashMap},
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use bytes::{BufMut, Bytes, BytesMut};
use pavane_proto::{Command, Descriptor, ProtocolError, TagStructReader, TagStructWriter};
use tokio::{
    io::AsyncWriteExt,
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::{Config, Resolved},
    error::ClientError,
    transport::{RecvStream, SendStream},
    wire,
};

/// Protocol version implemented by this client. Servers announcing less
/// are rejected during authentication.
pub const PROTOCOL_VERSION: u32 = 32;

/// Low half of the AUTH reply carries the server's protocol version.
const PROTOCOL_VERSION_MASK: u32 = 0x0000_FFFF;

/// Authentication cookies are exactly this many bytes.
const COOKIE_LENGTH: usize = 256;

/// Request tag reserved for server-initiated subscription events; never
/// allocated to a request.
const EVENT_TAG: u32 = 0xFFFF_FFFF;

/// Depth of the bounded request submission queue.
const REQUEST_QUEUE_DEPTH: usize = 16;

/// Descriptor plus two tagged u32s (command and tag).
const MIN_REQUEST_LEN: usize = 26;

/// Byte offset of the request tag inside an outgoing frame.
const TAG_OFFSET: usize = 26;

/// Joint deadline for the authentication and identification exchanges,
/// distinct from the caller-facing request timeout.
const INIT_DEADLINE: Duration = Duration::from_secs(10);

/// Fixed tags for the two exchanges that run before the multiplexer.
const AUTH_TAG: u32 = 0;
const IDENTIFY_TAG: u32 = 1;

/// Where the lifecycle currently is. Published through a watch channel so
/// callers can await readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection; dialing or waiting out the retry interval
    Connecting,
    /// Connected, authentication exchange in flight
    Authenticating,
    /// Authenticated, client identification in flight
    Identifying,
    /// Fully established; requests are being served
    Serving,
}

/// An outgoing request: the frame bytes (tag still a placeholder) and the
/// single-use response slot.
struct Request {
    command: Command,
    data: BytesMut,
    response: oneshot::Sender<Result<Bytes, ClientError>>,
}

/// A recorded request awaiting its reply, keyed by tag in the pending
/// table. The command is kept to attribute server-side errors.
struct PendingRequest {
    command: Command,
    response: oneshot::Sender<Result<Bytes, ClientError>>,
}

/// A reconnecting client for the PulseAudio native protocol.
///
/// Cheap to clone; all clones share one connection and one lifecycle.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

struct Shared {
    resolved: Resolved,
    requests_tx: mpsc::Sender<Request>,
    requests_rx: Mutex<Option<mpsc::Receiver<Request>>>,
    updates_tx: mpsc::Sender<()>,
    updates_rx: Arc<tokio::sync::Mutex<mpsc::Receiver<()>>>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown_tx: watch::Sender<bool>,
    client_index: AtomicU32,
    lifecycle: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
    /// Create a client from the given configuration. Environment
    /// fallbacks are applied here; no connection is made until
    /// [`Client::connect`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        // Capacity 1 on purpose: event bursts coalesce, extra events drop.
        let (updates_tx, updates_rx) = mpsc::channel(1);
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                resolved: config.resolve(),
                requests_tx,
                requests_rx: Mutex::new(Some(requests_rx)),
                updates_tx,
                updates_rx: Arc::new(tokio::sync::Mutex::new(updates_rx)),
                state_tx,
                shutdown_tx,
                client_index: AtomicU32::new(0),
                lifecycle: Mutex::new(None),
            }),
        }
    }

    /// Start the connection lifecycle. Reconnects after `retry` whenever
    /// an iteration fails. Must be called from within a Tokio runtime;
    /// calling it a second time is a no-op.
    pub fn connect(&self, retry: Duration) {
        let receiver = self
            .shared
            .requests_rx
            .lock()
            .expect("lifecycle mutex poisoned")
            .take();
        let Some(requests_rx) = receiver else {
            warn!("pulseaudio connection loop already started");
            return;
        };

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_lifecycle(shared, requests_rx, retry));
        *self.shared.lifecycle.lock().expect("lifecycle mutex poisoned") = Some(handle);
    }

    /// Signal the lifecycle to stop. The current connection is torn down,
    /// pending requests resolve with [`ClientError::Closed`], and no
    /// reconnect is attempted. Cancellation is signalled before any
    /// channel is closed, so in-flight submissions observe `Closed`
    /// rather than racing a closed queue.
    pub fn close(&self) {
        self.shared.shutdown_tx.send_replace(true);
    }

    /// Wait for the lifecycle task to finish after [`Client::close`].
    pub async fn closed(&self) {
        let handle = self.shared.lifecycle.lock().expect("lifecycle mutex poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Observe the connection state.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Index the server assigned to this client during identification;
    /// zero before the first successful handshake.
    #[must_use]
    pub fn client_index(&self) -> u32 {
        self.shared.client_index.load(Ordering::Relaxed)
    }

    pub(crate) fn updates_receiver(&self) -> Arc<tokio::sync::Mutex<mpsc::Receiver<()>>> {
        Arc::clone(&self.shared.updates_rx)
    }

    /// Issue a command with no arguments and await the reply body.
    pub(crate) async fn request(&self, command: Command) -> Result<Bytes, ClientError> {
        self.request_with(command, |_| {}).await
    }

    /// Issue a command, letting `build` append its argument list, and
    /// await the reply body.
    ///
    /// Submission is non-blocking: if the queue is full this returns
    /// [`ClientError::QueueFull`] immediately. The wait is bounded by the
    /// configured request timeout, if any; on timeout the pending entry is
    /// left behind and a late reply is discarded by the multiplexer.
    pub(crate) async fn request_with(
        &self,
        command: Command,
        build: impl FnOnce(&mut TagStructWriter<'_>),
    ) -> Result<Bytes, ClientError> {
        let mut data = command_frame(command);
        {
            let mut writer = TagStructWriter::new(&mut data);
            build(&mut writer);
        }
        let payload = data.len() - Descriptor::SIZE;
        if payload > Descriptor::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload,
                max: Descriptor::MAX_PAYLOAD_SIZE as usize,
            }
            .into());
        }

        let (response_tx, response_rx) = oneshot::channel();
        match self.shared.requests_tx.try_send(Request { command, data, response: response_tx }) {
            Ok(()) => {},
            Err(mpsc::error::TrySendError::Full(_)) => return Err(ClientError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => return Err(ClientError::Closed),
        }

        let reply = match self.shared.resolved.request_timeout {
            Some(limit) => match time::timeout(limit, response_rx).await {
                Ok(reply) => reply,
                Err(_) => return Err(ClientError::Timeout),
            },
            None => response_rx.await,
        };
        reply.map_err(|_| ClientError::Closed)?
    }
}

/// The lifecycle task: serve a connection, tear down, wait, repeat.
async fn run_lifecycle(shared: Arc<Shared>, mut requests: mpsc::Receiver<Request>, retry: Duration) {
    let mut shutdown = shared.shutdown_tx.subscribe();
    info!("starting pulseaudio connection loop");

    loop {
        if *shutdown.borrow() {
            break;
        }
        if let Err(err) = serve_connection(&shared, &mut requests, &mut shutdown).await {
            error!(error = %err, "pulseaudio connection error");
        }
        shared.state_tx.send_replace(ConnectionState::Connecting);
        if *shutdown.borrow() {
            break;
        }

        info!(interval = ?retry, "reconnecting pulseaudio connection loop");
        tokio::select! {
            _ = shutdown.changed() => {},
            _ = time::sleep(retry) => {},
        }
    }

    // Refuse further submissions, then release callers already queued.
    requests.close();
    while let Ok(request) = requests.try_recv() {
        let _ = request.response.send(Err(ClientError::Closed));
    }
    info!("stopping pulseaudio connection loop");
}

/// One lifecycle iteration: dial, init under its own deadline, serve.
async fn serve_connection(
    shared: &Shared,
    requests: &mut mpsc::Receiver<Request>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), ClientError> {
    shared.state_tx.send_replace(ConnectionState::Connecting);
    let endpoint = &shared.resolved.endpoint;
    info!(scheme = %endpoint.scheme, addr = %endpoint.addr, "dialing pulseaudio server");

    let stream = endpoint.dial(shared.resolved.dial_timeout).await?;
    let (mut recv, mut send) = stream.into_split();

    let init = async {
        shared.state_tx.send_replace(ConnectionState::Authenticating);
        authenticate(shared, &mut recv, &mut send).await?;
        shared.state_tx.send_replace(ConnectionState::Identifying);
        identify(shared, &mut recv, &mut send).await
    };
    tokio::select! {
        _ = shutdown.changed() => return Ok(()),
        init = time::timeout(INIT_DEADLINE, init) => {
            init.map_err(|_| ClientError::Timeout)??;
        },
    }

    shared.state_tx.send_replace(ConnectionState::Serving);
    info!(
        client_index = shared.client_index.load(Ordering::Relaxed),
        "serving pulseaudio connection"
    );

    let (frames_tx, frames_rx) = mpsc::channel(1);
    let receiver = tokio::spawn(receive_frames(recv, frames_tx));
    let result = multiplex(shared, send, requests, frames_rx, shutdown).await;
    receiver.abort();
    result
}

/// Read the cookie, send AUTH and check the server's protocol version.
async fn authenticate(
    shared: &Shared,
    recv: &mut RecvStream,
    send: &mut SendStream,
) -> Result<(), ClientError> {
    let path = &shared.resolved.cookie;
    let cookie = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::CookieRead { path: path.clone(), source })?;
    if cookie.len() != COOKIE_LENGTH {
        return Err(ClientError::CookieLength {
            path: path.clone(),
            len: cookie.len(),
            expected: COOKIE_LENGTH,
        });
    }

    let mut data = command_frame(Command::Auth);
    {
        let mut writer = TagStructWriter::new(&mut data);
        writer.put_u32(PROTOCOL_VERSION);
        writer.put_arbitrary(&cookie);
    }
    let body = exchange(recv, send, Command::Auth, AUTH_TAG, data).await?;

    let mut ts = TagStructReader::new(&body);
    let server_version = ts.read_u32()? & PROTOCOL_VERSION_MASK;
    if server_version < PROTOCOL_VERSION {
        return Err(ClientError::ServerVersion {
            server: server_version,
            required: PROTOCOL_VERSION,
        });
    }
    Ok(())
}

/// Send SET_CLIENT_NAME with our identification properties and store the
/// client index the server assigns.
async fn identify(
    shared: &Shared,
    recv: &mut RecvStream,
    send: &mut SendStream,
) -> Result<(), ClientError> {
    let mut props = BTreeMap::new();
    let exe = std::env::current_exe().ok();
    let name = exe
        .as_deref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pavane".to_owned());
    let binary = exe.as_deref().map(|path| path.display().to_string()).unwrap_or_default();

    props.insert("application.name".to_owned(), name);
    props.insert("application.process.id".to_owned(), std::process::id().to_string());
    props.insert("application.process.binary".to_owned(), binary);
    props.insert("application.language".to_owned(), "en_US.UTF-8".to_owned());
    if let Ok(display) = std::env::var("DISPLAY") {
        props.insert("window.x11.display".to_owned(), display);
    }
    if let Ok(user) = std::env::var("USER") {
        props.insert("application.process.user".to_owned(), user);
    }
    if let Ok(host) = std::env::var("HOSTNAME") {
        props.insert("application.process.host".to_owned(), host);
    }

    let mut data = command_frame(Command::SetClientName);
    TagStructWriter::new(&mut data).put_proplist(&props);
    let body = exchange(recv, send, Command::SetClientName, IDENTIFY_TAG, data).await?;

    let mut ts = TagStructReader::new(&body);
    let index = ts.read_u32()?;
    shared.client_index.store(index, Ordering::Relaxed);
    Ok(())
}

/// One direct request/reply exchange on the socket, used before the
/// multiplexer is running.
async fn exchange(
    recv: &mut RecvStream,
    send: &mut SendStream,
    command: Command,
    tag: u32,
    mut data: BytesMut,
) -> Result<Bytes, ClientError> {
    finalize_frame(&mut data, tag);
    send.write_all(&data).await?;
    send.flush().await?;

    let body = wire::read_frame(recv).await?;
    let (code, reply_tag, rest) = split_reply(body)?;
    if reply_tag != tag {
        return Err(ClientError::UnknownReplyTag { tag: reply_tag, code });
    }
    match code {
        code if code == Command::Reply.to_u32() => Ok(rest),
        code if code == Command::Error.to_u32() => {
            let mut ts = TagStructReader::new(&rest);
            let error_code = read_error_code(&mut ts);
            Err(ClientError::Server { command, code: error_code })
        },
        code => Err(ClientError::UnexpectedCommand { code }),
    }
}

/// The receiver task: split the read half into frames and forward them.
/// Exits by dropping (closing) the channel; a read error is forwarded
/// first so the multiplexer tears the connection down.
async fn receive_frames(mut recv: RecvStream, frames: mpsc::Sender<Result<Bytes, ClientError>>) {
    loop {
        match wire::read_frame(&mut recv).await {
            Ok(body) => {
                if frames.send(Ok(body)).await.is_err() {
                    return;
                }
            },
            Err(err) => {
                let _ = frames.send(Err(err)).await;
                return;
            },
        }
    }
}

/// The multiplexer: own the write half, pair replies with waiters by tag,
/// fan subscription events out. On exit every pending request resolves
/// with [`ClientError::Closed`].
async fn multiplex(
    shared: &Shared,
    mut send: SendStream,
    requests: &mut mpsc::Receiver<Request>,
    mut frames: mpsc::Receiver<Result<Bytes, ClientError>>,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<(), ClientError> {
    let mut pending: HashMap<u32, PendingRequest> = HashMap::new();
    let mut cursor: u32 = 0;

    let result = loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break Ok(());
                }
            },
            request = requests.recv() => {
                let Some(mut request) = request else { break Ok(()) };
                if request.data.len() < MIN_REQUEST_LEN {
                    let _ = request.response.send(Err(ClientError::RequestTooShort {
                        len: request.data.len(),
                        min: MIN_REQUEST_LEN,
                    }));
                    continue;
                }

                let tag = next_available_tag(&mut cursor, &pending);
                finalize_frame(&mut request.data, tag);
                if let Err(err) = write_frame(&mut send, &request.data).await {
                    let report = io::Error::new(err.kind(), err.to_string());
                    let _ = request.response.send(Err(ClientError::Transport(report)));
                    break Err(ClientError::Transport(err));
                }
                pending.insert(tag, PendingRequest {
                    command: request.command,
                    response: request.response,
                });
            },
            frame = frames.recv() => {
                let Some(frame) = frame else { break Ok(()) };
                let body = match frame {
                    Ok(body) => body,
                    Err(err) => break Err(err),
                };
                if let Err(err) = dispatch(shared, &mut pending, body) {
                    break Err(err);
                }
            },
        }
    };

    for (_, entry) in pending.drain() {
        let _ = entry.response.send(Err(ClientError::Closed));
    }
    result
}

/// Route one inbound frame: subscription event, reply, or error.
fn dispatch(
    shared: &Shared,
    pending: &mut HashMap<u32, PendingRequest>,
    body: Bytes,
) -> Result<(), ClientError> {
    let (code, tag, rest) = split_reply(body)?;

    if code == Command::SubscribeEvent.to_u32() && tag == EVENT_TAG {
        if shared.updates_tx.try_send(()).is_err() {
            debug!("update slot occupied; coalescing event");
        }
        return Ok(());
    }

    let Some(entry) = pending.remove(&tag) else {
        // A reply for a tag we never issued means the stream is corrupt.
        return Err(ClientError::UnknownReplyTag { tag, code });
    };

    if code == Command::Reply.to_u32() {
        if entry.response.send(Ok(rest)).is_err() {
            debug!(tag, "discarding late reply for abandoned request");
        }
    } else if code == Command::Error.to_u32() {
        let mut ts = TagStructReader::new(&rest);
        let error_code = read_error_code(&mut ts);
        let _ = entry
            .response
            .send(Err(ClientError::Server { command: entry.command, code: error_code }));
    } else {
        let _ = entry.response.send(Err(ClientError::UnexpectedCommand { code }));
    }
    Ok(())
}

fn read_error_code(ts: &mut TagStructReader<'_>) -> u32 {
    match ts.read_u32() {
        Ok(code) => code,
        Err(err) => {
            warn!(error = %err, "could not interpret error frame");
            0
        },
    }
}

/// Decode the (command, tag) prefix every inbound body starts with and
/// return the remainder.
fn split_reply(body: Bytes) -> Result<(u32, u32, Bytes), ClientError> {
    let mut ts = TagStructReader::new(&body);
    let code = ts.read_u32()?;
    let tag = ts.read_u32()?;
    let consumed = body.len() - ts.remaining();
    Ok((code, tag, body.slice(consumed..)))
}

/// Find an unused request tag, advancing a rolling cursor and skipping
/// the reserved event tag. Pending tags are released on reply, so the
/// scan is O(1) amortized.
fn next_available_tag(cursor: &mut u32, pending: &HashMap<u32, PendingRequest>) -> u32 {
    let mut tag = *cursor;
    while pending.contains_key(&tag) {
        tag = tag.wrapping_add(1);
        if tag == EVENT_TAG {
            tag = 0;
        }
    }
    *cursor = tag;
    tag
}

/// Start an outgoing frame: zeroed descriptor with the control channel,
/// then the u32-tagged command and a placeholder tag. Body length and the
/// real tag are patched in at send time.
fn command_frame(command: Command) -> BytesMut {
    let mut data = BytesMut::with_capacity(64);
    data.put_u32(0); // length, patched in finalize_frame
    data.put_u32(Descriptor::CHANNEL_CONTROL);
    data.put_u32(0); // offset high
    data.put_u32(0); // offset low
    data.put_u32(0); // flags

    let mut writer = TagStructWriter::new(&mut data);
    writer.put_u32(command.to_u32());
    writer.put_u32(0); // tag, patched in finalize_frame
    data
}

/// Patch body length (offset 0) and request tag (offset 26) into a frame
/// built by [`command_frame`].
fn finalize_frame(data: &mut BytesMut, tag: u32) {
    let length = (data.len() - Descriptor::SIZE) as u32;
    data[0..4].copy_from_slice(&length.to_be_bytes());
    data[TAG_OFFSET..TAG_OFFSET + 4].copy_from_slice(&tag.to_be_bytes());
}

async fn write_frame(send: &mut SendStream, data: &[u8]) -> io::Result<()> {
    send.write_all(data).await?;
    send.flush().await
}
