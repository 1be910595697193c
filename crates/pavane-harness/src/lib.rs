//! Test harness for the client: a scriptable mock PulseAudio peer.
//!
//! [`MockServer`] listens on loopback TCP and hands out [`MockConn`]
//! connections whose primitives mirror the protocol: read one request,
//! send a reply / error / subscription event, or inject raw bytes. Tests
//! drive the conversation frame by frame, so out-of-order replies, bursts
//! and malformed frames are all expressible.
//!
//! The real client owns real sockets, which is why the scenarios run
//! against a loopback peer rather than a simulated network.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{collections::BTreeMap, io, time::Duration};

use bytes::{Bytes, BytesMut};
use pavane_core::{Client, Config, ConnectionState, Scheme};
use pavane_proto::{
    CVolume, ChannelMap, Command, Descriptor, Frame, SampleSpec, TagStructReader, TagStructWriter,
};
use tempfile::NamedTempFile;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// AUTH reply announcing protocol version 32 (high half carries flags).
pub const SERVER_VERSION_REPLY: u32 = 0x0001_0000 | 32;

/// Request tag reserved for subscription events.
pub const EVENT_TAG: u32 = 0xFFFF_FFFF;

/// A mock PulseAudio server on loopback TCP.
pub struct MockServer {
    listener: TcpListener,
}

impl MockServer {
    /// Bind to an ephemeral loopback port.
    pub async fn bind() -> io::Result<Self> {
        Ok(Self { listener: TcpListener::bind("127.0.0.1:0").await? })
    }

    /// The `host:port` address clients should dial.
    pub fn addr(&self) -> String {
        self.listener.local_addr().expect("listener has a local addr").to_string()
    }

    /// Accept the next client connection.
    pub async fn accept(&self) -> io::Result<MockConn> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(MockConn { stream })
    }
}

/// One accepted client connection, driven frame by frame.
pub struct MockConn {
    stream: TcpStream,
}

impl MockConn {
    /// Read one request frame; returns (command code, tag, argument
    /// bytes past the prefix).
    pub async fn read_request(&mut self) -> io::Result<(u32, u32, Bytes)> {
        let mut descriptor = [0u8; Descriptor::SIZE];
        self.stream.read_exact(&mut descriptor).await?;
        let length =
            u32::from_be_bytes([descriptor[0], descriptor[1], descriptor[2], descriptor[3]]);

        let mut body = vec![0u8; length as usize];
        self.stream.read_exact(&mut body).await?;
        let body = Bytes::from(body);

        let mut ts = TagStructReader::new(&body);
        let command = ts.read_u32().expect("request command prefix");
        let tag = ts.read_u32().expect("request tag prefix");
        let consumed = body.len() - ts.remaining();
        Ok((command, tag, body.slice(consumed..)))
    }

    /// Send a frame with the given response command and tag.
    pub async fn send_frame(
        &mut self,
        command: Command,
        tag: u32,
        build: impl FnOnce(&mut TagStructWriter<'_>),
    ) -> io::Result<()> {
        let mut body = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut body);
            w.put_u32(command.to_u32());
            w.put_u32(tag);
            build(&mut w);
        }

        let frame = Frame::control(body.freeze());
        let mut wire = Vec::with_capacity(Descriptor::SIZE + frame.payload.len());
        frame.encode(&mut wire).expect("mock frames stay within bounds");
        self.send_raw(&wire).await
    }

    /// Send a REPLY frame for the given tag.
    pub async fn reply(
        &mut self,
        tag: u32,
        build: impl FnOnce(&mut TagStructWriter<'_>),
    ) -> io::Result<()> {
        self.send_frame(Command::Reply, tag, build).await
    }

    /// Send an ERROR frame for the given tag.
    pub async fn error(&mut self, tag: u32, code: u32) -> io::Result<()> {
        self.send_frame(Command::Error, tag, |w| w.put_u32(code)).await
    }

    /// Inject one subscription event (reserved tag, empty payload).
    pub async fn event(&mut self) -> io::Result<()> {
        self.send_frame(Command::SubscribeEvent, EVENT_TAG, |_| {}).await
    }

    /// Write raw bytes to the client, bypassing frame construction.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Serve the server side of the handshake, announcing `version_reply`
    /// to AUTH and client index 1 to SET_CLIENT_NAME.
    pub async fn handshake_with_version(&mut self, version_reply: u32) -> io::Result<()> {
        let (command, tag, _args) = self.read_request().await?;
        assert_eq!(command, Command::Auth.to_u32(), "first request must be AUTH");
        self.reply(tag, |w| w.put_u32(version_reply)).await?;

        let (command, tag, _args) = self.read_request().await?;
        assert_eq!(
            command,
            Command::SetClientName.to_u32(),
            "second request must be SET_CLIENT_NAME"
        );
        self.reply(tag, |w| w.put_u32(1)).await
    }

    /// [`MockConn::handshake_with_version`] at the supported version.
    pub async fn handshake(&mut self) -> io::Result<()> {
        self.handshake_with_version(SERVER_VERSION_REPLY).await
    }

    /// Assert that the client drops the connection.
    pub async fn expect_eof(&mut self) {
        let mut byte = [0u8; 1];
        match self.stream.read(&mut byte).await {
            Ok(0) | Err(_) => {},
            Ok(_) => panic!("expected the client to close the connection, got data"),
        }
    }
}

/// A 256-byte cookie file; kept alive for the duration of the test.
pub fn cookie_file() -> NamedTempFile {
    cookie_file_with_len(256)
}

/// A cookie file of arbitrary length, for the invalid-cookie scenarios.
pub fn cookie_file_with_len(len: usize) -> NamedTempFile {
    let file = NamedTempFile::new().expect("create temp cookie");
    std::fs::write(file.path(), vec![0x2A; len]).expect("write cookie");
    file
}

/// Client configuration pointing at the mock server.
pub fn test_config(server: &MockServer, cookie: &NamedTempFile) -> Config {
    Config {
        addr: Some(server.addr()),
        protocol: Some(Scheme::Tcp),
        cookie: Some(cookie.path().to_path_buf()),
        dial_timeout: Some(Duration::from_secs(5)),
        request_timeout: Some(Duration::from_secs(5)),
    }
}

/// Await a connection state, bounded so a wedged client fails the test
/// instead of hanging it.
pub async fn wait_for_state(client: &Client, target: ConnectionState) {
    let mut status = client.status();
    tokio::time::timeout(Duration::from_secs(5), status.wait_for(|state| *state == target))
        .await
        .expect("timed out waiting for connection state")
        .expect("client dropped");
}

/// Append a complete server-info payload with the given default sink.
pub fn write_server_info(w: &mut TagStructWriter<'_>, default_sink: &str) {
    w.put_string("pulseaudio");
    w.put_string("16.1");
    w.put_string("mock");
    w.put_string("mock-host");
    w.put_sample_spec(&SampleSpec { format: 3, channels: 2, rate: 44100 });
    w.put_string(default_sink);
    w.put_string("mock.monitor");
    w.put_u32(0x1234);
    w.put_channel_map(&ChannelMap(vec![0, 1]));
}

/// Append a complete sink-info payload with the given name, volumes and
/// mute state (no ports, no formats).
pub fn write_sink_info(w: &mut TagStructWriter<'_>, name: &str, volumes: &[u32], muted: bool) {
    let channels = volumes.len().max(1);
    w.put_u32(0);
    w.put_string(name);
    w.put_string("Mock Output");
    w.put_sample_spec(&SampleSpec { format: 3, channels: channels as u8, rate: 44100 });
    w.put_channel_map(&ChannelMap(vec![0; channels]));
    w.put_u32(0);
    w.put_cvolume(&CVolume(volumes.to_vec()));
    w.put_bool(muted);
    w.put_u32(0);
    w.put_string("mock.monitor");
    w.put_usec(0);
    w.put_string("mock-driver");
    w.put_u32(0);
    w.put_proplist(&BTreeMap::new());
    w.put_usec(0);
    w.put_volume(0x10000);
    w.put_u32(0);
    w.put_u32(0);
    w.put_u32(0);
    w.put_u32(0); // no ports
    w.put_string_null();
    w.put_u8(0); // no formats
}
