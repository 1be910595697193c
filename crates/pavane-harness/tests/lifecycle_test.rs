//! Lifecycle tests: dialing, authentication and identification.

use std::time::Duration;

use pavane_core::{Client, ConnectionState};
use pavane_harness::{
    MockServer, cookie_file, cookie_file_with_len, test_config, wait_for_state,
};
use pavane_proto::{Command, TagStructReader};

const RETRY: Duration = Duration::from_secs(60);

#[tokio::test]
async fn handshake_reaches_serving() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(RETRY);

    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();

    wait_for_state(&client, ConnectionState::Serving).await;
    assert_eq!(client.client_index(), 1);

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn auth_sends_version_and_cookie() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(RETRY);

    let mut conn = server.accept().await.unwrap();
    let (command, tag, args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::Auth.to_u32());

    let mut ts = TagStructReader::new(&args);
    assert_eq!(ts.read_u32().unwrap(), 32, "client protocol version");
    let sent_cookie = ts.read_arbitrary().unwrap();
    assert_eq!(sent_cookie.len(), 256);
    assert!(ts.is_empty());

    conn.reply(tag, |w| w.put_u32(pavane_harness::SERVER_VERSION_REPLY)).await.unwrap();

    // identification carries at least the mandatory properties
    let (command, tag, args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::SetClientName.to_u32());
    let mut ts = TagStructReader::new(&args);
    let props = ts.read_proplist().unwrap();
    assert!(props.contains_key("application.name"));
    assert!(props.contains_key("application.process.id"));
    assert!(props.contains_key("application.process.binary"));
    assert_eq!(props.get("application.language").map(String::as_str), Some("en_US.UTF-8"));
    conn.reply(tag, |w| w.put_u32(7)).await.unwrap();

    wait_for_state(&client, ConnectionState::Serving).await;
    assert_eq!(client.client_index(), 7);

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn auth_rejects_pre_v32_server() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(RETRY);

    let mut conn = server.accept().await.unwrap();
    let (command, tag, _args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::Auth.to_u32());
    conn.reply(tag, |w| w.put_u32(0x0001_0000 | 31)).await.unwrap();

    // The iteration fails before identification: no SET_CLIENT_NAME, the
    // socket closes, and the lifecycle never reaches Serving.
    conn.expect_eof().await;
    let status = client.status();
    assert_ne!(*status.borrow(), ConnectionState::Serving);

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn version_flags_in_the_high_half_are_masked_off() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(RETRY);

    let mut conn = server.accept().await.unwrap();
    // memfd/shm capability flags set, version exactly 32
    conn.handshake_with_version(0xDEAD_0000 | 32).await.unwrap();

    wait_for_state(&client, ConnectionState::Serving).await;
    client.close();
    client.closed().await;
}

#[tokio::test]
async fn wrong_cookie_length_fails_before_sending_bytes() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file_with_len(100);
    let client = Client::new(test_config(&server, &cookie));
    client.connect(RETRY);

    // The client dials but aborts authentication before writing AUTH.
    let mut conn = server.accept().await.unwrap();
    conn.expect_eof().await;

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn lifecycle_reconnects_after_a_failed_iteration() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(Duration::from_millis(50));

    // First iteration: kill the connection before replying to AUTH.
    let conn = server.accept().await.unwrap();
    drop(conn);

    // Second iteration arrives after the retry interval and succeeds.
    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();
    wait_for_state(&client, ConnectionState::Serving).await;

    client.close();
    client.closed().await;
}
