//! Multiplexer tests: tag matching, teardown, backpressure surfaces.

use std::{collections::HashSet, time::Duration};

use pavane_core::{Client, ClientError, ConnectionState};
use pavane_harness::{
    MockConn, MockServer, cookie_file, test_config, wait_for_state, write_server_info,
};
use pavane_proto::Command;
use tempfile::NamedTempFile;

async fn serving_client(retry: Duration) -> (MockServer, MockConn, Client, NamedTempFile) {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let client = Client::new(test_config(&server, &cookie));
    client.connect(retry);

    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();
    wait_for_state(&client, ConnectionState::Serving).await;
    (server, conn, client, cookie)
}

#[tokio::test]
async fn out_of_order_replies_reach_their_callers() {
    let (_server, mut conn, client, _cookie) = serving_client(Duration::from_secs(60)).await;

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (command, first_tag, _args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::GetServerInfo.to_u32());

    let second = tokio::spawn({
        let client = client.clone();
        async move { client.modules().await }
    });
    let (command, second_tag, _args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::GetModuleInfoList.to_u32());
    assert_ne!(first_tag, second_tag);

    // Reply to the second request before the first.
    conn.reply(second_tag, |_| {}).await.unwrap();
    conn.reply(first_tag, |w| write_server_info(w, "mock-sink")).await.unwrap();

    let modules = second.await.unwrap().unwrap();
    assert!(modules.is_empty());
    let info = first.await.unwrap().unwrap();
    assert_eq!(info.default_sink, "mock-sink");

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn concurrent_requests_each_get_their_own_reply() {
    let (_server, mut conn, client, _cookie) = serving_client(Duration::from_secs(60)).await;

    // Issue requests one at a time so the n-th wire tag belongs to the
    // n-th caller, then answer them all in reverse order.
    let mut callers = Vec::new();
    let mut tags = Vec::new();
    for _ in 0..8 {
        let handle = tokio::spawn({
            let client = client.clone();
            async move { client.server_info().await }
        });
        let (command, tag, _args) = conn.read_request().await.unwrap();
        assert_eq!(command, Command::GetServerInfo.to_u32());
        callers.push(handle);
        tags.push(tag);
    }

    let unique: HashSet<u32> = tags.iter().copied().collect();
    assert_eq!(unique.len(), tags.len(), "pending tags must be unique");

    for (i, tag) in tags.iter().enumerate().rev() {
        let sink = format!("sink-{i}");
        conn.reply(*tag, move |w| write_server_info(w, &sink)).await.unwrap();
    }

    for (i, caller) in callers.into_iter().enumerate() {
        let info = caller.await.unwrap().unwrap();
        assert_eq!(info.default_sink, format!("sink-{i}"), "caller {i} got a foreign reply");
    }

    // No pending entries remain: the next exchange runs clean.
    let follow_up = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_, tag, _) = conn.read_request().await.unwrap();
    conn.reply(tag, |w| write_server_info(w, "after")).await.unwrap();
    assert_eq!(follow_up.await.unwrap().unwrap().default_sink, "after");

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn unknown_reply_tag_tears_down_and_releases_waiters() {
    let (server, mut conn, client, _cookie) = serving_client(Duration::from_millis(50)).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_command, tag, _args) = conn.read_request().await.unwrap();

    // Reply with a tag that was never allocated.
    conn.reply(tag.wrapping_add(1000), |w| write_server_info(w, "nope")).await.unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::Closed), "waiter must observe client-closed, got {err}");
    conn.expect_eof().await;

    // The lifecycle recovers: a fresh connection is dialed and served.
    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();
    wait_for_state(&client, ConnectionState::Serving).await;

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn oversize_frame_tears_down_and_releases_waiters() {
    let (server, mut conn, client, _cookie) = serving_client(Duration::from_millis(50)).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_command, _tag, _args) = conn.read_request().await.unwrap();

    // A descriptor declaring 16 MiB + 1 of body.
    let mut raw = Vec::new();
    raw.extend_from_slice(&(16 * 1024 * 1024 + 1u32).to_be_bytes());
    raw.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
    raw.extend_from_slice(&[0u8; 12]);
    conn.send_raw(&raw).await.unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::Closed), "waiter must observe client-closed, got {err}");
    conn.expect_eof().await;

    // Reconnect proves the lifecycle survived the oversize frame.
    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();
    wait_for_state(&client, ConnectionState::Serving).await;

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn unexpected_response_command_is_surfaced_without_teardown() {
    let (_server, mut conn, client, _cookie) = serving_client(Duration::from_secs(60)).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_command, tag, _args) = conn.read_request().await.unwrap();

    // Neither REPLY nor ERROR.
    conn.send_frame(Command::Request, tag, |_| {}).await.unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedCommand { code: 61 }), "got {err}");

    // The connection keeps serving.
    let follow_up = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_, tag, _) = conn.read_request().await.unwrap();
    conn.reply(tag, |w| write_server_info(w, "still-alive")).await.unwrap();
    assert_eq!(follow_up.await.unwrap().unwrap().default_sink, "still-alive");

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn server_errors_carry_command_and_code() {
    let (_server, mut conn, client, _cookie) = serving_client(Duration::from_secs(60)).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.set_default_sink("missing").await }
    });
    let (command, tag, _args) = conn.read_request().await.unwrap();
    assert_eq!(command, Command::SetDefaultSink.to_u32());

    conn.error(tag, 5).await.unwrap(); // no such entity

    let err = pending.await.unwrap().unwrap_err();
    match err {
        ClientError::Server { command, code } => {
            assert_eq!(command, Command::SetDefaultSink);
            assert_eq!(code, 5);
        },
        other => panic!("expected a server error, got {other}"),
    }
    assert_eq!(
        err_string(&client, &mut conn).await,
        "pulse audio error: SetDefaultSink -> No such entity"
    );

    client.close();
    client.closed().await;
}

// Repeat the error exchange and render the message; keeps the assertion
// on the display format close to the scenario that produces it.
async fn err_string(client: &Client, conn: &mut MockConn) -> String {
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.set_default_sink("missing").await }
    });
    let (_, tag, _) = conn.read_request().await.unwrap();
    conn.error(tag, 5).await.unwrap();
    pending.await.unwrap().unwrap_err().to_string()
}

#[tokio::test]
async fn late_replies_for_timed_out_requests_are_discarded() {
    let server = MockServer::bind().await.unwrap();
    let cookie = cookie_file();
    let mut config = test_config(&server, &cookie);
    config.request_timeout = Some(Duration::from_millis(100));
    let client = Client::new(config);
    client.connect(Duration::from_secs(60));

    let mut conn = server.accept().await.unwrap();
    conn.handshake().await.unwrap();
    wait_for_state(&client, ConnectionState::Serving).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_command, tag, _args) = conn.read_request().await.unwrap();

    // Sit on the reply until the caller's deadline has passed.
    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::Timeout), "got {err}");

    // The late reply resolves the abandoned entry and is discarded; it
    // must not count as an unknown tag and tear the connection down.
    conn.reply(tag, |w| write_server_info(w, "late")).await.unwrap();

    let follow_up = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_, tag, _) = conn.read_request().await.unwrap();
    conn.reply(tag, |w| write_server_info(w, "fresh")).await.unwrap();
    assert_eq!(follow_up.await.unwrap().unwrap().default_sink, "fresh");

    client.close();
    client.closed().await;
}

#[tokio::test]
async fn close_releases_in_flight_requests() {
    let (_server, mut conn, client, _cookie) = serving_client(Duration::from_secs(60)).await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.server_info().await }
    });
    let (_command, _tag, _args) = conn.read_request().await.unwrap();

    client.close();
    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::Closed));
    client.closed().await;

    // After shutdown, new submissions fail fast with the closed error.
    let err = client.server_info().await.unwrap_err();
    assert!(matches!(err, ClientError::Closed));
}
