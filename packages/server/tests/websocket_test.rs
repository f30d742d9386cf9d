//! End-to-end tests: a real server on a loopback port driven by WebSocket clients.

use std::{net::SocketAddr, time::Duration};

use filedrop_server::{
    app::build_server,
    domain::{CHUNK_HEADER_LEN, ChunkHeader, MAX_FRAME_LEN, ROOM_CAPACITY},
    ui::TRANSPORT_MAX_MESSAGE_LEN,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE: Duration = Duration::from_millis(200);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral loopback port
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = build_server();
        let handle = tokio::spawn(async move {
            server
                .serve(listener, std::future::pending())
                .await
                .unwrap();
        });
        TestServer { addr, handle }
    }

    fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Helper struct wrapping one WebSocket client
struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.url()).await.unwrap();
        TestClient { stream }
    }

    async fn send_event(&mut self, event: &str, data: Value) {
        let text = json!({"event": event, "data": data}).to_string();
        self.stream.send(Message::text(text)).await.unwrap();
    }

    async fn send_binary(&mut self, frame: Vec<u8>) {
        self.stream.send(Message::binary(frame)).await.unwrap();
    }

    /// Next data frame, skipping control frames
    async fn recv(&mut self) -> Message {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for a message")
                .expect("stream ended")
                .expect("read error");
            match msg {
                Message::Ping(_) | Message::Pong(_) => continue,
                other => return other,
            }
        }
    }

    async fn recv_json(&mut self) -> Value {
        match self.recv().await {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    /// Receive events until one named `event` arrives
    async fn recv_event(&mut self, event: &str) -> Value {
        loop {
            let value = self.recv_json().await;
            if value["event"] == event {
                return value;
            }
        }
    }

    /// Assert nothing arrives for a short while
    async fn expect_silence(&mut self) {
        if let Ok(Some(Ok(msg))) = timeout(SILENCE, self.stream.next()).await {
            panic!("expected no message, got {:?}", msg);
        }
    }

    /// Join `room` as `username` and wait for the acknowledgement
    async fn join(&mut self, room: &str, username: &str) -> Value {
        self.send_event("join-room", json!({"roomId": room, "username": username}))
            .await;
        self.recv_event("room-joined").await
    }

    async fn close(mut self) {
        self.stream.close(None).await.unwrap();
    }
}

fn chunk_frame(file_id: &str, payload: &[u8]) -> Vec<u8> {
    ChunkHeader {
        chunk_index: 3,
        chunk_size: payload.len() as u32,
        is_last: true,
        file_id: file_id.to_string(),
    }
    .encode(payload)
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが 200 と status ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/api/health")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_two_users_join_and_see_each_other() {
    // テスト項目: alice と bob が同じ Room に参加し、互いの参加が通知される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;

    // when (操作):
    let alice_joined = alice.join("abc", "alice").await;
    let bob_joined = bob.join("abc", "bob").await;

    // then (期待する結果):
    assert_eq!(alice_joined["room"], "abc");
    assert_eq!(alice_joined["message"], "Successfully joined room");
    assert_eq!(alice_joined["users"], json!(["alice"]));
    assert_eq!(alice_joined["existingUsers"], json!([]));

    assert_eq!(bob_joined["users"], json!(["alice", "bob"]));
    assert_eq!(bob_joined["existingUsers"], json!(["alice"]));

    let user_joined = alice.recv_json().await;
    assert_eq!(
        user_joined,
        json!({"event": "user-joined", "username": "bob", "room": "abc"})
    );
    let room_users = alice.recv_json().await;
    assert_eq!(room_users["event"], "room-users");
    assert_eq!(room_users["users"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_sixth_user_is_rejected() {
    // テスト項目: 6 人目の参加者は room-full を受け取り、Room に追加されない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut members = Vec::new();
    for i in 0..5 {
        let mut client = TestClient::connect(&server).await;
        client.join("full", &format!("user{}", i)).await;
        members.push(client);
    }
    let mut sixth = TestClient::connect(&server).await;

    // when (操作):
    sixth
        .send_event("join-room", json!({"roomId": "full", "username": "late"}))
        .await;
    let response = sixth.recv_json().await;

    // then (期待する結果):
    assert_eq!(
        response,
        json!({
            "event": "room-full",
            "room": "full",
            "message": "Room is full. Maximum 5 users allowed.",
            "current_users": 5,
            "max_users": 5,
        })
    );

    // 拒否された接続には Room 内の中継が届かない
    members[0]
        .send_event("file-status", json!({"progress": 1}))
        .await;
    let relayed = members[1].recv_event("file-status").await;
    assert_eq!(relayed["senderName"], "user0");
    sixth.expect_silence().await;
}

#[tokio::test]
async fn test_full_room_lists_every_member() {
    // テスト項目: 5 人が参加すると、全員の room-users に 5 人分の異なる表示名が並ぶ
    // given (前提条件):
    let server = TestServer::start().await;
    let mut clients = Vec::new();
    for i in 0..ROOM_CAPACITY {
        let mut client = TestClient::connect(&server).await;
        let joined = client.join("five", &format!("user{}", i)).await;
        clients.push((client, joined));
    }

    // when (操作):
    // 5 人目の参加による room-users が全員に届くまで読み進める
    let mut lists = Vec::new();
    for (client, joined) in clients.iter_mut() {
        let mut users = joined["users"].as_array().unwrap().clone();
        while users.len() < ROOM_CAPACITY {
            let event = client.recv_event("room-users").await;
            users = event["users"].as_array().unwrap().clone();
        }
        lists.push(users);
    }

    // then (期待する結果):
    let expected: Vec<Value> = (0..ROOM_CAPACITY)
        .map(|i| json!(format!("user{}", i)))
        .collect();
    for users in lists {
        let mut sorted = users.clone();
        sorted.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        sorted.dedup();
        assert_eq!(sorted, expected);
    }
}

#[tokio::test]
async fn test_rejected_switch_notifies_previous_room() {
    // テスト項目: 満員の Room への移動が拒否されると、元の Room から退出したことが通知される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut members = Vec::new();
    for i in 0..ROOM_CAPACITY {
        let mut client = TestClient::connect(&server).await;
        client.join("full", &format!("user{}", i)).await;
        members.push(client);
    }
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("home", "alice").await;
    bob.join("home", "bob").await;
    alice.recv_event("room-users").await;

    // when (操作):
    alice
        .send_event("join-room", json!({"roomId": "full", "username": "alice"}))
        .await;

    // then (期待する結果):
    let rejection = alice.recv_event("room-full").await;
    assert_eq!(rejection["room"], "full");
    let left = bob.recv_json().await;
    assert_eq!(
        left,
        json!({"event": "user-left", "username": "alice", "room": "home"})
    );
    let room_users = bob.recv_json().await;
    assert_eq!(room_users["users"], json!(["bob"]));

    // 元の Room の中継はもう届かない
    bob.send_event("file-status", json!({"progress": 7})).await;
    alice.expect_silence().await;
}

#[tokio::test]
async fn test_file_meta_is_relayed_to_others_only() {
    // テスト項目: file-meta は送信元以外に senderName 付きで転送される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;
    alice.recv_event("room-users").await;

    // when (操作):
    let metadata = json!({"fileId": "f1", "name": "a.txt", "size": 10});
    alice
        .send_event("file-meta", json!({"metadata": metadata.clone()}))
        .await;

    // then (期待する結果):
    let relayed = bob.recv_json().await;
    assert_eq!(
        relayed,
        json!({"event": "file-meta", "data": metadata, "senderName": "alice"})
    );
    alice.expect_silence().await;
}

#[tokio::test]
async fn test_file_status_is_relayed() {
    // テスト項目: file-status の progress が data として転送される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;

    // when (操作):
    bob.send_event("file-status", json!({"progress": 42})).await;

    // then (期待する結果):
    let relayed = alice.recv_event("file-status").await;
    assert_eq!(relayed["data"], 42);
    assert_eq!(relayed["senderName"], "bob");
}

#[tokio::test]
async fn test_binary_chunk_is_forwarded_unchanged() {
    // テスト項目: 64 バイトヘッダ + 1024 バイトのフレームがそのまま転送される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    let mut carol = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;
    carol.join("abc", "carol").await;
    alice.recv_event("room-users").await;
    alice.recv_event("room-users").await;
    bob.recv_event("room-users").await;

    let payload: Vec<u8> = (0..1024).map(|i| (i % 251) as u8).collect();
    let frame = chunk_frame("8a1b7c6e-2f3d-4e5a-9b8c-7d6e5f4a3b2c", &payload);
    assert_eq!(frame.len(), CHUNK_HEADER_LEN + 1024);

    // when (操作):
    alice.send_binary(frame.clone()).await;

    // then (期待する結果):
    for peer in [&mut bob, &mut carol] {
        match peer.recv().await {
            Message::Binary(received) => assert_eq!(received.as_ref(), frame.as_slice()),
            other => panic!("expected a binary frame, got {:?}", other),
        }
    }
    alice.expect_silence().await;
}

#[tokio::test]
async fn test_short_binary_frame_is_not_forwarded() {
    // テスト項目: 10 バイトのバイナリフレームは転送されず、送信元の接続も維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;
    alice.recv_event("room-users").await;

    // when (操作):
    alice.send_binary(vec![0u8; 10]).await;

    // then (期待する結果):
    bob.expect_silence().await;
    alice.send_event("test-connection", Value::Null).await;
    let reply = alice.recv_json().await;
    assert_eq!(reply["event"], "test-success");
}

#[tokio::test]
async fn test_oversized_frames_are_dropped_without_closing() {
    // テスト項目: 2 MiB を超え、転送層の上限以下のフレームは破棄されるが接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;
    alice.recv_event("room-users").await;

    let size = 3 << 20;
    assert!(size > MAX_FRAME_LEN && size < TRANSPORT_MAX_MESSAGE_LEN);
    let payload = vec![1u8; size - CHUNK_HEADER_LEN];
    let frame = chunk_frame("8a1b7c6e-2f3d-4e5a-9b8c-7d6e5f4a3b2c", &payload);
    let text = json!({"event": "file-chunk", "data": {"chunk": "x".repeat(size)}}).to_string();

    // when (操作):
    alice.send_binary(frame).await;
    alice.stream.send(Message::text(text)).await.unwrap();

    // then (期待する結果):
    bob.expect_silence().await;
    alice.send_event("test-connection", json!({})).await;
    let reply = alice.recv_json().await;
    assert_eq!(reply["event"], "test-success");
}

#[tokio::test]
async fn test_connection_test_reply() {
    // テスト項目: test-connection に test-success が返る（Room 未参加でも可）
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = TestClient::connect(&server).await;

    // when (操作):
    client.send_event("test-connection", json!({})).await;

    // then (期待する結果):
    let reply = client.recv_json().await;
    assert_eq!(
        reply,
        json!({"event": "test-success", "message": "Connection test successful"})
    );
}

#[tokio::test]
async fn test_unknown_and_malformed_frames_keep_connection_open() {
    // テスト項目: 不正な JSON や未知のイベントを送っても接続は切れない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut client = TestClient::connect(&server).await;

    // when (操作):
    client.stream.send(Message::text("not json")).await.unwrap();
    client.send_event("dance", json!({})).await;
    client.send_event("test-connection", json!({})).await;

    // then (期待する結果):
    let reply = client.recv_json().await;
    assert_eq!(reply["event"], "test-success");
}

#[tokio::test]
async fn test_disconnect_notifies_remaining_members() {
    // テスト項目: 切断した参加者の user-left と room-users が残りの参加者に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("abc", "alice").await;
    bob.join("abc", "bob").await;
    alice.recv_event("room-users").await;

    // when (操作):
    bob.close().await;

    // then (期待する結果):
    let left = alice.recv_json().await;
    assert_eq!(
        left,
        json!({"event": "user-left", "username": "bob", "room": "abc"})
    );
    let room_users = alice.recv_json().await;
    assert_eq!(room_users["users"], json!(["alice"]));
}

#[tokio::test]
async fn test_explicit_leave_and_empty_room_removal() {
    // テスト項目: leave-room で room-left が返り、空になった Room は一覧から消える
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    alice.join("solo", "alice").await;

    // when (操作):
    alice.send_event("leave-room", json!({"roomId": "solo"})).await;

    // then (期待する結果):
    let ack = alice.recv_json().await;
    assert_eq!(ack, json!({"event": "room-left", "room": "solo"}));

    // 空になった Room は削除されているので、次の参加者は最初の参加者になる
    let mut bob = TestClient::connect(&server).await;
    let joined = bob.join("solo", "bob").await;
    assert_eq!(joined["users"], json!(["bob"]));
    assert_eq!(joined["existingUsers"], json!([]));
    alice.expect_silence().await;
}

#[tokio::test]
async fn test_switching_rooms_notifies_previous_room() {
    // テスト項目: 別の Room に移動すると移動元の参加者に user-left が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    alice.join("first", "alice").await;
    bob.join("first", "bob").await;
    alice.recv_event("room-users").await;

    // when (操作):
    let joined = bob.join("second", "bob").await;

    // then (期待する結果):
    assert_eq!(joined["room"], "second");
    assert_eq!(joined["existingUsers"], json!([]));
    let left = alice.recv_json().await;
    assert_eq!(
        left,
        json!({"event": "user-left", "username": "bob", "room": "first"})
    );
    let room_users = alice.recv_json().await;
    assert_eq!(room_users["users"], json!(["alice"]));
}
