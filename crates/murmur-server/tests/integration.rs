//! End-to-end tests: a real server on an ephemeral port, driven by a
//! `tokio-tungstenite` client, with scripted recognition models.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use murmur_recognition::testing::{ScriptedModel, Step, scripted_registry};
use murmur_server::{MurmurServer, ServerConfig};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start(models: &[Arc<ScriptedModel>], max_message_size: usize) -> (MurmurServer, String) {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        max_message_size,
    };
    let server = MurmurServer::new(config, scripted_registry(models));
    let (addr, _handle) = server.listen().await.expect("listen");
    (server, format!("127.0.0.1:{}", addr.port()))
}

async fn connect(addr: &str) -> Client {
    let (ws, _resp) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect");
    ws
}

async fn send_cmd(ws: &mut Client, cmd: Value) {
    ws.send(Message::Text(cmd.to_string().into())).await.unwrap();
}

async fn send_audio(ws: &mut Client, bytes: &[u8]) {
    ws.send(Message::Binary(bytes.to_vec().into())).await.unwrap();
}

/// Next JSON text frame, skipping control frames.
async fn recv_json(ws: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for reply")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Whether the server ends the connection within the timeout.
async fn closes(ws: &mut Client) -> bool {
    loop {
        match tokio::time::timeout(TIMEOUT, ws.next()).await {
            Err(_) => return false,
            Ok(None | Some(Err(_)) | Some(Ok(Message::Close(_)))) => return true,
            Ok(Some(Ok(Message::Text(_) | Message::Binary(_)))) => return false,
            Ok(Some(Ok(_))) => {}
        }
    }
}

async fn health(addr: &str) -> Value {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    let _ = stream.read_to_string(&mut raw).await.unwrap();
    let body = raw.split("\r\n\r\n").nth(1).unwrap_or_default();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn streaming_and_finalize_conversation() {
    let en = ScriptedModel::new("en");
    en.push_step(Step::Partial(String::new()));
    en.push_step(Step::Partial("hel".into()));
    en.push_step(Step::Complete("hello".into()));
    en.push_final("world");
    let (_server, addr) = start(&[en.clone()], 1 << 23).await;
    let mut ws = connect(&addr).await;

    send_audio(&mut ws, &[0, 0]).await; // blank partial: no reply
    send_audio(&mut ws, &[0, 0, 0]).await;
    assert_eq!(recv_json(&mut ws).await, json!({"partial": "hel"}));

    send_audio(&mut ws, &[0, 0]).await;
    let streamed = recv_json(&mut ws).await;
    assert_eq!(streamed["text"], "hello");
    assert_eq!(streamed["result"][0]["word"], "hello");

    send_cmd(&mut ws, json!({"cmd": "finalize"})).await;
    assert_eq!(recv_json(&mut ws).await["text"], "world");
    assert_eq!(recv_json(&mut ws).await, json!({"full_result": "world"}));

    send_cmd(&mut ws, json!({"cmd": "get_final_results"})).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"cmd": "final_results", "results": ["world"], "full_text": "world", "result_count": 1})
    );

    assert_eq!(en.frames_received()[1], vec![0, 0, 0, 0]);
}

#[tokio::test]
async fn malformed_text_gets_no_reply_and_keeps_connection() {
    let en = ScriptedModel::new("en");
    let (_server, addr) = start(&[en], 1 << 23).await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("definitely not json".to_string().into())).await.unwrap();
    send_cmd(&mut ws, json!({"cmd": "teleport"})).await;
    send_cmd(&mut ws, json!({"cmd": "get_final_results"})).await;

    // The first reply is the dump, proving the bad messages were dropped.
    assert_eq!(recv_json(&mut ws).await["cmd"], "final_results");
}

#[tokio::test]
async fn language_switch_over_the_wire() {
    let en = ScriptedModel::new("en");
    let ru = ScriptedModel::new("ru");
    en.push_final("hello");
    ru.push_final("privet");
    let (_server, addr) = start(&[en, ru], 1 << 23).await;
    let mut ws = connect(&addr).await;

    send_cmd(&mut ws, json!({"cmd": "finalize"})).await;
    let _ = recv_json(&mut ws).await;
    let _ = recv_json(&mut ws).await;

    send_cmd(&mut ws, json!({"cmd": "set_language", "language": "de"})).await;
    let err = recv_json(&mut ws).await;
    assert_eq!(err["status"], "language_error");
    assert_eq!(err["available"], json!(["en", "ru"]));

    send_cmd(&mut ws, json!({"cmd": "set_language", "language": "ru"})).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"status": "language_changed", "language": "ru"})
    );

    send_cmd(&mut ws, json!({"cmd": "finalize"})).await;
    assert_eq!(recv_json(&mut ws).await["text"], "privet");
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"full_result": "hello privet"})
    );
}

#[tokio::test]
async fn sessions_are_isolated() {
    let en = ScriptedModel::new("en");
    en.push_final("first");
    let (_server, addr) = start(&[en], 1 << 23).await;

    let mut a = connect(&addr).await;
    let mut b = connect(&addr).await;

    send_cmd(&mut a, json!({"cmd": "finalize"})).await;
    let _ = recv_json(&mut a).await;
    assert_eq!(recv_json(&mut a).await, json!({"full_result": "first"}));

    send_cmd(&mut b, json!({"cmd": "get_final_results"})).await;
    assert_eq!(recv_json(&mut b).await["result_count"], 0);

    send_cmd(&mut b, json!({"cmd": "set_language", "language": "en"})).await;
    let _ = recv_json(&mut b).await;
    send_cmd(&mut a, json!({"cmd": "get_final_results"})).await;
    assert_eq!(recv_json(&mut a).await["results"], json!(["first"]));
}

#[tokio::test]
async fn reset_clears_the_log() {
    let en = ScriptedModel::new("en");
    en.push_final("gone");
    let (_server, addr) = start(&[en], 1 << 23).await;
    let mut ws = connect(&addr).await;

    send_cmd(&mut ws, json!({"cmd": "finalize"})).await;
    let _ = recv_json(&mut ws).await;
    let _ = recv_json(&mut ws).await;
    send_cmd(&mut ws, json!({"cmd": "reset"})).await;
    send_cmd(&mut ws, json!({"cmd": "get_final_results"})).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"cmd": "final_results", "results": [], "full_text": "", "result_count": 0})
    );
}

#[tokio::test]
async fn health_counts_open_connections() {
    let (_server, addr) = start(&[ScriptedModel::new("en")], 1 << 23).await;
    let mut ws = connect(&addr).await;

    // Round-trip once so the session is fully registered.
    send_cmd(&mut ws, json!({"cmd": "get_final_results"})).await;
    let _ = recv_json(&mut ws).await;

    let body = health(&addr).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 1);
    assert_eq!(body["default_language"], "en");
}

#[tokio::test]
async fn oversized_message_ends_connection() {
    let (_server, addr) = start(&[ScriptedModel::new("en")], 1024).await;
    let mut ws = connect(&addr).await;

    let _ = ws.send(Message::Binary(vec![0u8; 4096].into())).await;
    assert!(closes(&mut ws).await);
}

#[tokio::test]
async fn shutdown_closes_open_sessions() {
    let (server, addr) = start(&[ScriptedModel::new("en")], 1 << 23).await;
    let mut ws = connect(&addr).await;

    send_cmd(&mut ws, json!({"cmd": "get_final_results"})).await;
    let _ = recv_json(&mut ws).await;

    server.shutdown().shutdown();
    assert!(closes(&mut ws).await);
}
