//! WebSocket channels exercised against a served instance with real
//! clients.

#![allow(clippy::panic)]

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}{path}")).await else {
        panic!("websocket connect to {path} failed");
    };
    ws
}

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next()).await;
        let Ok(Some(Ok(message))) = frame else {
            panic!("no frame received");
        };
        if let Message::Text(text) = message {
            let Ok(json) = serde_json::from_str(text.as_str()) else {
                panic!("invalid json frame: {text}");
            };
            return json;
        }
    }
}

async fn send(ws: &mut Client, value: Value) {
    assert_ok!(ws.send(Message::text(value.to_string())).await);
}

fn kind(json: &Value) -> &str {
    json.get("type").and_then(Value::as_str).unwrap_or_default()
}

async fn status_connections(client: &reqwest::Client, addr: SocketAddr) -> Option<Value> {
    let Ok(response) = client.get(format!("http://{addr}/health")).send().await else {
        panic!("health request failed");
    };
    let Ok(json) = response.json::<Value>().await else {
        panic!("health body invalid");
    };
    json.pointer("/connections/status").cloned()
}

async fn serve() -> SocketAddr {
    let config = common::config(1);
    common::serve(common::state(&config)).await
}

#[tokio::test]
async fn status_channel_welcomes_and_routes_telemetry_by_drone() {
    let addr = serve().await;
    let mut follower = connect(addr, "/ws/status").await;
    let mut bystander = connect(addr, "/ws/status").await;

    let welcome = next_json(&mut follower).await;
    assert_eq!(kind(&welcome), "welcome");
    assert!(welcome.get("connectionId").is_some());
    assert_eq!(kind(&next_json(&mut bystander).await), "welcome");

    send(&mut follower, json!({"type": "subscribe", "droneId": "drone-1"})).await;
    let ack = next_json(&mut follower).await;
    assert_eq!(kind(&ack), "subscribed");
    assert_eq!(ack.get("droneId").and_then(Value::as_str), Some("drone-1"));

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/v1/telemetry"))
        .json(&json!({
            "droneId": "drone-1",
            "latitude": 52.37,
            "longitude": 4.89,
            "altitude": 40.0,
            "speed": 8.5,
            "batteryLevel": 71.0
        }))
        .send()
        .await;
    let Ok(response) = response else {
        panic!("telemetry post failed");
    };
    assert_eq!(response.status().as_u16(), 202);

    let update = next_json(&mut follower).await;
    assert_eq!(kind(&update), "status_update");
    assert_eq!(update.get("droneId").and_then(Value::as_str), Some("drone-1"));
    assert_eq!(
        update.pointer("/data/kind").and_then(Value::as_str),
        Some("telemetry")
    );

    // The bystander never subscribed, so it only sees a later error reply.
    send(&mut bystander, json!({"type": "bogus"})).await;
    assert_eq!(kind(&next_json(&mut bystander).await), "error");
}

#[tokio::test]
async fn late_subscriber_gets_latest_telemetry_immediately() {
    let addr = serve().await;
    let client = reqwest::Client::new();
    let posted = client
        .post(format!("http://{addr}/api/v1/telemetry"))
        .json(&json!({
            "droneId": "drone-9",
            "latitude": 1.0,
            "longitude": 2.0,
            "altitude": 3.0,
            "batteryLevel": 50.0
        }))
        .send()
        .await;
    assert_ok!(posted);

    let mut ws = connect(addr, "/ws/status").await;
    assert_eq!(kind(&next_json(&mut ws).await), "welcome");
    send(&mut ws, json!({"type": "subscribe", "droneId": "drone-9"})).await;

    assert_eq!(kind(&next_json(&mut ws).await), "subscribed");
    let snapshot = next_json(&mut ws).await;
    assert_eq!(kind(&snapshot), "status_update");
    assert_eq!(
        snapshot.pointer("/data/batteryLevel").and_then(Value::as_f64),
        Some(50.0)
    );
}

#[tokio::test]
async fn order_channel_snapshot_subscribe_and_updates() {
    let addr = serve().await;
    let client = reqwest::Client::new();

    let created = client
        .post(format!("http://{addr}/api/v1/orders"))
        .json(&json!({
            "customerName": "Lin",
            "deliveryAddress": "12 Pier Rd",
            "productName": "Medicine kit",
            "quantity": 1
        }))
        .send()
        .await;
    let Ok(created) = created else {
        panic!("order create failed");
    };
    assert_eq!(created.status().as_u16(), 201);
    let Ok(order) = created.json::<Value>().await else {
        panic!("order body invalid");
    };
    let Some(order_id) = order.get("id").and_then(Value::as_i64) else {
        panic!("order id missing");
    };

    let mut subscriber = connect(addr, "/ws/orders").await;
    let mut watcher = connect(addr, "/ws/orders").await;

    let all = next_json(&mut subscriber).await;
    assert_eq!(kind(&all), "all_orders_status");
    assert_eq!(all.get("orders").and_then(Value::as_array).map(Vec::len), Some(1));
    assert_eq!(kind(&next_json(&mut watcher).await), "all_orders_status");

    send(&mut subscriber, json!({"type": "subscribe", "orderId": order_id})).await;
    let subscribed = next_json(&mut subscriber).await;
    assert_eq!(kind(&subscribed), "order_subscribed");
    assert_eq!(
        subscribed.pointer("/order/status").and_then(Value::as_str),
        Some("pending")
    );

    let updated = client
        .put(format!("http://{addr}/api/v1/orders/{order_id}/status"))
        .json(&json!({"status": "in_flight"}))
        .send()
        .await;
    let Ok(updated) = updated else {
        panic!("status update failed");
    };
    assert!(updated.status().is_success());

    let update = next_json(&mut subscriber).await;
    assert_eq!(kind(&update), "order_update");
    assert_eq!(
        update.pointer("/order/status").and_then(Value::as_str),
        Some("in_flight")
    );
    let changed = next_json(&mut subscriber).await;
    assert_eq!(kind(&changed), "order_status_changed");

    let notice = next_json(&mut watcher).await;
    assert_eq!(kind(&notice), "order_status_changed");
    assert_eq!(notice.get("previousStatus").and_then(Value::as_str), Some("pending"));
    assert_eq!(notice.get("status").and_then(Value::as_str), Some("in_flight"));
}

#[tokio::test]
async fn closed_clients_are_deregistered() {
    let addr = serve().await;
    let mut ws = connect(addr, "/ws/status").await;
    assert_eq!(kind(&next_json(&mut ws).await), "welcome");

    let client = reqwest::Client::new();
    assert_eq!(status_connections(&client, addr).await, Some(json!(1)));

    assert_ok!(ws.close(None).await);
    drop(ws);

    let mut remaining = None;
    for _ in 0..50 {
        let count = status_connections(&client, addr).await;
        if count == Some(json!(0)) {
            remaining = count;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(remaining, Some(json!(0)));
}
