//! End-to-end tests: UDP datagrams in, samples and overlay JSON out.

use std::time::Duration;

use futures::StreamExt;
use rallywire::{
    ListenerConfig, OverlayFrame, Rallywire, ReceiverState, TelemetryError, TelemetrySample,
    UpdateRate,
};
use tokio::net::UdpSocket;

const WAIT: Duration = Duration::from_secs(5);

fn sample(time: f32) -> TelemetrySample {
    TelemetrySample { time, speed: 30.0, gear: 4.0, max_gears: 6.0, ..Default::default() }
}

#[tokio::test]
async fn samples_fan_out_to_every_subscriber() {
    let mut listener = Rallywire::listen("127.0.0.1:0").await.unwrap();
    let target = listener.local_addr().unwrap();
    let mut first = listener.subscribe();
    let mut second = listener.subscribe();

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for time in 1..=3 {
        socket.send_to(&sample(time as f32).to_bytes(), target).await.unwrap();
    }

    for subscription in [&mut first, &mut second] {
        for time in 1..=3 {
            let received = tokio::time::timeout(WAIT, subscription.recv()).await.unwrap().unwrap();
            assert_eq!(received, sample(time as f32));
        }
    }

    let stats = listener.stop().await.unwrap().unwrap();
    assert_eq!(stats.published, 3);
    assert_eq!(listener.state(), ReceiverState::Stopped);
}

#[tokio::test]
async fn overlay_json_from_live_datagram() {
    let mut listener = Rallywire::start(&ListenerConfig::with_addr("localhost:0")).await.unwrap();
    let target = listener.local_addr().unwrap();
    let mut frames = listener.subscribe_with_rate(UpdateRate::Native);

    let record =
        TelemetrySample { speed: 42.0, engine_rate: 512.0, max_gears: 6.0, ..Default::default() };
    // localhost may resolve to either loopback family
    let sender_addr = if target.is_ipv4() { "127.0.0.1:0" } else { "[::1]:0" };
    let socket = UdpSocket::bind(sender_addr).await.unwrap();
    socket.send_to(&record.to_bytes(), target).await.unwrap();

    let received = tokio::time::timeout(WAIT, frames.next()).await.unwrap().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&OverlayFrame::from(&received).to_json().unwrap()).unwrap();

    assert_eq!(json["speed"], 42.0);
    assert_eq!(json["rpm"], 512.0);
    assert_eq!(json["maxGears"], 6.0);
    assert_eq!(json["gear"], 0.0);

    listener.stop().await.unwrap();
    assert!(tokio::time::timeout(WAIT, frames.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn stopped_listener_frees_its_port() {
    let mut listener = Rallywire::listen("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    match Rallywire::listen(addr.to_string()).await {
        Err(TelemetryError::Bind { .. }) => {}
        Err(other) => panic!("Expected Bind error, got {other:?}"),
        Ok(_) => panic!("Second listener bound an address already in use"),
    }

    listener.stop().await.unwrap();

    let mut again = Rallywire::listen(addr.to_string()).await.unwrap();
    assert_eq!(again.local_addr(), Some(addr));
    again.stop().await.unwrap();
}
