use pulsegen::broadcast::{ChannelObserver, Snapshot};
use pulsegen::config::{Configuration, TargetAddress};
use pulsegen::engine::TrafficGenerator;
use pulsegen::network::UdpConnector;
use pulsegen::pacing::RunEnd;
use pulsegen::profile::ProfileKind;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

const TICK_BYTES: u64 = 100_000;

fn constant_config(port: u16) -> Configuration {
    Configuration {
        profile: ProfileKind::Constant,
        duration_seconds: 1,
        max_bandwidth_mbps: 8.0,
        target: TargetAddress {
            host: "127.0.0.1".to_string(),
            port,
        },
        packet_size_bytes: 1000,
        ..Default::default()
    }
}

/// Drain datagrams until the sender has been quiet for a while
async fn receive_all(socket: UdpSocket) -> (u64, u64, bool) {
    let mut buf = vec![0u8; 65_536];
    let mut bytes = 0u64;
    let mut packets = 0u64;
    let mut uniform = true;

    let quiet = Duration::from_millis(500);
    while let Ok(Ok((len, _))) = timeout(quiet, socket.recv_from(&mut buf)).await {
        bytes += len as u64;
        packets += 1;
        uniform &= len == 1000;
    }

    (bytes, packets, uniform)
}

#[tokio::test]
async fn test_constant_profile_over_loopback() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = receiver.local_addr().unwrap().port();
    let receive = tokio::spawn(receive_all(receiver));

    let generator = TrafficGenerator::builder()
        .config(constant_config(port))
        .connector(Arc::new(UdpConnector::default()))
        .build();

    let (observer, mut snapshots) = ChannelObserver::channel(64);
    generator.subscribe(Arc::new(observer)).unwrap();

    generator.start().unwrap();
    timeout(Duration::from_secs(3), generator.wait_idle())
        .await
        .expect("run should expire on its own");

    let status = generator.status();
    assert!(!status.is_running);
    assert_eq!(status.last_run_end, Some(RunEnd::Expired));

    // Ten ticks of 100 kB, allowing one tick lost to scheduling
    let sent = status.metrics.total_bytes_sent;
    assert!(
        (9 * TICK_BYTES..=10 * TICK_BYTES).contains(&sent),
        "sent {sent} bytes"
    );
    assert_eq!(status.metrics.total_packets_sent * 1000, sent);
    assert_eq!(status.metrics.current_bandwidth_mbps, 8.0);

    let (received, packets, uniform) = receive.await.unwrap();
    assert!(uniform, "every datagram should carry the configured size");
    assert!(received <= sent);
    assert!(received >= sent / 2, "received only {received} of {sent} bytes");
    assert_eq!(received, packets * 1000);

    // Initial state, then one metrics snapshot per completed tick
    assert!(matches!(snapshots.recv().await, Some(Snapshot::State(_))));
    let mut live = 0;
    while let Ok(snapshot) = snapshots.try_recv() {
        assert!(matches!(snapshot, Snapshot::Metrics(_)));
        live += 1;
    }
    assert!((9..=10).contains(&live), "got {live} live snapshots");
}

#[tokio::test]
async fn test_stop_halts_emission() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = receiver.local_addr().unwrap().port();

    let mut config = constant_config(port);
    config.duration_seconds = 30;

    let generator = TrafficGenerator::builder()
        .config(config)
        .connector(Arc::new(UdpConnector::default()))
        .build();

    generator.start().unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;
    generator.stop();

    let stopped_at = generator.status().metrics.total_bytes_sent;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let status = generator.status();
    assert!(!status.is_running);
    assert_eq!(status.last_run_end, Some(RunEnd::Stopped));
    assert_eq!(status.metrics.total_bytes_sent, stopped_at);
    assert!(stopped_at <= 4 * TICK_BYTES);
}

#[tokio::test]
async fn test_unresolvable_target_ends_run() {
    let mut config = constant_config(9);
    config.target.host = "pulsegen.invalid".to_string();

    let generator = TrafficGenerator::builder()
        .config(config)
        .connector(Arc::new(UdpConnector::default()))
        .build();

    generator.start().unwrap();
    timeout(Duration::from_secs(10), generator.wait_idle())
        .await
        .expect("connect failure should end the run");

    let status = generator.status();
    assert!(matches!(status.last_run_end, Some(RunEnd::TransportFailure(_))));
    assert_eq!(status.metrics.total_bytes_sent, 0);
}
