use base64::Engine;
use crowd_monitor::{Config, FrameWriter, Monitor};
use crowd_monitor_data::{DashboardStore, StoreEvent};
use crowd_monitor_shared::{AreaSnapshot, AreaStatus, Detection};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

fn encoded_frame() -> String {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb([0, 0, 0])))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn lobby(frame: Option<String>, density_grid: Option<Vec<Vec<f32>>>) -> AreaSnapshot {
    AreaSnapshot {
        camera_index: 4,
        name: "Lobby".to_string(),
        status: AreaStatus::Warning,
        person_count: 1,
        avg_velocity: 0.5,
        velocity_std: 0.1,
        frame,
        detections: vec![Detection {
            bbox: [4.0, 4.0, 20.0, 20.0],
            track_id: 12,
        }],
        density_grid,
    }
}

#[test]
fn test_config_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "server_url: http://10.0.0.5:9000").unwrap();
    writeln!(file, "reconnect_delay_ms: 500").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.server_url, "http://10.0.0.5:9000");
    assert_eq!(config.reconnect_delay_ms, 500);
    assert_eq!(config.perf_poll_interval_ms, 3000);
    assert!(config.alert_sound);

    let settings = config.session_settings();
    assert_eq!(settings.reconnect_delay, Duration::from_millis(500));
}

#[test]
fn test_zero_poll_interval_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "perf_poll_interval_ms: 0").unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("perf poll interval"));
}

#[test]
fn test_writer_renders_camera_and_density() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FrameWriter::new(dir.path().join("frames")).unwrap();

    let written = writer
        .write_area(&lobby(Some(encoded_frame()), Some(vec![vec![0.9; 4]; 3])))
        .unwrap();

    let camera = image::open(written.camera.unwrap()).unwrap();
    assert_eq!((camera.width(), camera.height()), (32, 24));

    let density = image::open(written.density.unwrap()).unwrap();
    assert_eq!((density.width(), density.height()), (300, 225));
}

#[test]
fn test_lost_signal_removes_stale_views() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FrameWriter::new(dir.path()).unwrap();

    writer
        .write_area(&lobby(Some(encoded_frame()), Some(vec![vec![0.9]])))
        .unwrap();
    assert!(writer.camera_path(4).exists());

    let written = writer.write_area(&lobby(None, None)).unwrap();
    assert_eq!(written.camera, None);
    assert!(!writer.camera_path(4).exists());
    assert!(!writer.density_path(4).exists());
}

#[test]
fn test_undecodable_frame_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FrameWriter::new(dir.path()).unwrap();

    assert!(writer
        .write_area(&lobby(Some("AAAA".to_string()), None))
        .is_err());
}

#[test]
fn test_density_refreshed_when_frame_is_undecodable() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FrameWriter::new(dir.path()).unwrap();

    writer
        .write_area(&lobby(Some(encoded_frame()), Some(vec![vec![0.1]])))
        .unwrap();
    let before = std::fs::read(writer.density_path(4)).unwrap();

    let result = writer.write_area(&lobby(Some("AAAA".to_string()), Some(vec![vec![0.9]])));
    assert!(result.is_err());

    let after = std::fs::read(writer.density_path(4)).unwrap();
    assert_ne!(before, after);
    assert!(!writer.camera_path(4).exists());
}

#[test]
fn test_monitor_renders_on_snapshot_event() {
    let dir = tempfile::tempdir().unwrap();
    let writer = FrameWriter::new(dir.path()).unwrap();
    let mut monitor = Monitor::new(writer);

    let store = DashboardStore::new();
    let areas = vec![lobby(Some(encoded_frame()), None)];
    store.replace_areas(areas.clone(), None);
    monitor.handle_event(&store, StoreEvent::AreasReplaced(Arc::new(areas)));

    assert!(dir.path().join("cam_4.png").exists());
    assert!(!dir.path().join("density_4.png").exists());
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        // Nothing listens here; the session keeps retrying until shutdown
        server_url: "http://127.0.0.1:9".to_string(),
        reconnect_delay_ms: 50,
        output_dir: dir.path().to_path_buf(),
        alert_sound: false,
        ..Default::default()
    };

    let monitor = Monitor::new(FrameWriter::new(&config.output_dir).unwrap());
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        monitor.run(&config, tokio::time::sleep(Duration::from_millis(300))),
    )
    .await
    .expect("monitor did not stop");

    assert!(result.is_ok());
}
