//! Rendering tests against real encoded frames

use base64::Engine;
use crowd_monitor_renderer::{render_area, render_area_density, CameraView};
use crowd_monitor_shared::{AreaSnapshot, AreaStatus, Detection};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

const BACKGROUND: [u8; 3] = [10, 10, 10];

fn encoded_frame(width: u32, height: u32) -> String {
    let frame = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(frame)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn area(status: AreaStatus, detections: Vec<Detection>) -> AreaSnapshot {
    AreaSnapshot {
        camera_index: 0,
        name: "Lobby".to_string(),
        status,
        person_count: detections.len() as u32,
        avg_velocity: 1.2,
        velocity_std: 0.4,
        frame: Some(encoded_frame(64, 48)),
        detections,
        density_grid: None,
    }
}

fn canvas_of(view: CameraView) -> crowd_monitor_renderer::Canvas {
    match view {
        CameraView::Frame(canvas) => canvas,
        CameraView::NoSignal => panic!("expected a frame"),
    }
}

#[test]
fn test_surface_matches_native_resolution() {
    let canvas = canvas_of(render_area(&area(AreaStatus::Normal, vec![])).unwrap());
    assert_eq!((canvas.width(), canvas.height()), (64, 48));
    assert_eq!(canvas.pixel(32, 24), [10, 10, 10, 255]);
}

#[test]
fn test_boxes_use_status_colour() {
    let detection = Detection {
        bbox: [10.0, 20.0, 30.0, 40.0],
        track_id: 3,
    };

    for (status, rgb) in [
        (AreaStatus::Normal, [0x22, 0xc5, 0x5e]),
        (AreaStatus::Warning, [0xea, 0xb3, 0x08]),
        (AreaStatus::Critical, [0xef, 0x44, 0x44]),
        (AreaStatus::Offline, [0x6b, 0x72, 0x80]),
    ] {
        let canvas = canvas_of(render_area(&area(status, vec![detection])).unwrap());
        assert_eq!(canvas.pixel(10, 30), [rgb[0], rgb[1], rgb[2], 255]);
        assert_eq!(canvas.pixel(20, 30), [10, 10, 10, 255]);
    }
}

#[test]
fn test_stale_boxes_do_not_persist() {
    let first = area(
        AreaStatus::Warning,
        vec![Detection {
            bbox: [5.0, 5.0, 25.0, 25.0],
            track_id: 1,
        }],
    );
    let second = area(
        AreaStatus::Warning,
        vec![Detection {
            bbox: [40.0, 20.0, 60.0, 40.0],
            track_id: -1,
        }],
    );

    let before = canvas_of(render_area(&first).unwrap());
    assert_ne!(before.pixel(5, 15), [10, 10, 10, 255]);

    let after = canvas_of(render_area(&second).unwrap());
    assert_eq!(after.pixel(5, 15), [10, 10, 10, 255]);
    assert_eq!(after.pixel(40, 30), [0xea, 0xb3, 0x08, 255]);
}

#[test]
fn test_density_overlay_on_frame() {
    let mut snapshot = area(AreaStatus::Critical, vec![]);
    snapshot.density_grid = Some(vec![vec![0.05, 1.0], vec![0.0, 0.5]]);

    let canvas = canvas_of(render_area(&snapshot).unwrap());

    // Below 0.1 the frame shows through untouched
    assert_eq!(canvas.pixel(5, 5), [10, 10, 10, 255]);
    assert_eq!(canvas.pixel(5, 40), [10, 10, 10, 255]);

    // Red at a quarter opacity over the dark frame
    let red = canvas.pixel(50, 5);
    assert_eq!(red, [71, 8, 8, 255]);

    let standalone = render_area_density(&snapshot).unwrap();
    assert_eq!((standalone.width(), standalone.height()), (300, 225));
    assert_eq!(standalone.pixel(10, 10)[3], 153);
}

#[test]
fn test_no_grid_means_no_density_map() {
    let mut snapshot = area(AreaStatus::Normal, vec![]);
    assert!(render_area_density(&snapshot).is_none());

    snapshot.density_grid = Some(vec![]);
    assert!(render_area_density(&snapshot).is_none());
}
