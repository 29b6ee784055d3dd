//! Writes rendered camera views to disk

use crowd_monitor_renderer::{render_area, render_area_density, CameraView, Canvas};
use crowd_monitor_shared::{AreaSnapshot, CrowdMonitorError, MonitorResult};
use std::path::{Path, PathBuf};

/// What was written for one area
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WrittenViews {
    pub camera: Option<PathBuf>,
    pub density: Option<PathBuf>,
}

pub struct FrameWriter {
    dir: PathBuf,
}

impl FrameWriter {
    /// Creates `dir` if it does not exist yet
    pub fn new(dir: impl Into<PathBuf>) -> MonitorResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| CrowdMonitorError::Output {
            message: format!("cannot create {}: {e}", dir.display()),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn camera_path(&self, camera_index: u32) -> PathBuf {
        self.dir.join(format!("cam_{camera_index}.png"))
    }

    pub fn density_path(&self, camera_index: u32) -> PathBuf {
        self.dir.join(format!("density_{camera_index}.png"))
    }

    /// Re-render one area. A snapshot without a frame removes the stale
    /// camera image so the directory never shows an outdated view. The
    /// density map is written even when the camera frame cannot be decoded;
    /// the decode error is reported afterwards.
    pub fn write_area(&self, area: &AreaSnapshot) -> MonitorResult<WrittenViews> {
        let mut written = WrittenViews::default();

        let density_path = self.density_path(area.camera_index);
        match render_area_density(area) {
            Some(canvas) => {
                save_png(&canvas, &density_path)?;
                written.density = Some(density_path);
            }
            None => remove_stale(&density_path)?,
        }

        let camera_path = self.camera_path(area.camera_index);
        match render_area(area) {
            Ok(CameraView::Frame(canvas)) => {
                save_png(&canvas, &camera_path)?;
                written.camera = Some(camera_path);
            }
            Ok(CameraView::NoSignal) => remove_stale(&camera_path)?,
            Err(e) => {
                remove_stale(&camera_path)?;
                return Err(e);
            }
        }

        Ok(written)
    }
}

fn save_png(canvas: &Canvas, path: &Path) -> MonitorResult<()> {
    canvas
        .image()
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| CrowdMonitorError::Output {
            message: format!("cannot write {}: {e}", path.display()),
        })
}

fn remove_stale(path: &Path) -> MonitorResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CrowdMonitorError::Output {
            message: format!("cannot remove {}: {e}", path.display()),
        }),
    }
}
