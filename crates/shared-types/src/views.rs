//! Derived views over the current snapshot set. Pure functions, no state.

use serde::Serialize;

use crate::data_types::{AreaSnapshot, AreaStatus};

/// The "System Overview" card
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SystemOverview {
    pub active_cameras: usize,
    pub total_persons: u64,
    pub critical_areas: usize,
}

impl SystemOverview {
    pub fn from_areas(areas: &[AreaSnapshot]) -> Self {
        Self {
            active_cameras: areas
                .iter()
                .filter(|a| a.status != AreaStatus::Offline)
                .count(),
            total_persons: areas.iter().map(|a| u64::from(a.person_count)).sum(),
            critical_areas: areas
                .iter()
                .filter(|a| a.status == AreaStatus::Critical)
                .count(),
        }
    }
}

/// One status card per area
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AreaCard {
    pub camera_index: u32,
    pub name: String,
    pub status: AreaStatus,
    pub label: &'static str,
    pub person_count: u32,
    pub avg_velocity: f64,
    pub chaos_index: f64,
    /// Critical cards pulse in the dashboard
    pub highlighted: bool,
}

impl From<&AreaSnapshot> for AreaCard {
    fn from(area: &AreaSnapshot) -> Self {
        Self {
            camera_index: area.camera_index,
            name: area.name.clone(),
            status: area.status,
            label: area.status.label(),
            person_count: area.person_count,
            avg_velocity: area.avg_velocity,
            chaos_index: area.velocity_std,
            highlighted: area.status == AreaStatus::Critical,
        }
    }
}

pub fn area_cards(areas: &[AreaSnapshot]) -> Vec<AreaCard> {
    areas.iter().map(AreaCard::from).collect()
}
