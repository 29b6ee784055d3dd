//! Bounded, newest-first alert history

use std::collections::VecDeque;

use serde::Serialize;

use crate::data_types::Alert;

/// Maximum number of alerts kept in the log
pub const ALERT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(ALERT_LOG_CAPACITY)
    }
}

impl AlertLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry when full
    pub fn push(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&Alert> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&Alert> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(n: u32) -> Alert {
        Alert {
            area: format!("Area {n}"),
            timestamp: 1_700_000_000.0 + n as f64,
            reason: "Over capacity".to_string(),
            person_count: n,
        }
    }

    #[test]
    fn test_newest_first() {
        let mut log = AlertLog::default();
        log.push(alert(1));
        log.push(alert(2));

        assert_eq!(log.len(), 2);
        assert_eq!(log.newest().unwrap().person_count, 2);
        assert_eq!(log.get(1).unwrap().person_count, 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = AlertLog::default();
        for n in 0..ALERT_LOG_CAPACITY as u32 {
            log.push(alert(n));
        }
        assert_eq!(log.len(), 100);
        assert_eq!(log.get(99).unwrap().person_count, 0);

        log.push(alert(100));
        assert_eq!(log.len(), 100);
        assert_eq!(log.newest().unwrap().person_count, 100);
        assert_eq!(log.get(99).unwrap().person_count, 1);
        assert!(log.iter().all(|a| a.person_count != 0));
    }
}
