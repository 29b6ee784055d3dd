//! Audible alert notification
//!
//! Playback is best-effort: any failure is swallowed. The process-wide
//! output is created lazily on the first alert, never at startup.

use crowd_monitor_shared::{CrowdMonitorError, MonitorResult};
use once_cell::sync::OnceCell;
use std::io::{IsTerminal, Write};
use std::time::Duration;

/// Description of a short notification tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub gain: f32,
}

pub const ALERT_TONE: Tone = Tone {
    frequency_hz: 800.0,
    duration: Duration::from_millis(200),
    gain: 0.3,
};

/// A device able to play a tone
pub trait AudioOutput: Send + Sync {
    fn play(&self, tone: &Tone) -> MonitorResult<()>;
}

/// Rings the terminal bell on stderr
pub struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play(&self, _tone: &Tone) -> MonitorResult<()> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| CrowdMonitorError::Audio {
                message: e.to_string(),
            })
    }
}

static OUTPUT: OnceCell<Option<Box<dyn AudioOutput>>> = OnceCell::new();

fn detect_output() -> Option<Box<dyn AudioOutput>> {
    if std::io::stderr().is_terminal() {
        Some(Box::new(TerminalBell))
    } else {
        log::debug!("No audio output available, alerts will be silent");
        None
    }
}

/// Something that reacts to a new alert
pub trait AlertSound: Send + Sync {
    fn play_alert(&self);
}

/// Plays [`ALERT_TONE`] on the lazily detected process-wide output
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBeep;

impl AlertSound for SystemBeep {
    fn play_alert(&self) {
        if let Some(output) = OUTPUT.get_or_init(detect_output) {
            if let Err(e) = output.play(&ALERT_TONE) {
                log::trace!("Alert tone failed: {e}");
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl AlertSound for Muted {
    fn play_alert(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl AudioOutput for Broken {
        fn play(&self, _tone: &Tone) -> MonitorResult<()> {
            Err(CrowdMonitorError::Audio {
                message: "device busy".to_string(),
            })
        }
    }

    #[test]
    fn test_alert_tone() {
        assert_eq!(ALERT_TONE.frequency_hz, 800.0);
        assert_eq!(ALERT_TONE.duration, Duration::from_millis(200));
    }

    #[test]
    fn test_failures_are_errors_not_panics() {
        assert!(Broken.play(&ALERT_TONE).is_err());
        SystemBeep.play_alert();
        Muted.play_alert();
    }

    #[test]
    fn test_output_detected_once_on_first_alert() {
        SystemBeep.play_alert();
        let first = OUTPUT.get().map(|output| output.is_some());
        assert!(first.is_some());

        SystemBeep.play_alert();
        assert_eq!(OUTPUT.get().map(|output| output.is_some()), first);
    }
}
