//! Lights worker configuration.

use std::time::Duration;

use crate::{BULB_COUNT, DEFAULT_FADE_STEPS, DEFAULT_SERVICE_NAME};

/// A lights worker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightsConfig {
    /// The number of bulbs in the controller's bulb array.
    pub bulb_count: u16,
    /// The number of render ticks a bulb needs to fade out.
    pub fade_steps: u32,
    /// How long the worker waits for a next command between two rendered frames.
    ///
    /// Smaller values make bulbs react faster at the cost of more wakeups.
    pub poll_timeout: Duration,
    /// Period of the "Connected" status updates.
    pub status_period: Duration,
    /// Name under which the touchpad introduces itself to the bulb controller.
    pub service_name: String,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            bulb_count: BULB_COUNT,
            fade_steps: DEFAULT_FADE_STEPS,
            poll_timeout: Duration::from_millis(10),
            status_period: Duration::from_secs(1),
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
        }
    }
}

impl LightsConfig {
    #[must_use]
    pub fn with_bulb_count(mut self, bulb_count: u16) -> Self {
        self.bulb_count = bulb_count;
        self
    }

    #[must_use]
    pub fn with_fade_steps(mut self, fade_steps: u32) -> Self {
        self.fade_steps = fade_steps;
        self
    }

    #[must_use]
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    #[must_use]
    pub fn with_status_period(mut self, status_period: Duration) -> Self {
        self.status_period = status_period;
        self
    }

    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }
}
