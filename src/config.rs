use std::env;
use std::time::Duration;
use std::num::NonZeroU32;
use governor::Quota;

#[derive(Clone)]
pub struct Config {
    // Liveness window
    pub heartbeat_timeout_secs: u64,

    // Probe-back verification
    pub probe_timeout_secs: u64,

    // Rate limiting configs
    pub advertise_period_secs: u64,
    pub advertise_burst_limit: u32,
    pub heartbeat_period_secs: u64,
    pub heartbeat_burst_limit: u32,
    pub server_list_period_secs: u64,
    pub server_list_burst_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: 75,
            probe_timeout_secs: 3,
            advertise_period_secs: 60,
            advertise_burst_limit: 30,
            heartbeat_period_secs: 60,
            heartbeat_burst_limit: 100,
            server_list_period_secs: 5,
            server_list_burst_limit: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            heartbeat_timeout_secs: env::var("HEARTBEAT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.heartbeat_timeout_secs),

            probe_timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.probe_timeout_secs),

            advertise_period_secs: env::var("ADVERTISE_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.advertise_period_secs),

            advertise_burst_limit: env::var("ADVERTISE_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.advertise_burst_limit),

            heartbeat_period_secs: env::var("HEARTBEAT_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.heartbeat_period_secs),

            heartbeat_burst_limit: env::var("HEARTBEAT_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.heartbeat_burst_limit),

            server_list_period_secs: env::var("SERVER_LIST_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_list_period_secs),

            server_list_burst_limit: env::var("SERVER_LIST_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_list_burst_limit),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn advertise_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.advertise_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.advertise_burst_limit).unwrap())
    }

    pub fn heartbeat_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.heartbeat_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.heartbeat_burst_limit).unwrap())
    }

    pub fn server_list_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.server_list_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.server_list_burst_limit).unwrap())
    }
}
