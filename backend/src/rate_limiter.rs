use std::{
    collections::{HashMap, VecDeque},
    net::IpAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::warn;

use crate::config::config_model::RateLimit;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const UNKNOWN_CALLER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteClass {
    pub name: &'static str,
    pub prefixes: Vec<&'static str>,
    pub limit: usize,
    pub window: Duration,
}

impl RouteClass {
    pub fn new(name: &'static str, prefixes: Vec<&'static str>, limit: usize) -> Self {
        Self {
            name,
            prefixes,
            limit,
            window: DEFAULT_WINDOW,
        }
    }

    fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected { retry_after: Duration },
    /// The path belongs to no route class.
    Unlimited,
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Admission::Rejected { .. })
    }
}

type Key = (String, &'static str);

/// Per-IP sliding-window log, one window per route class.
pub struct RateLimiter {
    classes: Vec<RouteClass>,
    hits: Mutex<HashMap<Key, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Classes are checked in order; the first matching prefix wins.
    pub fn new(classes: Vec<RouteClass>) -> Self {
        Self {
            classes,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimit) -> Self {
        Self::new(vec![
            RouteClass::new("auth", vec!["/api/v1/auth"], config.auth_per_minute),
            RouteClass::new("discord", vec!["/api/v1/discord"], config.discord_per_minute),
            RouteClass::new("admin", vec!["/api/v1/admin"], config.admin_per_minute),
            RouteClass::new(
                "subscriptions",
                vec!["/api/v1/subscriptions/confirm"],
                config.subscriptions_per_minute,
            ),
        ])
    }

    pub fn classify(&self, path: &str) -> Option<&RouteClass> {
        self.classes.iter().find(|class| class.matches(path))
    }

    pub fn admit(&self, caller_ip: &str, path: &str) -> bool {
        self.check_at(caller_ip, path, Instant::now()).is_allowed()
    }

    /// Rejected requests are not recorded.
    pub fn check_at(&self, caller_ip: &str, path: &str, now: Instant) -> Admission {
        let Some(class) = self.classify(path) else {
            return Admission::Unlimited;
        };

        let mut hits = self.hits.lock();
        let log = hits
            .entry((caller_ip.to_string(), class.name))
            .or_default();

        while log
            .front()
            .is_some_and(|hit| now.saturating_duration_since(*hit) >= class.window)
        {
            log.pop_front();
        }

        if log.len() >= class.limit {
            let retry_after = log
                .front()
                .map(|oldest| class.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(class.window);
            warn!(
                caller_ip,
                class = class.name,
                limit = class.limit,
                "rate_limit: request rejected"
            );
            return Admission::Rejected { retry_after };
        }

        log.push_back(now);
        Admission::Admitted
    }

    /// Drops empty or fully expired logs.
    pub fn purge_expired(&self, now: Instant) {
        let windows: HashMap<&'static str, Duration> = self
            .classes
            .iter()
            .map(|class| (class.name, class.window))
            .collect();

        self.hits.lock().retain(|(_, class), log| {
            let window = windows.get(class).copied().unwrap_or(DEFAULT_WINDOW);
            log.back()
                .is_some_and(|last| now.saturating_duration_since(*last) < window)
        });
    }

    pub async fn run_purge_loop(self: Arc<Self>) {
        loop {
            tokio::time::sleep(DEFAULT_WINDOW).await;
            self.purge_expired(Instant::now());
        }
    }
}

/// First `X-Forwarded-For` entry, else the peer address, else `unknown`.
pub fn resolve_caller_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string())
}
