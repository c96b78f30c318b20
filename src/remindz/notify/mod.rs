//! # Notifications
//!
//! The [`Notifier`] turns a due reminder into exactly one user-visible
//! notification. It owns two things:
//!
//! - a bounded [`DedupCache`] of recently delivered [`NotificationKey`]s, so a
//!   double firing of the same occurrence is dropped
//! - a [`NotificationChannel`] that does the actual delivery
//!
//! ## Channels
//!
//! Two kinds of channel exist and they handle permission differently:
//!
//! - **Native** ([`desktop::DesktopChannel`]): the platform notifier command.
//!   Permission is requested before every delivery.
//! - **Terminal** ([`terminal::TerminalChannel`]): prints to the controlling
//!   terminal. Permission is checked first and only requested while it is
//!   still undecided; once denied it stays denied.
//!
//! [`select_channel`] picks one from the configured [`NotifierMode`].

use crate::config::NotifierMode;
use crate::error::Result;
use crate::model::ReminderId;
use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};

pub mod desktop;
pub mod terminal;

pub use desktop::DesktopChannel;
pub use terminal::TerminalChannel;

/// Identity of one occurrence of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub reminder_id: ReminderId,
    pub occurrence: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: NotificationKey,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; asking may still grant it.
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Native,
    Terminal,
}

pub trait NotificationChannel {
    fn kind(&self) -> ChannelKind;

    /// Current permission without asking.
    fn permission(&self) -> Permission;

    /// Ask for permission, remembering the answer.
    fn request_permission(&mut self) -> Result<Permission>;

    fn deliver(&mut self, notification: &Notification) -> Result<()>;
}

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Key already notified; the channel was not touched.
    Suppressed,
    PermissionDenied,
    Failed(String),
}

impl Delivery {
    /// True when delivery was tried, whatever its result.
    pub fn attempted(&self) -> bool {
        !matches!(self, Delivery::Suppressed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Delivery::Delivered => "delivered",
            Delivery::Suppressed => "suppressed",
            Delivery::PermissionDenied => "permission-denied",
            Delivery::Failed(_) => "failed",
        }
    }
}

/// Set of recently seen keys, evicting the oldest past `capacity`.
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    order: VecDeque<NotificationKey>,
    seen: HashSet<NotificationKey>,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.seen.contains(key)
    }

    /// Record `key`. Returns false if it was already present.
    pub fn insert(&mut self, key: NotificationKey) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub struct Notifier<C: NotificationChannel> {
    channel: C,
    seen: DedupCache,
}

impl<C: NotificationChannel> Notifier<C> {
    pub fn new(channel: C, dedup_capacity: usize) -> Self {
        Self {
            channel,
            seen: DedupCache::new(dedup_capacity),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn notify(&mut self, notification: &Notification) -> Delivery {
        if !self.seen.insert(notification.key) {
            tracing::debug!(
                id = notification.key.reminder_id,
                occurrence = %notification.key.occurrence,
                "duplicate notification suppressed"
            );
            return Delivery::Suppressed;
        }

        let permission = match self.resolve_permission() {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "permission request failed");
                return Delivery::Failed(e.to_string());
            }
        };
        if permission != Permission::Granted {
            tracing::warn!(
                id = notification.key.reminder_id,
                "notification permission not granted"
            );
            return Delivery::PermissionDenied;
        }

        match self.channel.deliver(notification) {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                tracing::error!(error = %e, id = notification.key.reminder_id, "delivery failed");
                Delivery::Failed(e.to_string())
            }
        }
    }

    fn resolve_permission(&mut self) -> Result<Permission> {
        match self.channel.kind() {
            ChannelKind::Native => self.channel.request_permission(),
            ChannelKind::Terminal => match self.channel.permission() {
                Permission::Prompt => self.channel.request_permission(),
                decided => Ok(decided),
            },
        }
    }
}

/// Either production channel, chosen at startup.
pub enum AnyChannel {
    Desktop(DesktopChannel),
    Terminal(TerminalChannel),
}

impl NotificationChannel for AnyChannel {
    fn kind(&self) -> ChannelKind {
        match self {
            AnyChannel::Desktop(c) => c.kind(),
            AnyChannel::Terminal(c) => c.kind(),
        }
    }

    fn permission(&self) -> Permission {
        match self {
            AnyChannel::Desktop(c) => c.permission(),
            AnyChannel::Terminal(c) => c.permission(),
        }
    }

    fn request_permission(&mut self) -> Result<Permission> {
        match self {
            AnyChannel::Desktop(c) => c.request_permission(),
            AnyChannel::Terminal(c) => c.request_permission(),
        }
    }

    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        match self {
            AnyChannel::Desktop(c) => c.deliver(notification),
            AnyChannel::Terminal(c) => c.deliver(notification),
        }
    }
}

/// Pick the delivery channel for this process.
///
/// `Auto` prefers the desktop notifier when a graphical session and a notifier
/// command are present. A forced `Desktop` without a notifier falls back to
/// the terminal with a warning.
pub fn select_channel(mode: NotifierMode) -> AnyChannel {
    match mode {
        NotifierMode::Terminal => AnyChannel::Terminal(TerminalChannel::granted()),
        NotifierMode::Desktop => match DesktopChannel::detect() {
            Some(c) => AnyChannel::Desktop(c),
            None => {
                tracing::warn!("no desktop notifier found, using the terminal");
                AnyChannel::Terminal(TerminalChannel::granted())
            }
        },
        NotifierMode::Auto => match DesktopChannel::detect() {
            Some(c) => AnyChannel::Desktop(c),
            None => AnyChannel::Terminal(TerminalChannel::new()),
        },
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::error::RemindzError;

    /// Channel that records deliveries instead of showing them.
    pub struct RecordingChannel {
        pub kind: ChannelKind,
        pub permission: Permission,
        /// Answer given when permission is requested.
        pub grant_on_request: bool,
        pub fail_delivery: bool,
        pub permission_requests: usize,
        pub delivered: Vec<Notification>,
    }

    impl RecordingChannel {
        pub fn native() -> Self {
            Self {
                kind: ChannelKind::Native,
                permission: Permission::Prompt,
                grant_on_request: true,
                fail_delivery: false,
                permission_requests: 0,
                delivered: Vec::new(),
            }
        }

        pub fn terminal(permission: Permission) -> Self {
            Self {
                kind: ChannelKind::Terminal,
                permission,
                ..Self::native()
            }
        }

        pub fn denying(mut self) -> Self {
            self.grant_on_request = false;
            self
        }

        pub fn failing(mut self) -> Self {
            self.fail_delivery = true;
            self
        }
    }

    impl NotificationChannel for RecordingChannel {
        fn kind(&self) -> ChannelKind {
            self.kind
        }

        fn permission(&self) -> Permission {
            self.permission
        }

        fn request_permission(&mut self) -> Result<Permission> {
            self.permission_requests += 1;
            self.permission = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
            Ok(self.permission)
        }

        fn deliver(&mut self, notification: &Notification) -> Result<()> {
            if self.fail_delivery {
                return Err(RemindzError::Notify("channel unavailable".to_string()));
            }
            self.delivered.push(notification.clone());
            Ok(())
        }
    }
}
