//! Observer registry for "updates available" notifications.

use std::sync::mpsc::Sender;

use parking_lot::Mutex;

use cellnet_core::sync::lock_watched;

use super::state::EngineStatus;

/// Published after the worker makes new updates visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notification {
    pub status: EngineStatus,
    /// Entries waiting in the update queue.
    pub pending: usize,
    /// Time steps executed since the engine started.
    pub steps: u64,
}

pub type UpdateCallback = Box<dyn Fn(&Notification) + Send + Sync>;

enum Listener {
    Callback(UpdateCallback),
    Channel(Sender<Notification>),
}

/// Callbacks run on the worker thread and must not register further listeners.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: Mutex<Vec<Listener>>,
}

impl Notifier {
    pub(crate) fn add_callback(&self, callback: UpdateCallback) {
        lock_watched(&self.listeners, "listeners").push(Listener::Callback(callback));
    }

    pub(crate) fn add_channel(&self, sender: Sender<Notification>) {
        lock_watched(&self.listeners, "listeners").push(Listener::Channel(sender));
    }

    /// Delivers `notification` to every listener, dropping channels whose receiver is gone.
    pub(crate) fn notify(&self, notification: &Notification) {
        let mut listeners = lock_watched(&self.listeners, "listeners");
        listeners.retain(|listener| match listener {
            Listener::Callback(callback) => {
                callback(notification);
                true
            }
            Listener::Channel(sender) => sender.send(*notification).is_ok(),
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock_watched(&self.listeners, "listeners").len()
    }
}
