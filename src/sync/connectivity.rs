//! Connectivity as an explicit input.
//!
//! The orchestrator never inspects ambient network state; whoever observes
//! connectivity (a platform hook, a probe loop, a test) publishes it here
//! and the orchestrator subscribes. That keeps the offline-to-online
//! transition drivable without a real network.

use tokio::sync::watch;

/// Publisher side of the connectivity signal.
pub struct ConnectivityWatch {
  sender: watch::Sender<bool>,
}

impl ConnectivityWatch {
  pub fn new(initially_online: bool) -> Self {
    let (sender, _) = watch::channel(initially_online);
    Self { sender }
  }

  /// Publish an observation. Repeated identical observations do not wake
  /// subscribers.
  pub fn set_online(&self, online: bool) {
    self.sender.send_if_modified(|current| {
      let changed = *current != online;
      *current = online;
      changed
    });
  }

  pub fn is_online(&self) -> bool {
    *self.sender.borrow()
  }

  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.sender.subscribe()
  }
}

impl Default for ConnectivityWatch {
  fn default() -> Self {
    Self::new(true)
  }
}
