//! In-process named event channels.
//!
//! Producers on any thread hold an [`Emitter`] for one channel and push JSON
//! payloads into a queue. The UI thread owns the [`EventBus`], registers
//! callbacks with [`EventBus::listen`] and delivers queued events with
//! [`EventBus::pump`], strictly in arrival order.

pub mod payload;

pub use payload::{CpuStat, Sample, SingleCpu};

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::EventError;

/// One delivery on a named channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub channel: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&Event)>;
type Waker = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    id: ListenerId,
    channel: String,
    /// `None` while the callback is running.
    callback: Option<Callback>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    channels: HashSet<String>,
    listeners: Vec<Listener>,
}

impl Registry {
    fn add(&mut self, channel: &str, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            channel: channel.to_owned(),
            callback: Some(callback),
        });
        id
    }

    /// Hands the removed listener back so the caller can drop it once the
    /// registry is no longer borrowed; its callback may own other guards.
    fn remove(&mut self, id: ListenerId) -> Option<Listener> {
        let index = self.listeners.iter().position(|l| l.id == id)?;
        Some(self.listeners.remove(index))
    }

    fn take_callback(&mut self, id: ListenerId) -> Option<Callback> {
        self.listeners
            .iter_mut()
            .find(|l| l.id == id)
            .and_then(|l| l.callback.take())
    }

    /// Puts a callback back after dispatch. If the listener was released
    /// while its callback ran, the callback is returned to the caller.
    fn restore_callback(&mut self, id: ListenerId, callback: Callback) -> Option<Callback> {
        match self.listeners.iter_mut().find(|l| l.id == id) {
            Some(listener) => {
                listener.callback = Some(callback);
                None
            }
            None => Some(callback),
        }
    }
}

pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    waker: Option<Waker>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            registry: Rc::default(),
            sender,
            receiver,
            waker: None,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus whose emitters call `waker` after every queued event,
    /// typically to request a repaint of the UI.
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            waker: Some(Arc::new(waker)),
            ..Self::default()
        }
    }

    /// Opens `name` for listeners and returns an emitter for it.
    /// Opening an already open channel just hands out another emitter.
    pub fn open_channel(&self, name: &str) -> Emitter {
        if self.registry.borrow_mut().channels.insert(name.to_owned()) {
            debug!("Opened event channel `{name}`");
        }
        Emitter {
            channel: Arc::from(name),
            sender: self.sender.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Closes `name`. Queued and future events on it are discarded; existing
    /// listeners stay registered until their owners release them.
    pub fn close_channel(&self, name: &str) -> bool {
        self.registry.borrow_mut().channels.remove(name)
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.registry.borrow().channels.contains(name)
    }

    /// Registers `callback` for every event on `channel`.
    ///
    /// The listener stays registered for as long as the returned [`Unlisten`]
    /// guard is alive.
    pub fn listen<F>(&self, channel: &str, callback: F) -> Result<Unlisten, EventError>
    where
        F: FnMut(&Event) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        if !registry.channels.contains(channel) {
            return Err(EventError::unavailable(channel));
        }
        let id = registry.add(channel, Box::new(callback));

        Ok(Unlisten {
            id,
            channel: channel.to_owned(),
            registry: Rc::downgrade(&self.registry),
            released: false,
        })
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.channel == channel)
            .count()
    }

    /// Delivers every queued event and returns how many callbacks ran.
    pub fn pump(&self) -> usize {
        let mut calls = 0;
        while let Ok(event) = self.receiver.try_recv() {
            calls += self.dispatch(&event);
        }
        calls
    }

    fn dispatch(&self, event: &Event) -> usize {
        let ids: Vec<ListenerId> = {
            let registry = self.registry.borrow();
            if !registry.channels.contains(&event.channel) {
                debug!("Dropping event for closed channel `{}`", event.channel);
                return 0;
            }
            registry
                .listeners
                .iter()
                .filter(|l| l.channel == event.channel)
                .map(|l| l.id)
                .collect()
        };

        let mut calls = 0;
        for id in ids {
            // The registry must not stay borrowed while user code runs.
            let callback = self.registry.borrow_mut().take_callback(id);
            let Some(mut callback) = callback else {
                continue;
            };
            callback(event);
            calls += 1;
            let orphaned = self.registry.borrow_mut().restore_callback(id, callback);
            drop(orphaned);
        }
        calls
    }
}

/// Sending end of one channel. Cheap to clone and safe to move to another
/// thread.
#[derive(Clone)]
pub struct Emitter {
    channel: Arc<str>,
    sender: Sender<Event>,
    waker: Option<Waker>,
}

impl Emitter {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn emit<T: Serialize>(&self, payload: &T) -> Result<(), EventError> {
        let payload = serde_json::to_value(payload)?;
        self.emit_value(payload)
    }

    pub fn emit_value(&self, payload: Value) -> Result<(), EventError> {
        let event = Event {
            channel: self.channel.to_string(),
            payload,
        };
        self.sender
            .send(event)
            .map_err(|_| EventError::disconnected(&*self.channel))?;

        if let Some(waker) = &self.waker {
            waker();
        }
        Ok(())
    }
}

/// Guard for one registered listener. Releasing happens at most once, either
/// through [`Unlisten::unlisten`] or on drop.
#[must_use = "dropping an Unlisten releases the listener immediately"]
pub struct Unlisten {
    id: ListenerId,
    channel: String,
    registry: Weak<RefCell<Registry>>,
    released: bool,
}

impl Unlisten {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns `false` if the bus was already gone.
    pub fn unlisten(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.borrow_mut().remove(self.id);
        removed.is_some()
    }
}

impl Drop for Unlisten {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Unlisten {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unlisten")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("released", &self.released)
            .finish()
    }
}
