//! Change bus: synchronous publish/subscribe for polygon group mutations.
//!
//! Each editor owns its own bus, so two editors never see each other's
//! events. Listeners run synchronously, in subscription order, once per
//! emit; coalescing is left to the subscriber.

use crate::id::GroupId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// What happened to a polygon group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    GroupAdded,
    GroupMoved,
    GroupRemoved,
    VertexAdded,
    VertexMoved,
    VertexRemoved,
    CenterMoved,
    PayloadChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub group: GroupId,
}

/// A subscriber. Identity is the `Rc` allocation, so keep the handle you
/// subscribed with in order to unsubscribe.
pub type Listener = Rc<dyn Fn(&ChangeEvent)>;

/// Cheaply clonable handle; clones share one listener list.
#[derive(Clone, Default)]
pub struct ChangeBus {
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Remove `listener` (matched by reference). Returns `false` when it was
    /// not subscribed.
    pub fn unsubscribe(&self, listener: &Listener) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| same_listener(l, listener)) {
            Some(pos) => {
                listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver one event to every listener.
    ///
    /// Dispatch walks a snapshot of the list, so listeners may subscribe or
    /// unsubscribe (themselves included) while it runs. A listener removed
    /// mid-dispatch is not called afterwards; one added mid-dispatch first
    /// hears the next emit.
    pub fn emit(&self, kind: ChangeKind, group: GroupId) {
        let event = ChangeEvent { kind, group };
        let snapshot: Vec<Listener> = self.listeners.borrow().clone();
        log::trace!("change {kind:?} on {group} -> {} listener(s)", snapshot.len());

        for listener in &snapshot {
            let still_subscribed = self
                .listeners
                .borrow()
                .iter()
                .any(|l| same_listener(l, listener));
            if still_subscribed {
                listener(&event);
            }
        }
    }

    pub fn group_added(&self, group: GroupId) {
        self.emit(ChangeKind::GroupAdded, group);
    }

    pub fn group_moved(&self, group: GroupId) {
        self.emit(ChangeKind::GroupMoved, group);
    }

    pub fn group_removed(&self, group: GroupId) {
        self.emit(ChangeKind::GroupRemoved, group);
    }

    pub fn vertex_added(&self, group: GroupId) {
        self.emit(ChangeKind::VertexAdded, group);
    }

    pub fn vertex_moved(&self, group: GroupId) {
        self.emit(ChangeKind::VertexMoved, group);
    }

    pub fn vertex_removed(&self, group: GroupId) {
        self.emit(ChangeKind::VertexRemoved, group);
    }

    pub fn center_moved(&self, group: GroupId) {
        self.emit(ChangeKind::CenterMoved, group);
    }

    pub fn payload_changed(&self, group: GroupId) {
        self.emit(ChangeKind::PayloadChanged, group);
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Test helper: a listener that records every event it hears.
#[cfg(test)]
pub(crate) fn recorder() -> (Listener, Rc<RefCell<Vec<ChangeEvent>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let listener: Listener = Rc::new(move |e: &ChangeEvent| sink.borrow_mut().push(*e));
    (listener, seen)
}
