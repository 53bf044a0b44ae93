//! Typed publish/subscribe dispatcher shared by every system in the game.
//!
//! Handlers are keyed by the event's type. Publishing is synchronous: every
//! handler registered for the type runs, in registration order, before
//! `publish` returns. The registry lock is only held while the handler list
//! is copied, so a handler may itself publish, subscribe or unsubscribe.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::log::error;

/// A registered listener for events of type `E`.
///
/// Identity is the `Arc` itself: keep a clone around to unsubscribe later.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Anything that can travel over the bus.
pub trait BusEvent: Any + Send + Sync {}

impl<T: Any + Send + Sync> BusEvent for T {}

/// Each entry holds a `Vec<Handler<E>>` for the `E` matching its key.
type HandlerMap = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// Handle to the shared subscription registry.
///
/// Cloning is cheap and every clone talks to the same registry, so the bus can
/// be handed to each service that needs to publish or listen.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<HandlerMap>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, HandlerMap> {
        // Handlers never run under the lock, so a poisoned registry is still consistent.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler` for events of type `E`.
    ///
    /// Registering the same handler twice is allowed and makes it run twice
    /// per publish.
    pub fn subscribe<E: BusEvent>(&self, handler: Handler<E>) {
        let mut registry = self.registry();
        let entry = registry
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Handler<E>>::new()) as Box<dyn Any + Send + Sync>);

        if let Some(list) = entry.downcast_mut::<Vec<Handler<E>>>() {
            list.push(handler);
        }
    }

    /// Register a closure and return the handle needed to unsubscribe it.
    pub fn subscribe_fn<E, F>(&self, listener: F) -> Handler<E>
    where
        E: BusEvent,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let handler: Handler<E> = Arc::new(listener);
        self.subscribe(Arc::clone(&handler));
        handler
    }

    /// Remove one registration of `handler` for `E`. Unknown handlers are ignored.
    pub fn unsubscribe<E: BusEvent>(&self, handler: &Handler<E>) {
        let mut registry = self.registry();
        let Some(list) = registry
            .get_mut(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_mut::<Vec<Handler<E>>>())
        else {
            return;
        };

        if let Some(index) = list.iter().position(|registered| Arc::ptr_eq(registered, handler)) {
            list.remove(index);
        }
    }

    /// Deliver `event` to every handler currently registered for `E`.
    ///
    /// A handler that panics is logged and skipped; the remaining handlers
    /// still run and the panic does not reach the caller.
    pub fn publish<E: BusEvent>(&self, event: E) {
        let handlers = {
            let registry = self.registry();
            match registry
                .get(&TypeId::of::<E>())
                .and_then(|entry| entry.downcast_ref::<Vec<Handler<E>>>())
            {
                Some(list) if !list.is_empty() => list.clone(),
                _ => return,
            }
        };

        for handler in handlers {
            let delivery = panic::catch_unwind(AssertUnwindSafe(|| handler(&event)));
            if let Err(payload) = delivery {
                error!(
                    "Error publishing {} to listener: {}",
                    type_name::<E>(),
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// Number of registrations for `E`, duplicates included.
    pub fn subscriber_count<E: BusEvent>(&self) -> usize {
        self.registry()
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_ref::<Vec<Handler<E>>>())
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.registry().len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Pong;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Ping) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&log);
        let make = move |name: &str| {
            let log = Arc::clone(&shared);
            let name = name.to_string();
            Box::new(move |ping: &Ping| log.lock().unwrap().push(format!("{name}:{}", ping.0)))
                as Box<dyn Fn(&Ping) + Send + Sync>
        };
        (log, make)
    }

    #[test]
    fn publish_reaches_every_handler_in_subscription_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        for name in ["a", "b", "c"] {
            let listener = make(name);
            bus.subscribe_fn(move |ping: &Ping| listener(ping));
        }

        bus.publish(Ping(7));

        assert_eq!(*log.lock().unwrap(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn unsubscribed_handler_is_not_invoked() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let first = make("a");
        let second = make("b");
        let third = make("c");
        bus.subscribe_fn(move |ping: &Ping| first(ping));
        let removed = bus.subscribe_fn(move |ping: &Ping| second(ping));
        bus.subscribe_fn(move |ping: &Ping| third(ping));

        bus.unsubscribe(&removed);
        bus.publish(Ping(1));

        assert_eq!(*log.lock().unwrap(), vec!["a:1", "c:1"]);
        assert_eq!(bus.subscriber_count::<Ping>(), 2);
    }

    #[test]
    fn double_subscription_runs_twice_and_unsubscribes_once() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let handler: Handler<Ping> = Arc::new(move |_: &Ping| *counter.lock().unwrap() += 1);

        bus.subscribe(Arc::clone(&handler));
        bus.subscribe(Arc::clone(&handler));
        bus.publish(Ping(0));
        assert_eq!(*count.lock().unwrap(), 2);

        bus.unsubscribe(&handler);
        bus.publish(Ping(0));
        assert_eq!(*count.lock().unwrap(), 3);
    }

    #[test]
    fn unsubscribing_unknown_handler_is_a_no_op() {
        let bus = EventBus::new();
        let stranger: Handler<Ping> = Arc::new(|_: &Ping| {});

        bus.unsubscribe(&stranger);
        bus.subscribe_fn(|_: &Ping| {});
        bus.unsubscribe(&stranger);

        assert_eq!(bus.subscriber_count::<Ping>(), 1);
    }

    #[test]
    fn panicking_handler_does_not_stop_delivery() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let before = make("before");
        let after = make("after");
        bus.subscribe_fn(move |ping: &Ping| before(ping));
        bus.subscribe_fn(|_: &Ping| panic!("listener exploded"));
        bus.subscribe_fn(move |ping: &Ping| after(ping));

        bus.publish(Ping(3));

        assert_eq!(*log.lock().unwrap(), vec!["before:3", "after:3"]);
    }

    #[test]
    fn events_are_routed_by_type() {
        let bus = EventBus::new();
        let pongs = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&pongs);
        bus.subscribe_fn(move |_: &Pong| *counter.lock().unwrap() += 1);

        bus.publish(Ping(1));
        assert_eq!(*pongs.lock().unwrap(), 0);

        bus.publish(Pong);
        assert_eq!(*pongs.lock().unwrap(), 1);
    }

    #[test]
    fn handlers_may_publish_and_subscribe_reentrantly() {
        let bus = EventBus::new();
        let pongs = Arc::new(Mutex::new(0));

        let inner_bus = bus.clone();
        let counter = Arc::clone(&pongs);
        bus.subscribe_fn(move |_: &Ping| {
            let counter = Arc::clone(&counter);
            inner_bus.subscribe_fn(move |_: &Pong| *counter.lock().unwrap() += 1);
            inner_bus.publish(Pong);
        });

        bus.publish(Ping(0));

        assert_eq!(*pongs.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count::<Pong>(), 1);
    }

    #[test]
    fn handler_added_during_publish_waits_for_next_publish() {
        let bus = EventBus::new();
        let late = Arc::new(Mutex::new(0));

        let inner_bus = bus.clone();
        let counter = Arc::clone(&late);
        bus.subscribe_fn(move |_: &Ping| {
            let counter = Arc::clone(&counter);
            inner_bus.subscribe_fn(move |_: &Ping| *counter.lock().unwrap() += 1);
        });

        bus.publish(Ping(0));
        assert_eq!(*late.lock().unwrap(), 0);

        bus.publish(Ping(0));
        assert_eq!(*late.lock().unwrap(), 1);
    }

    #[test]
    fn clones_share_one_registry() {
        let bus = EventBus::new();
        let other = bus.clone();
        other.subscribe_fn(|_: &Ping| {});

        assert_eq!(bus.subscriber_count::<Ping>(), 1);
    }

    #[test]
    fn concurrent_clones_subscribe_publish_and_unsubscribe() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        const THREADS: usize = 8;
        const PINGS: usize = 100;

        let bus = EventBus::new();
        let total = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&total);
        bus.subscribe_fn(move |_: &Ping| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        std::thread::scope(|scope| {
            for id in 0..THREADS {
                let bus = bus.clone();
                scope.spawn(move || {
                    let own = Arc::new(AtomicUsize::new(0));
                    let seen = Arc::clone(&own);
                    let handler = bus.subscribe_fn(move |_: &Ping| {
                        seen.fetch_add(1, Ordering::SeqCst);
                    });

                    for n in 0..PINGS {
                        bus.publish(Ping((id * PINGS + n) as u32));
                    }
                    bus.unsubscribe(&handler);

                    // At least its own pings, plus whatever other threads sent meanwhile.
                    assert!(own.load(Ordering::SeqCst) >= PINGS);
                });
            }
        });

        assert_eq!(total.load(Ordering::SeqCst), THREADS * PINGS);
        assert_eq!(bus.subscriber_count::<Ping>(), 1);
    }
}
