//! Fan-out of compiled rule payloads to everything that wants to know when
//! the text preferences change.

use crate::disposable::Disposable;
use crate::error::{Result, SmartypeError};
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// A receiver of serialized rule payloads.
pub trait PreferenceConsumer: Send {
    /// False once the consumer is gone (closed window, dropped channel).
    fn is_alive(&self) -> bool {
        true
    }

    /// Hand over a payload. An error marks the consumer as gone.
    fn deliver(&mut self, payload: &[u8]) -> Result<()>;
}

impl PreferenceConsumer for Sender<Vec<u8>> {
    fn deliver(&mut self, payload: &[u8]) -> Result<()> {
        self.send(payload.to_vec())
            .map_err(|_| SmartypeError::Other("consumer channel closed".to_string()))
    }
}

/// Adapts a closure into a consumer that is always alive.
pub struct FnConsumer<F>(pub F);

impl<F> PreferenceConsumer for FnConsumer<F>
where
    F: FnMut(&[u8]) -> Result<()> + Send,
{
    fn deliver(&mut self, payload: &[u8]) -> Result<()> {
        (self.0)(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConsumerId(u64);

type ConsumerSlot = Arc<Mutex<Box<dyn PreferenceConsumer>>>;

#[derive(Default)]
pub struct PreferenceHub {
    next_id: u64,
    consumers: BTreeMap<ConsumerId, ConsumerSlot>,
}

pub type SharedHub = Arc<Mutex<PreferenceHub>>;

fn lock(hub: &SharedHub) -> Result<MutexGuard<'_, PreferenceHub>> {
    hub.lock()
        .map_err(|_| SmartypeError::Other("preference hub lock poisoned".to_string()))
}

impl PreferenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedHub {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn register(&mut self, consumer: Box<dyn PreferenceConsumer>) -> ConsumerId {
        let id = ConsumerId(self.next_id);
        self.next_id += 1;
        log::debug!("Registering consumer {:?} for preference changes", id);
        self.consumers.insert(id, Arc::new(Mutex::new(consumer)));
        id
    }

    pub fn unregister(&mut self, id: ConsumerId) -> bool {
        log::debug!("Unregistering consumer {:?}", id);
        self.consumers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Deliver `payload` to every live consumer, dropping the ones that are
    /// gone or fail. Returns how many received it.
    ///
    /// The hub lock is released while consumers run, so a consumer may
    /// register or dispose registrations (its own included) from `deliver`.
    /// A consumer unregistered before its turn is skipped.
    pub fn notify(hub: &SharedHub, payload: &[u8]) -> Result<usize> {
        let targets: Vec<(ConsumerId, ConsumerSlot)> = lock(hub)?
            .consumers
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        let mut delivered = 0;
        let mut gone = Vec::new();

        for (id, slot) in targets {
            if !lock(hub)?.consumers.contains_key(&id) {
                continue;
            }

            let mut consumer = match slot.lock() {
                Ok(consumer) => consumer,
                Err(_) => {
                    log::debug!("Consumer {:?} panicked earlier, removing it", id);
                    gone.push(id);
                    continue;
                }
            };

            if !consumer.is_alive() {
                log::debug!("Consumer {:?} is gone, removing it", id);
                gone.push(id);
                continue;
            }

            match consumer.deliver(payload) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    log::debug!("Consumer {:?} failed ({}), removing it", id, err);
                    gone.push(id);
                }
            }
        }

        if !gone.is_empty() {
            let mut hub = lock(hub)?;
            for id in gone {
                hub.consumers.remove(&id);
            }
        }

        Ok(delivered)
    }
}

/// A consumer's place in a shared hub; disposing it unregisters.
pub struct HubRegistration {
    hub: Weak<Mutex<PreferenceHub>>,
    id: ConsumerId,
    disposed: bool,
}

impl HubRegistration {
    pub fn register(hub: &SharedHub, consumer: Box<dyn PreferenceConsumer>) -> Result<Self> {
        let id = lock(hub)?.register(consumer);

        Ok(Self {
            hub: Arc::downgrade(hub),
            id,
            disposed: false,
        })
    }

    pub fn id(&self) -> ConsumerId {
        self.id
    }
}

impl Disposable for HubRegistration {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut hub) = hub.lock() {
                hub.unregister(self.id);
            }
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct Window {
        destroyed: Arc<AtomicBool>,
        received: Arc<AtomicUsize>,
    }

    impl PreferenceConsumer for Window {
        fn is_alive(&self) -> bool {
            !self.destroyed.load(Ordering::SeqCst)
        }

        fn deliver(&mut self, _: &[u8]) -> Result<()> {
            self.received.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn notify_skips_and_drops_dead_consumers() {
        let hub = PreferenceHub::shared();
        let destroyed = Arc::new(AtomicBool::new(false));
        let received = Arc::new(AtomicUsize::new(0));

        hub.lock().unwrap().register(Box::new(Window {
            destroyed: Arc::clone(&destroyed),
            received: Arc::clone(&received),
        }));
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        hub.lock().unwrap().register(Box::new(tx));

        assert_eq!(PreferenceHub::notify(&hub, b"one").unwrap(), 2);
        assert_eq!(rx.recv().unwrap(), b"one".to_vec());

        destroyed.store(true, Ordering::SeqCst);
        drop(rx);
        assert_eq!(PreferenceHub::notify(&hub, b"two").unwrap(), 0);
        assert!(hub.lock().unwrap().is_empty());
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    /// Runs `notify` on another thread so a lock-up fails the test instead
    /// of hanging it.
    fn notify_with_timeout(hub: &SharedHub, payload: &'static [u8]) -> usize {
        let hub = Arc::clone(hub);
        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = done_tx.send(PreferenceHub::notify(&hub, payload).unwrap());
        });
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn consumer_can_dispose_its_own_registration_while_delivering() {
        let hub = PreferenceHub::shared();
        let own: Arc<Mutex<Option<HubRegistration>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&own);

        let registration = HubRegistration::register(
            &hub,
            Box::new(FnConsumer(move |_: &[u8]| -> Result<()> {
                if let Some(mut registration) = slot.lock().unwrap().take() {
                    registration.dispose();
                }
                Ok(())
            })),
        )
        .unwrap();
        *own.lock().unwrap() = Some(registration);

        assert_eq!(notify_with_timeout(&hub, b"once"), 1);
        assert!(hub.lock().unwrap().is_empty());
        assert_eq!(notify_with_timeout(&hub, b"twice"), 0);
    }

    #[test]
    fn consumer_unregistered_by_an_earlier_one_is_skipped() {
        let hub = PreferenceHub::shared();
        let later: Arc<Mutex<Option<HubRegistration>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&later);

        hub.lock()
            .unwrap()
            .register(Box::new(FnConsumer(move |_: &[u8]| -> Result<()> {
                if let Some(mut registration) = slot.lock().unwrap().take() {
                    registration.dispose();
                }
                Ok(())
            })));
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        *later.lock().unwrap() = Some(HubRegistration::register(&hub, Box::new(tx)).unwrap());

        assert_eq!(notify_with_timeout(&hub, b"payload"), 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.lock().unwrap().len(), 1);
    }

    #[test]
    fn registration_dispose_unregisters() {
        let hub = PreferenceHub::shared();
        let mut registration =
            HubRegistration::register(&hub, Box::new(FnConsumer(|_: &[u8]| -> Result<()> { Ok(()) }))).unwrap();
        assert_eq!(hub.lock().unwrap().len(), 1);

        registration.dispose();
        registration.dispose();
        assert!(hub.lock().unwrap().is_empty());
    }

    #[test]
    fn registration_outliving_hub_is_harmless() {
        let hub = PreferenceHub::shared();
        let mut registration =
            HubRegistration::register(&hub, Box::new(FnConsumer(|_: &[u8]| -> Result<()> { Ok(()) }))).unwrap();
        drop(hub);
        registration.dispose();
        assert!(registration.is_disposed());
    }
}
