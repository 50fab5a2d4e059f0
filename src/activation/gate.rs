use log::debug;
use std::sync::{Condvar, Mutex};

/// Serializes mock sessions across threads.
///
/// A ticket lock: every acquirer takes the next ticket and waits until it is served, so waiters
/// are let in one at a time, in arrival order, with no bound on how many can queue up.
///
/// Unlike a `Mutex` guard, holding the gate is not tied to a scope or to a thread: a session is
/// opened by [`acquire`] and closed by whoever calls [`release`].
///
/// [`acquire`]: AdmissionGate::acquire
/// [`release`]: AdmissionGate::release
#[derive(Debug, Default)]
pub(crate) struct AdmissionGate {
    queue: Mutex<Tickets>,
    turn: Condvar,
}

#[derive(Debug, Default)]
struct Tickets {
    next_ticket: u64,
    now_serving: u64,
}

impl Tickets {
    fn is_held(&self) -> bool {
        self.now_serving != self.next_ticket
    }
}

impl AdmissionGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the gate is ours.
    pub(crate) fn acquire(&self) {
        let mut tickets = self.queue.lock().expect("Poisoned lock!");
        let ticket = tickets.next_ticket;
        tickets.next_ticket += 1;
        if ticket != tickets.now_serving {
            debug!(
                "Another mock session is active, waiting for it to end ({} ahead of us).",
                ticket - tickets.now_serving
            );
        }
        while ticket != tickets.now_serving {
            tickets = self.turn.wait(tickets).expect("Poisoned lock!");
        }
    }

    /// Hand the gate over to the oldest waiter, if any. Does nothing if the gate is not held.
    pub(crate) fn release(&self) {
        let mut tickets = self.queue.lock().expect("Poisoned lock!");
        if !tickets.is_held() {
            return;
        }
        tickets.now_serving += 1;
        if tickets.is_held() {
            debug!("Handing the mock session over to the next waiter.");
            // Every waiter re-checks its own ticket.
            self.turn.notify_all();
        }
    }

    pub(crate) fn is_held(&self) -> bool {
        self.queue.lock().expect("Poisoned lock!").is_held()
    }

    /// How many acquirers are blocked behind the current holder.
    pub(crate) fn waiters(&self) -> u64 {
        let tickets = self.queue.lock().expect("Poisoned lock!");
        (tickets.next_ticket - tickets.now_serving).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn wait_for_waiters(gate: &AdmissionGate, n: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while gate.waiters() != n {
            assert!(Instant::now() < deadline, "waiters never showed up");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn an_idle_gate_is_granted_immediately() {
        let gate = AdmissionGate::new();
        assert!(!gate.is_held());

        gate.acquire();
        assert!(gate.is_held());
        assert_eq!(gate.waiters(), 0);

        gate.release();
        assert!(!gate.is_held());
    }

    #[test]
    fn releasing_an_idle_gate_is_a_no_op() {
        let gate = AdmissionGate::new();
        gate.release();
        gate.release();

        assert!(!gate.is_held());
        gate.acquire();
        assert!(gate.is_held());
    }

    #[test]
    fn a_second_acquirer_waits_for_release() {
        let gate = Arc::new(AdmissionGate::new());
        gate.acquire();

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || {
                gate.acquire();
                tx.send(()).unwrap();
            })
        };

        wait_for_waiters(&gate, 1);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        gate.release();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
        assert!(gate.is_held());
        assert_eq!(gate.waiters(), 0);
    }

    #[test]
    fn waiters_are_served_in_arrival_order() {
        let gate = Arc::new(AdmissionGate::new());
        gate.acquire();

        let (tx, rx) = mpsc::channel();
        let mut handles = Vec::new();
        for id in 0..3u64 {
            let waiter_gate = gate.clone();
            let tx = tx.clone();
            handles.push(thread::spawn(move || {
                waiter_gate.acquire();
                tx.send(id).unwrap();
                waiter_gate.release();
            }));
            // Make sure `id` queues up before `id + 1`.
            wait_for_waiters(&gate, id + 1);
        }

        gate.release();
        let order: Vec<u64> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(order, vec![0, 1, 2]);
        assert!(!gate.is_held());
    }
}
