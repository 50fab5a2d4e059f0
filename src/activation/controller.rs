use crate::activation::gate::AdmissionGate;
use crate::transport::{default_transport, same_transport, set_default_transport};
use crate::{Client, MockTransport, Settings, Transport};
use log::debug;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{Arc, Mutex};

static CONTROLLER: Lazy<ActivationController> =
    Lazy::new(|| ActivationController::new(*Settings::global()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Inactive,
    /// The mock transport is the process-wide default.
    Active,
    /// The mock transport is installed on a single client.
    ActiveNonDefault,
}

/// A client whose transport was swapped, and what to put back.
struct RedirectedClient {
    client: Client,
    transport: Option<Arc<dyn Transport>>,
}

struct ControllerState {
    mode: Mode,
    /// The default transport to restore on deactivation.
    saved_original: Arc<dyn Transport>,
    redirected: Option<RedirectedClient>,
}

/// Swaps a [`MockTransport`] in place of the real transport, and puts the real one back.
///
/// A mock *session* goes from [`activate`] (or [`activate_non_default`]) to the matching
/// [`deactivate`]. Only one session can be open at a time: activating while another session is
/// open blocks until it is deactivated, and concurrent activations are let in in arrival order.
/// A session can be closed from a different thread than the one that opened it.
///
/// Activating twice without deactivating in between blocks forever, as it would with any
/// non-reentrant lock.
///
/// There is one process-wide controller, [`ActivationController::global`], which is what the
/// free functions at the crate root drive. It is created the first time it is used, capturing
/// the default transport at that point as the one to restore, and is never torn down.
///
/// [`activate`]: ActivationController::activate
/// [`activate_non_default`]: ActivationController::activate_non_default
/// [`deactivate`]: ActivationController::deactivate
pub struct ActivationController {
    mock: Arc<MockTransport>,
    state: Mutex<ControllerState>,
    gate: AdmissionGate,
    settings: Settings,
}

impl ActivationController {
    /// The process-wide controller, configured from the environment.
    pub fn global() -> &'static ActivationController {
        &CONTROLLER
    }

    /// A controller with its own, empty, [`MockTransport`] and its own session queue.
    ///
    /// Beware: it shares the process-wide default transport with every other controller.
    /// Stick to [`activate_non_default`](Self::activate_non_default) unless it is the only
    /// controller in use.
    pub fn new(settings: Settings) -> Self {
        Self {
            mock: Arc::new(MockTransport::new()),
            state: Mutex::new(ControllerState {
                mode: Mode::Inactive,
                saved_original: default_transport(),
                redirected: None,
            }),
            gate: AdmissionGate::new(),
            settings,
        }
    }

    /// Install the mock transport as the process-wide default transport.
    ///
    /// Blocks until any other open session has been deactivated.
    pub fn activate(&self) {
        if self.is_disabled() {
            return;
        }
        self.gate.acquire();

        let mut state = self.state.lock().expect("Poisoned lock!");
        let ambient = default_transport();
        // Never save the mock itself as the transport to restore.
        if !same_transport(&ambient, &self.mock) {
            state.saved_original = ambient;
        }
        set_default_transport(self.mock.clone());
        state.mode = Mode::Active;
        debug!("Mock transport installed as the default transport.");
    }

    /// Install the mock transport on `client` only, leaving the default transport alone.
    ///
    /// Blocks until any other open session has been deactivated.
    pub fn activate_non_default(&self, client: &Client) {
        if self.is_disabled() {
            return;
        }
        self.gate.acquire();

        let mut state = self.state.lock().expect("Poisoned lock!");
        let transport = client.set_transport(Some(self.mock.clone() as Arc<dyn Transport>));
        state.redirected = Some(RedirectedClient {
            client: client.clone(),
            transport,
        });
        state.mode = Mode::ActiveNonDefault;
        debug!("Mock transport installed on a custom client.");
    }

    /// Put back the transport replaced by the last activation and close the session.
    ///
    /// Does nothing if no session is open.
    pub fn deactivate(&self) {
        self.close(false)
    }

    /// [`deactivate`](Self::deactivate), then drop every responder, before the next session is
    /// let in.
    ///
    /// The responders are dropped even if no session is open.
    pub fn deactivate_and_reset(&self) {
        self.close(true)
    }

    fn close(&self, reset: bool) {
        {
            let mut state = self.state.lock().expect("Poisoned lock!");
            if reset {
                self.mock.reset();
            }
            if self.is_disabled() {
                return;
            }
            match state.mode {
                Mode::Inactive => return,
                Mode::Active => {
                    set_default_transport(state.saved_original.clone());
                    debug!("Default transport restored.");
                }
                Mode::ActiveNonDefault => {
                    if let Some(RedirectedClient { client, transport }) = state.redirected.take() {
                        client.set_transport(transport);
                        debug!("Custom client transport restored.");
                    }
                }
            }
            state.mode = Mode::Inactive;
        }

        // Only let the next session in once everything is back in place.
        self.gate.release();
    }

    /// Drop every responder registered on the mock transport.
    ///
    /// It can be called whether a session is open or not.
    pub fn reset(&self) {
        self.with_mock(MockTransport::reset);
    }

    /// Run `f` against the mock transport while holding the controller lock.
    pub(crate) fn with_mock<T>(&self, f: impl FnOnce(&MockTransport) -> T) -> T {
        let _state = self.state.lock().expect("Poisoned lock!");
        f(&self.mock)
    }

    /// The mock transport installed by this controller.
    pub fn mock(&self) -> Arc<MockTransport> {
        self.mock.clone()
    }

    /// The default transport that will be restored on deactivation.
    ///
    /// Outside of a session it is the current default transport, unless something changed it
    /// since the last activation.
    pub fn initial_transport(&self) -> Arc<dyn Transport> {
        self.state
            .lock()
            .expect("Poisoned lock!")
            .saved_original
            .clone()
    }

    /// `true` while a session is open.
    pub fn is_active(&self) -> bool {
        self.state.lock().expect("Poisoned lock!").mode != Mode::Inactive
    }

    /// `true` if activation and deactivation are turned off, see [`Settings::disable`].
    pub fn is_disabled(&self) -> bool {
        self.settings.is_disabled()
    }

    /// How many activations are waiting for the open session to end.
    pub fn pending_activations(&self) -> u64 {
        self.gate.waiters()
    }
}

impl fmt::Debug for ActivationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().expect("Poisoned lock!");
        f.debug_struct("ActivationController")
            .field("mode", &state.mode)
            .field("gate_held", &self.gate.is_held())
            .field("mock", &self.mock)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
