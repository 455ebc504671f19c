//! Recording command queue shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use modemctl::services::{
    modem::{GenericCdma, Modem, ModemInfo, Subsystem},
    serial::{
        CommandQueue, FinalResult, FlashDone, PortSettings, Queued, Reply, Responder,
        TransportError, queued,
    },
};

/// One interaction with the queue, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    Close(String),
    Queue {
        port: String,
        command: String,
        cached: bool,
    },
    Flash {
        port: String,
        millis: u64,
    },
}

impl Call {
    pub fn queue(port: &str, command: &str) -> Self {
        Call::Queue {
            port: port.to_owned(),
            command: command.to_owned(),
            cached: false,
        }
    }

    pub fn cached(port: &str, command: &str) -> Self {
        Call::Queue {
            port: port.to_owned(),
            command: command.to_owned(),
            cached: true,
        }
    }

    pub fn flash(port: &str, millis: u64) -> Self {
        Call::Flash {
            port: port.to_owned(),
            millis,
        }
    }
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(FinalResult),
    Hold,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    open: HashSet<String>,
    failing_opens: HashSet<String>,
    scripts: HashMap<String, Script>,
    held: HashMap<String, Responder<String>>,
}

/// Command queue that answers from a script and records every call.
///
/// Unscripted commands answer with an empty `OK` reply. Commands on ports
/// that are not open fail with `NotOpen`, like the serial queue.
#[derive(Default)]
pub struct MockQueue {
    state: Mutex<State>,
}

impl MockQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, command: &str, reply: &str) {
        self.script(command, Script::Reply(reply.to_owned()));
    }

    pub fn fail(&self, command: &str, result: FinalResult) {
        self.script(command, Script::Fail(result));
    }

    /// Leave `command` unanswered until [`MockQueue::release`].
    pub fn hold(&self, command: &str) {
        self.script(command, Script::Hold);
    }

    pub fn release(&self, command: &str, result: Result<String, TransportError>) {
        let responder = self.state.lock().unwrap().held.remove(command);
        responder
            .unwrap_or_else(|| panic!("{command} is not held"))
            .respond(result);
    }

    pub fn is_held(&self, command: &str) -> bool {
        self.state.lock().unwrap().held.contains_key(command)
    }

    pub fn fail_open(&self, port: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_opens
            .insert(port.to_owned());
    }

    pub fn mark_open(&self, port: &str) {
        self.state.lock().unwrap().open.insert(port.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Queue { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    fn script(&self, command: &str, script: Script) {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(command.to_owned(), script);
    }

    fn submit(&self, port: &str, command: &str, cached: bool) -> Reply {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Queue {
            port: port.to_owned(),
            command: command.to_owned(),
            cached,
        });

        if !state.open.contains(port) {
            return Queued::ready(port, Err(TransportError::NotOpen(port.to_owned())));
        }

        match state.scripts.get(command).cloned() {
            Some(Script::Reply(reply)) => Queued::ready(port, Ok(reply)),
            Some(Script::Fail(result)) => Queued::ready(port, Err(TransportError::Final(result))),
            Some(Script::Hold) => {
                let (responder, handle) = queued(port);
                state.held.insert(command.to_owned(), responder);
                handle
            }
            None => Queued::ready(port, Ok(String::new())),
        }
    }
}

impl CommandQueue for MockQueue {
    fn open(&self, port: &str, _settings: &PortSettings) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Open(port.to_owned()));
        if state.failing_opens.contains(port) {
            return Err(TransportError::OpenFailed {
                port: port.to_owned(),
                reason: "No such device".to_owned(),
            });
        }
        state.open.insert(port.to_owned());
        Ok(())
    }

    fn close(&self, port: &str) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Close(port.to_owned()));
        state.open.remove(port);
    }

    fn is_open(&self, port: &str) -> bool {
        self.state.lock().unwrap().open.contains(port)
    }

    fn queue(&self, port: &str, command: &str, _timeout: Duration) -> Reply {
        self.submit(port, command, false)
    }

    fn queue_cached(&self, port: &str, command: &str, _timeout: Duration) -> Reply {
        self.submit(port, command, true)
    }

    fn flash(&self, port: &str, duration: Duration) -> FlashDone {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::flash(port, duration.as_millis() as u64));
        if state.open.contains(port) {
            Queued::ready(port, Ok(()))
        } else {
            Queued::ready(port, Err(TransportError::NotOpen(port.to_owned())))
        }
    }
}

pub fn info() -> ModemInfo {
    ModemInfo {
        device: "/sys/devices/pci0000:00/usb2/2-1".to_owned(),
        driver: "option".to_owned(),
        plugin: "Generic".to_owned(),
    }
}

/// Generic CDMA modem over `queue` with `ports` claimed in order.
pub fn modem_with_ports(queue: &Arc<MockQueue>, ports: &[&str]) -> Modem {
    let modem = Modem::new(info(), Arc::new(GenericCdma), queue.clone());
    for port in ports {
        modem.grab_port(&Subsystem::Tty, port);
    }
    modem
}

/// Let spawned operation tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
