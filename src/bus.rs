//! The signal bus connecting the window shell to the subsystems that actually
//! speak the radio protocol, store messages, and move files.
//!
//! Two kinds of traffic, kept as distinct static types so a blocking call can
//! never hide inside a notification:
//!
//! * [`Event`]s are fire-and-forget. Any number of handlers (including zero)
//!   may be subscribed; `publish` runs them synchronously in registration
//!   order on the calling context and returns nothing.
//! * [`Request`]s are request-reply. Exactly one responder per
//!   [`RequestKind`]; `call` runs it and hands its [`Reply`] back to the
//!   caller. Registering a second responder for a kind, or calling with none
//!   registered, is a deterministic [`BusError`].
//!
//! The bus is single-threaded. Handlers are expected to be in-memory lookups
//! and must not publish or call on the same bus re-entrantly.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt,
};

pub type PortId = String;
pub type StationId = String;

#[derive(Debug, Clone, strum_macros::Display)]
pub enum Event {
    /// The preferences editor saved changes; subsystems should re-read config.
    ConfigChanged,

    /// Center the map window on a station.
    ShowMapStation { station: StationId },

    /// Ping a station on a given port.
    PingStation { station: StationId, port: PortId },

    /// Send a chat payload out over the radio.
    UserSendChat {
        group: String,
        port: PortId,
        text: String,
        broadcast: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum RequestKind {
    StationList,
    ChatPort,
}

#[derive(Debug, Clone)]
pub enum Request {
    /// The currently-heard stations, keyed by port.
    StationList,

    /// The port the chat tab is currently speaking on.
    ChatPort,
}

impl Request {
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::StationList => RequestKind::StationList,
            Self::ChatPort => RequestKind::ChatPort,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    StationList(BTreeMap<PortId, Vec<StationId>>),
    ChatPort(PortId),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("no responder registered for {0}")]
    NoResponder(RequestKind),

    #[error("a responder is already registered for {0}")]
    DuplicateResponder(RequestKind),

    #[error("responder for {0} returned a mismatched reply")]
    ReplyMismatch(RequestKind),
}

type EventHandler = Box<dyn FnMut(&Event)>;
type Responder = Box<dyn FnMut(&Request) -> Reply>;

#[derive(Default)]
pub struct SignalBus {
    handlers: RefCell<Vec<EventHandler>>,
    responders: RefCell<HashMap<RequestKind, Responder>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a fire-and-forget handler. Handlers run in registration
    /// order, synchronously, every time an event is published.
    pub fn subscribe(&self, handler: impl FnMut(&Event) + 'static) {
        self.handlers.borrow_mut().push(Box::new(handler));
    }

    /// Registers the single responder for a request kind.
    pub fn respond(
        &self,
        kind: RequestKind,
        responder: impl FnMut(&Request) -> Reply + 'static,
    ) -> Result<(), BusError> {
        let mut responders = self.responders.borrow_mut();
        if responders.contains_key(&kind) {
            return Err(BusError::DuplicateResponder(kind));
        }
        responders.insert(kind, Box::new(responder));
        Ok(())
    }

    pub fn publish(&self, event: &Event) {
        tracing::debug!(%event, "publishing");
        for handler in self.handlers.borrow_mut().iter_mut() {
            handler(event);
        }
    }

    /// Runs the responder for `request` and returns its reply. The caller
    /// blocks until the responder returns.
    pub fn call(&self, request: &Request) -> Result<Reply, BusError> {
        let kind = request.kind();
        let mut responders = self.responders.borrow_mut();
        let responder = responders
            .get_mut(&kind)
            .ok_or(BusError::NoResponder(kind))?;
        Ok(responder(request))
    }

    /// Typed `call` for the chat port.
    pub fn chat_port(&self) -> Result<PortId, BusError> {
        match self.call(&Request::ChatPort)? {
            Reply::ChatPort(port) => Ok(port),
            Reply::StationList(_) => Err(BusError::ReplyMismatch(RequestKind::ChatPort)),
        }
    }

    /// Typed `call` for the station list.
    pub fn station_list(&self) -> Result<BTreeMap<PortId, Vec<StationId>>, BusError> {
        match self.call(&Request::StationList)? {
            Reply::StationList(stations) => Ok(stations),
            Reply::ChatPort(_) => Err(BusError::ReplyMismatch(RequestKind::StationList)),
        }
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("handlers", &self.handlers.borrow().len())
            .field("responders", &self.responders.borrow().len())
            .finish()
    }
}
