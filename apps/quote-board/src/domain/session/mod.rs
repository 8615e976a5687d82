//! Feed Session State Machine
//!
//! Transport callbacks are modelled as transitions on [`FeedSession`]. Each
//! handler updates the session and returns the effects the caller must apply
//! (status text, opening a connection, dispatching a message). Nothing here
//! touches a socket.
//!
//! ```text
//! disconnected ──open()──► connecting ──opened──► connected ─┐
//!      ▲                        │                     ▲       │ message
//!      │                        │ closed/error        └───────┘
//!      │                        ▼                     │ closed/error
//!      └──────────────────── failed ◄─────────────────┘
//!                               │ open()
//!                               └──────► connecting
//! ```

use serde::Serialize;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection has been attempted.
    #[default]
    Disconnected,
    /// Waiting for the transport to open.
    Connecting,
    /// Transport open, messages flowing.
    Connected,
    /// Closed, errored or unsupported.
    Failed,
}

impl ConnectionState {
    /// State name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        }
    }
}

/// Style tag of the status readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusClass {
    /// Connection attempt in flight.
    Connecting,
    /// Connected and idle.
    Connected,
    /// Connection lost.
    Disconnected,
    /// Transport unavailable.
    NotSupported,
    /// A message is being reconciled.
    Processing,
}

impl StatusClass {
    /// Class tag as used by the board.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::NotSupported => "not-supported",
            Self::Processing => "processing",
        }
    }
}

/// Text plus class shown in the status readout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    /// Style tag.
    pub class: StatusClass,
    /// Display text.
    pub text: String,
}

impl StatusLine {
    /// Create a status line.
    #[must_use]
    pub fn new(class: StatusClass, text: impl Into<String>) -> Self {
        Self {
            class,
            text: text.into(),
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(StatusClass::Disconnected, "disconnected")
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Update the status readout.
    Status(StatusLine),
    /// Open a new transport connection.
    Connect,
    /// Hand a raw message to the renderer.
    Dispatch(String),
}

/// Connection state and message bookkeeping for one board.
#[derive(Debug, Clone)]
pub struct FeedSession {
    state: ConnectionState,
    message_count: u64,
    transport_supported: bool,
}

impl FeedSession {
    /// Create a session. `transport_supported` is false when the endpoint
    /// cannot be reached by this client at all.
    #[must_use]
    pub const fn new(transport_supported: bool) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            message_count: 0,
            transport_supported,
        }
    }

    /// Current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Messages dispatched since the transport last opened.
    #[must_use]
    pub const fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Whether the transport is usable at all.
    #[must_use]
    pub const fn transport_supported(&self) -> bool {
        self.transport_supported
    }

    /// Request a connection.
    ///
    /// Honoured only from `Disconnected` or `Failed`; while connecting or
    /// connected it is a no-op. An unsupported transport reports once and
    /// never connects.
    pub fn open(&mut self) -> Vec<SessionEffect> {
        if !self.transport_supported {
            if self.state == ConnectionState::Disconnected {
                self.state = ConnectionState::Failed;
                return vec![SessionEffect::Status(StatusLine::new(
                    StatusClass::NotSupported,
                    "not supported",
                ))];
            }
            return Vec::new();
        }

        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                self.state = ConnectionState::Connecting;
                vec![
                    SessionEffect::Status(StatusLine::new(StatusClass::Connecting, "connecting")),
                    SessionEffect::Connect,
                ]
            }
            ConnectionState::Connecting | ConnectionState::Connected => Vec::new(),
        }
    }

    /// The transport opened.
    pub fn on_open(&mut self) -> Vec<SessionEffect> {
        if self.state != ConnectionState::Connecting {
            tracing::debug!(state = self.state.as_str(), "Ignoring stale open event");
            return Vec::new();
        }

        self.state = ConnectionState::Connected;
        self.message_count = 0;
        vec![SessionEffect::Status(StatusLine::new(
            StatusClass::Connected,
            "connected",
        ))]
    }

    /// A text message arrived.
    pub fn on_message(&mut self, text: String) -> Vec<SessionEffect> {
        if self.state != ConnectionState::Connected {
            tracing::debug!(
                state = self.state.as_str(),
                "Ignoring message outside connected state"
            );
            return Vec::new();
        }

        self.message_count += 1;
        let n = self.message_count;
        vec![
            SessionEffect::Status(StatusLine::new(
                StatusClass::Processing,
                format!("incoming message {n}"),
            )),
            SessionEffect::Dispatch(text),
            SessionEffect::Status(StatusLine::new(
                StatusClass::Connected,
                format!("connected, {n} {}", if n == 1 { "message" } else { "messages" }),
            )),
        ]
    }

    /// The transport closed.
    pub fn on_close(&mut self) -> Vec<SessionEffect> {
        self.fail()
    }

    /// The transport failed.
    pub fn on_error(&mut self, reason: &str) -> Vec<SessionEffect> {
        tracing::debug!(reason, "Transport error");
        self.fail()
    }

    fn fail(&mut self) -> Vec<SessionEffect> {
        if !self.transport_supported {
            return Vec::new();
        }
        self.state = ConnectionState::Failed;
        vec![SessionEffect::Status(StatusLine::new(
            StatusClass::Disconnected,
            "disconnected",
        ))]
    }
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new(true)
    }
}
