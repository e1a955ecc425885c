//! Telegram dispatcher: group address → handler routing.
//!
//! ```text
//!   Telegram ──▶ route table (registration order)
//!                  │ first route whose address matches exactly
//!                  │ and whose handler accepts the command
//!                  ▼
//!   READ  + Measurement(q) ──▶ MeasurementPort::read(q) ──▶ answer_value(same address)
//!   WRITE + Output(ch)     ──▶ OutputPort::set_output(ch) + OutputStates
//!   anything else          ──▶ Ignored(reason), no side effect
//! ```
//!
//! Addresses are compared as value types; there is no wildcard or subtree
//! matching.  When two routes share an address only the first one that
//! accepts the command runs, so an inbound READ is answered at most once.

use heapless::Vec;

use super::ports::{BusPort, MeasurementPort, OutputChannel, OutputPort, Quantity};
use crate::config::GroupMap;
use crate::context::NodeContext;
use crate::error::ConfigError;
use crate::knx::address::GroupAddress;
use crate::knx::telegram::{Command, Telegram};

/// Capacity of the route table.
pub const MAX_ROUTES: usize = 16;

/// What a route does with a matching telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Answers GroupValueRead with a fresh sample.
    Measurement(Quantity),
    /// Follows GroupValueWrite with a DPT 1 payload.
    Output(OutputChannel),
}

impl Handler {
    const fn accepts(self, command: Command) -> bool {
        matches!(
            (self, command),
            (Self::Measurement(_), Command::Read) | (Self::Output(_), Command::Write)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub address: GroupAddress,
    pub handler: Handler,
}

/// Why a telegram produced no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No route for the destination address.
    NotListening,
    /// Command is neither READ nor WRITE.
    UnsupportedCommand,
    /// Address is routed, but no route there handles this command.
    NoHandler,
    /// WRITE without a usable boolean payload.
    MissingPayload,
}

/// Result of one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOutcome {
    Answered {
        address: GroupAddress,
        quantity: Quantity,
        value: f32,
    },
    Switched {
        address: GroupAddress,
        channel: OutputChannel,
        on: bool,
    },
    Ignored(IgnoreReason),
}

/// Fixed-capacity route table.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    routes: Vec<Route, MAX_ROUTES>,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Routes for every measurement and output in `groups`, in the order
    /// CO2, temperature, humidity, brightness, green, yellow, red.
    pub fn from_groups(groups: &GroupMap) -> Result<Self, ConfigError> {
        let mut d = Self::new();
        for q in Quantity::ALL {
            d.register(groups.measurement(q), Handler::Measurement(q))?;
        }
        for ch in OutputChannel::ALL {
            d.register(groups.output(ch), Handler::Output(ch))?;
        }
        Ok(d)
    }

    /// Append a route.  Earlier routes win on shared addresses.
    pub fn register(&mut self, address: GroupAddress, handler: Handler) -> Result<(), ConfigError> {
        self.routes
            .push(Route { address, handler })
            .map_err(|_| ConfigError::TooManyRoutes)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn listens_on(&self, address: GroupAddress) -> bool {
        self.routes.iter().any(|r| r.address == address)
    }

    /// Route one inbound telegram.  Never fails; unroutable telegrams are
    /// reported as [`DispatchOutcome::Ignored`] and touch nothing.
    pub fn dispatch<H, B>(
        &self,
        telegram: &Telegram,
        ctx: &mut NodeContext,
        hw: &mut H,
        bus: &mut B,
    ) -> DispatchOutcome
    where
        H: MeasurementPort + OutputPort,
        B: BusPort,
    {
        let address = telegram.destination;
        if !self.listens_on(address) {
            return DispatchOutcome::Ignored(IgnoreReason::NotListening);
        }
        if !matches!(telegram.command, Command::Read | Command::Write) {
            return DispatchOutcome::Ignored(IgnoreReason::UnsupportedCommand);
        }

        let Some(route) = self
            .routes
            .iter()
            .find(|r| r.address == address && r.handler.accepts(telegram.command))
        else {
            return DispatchOutcome::Ignored(IgnoreReason::NoHandler);
        };

        match route.handler {
            Handler::Measurement(quantity) => {
                let value = hw.read(quantity);
                bus.answer_value(address, value);
                DispatchOutcome::Answered {
                    address,
                    quantity,
                    value,
                }
            }
            Handler::Output(channel) => {
                let Some(on) = telegram.as_bool() else {
                    return DispatchOutcome::Ignored(IgnoreReason::MissingPayload);
                };
                hw.set_output(channel, on);
                ctx.outputs.set(channel, on);
                DispatchOutcome::Switched { address, channel, on }
            }
        }
    }
}
