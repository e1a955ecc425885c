//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; on the device they become log lines.

use super::dispatcher::IgnoreReason;
use super::ports::{OutputChannel, Quantity};
use crate::knx::address::{GroupAddress, IndividualAddress};
use crate::scheduler::TelemetryFrame;

/// Structured events emitted by the node core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// The service has started under its own bus address.
    Started { address: IndividualAddress },

    /// Four measurements were pushed.
    TelemetryPushed(TelemetryFrame),

    /// A GroupValueRead was answered.
    ReadAnswered {
        address: GroupAddress,
        quantity: Quantity,
        value: f32,
    },

    /// A GroupValueWrite switched an output.
    OutputSwitched {
        address: GroupAddress,
        channel: OutputChannel,
        on: bool,
    },

    /// The button was pressed and published.
    ButtonPressed { address: GroupAddress },

    /// The feedback flash went dark.
    FeedbackExpired,

    /// An inbound telegram for a routed address had no effect.
    TelegramIgnored {
        address: GroupAddress,
        reason: IgnoreReason,
    },
}
