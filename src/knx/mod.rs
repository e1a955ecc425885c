//! KNX TP1 protocol stack for a single group-communication node.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        KNX stack                             │
//! │                                                              │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │ ByteLink │──▶│  Codec   │──▶│ Telegram │──▶│ BusPort   │  │
//! │  │ (UART)   │   │ (frames) │   │ + DPT    │   │ (TpUart)  │  │
//! │  └──────────┘   └──────────┘   └──────────┘   └───────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod address;
pub mod codec;
pub mod dpt;
pub mod link;
pub mod telegram;
pub mod tpuart;
