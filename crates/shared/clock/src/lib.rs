//! Hadron Clock
//!
//! Time engine for the physics sandbox: advances simulated time subtick by
//! subtick and notifies listeners at tick (or subtick) boundaries.
//!
//! ## Layers
//!
//! ```text
//! Clock (pause / resume / stop / reset, listener fan-out)
//!     │
//!     ├── ListenerRegistry (token-keyed callbacks, tick/subtick gate)
//!     │
//!     └── Subticker (what drives time forward)
//!             ├── VirtualSubticker (explicit advance only)
//!             └── RealSubticker    (wall-clock pump + explicit advance)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use hadron_clock::Clock;
//! use hadron_core::Subticking;
//!
//! let clock = Clock::virtual_time();
//! clock.start().await;
//!
//! let token = clock.add_listener(|event| async move {
//!     println!("tick at {}", event.current);
//! });
//!
//! clock.advance_time(Subticking::ticks(2)).await; // ticks 0, 1, 2
//! clock.pause().await;
//! clock.advance_time(Subticking::ticks(1)).await; // buffered
//! clock.resume().await;                           // tick 3
//! clock.remove_listener(token);
//! ```

mod clock;
mod real_time;
mod registry;
mod timeline;
mod virtual_time;

pub use clock::Clock;
pub use real_time::{RealSubticker, RealSubtickerConfig};
pub use registry::ListenerRegistry;
pub use virtual_time::VirtualSubticker;

// Re-export the port types for convenience
pub use hadron_ports::{
    ConfigError, Granularity, ListenerToken, RunState, SubtickAction, Subticker, TickCallback,
};
