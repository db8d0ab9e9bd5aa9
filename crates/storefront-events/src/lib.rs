//! Application-wide signals for the storefront client.
//!
//! - [`EventBus`]: typed publish/subscribe owned by the application root,
//!   carrying login/logout notices, toast requests and review refreshes.
//! - [`Clock`]: injected time source so timers can be tested without waiting.
//! - [`ToastBus`]: the toast state machine (active, closing, removed) and
//!   [`ToastCenter`], its shared, async-driven handle.

mod bus;
mod clock;
mod toast;

pub use bus::{AppEvent, EventBus, LoginNotice, ToastRequest};
pub use clock::{Clock, ManualClock, TokioClock};
pub use toast::{
    Toast, ToastBus, ToastCenter, ToastId, ToastKind, ToastPhase, DEFAULT_TOAST_DURATION,
    TOAST_GRACE_PERIOD,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{AppEvent, Clock, EventBus, ToastCenter, ToastKind, ToastRequest};
}
