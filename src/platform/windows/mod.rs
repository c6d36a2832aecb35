//! Windows platform backend: WH_MOUSE_LL capture, SendInput injection.

mod capture;
mod injector;

pub use capture::MouseCapture;
pub use injector::SendInputInjector;
