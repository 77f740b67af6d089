//! HTTP surfaces and the helpers they render with

mod desktop_bridge;
mod interfaces;
mod mobile_server;
mod qr;

pub use desktop_bridge::{desktop_router, serve_desktop};
pub use interfaces::{list_interfaces, NetworkInterface};
pub use mobile_server::{mobile_router, serve_mobile};
pub use qr::render_qr_data_url;
