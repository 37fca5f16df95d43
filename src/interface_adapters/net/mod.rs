// Network adapter for the browser websocket.

pub mod client;

pub use client::{spawn_state_serializer, ws_handler};
