// Interface adapters: wire protocol, network handling and the inference client.

pub mod clients;
pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
