// Interface adapters: HTTP and WebSocket transport, storage adapters, wire protocol.

pub mod clients;
pub mod handlers;
pub mod net;
pub mod postgres;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod utils;
