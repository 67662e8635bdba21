//! GrowthBase chat: a Dify proxy endpoint plus the client-side chat core.
//!
//! The server half ([`routes`], [`upstream`]) relays one query per request
//! to the hosted AI service. The client half ([`conversation`], [`reducer`],
//! [`view`], [`composer`]) keeps local conversation history and grows the
//! assistant reply as the proxy streams it back.

pub mod composer;
pub mod config;
pub mod conversation;
pub mod error;
pub mod reducer;
pub mod routes;
pub mod state;
pub mod upstream;
pub mod view;
pub mod wire;
