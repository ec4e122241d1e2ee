//! Remote Script Relay
//!
//! Lets a fixed set of chat users trigger a local script through a Telegram
//! bot and receive its output as a photo, a video or text.
//!
//! ## Architecture
//!
//! ```text
//! Telegram → RemoteAdapter → mpsc → RelayGateway
//!                                      ↓
//!                         SessionRegistry lock + CommandDispatcher
//!                                      ↓
//!                      reply ← RemoteAdapter    ExecutionQueue (4)
//!                                                   ↓
//!                                      ExecutionWorker (resource lock)
//!                                                   ↓
//!                              ScriptRunner → ResponseMapper → RemoteAdapter
//! ```

pub mod adapters;
pub mod allow_list;
pub mod command_router;
pub mod dispatcher;
pub mod execution_queue;
pub mod gateway;
pub mod response_mapper;
pub mod script_runner;
pub mod session_registry;
pub mod types;
pub mod worker;

pub use types::*;
