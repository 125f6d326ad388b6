//! Built-in sinks
//!
//! - [`DiscordSink`] - posts to a Discord channel
//! - [`StdoutSink`] - prints to stdout

pub mod discord;
pub mod stdout;

pub use discord::DiscordSink;
pub use stdout::StdoutSink;
