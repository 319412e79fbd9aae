//! turnkit: one-shot tool-calling turns over a chat model.
//!
//! A turn appends the user's message, asks the model once, records its
//! answer, and when the model asks for a tool, runs the first requested tool
//! and records its result. The model sees that result on the next turn.
//!
//! # Quick Start
//!
//! ```no_run
//! use turnkit::prelude::*;
//!
//! # async fn example() -> turnkit::error::Result<()> {
//! let config = AgentConfig::resolve(None)?;
//! let mut agent = Agent::from_config(&config)?;
//! let tools = agent.registry().definitions_for(["dad_joke"])?;
//! let history = agent.run_turn("tell me a dad joke", &tools).await?;
//! println!("{:?}", history.last());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
