//! Multi-group `FollowJointTrajectory` action server.
//!
//! Accepts joint trajectories per motion group, translates them into the
//! controller's dynamic joint trajectory commands, supervises execution
//! through controller feedback and reports success, abort or rejection to
//! the client.
//!
//! The transport is abstracted by [`dynjta_core::Node`]; a [`Dispatcher`]
//! creates every publisher, subscription and action server it needs from
//! it.
//!
//! # Example
//!
//! ```ignore
//! use dynjta::{ActionConfig, Dispatcher, config::DEFAULT_NODE_NAME, logger::init_logging};
//!
//! #[tokio::main]
//! async fn main() -> dynjta::Result<()> {
//!     init_logging(DEFAULT_NODE_NAME);
//!     let config = ActionConfig::from_file("params.yaml", DEFAULT_NODE_NAME)?;
//!     let node = my_transport::Node::new(DEFAULT_NODE_NAME)?;
//!     let _dispatcher = Dispatcher::new(&node, &config)?;
//!     tokio::signal::ctrl_c().await.ok();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod logger;
pub mod session;
pub mod status;
pub mod tolerance;
pub mod translator;
pub mod watchdog;

pub use config::{ActionConfig, GroupConfig};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use fanout::{FanOut, FanOutMismatch, check_fan_out};
pub use session::{ActiveGoal, GoalSession, SessionState, SharedSession};
pub use status::StatusCache;
pub use tolerance::within_goal_constraints;
pub use translator::{translate_fan_out, translate_group};
pub use watchdog::Watchdog;
