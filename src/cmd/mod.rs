//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled        |
//! |------------|-------------------------|
//! | `serve`    | `Serve`                 |
//! | `pipeline` | `Generate`, `Analyze`   |
//! | `health`   | `Health`                |
//! | `config`   | `Config`                |

pub mod config;
pub mod health;
pub mod pipeline;
pub mod serve;

pub use config::cmd_config;
pub use health::cmd_health;
pub use pipeline::{cmd_analyze, cmd_generate};
pub use serve::cmd_serve;
