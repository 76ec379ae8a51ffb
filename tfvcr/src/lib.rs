mod cassette;
mod config_view;
mod data;
mod diff_steps;
mod error;
mod harness_configuration;
pub mod markdown;
pub mod matcher;
mod playback_server;
mod steps;
mod util;

pub use cassette::Cassette;
pub use config_view::{reform_config_with_provider, ConfigEdit, ConfigView, KeepReason, ProviderAssignment};
pub use data::{InteractionData, Origin, RequestData, RequestDescriptor, ResponseData};
pub use diff_steps::{expand_steps, insert_diff_steps};
pub use error::Error;
pub use harness_configuration::{HarnessConfiguration, ReleaseDiff, VcrMode};
pub use matcher::matches;
pub use playback_server::PlaybackServer;
pub use steps::{ResourceStates, StepCheck, TestCase, TestStep};
