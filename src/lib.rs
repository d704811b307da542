//! themeloop keeps a continuously playing visual show fed with decoded stills and animation
//! loops drawn from several themes.
//!
//! Decoding and uploading assets is expensive relative to a frame budget, so the engine keeps a
//! bounded window of decoded assets warm and rotates which themes are on screen, doing all of it
//! incrementally on a maintenance thread while the render thread only reads.
//!
//! # Pieces
//!
//! - [`PathCollection`]: cyclic asset references with enabled flags and non-repeating selection.
//! - [`Theme`]: one theme's stills map and animation frames behind two independent locks.
//! - [`ThemeBank`]: two displayed themes, plus one warming in and one cooling out when there are
//!   enough themes, and the switch protocol between them.
//! - [`MaintenanceDriver`]: runs a bank on its own thread and hands the displayed pair to the
//!   render thread as [`ActivePair`] snapshots.
//!
//! # Threading contract
//!
//! `ThemeBank` is owned by exactly one controller context. Only `Theme` reads cross threads, via
//! the `Arc<Theme>` handles inside an [`ActivePair`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod driver;
mod foundation;
mod show;

pub use assets::decode::{decode_animation, decode_image};
pub use assets::image::{Image, TextureKey};
pub use assets::loader::{AssetLoader, FsAssetLoader, SyntheticLoader};
pub use config::{ShowConfig, SystemConfig, ThemeConfig};
pub use driver::{DriverOpts, MaintenanceDriver};
pub use foundation::error::{ThemeloopError, ThemeloopResult};
pub use foundation::rng::Rng64;
pub use show::bank::{Slots, ThemeBank, UpdateOutcome};
pub use show::pair::{ActivePair, PairReceiver};
pub use show::paths::PathCollection;
pub use show::theme::{LoadStep, Theme, ping_pong_index};
