//! # Valalah Themes
//!
//! The four seasonal page themes and the stage that runs them:
//!
//! | theme  | effect |
//! |--------|--------|
//! | winter | snowflakes drift down |
//! | easter | eggs fall, click one to crack it into chocolate |
//! | summer | a warm glow trails the pointer, throwing sparkles |
//! | autumn | maple and oak leaves sway down in four colors |
//!
//! Presets can be tuned with a TOML themes file, see [`ThemeOverrides`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use valalah_themes::{headless_stage, ThemeKind, ThemeOverrides};
//!
//! let mut stage = headless_stage(ThemeKind::Winter, ThemeOverrides::none(), Viewport::desktop(), 7)?;
//! stage.document_ready();
//! stage.switch_to(ThemeKind::Easter)?;
//! stage.before_unload();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod headless;
pub mod kind;
pub mod overrides;
pub mod presets;
pub mod stage;
pub mod theme;

pub use error::{ThemeError, ThemeResult};
pub use headless::{headless_factory, headless_stage, HeadlessStage, HeadlessTheme};
pub use kind::ThemeKind;
pub use overrides::{ControllerPatch, ThemeOverrides, TrailPatch};
pub use stage::{ThemeFactory, ThemeStage};
pub use theme::{Theme, ThemeParts};
