//! scrollstack
//!
//! Compositional scroll-view layout: stacks independently sized, possibly
//! self-scrolling regions into one continuous vertical scroll surface.
//!
//! The core is [`layout::LayoutEngine`]. It caches each region's stacked
//! geometry, rebuilds that cache only on structural change, reflows forward
//! from a single region on size change and repositions only the regions near
//! the viewport on scroll.
//!
//! `scenario` replays declarative TOML scenarios against the engine; `config`
//! and `logging` carry the binary's ambient setup.

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod scenario;
