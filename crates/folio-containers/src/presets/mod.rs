//! Built-in container presets.

mod chart;
mod chat;
mod grid;
mod markmap;
mod steps;
mod timeline;

use folio_config::FeatureToggles;
use folio_markdown::{MarkdownEngine, Plugin};

pub use chart::{ChartData, Charts, Item, Series, chart_option};
pub use chat::{chat, message};
pub use grid::{chart_grid, table_grid};
pub use markmap::Markmap;
pub use steps::{carousel, stepper};
pub use timeline::{timeline, timeline_item};

/// Which preset groups to install.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Presets {
    /// `timeline` and `timeline-item`.
    pub timeline: bool,
    /// `chart-grid` and `table-grid`.
    pub grids: bool,
    /// `chart` blocks.
    pub charts: bool,
    /// `chat` and `message`.
    pub chat: bool,
    pub stepper: bool,
    pub carousel: bool,
    /// `markmap` fences.
    pub markmap: bool,
}

impl Presets {
    /// Every preset.
    pub fn all() -> Self {
        Self::from_features(&FeatureToggles::default())
    }

    /// Presets enabled in the site config.
    pub fn from_features(features: &FeatureToggles) -> Self {
        Self {
            timeline: features.timeline,
            grids: features.grids,
            charts: features.charts,
            chat: features.chat,
            stepper: features.stepper,
            carousel: features.carousel,
            markmap: features.markmap,
        }
    }
}

impl Plugin for Presets {
    fn install(&self, md: &mut MarkdownEngine) {
        if self.timeline {
            md.use_plugin(&timeline()).use_plugin(&timeline_item());
        }
        if self.grids {
            md.use_plugin(&chart_grid()).use_plugin(&table_grid());
        }
        if self.charts {
            md.use_plugin(&Charts);
        }
        if self.chat {
            md.use_plugin(&chat()).use_plugin(&message());
        }
        if self.stepper {
            md.use_plugin(&stepper());
        }
        if self.carousel {
            md.use_plugin(&carousel());
        }
        if self.markmap {
            md.use_plugin(&Markmap);
        }
    }
}
