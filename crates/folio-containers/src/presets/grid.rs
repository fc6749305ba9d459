//! Grid layout containers for charts and tables.

use folio_markdown::BlockConfig;

use crate::attrs::AttrFragment;
use crate::container::ContainerPlugin;
use crate::mapping::ConfigMapping;

/// Grid variant.
#[derive(Clone, Copy)]
struct GridStyle {
    class: &'static str,
    default_gap: &'static str,
    stretch: bool,
}

const CHART_GRID: GridStyle = GridStyle {
    class: "chart-grid",
    default_gap: "24px",
    stretch: true,
};

const TABLE_GRID: GridStyle = GridStyle {
    class: "table-grid",
    default_gap: "20px",
    stretch: false,
};

/// Compose one `style` and the class list from the whole config.
fn grid_attrs(grid: GridStyle, config: &BlockConfig) -> Vec<AttrFragment> {
    let mut fragments = vec![
        AttrFragment::style("display: grid"),
        AttrFragment::style(format!(
            "grid-template-columns: repeat({}, 1fr)",
            config.display_or("columns", "2")
        )),
        AttrFragment::style(format!("gap: {}", config.display_or("gap", grid.default_gap))),
        AttrFragment::style("margin: 20px 0"),
    ];

    if grid.stretch {
        fragments.push(AttrFragment::style("align-items: stretch"));
        if config.is_truthy("minHeight") {
            fragments.push(AttrFragment::style(format!(
                "min-height: {}",
                config.display_or("minHeight", "")
            )));
        }
    }

    fragments.push(AttrFragment::class(grid.class));
    if config.is_truthy("responsive") {
        fragments.push(AttrFragment::class(format!("{}-responsive", grid.class)));
    }
    fragments
}

/// `::: chart-grid {"columns": 3}` laying out charts in a CSS grid.
pub fn chart_grid() -> ContainerPlugin {
    ContainerPlugin::new("chart-grid", "div")
        .with_mapping(ConfigMapping::new().full_config(|config| grid_attrs(CHART_GRID, config)))
        .with_defaults(
            BlockConfig::new()
                .with("columns", 2)
                .with("gap", "24px")
                .with("responsive", true)
                .with("equalHeight", true)
                .with("minHeight", "300px"),
        )
}

/// `::: table-grid` for mixed content.
pub fn table_grid() -> ContainerPlugin {
    ContainerPlugin::new("table-grid", "div")
        .with_mapping(ConfigMapping::new().full_config(|config| grid_attrs(TABLE_GRID, config)))
        .with_defaults(
            BlockConfig::new()
                .with("columns", 2)
                .with("gap", "20px")
                .with("responsive", true),
        )
}
