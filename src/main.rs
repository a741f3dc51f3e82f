use std::env;

use anyhow::{bail, Context, Result};
use tracing::info;

use folio::host::HeadlessHost;
use folio::{Gallery, GalleryConfig, GalleryItem, GridView, ReducedMotionSignal, Section};

#[derive(Debug, Clone, Default)]
struct DryRunArgs {
    columns: Option<u32>,
    reduced_motion: bool,
    no_intersection: bool,
    deny_autoplay: bool,
}

fn parse_args() -> Result<DryRunArgs> {
    let mut parsed = DryRunArgs::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--columns" => {
                let value = args.next().context("Missing value for --columns")?;
                parsed.columns = Some(
                    value
                        .parse::<u32>()
                        .context("Failed to parse --columns as a positive integer")?,
                );
            }
            "--reduced-motion" => parsed.reduced_motion = true,
            "--no-intersection" => parsed.no_intersection = true,
            "--deny-autoplay" => parsed.deny_autoplay = true,
            other => bail!("Unknown argument: {other}"),
        }
    }

    Ok(parsed)
}

fn portfolio_sections() -> Vec<Section> {
    let videos = ["deftones", "parku", "aphex"]
        .iter()
        .map(|name| {
            GalleryItem::new(
                format!("v-{name}"),
                format!("{name}_story.mp4"),
                format!("/videos/{name}_story.mp4"),
            )
            .with_aspect_ratio(6.0 / 19.0)
        })
        .collect();

    let images = [
        ("qb-4", "e88ecd164700707.63fb7be12e07e.jpg"),
        ("qb-1", "0bb1ab164700707.63fb7be1302e7.jpg"),
        ("qb-2", "caa804164700707.63fb7be1313e9.jpg"),
        ("qb-3", "b78afe164700707.63fb7be12afd1.jpg"),
        ("qb-7", "b1f91b164700707.63fb7be12f267.jpg"),
        ("qb-5", "d54369164700707.63fb7be12c17b.jpg"),
        ("qb-6", "c58d35164700707.63fb7be132398.jpg"),
    ]
    .iter()
    .map(|(id, file)| {
        GalleryItem::new(
            *id,
            format!("qbicle {}", &id[3..]),
            format!("/images/qbicle/{file}"),
        )
    })
    .collect();

    vec![
        Section::new("3D", videos).with_description("Story-format motion pieces."),
        Section::new("Qbicle Brand Identity and UI/UX", images)
            .with_description("Brand identity and interface work for Qbicle."),
    ]
}

/// Natural dimensions the headless host reports once media "loads".
const NATURAL_DIMENSIONS: [(&str, f64, f64); 10] = [
    ("v-deftones", 1080.0, 3420.0),
    ("v-parku", 1080.0, 3420.0),
    ("v-aphex", 1080.0, 3420.0),
    ("qb-4", 1920.0, 1080.0),
    ("qb-1", 1400.0, 1050.0),
    ("qb-2", 1080.0, 1350.0),
    ("qb-3", 1600.0, 1200.0),
    ("qb-7", 1920.0, 1080.0),
    ("qb-5", 1200.0, 1200.0),
    ("qb-6", 1080.0, 1620.0),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio=info".parse().context("Invalid log directive")?),
        )
        .init();

    let args = parse_args()?;
    let mut config = GalleryConfig::from_env().context("Failed to load gallery config")?;
    if let Some(columns) = args.columns {
        config.view = GridView::from_columns(columns)?;
    }

    let host = if args.no_intersection {
        HeadlessHost::without_intersection()
    } else {
        HeadlessHost::new()
    };
    host.set_autoplay_allowed(!args.deny_autoplay);

    let motion = ReducedMotionSignal::new(args.reduced_motion);
    let mut gallery = Gallery::mount(config, host, motion, portfolio_sections())?;

    let scrolled = gallery.host().scroll_all_into_view();
    info!(blocks = scrolled, "Scrolled blocks into view");
    for (id, width, height) in NATURAL_DIMENSIONS {
        gallery.host().load_metadata(&id.into(), width, height);
    }
    let summary = gallery.process_events();
    info!(
        events = summary.events,
        relayout = summary.relayout,
        "Processed host events"
    );

    for view in gallery.render() {
        println!(
            "== {} ({}, {} unit rows, {:.0}px)",
            view.title,
            gallery.view(),
            view.layout.unit_rows(),
            view.layout.total_height(24.0)
        );
        for directive in &view.directives {
            let playback = directive
                .playback
                .map(|phase| format!("{phase:?}"))
                .unwrap_or_else(|| {
                    let state = if directive.reveal { "revealed" } else { "hidden" };
                    state.to_owned()
                });
            println!(
                "  {:<20} {:<24} {}",
                directive.label,
                directive.placement.grid_area(),
                playback
            );
        }
    }

    gallery.unmount();
    Ok(())
}
