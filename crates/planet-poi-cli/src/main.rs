// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use planet_poi_core::autocomplete::{LookupResult, SystemLookup};
use planet_poi_core::background::BackgroundQueue;
use planet_poi_core::geodesy::{distance_text, split_system_and_body};
use planet_poi_core::guidance::GuidanceFrame;
use planet_poi_core::overlay::{JsonLinesTransport, NullTransport};
use planet_poi_core::release::{ReleaseChecker, ReleaseStatus, CURRENT_VERSION};
use planet_poi_core::session::{DashboardEntry, Session};
use planet_poi_core::settings::{JsonConfigStore, Settings};
use planet_poi_core::share;
use planet_poi_core::store::{parse_coordinate, Coordinates, ImportMode, Item, NodeId, Poi, PoiEdit, PoiStore, PoiTree};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// POI file to use instead of the one in the config directory
    #[arg(short, long, env = "PLANET_POI_FILE")]
    file: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the folder tree with item ids
    List,
    /// Add a POI, e.g. `add "HIP 36601 C 3 b" --lat -67.5 --lon 127.2`
    Add {
        /// Full body name, or just a system name
        name: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        lat: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        lon: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Folder id to add into (root if omitted)
        #[arg(long)]
        folder: Option<NodeId>,
    },
    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        parent: Option<NodeId>,
    },
    /// Rename a folder
    Rename { id: NodeId, name: String },
    /// Delete a POI, or a folder with everything in it
    Rm {
        id: NodeId,
        /// Required to delete a non-empty folder
        #[arg(long)]
        yes: bool,
    },
    /// Move an item into a folder (root if --to is omitted)
    Mv {
        id: NodeId,
        #[arg(long)]
        to: Option<NodeId>,
    },
    /// Flip a POI between active and inactive
    Toggle { id: NodeId },
    /// Change fields of a POI
    Edit {
        id: NodeId,
        /// New full body name
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Print a share link for a POI
    Share { id: NodeId },
    /// Add the POI from a share link
    ImportLink {
        url: String,
        #[arg(long)]
        folder: Option<NodeId>,
    },
    /// Write all POIs to a file
    Export { path: PathBuf },
    /// Read POIs from a file
    Import {
        path: PathBuf,
        /// Replace all POIs instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Compute rows and guidance for one position sample
    Guide {
        /// Full body name the player is on
        #[arg(long)]
        body: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        heading: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        altitude: f64,
        #[arg(long)]
        radius: Option<f64>,
        /// Also print the overlay commands as JSON lines
        #[arg(long)]
        overlay: bool,
    },
    /// Show or change settings
    Prefs {
        #[arg(long)]
        threshold: Option<u32>,
        #[arg(long)]
        distance: Option<u32>,
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        margin: Option<i32>,
        #[arg(long)]
        altitude: Option<bool>,
        #[arg(long)]
        heading_guidance: Option<bool>,
        #[arg(long)]
        gui_info: Option<bool>,
        #[arg(long)]
        auto_update: Option<bool>,
    },
    /// Suggest system names
    Lookup {
        query: String,
        /// Only report whether the name is an exact match
        #[arg(long)]
        validate: bool,
    },
    /// Check GitHub for a newer release
    CheckUpdate,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new().set_target_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Logging unavailable: {}", e);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.file.clone().unwrap_or_else(planet_poi_core::default_poi_path);
    log::debug!("Using POI file — path={}", path.display());
    let mut store = PoiStore::open(&path);

    match cli.command {
        Commands::List => {
            println!("POIs in {}", path.display());
            if store.tree().is_empty() {
                println!("(empty)");
            }
            print_items(store.tree(), store.tree().root_children(), 0);
        }
        Commands::Add {
            name,
            lat,
            lon,
            description,
            folder,
        } => {
            let poi = Poi::from_input(&name, &lat, &lon, &description)?;
            let full = poi.full_body_name();
            let id = store.add_poi(folder, poi)?;
            println!("Added #{} on {}", id, full);
        }
        Commands::Mkdir { name, parent } => {
            let id = store.create_folder(parent, &name)?;
            println!("Created folder #{} {}", id, name.trim());
        }
        Commands::Rename { id, name } => {
            store.rename_folder(id, &name)?;
            println!("Renamed #{} to {}", id, name.trim());
        }
        Commands::Rm { id, yes } => {
            if let Some(census) = store.count_folder_contents(id) {
                if (census.subfolders > 0 || census.pois > 0) && !yes {
                    bail!(
                        "Folder #{} contains {} subfolders and {} POIs; pass --yes to delete it",
                        id,
                        census.subfolders,
                        census.pois
                    );
                }
            }
            if store.delete(id)? {
                println!("Deleted #{}", id);
            } else {
                println!("No item #{}", id);
            }
        }
        Commands::Mv { id, to } => {
            if store.move_item(id, to)? {
                let location = store.location_path(id).unwrap_or_default();
                println!("Moved #{} to {}", id, location);
            } else {
                println!("No item #{}", id);
            }
        }
        Commands::Toggle { id } => {
            let active = store.toggle_active(id)?;
            println!("#{} is now {}", id, if active { "active" } else { "inactive" });
        }
        Commands::Edit {
            id,
            name,
            lat,
            lon,
            description,
            notes,
        } => {
            let mut edit = PoiEdit {
                description: description.map(|d| d.trim().to_string()),
                notes,
                ..Default::default()
            };
            if let Some(name) = name {
                let (system, body) = split_system_and_body(name.trim());
                if system.is_empty() {
                    bail!("System must not be empty");
                }
                edit.system = Some(system);
                edit.body = Some(body);
            }
            if lat.is_some() || lon.is_some() {
                let lat = parse_coordinate("latitude", lat.as_deref().unwrap_or_default())?;
                let lon = parse_coordinate("longitude", lon.as_deref().unwrap_or_default())?;
                edit.coords = Some(Coordinates::from_parts(lat, lon)?);
            }
            store.edit_poi(id, edit)?;
            println!("Updated #{}", id);
        }
        Commands::Share { id } => {
            let poi = store
                .tree()
                .poi(id)
                .ok_or_else(|| anyhow!("No POI #{}", id))?;
            println!("{}", share::encode(poi));
        }
        Commands::ImportLink { url, folder } => {
            let shared = share::decode(&url)?;
            let poi = shared.into_poi();
            let label = poi.label();
            let id = store.add_poi(folder, poi)?;
            println!("Added #{} {}", id, label);
        }
        Commands::Export { path } => {
            store.export_to(&path)?;
            println!("Exported {} items to {}", store.tree().len(), path.display());
        }
        Commands::Import { path, replace } => {
            let mode = if replace { ImportMode::Replace } else { ImportMode::Merge };
            let count = store.import_from(&path, mode)?;
            println!("Imported {} items from {}", count, path.display());
        }
        Commands::Guide {
            body,
            lat,
            lon,
            heading,
            altitude,
            radius,
            overlay,
        } => {
            let mut config = JsonConfigStore::open_default()?;
            let settings = Settings::load_or_init(&mut config);
            let mut session = Session::new(store, settings);

            let entry = DashboardEntry {
                latitude: Some(lat),
                longitude: Some(lon),
                altitude: Some(altitude),
                heading,
                body_name: Some(body),
                planet_radius: radius,
            };

            if overlay {
                let stdout = std::io::stdout();
                let mut transport = JsonLinesTransport::new(stdout.lock());
                session.on_dashboard(&entry, &mut transport);
            } else {
                session.on_dashboard(&entry, &mut NullTransport);
            }
            print_frame(session.last_frame());
        }
        Commands::Prefs {
            threshold,
            distance,
            rows,
            margin,
            altitude,
            heading_guidance,
            gui_info,
            auto_update,
        } => {
            let mut config = JsonConfigStore::open_default()?;
            let mut settings = Settings::load_or_init(&mut config);
            let before = settings.clone();

            settings.guidance_threshold = threshold.unwrap_or(settings.guidance_threshold);
            settings.guidance_distance = distance.unwrap_or(settings.guidance_distance);
            settings.max_overlay_rows = rows.unwrap_or(settings.max_overlay_rows);
            settings.overlay_left_margin = margin.unwrap_or(settings.overlay_left_margin);
            settings.calc_with_altitude = altitude.unwrap_or(settings.calc_with_altitude);
            settings.heading_guidance = heading_guidance.unwrap_or(settings.heading_guidance);
            settings.show_gui_info = gui_info.unwrap_or(settings.show_gui_info);
            settings.auto_update = auto_update.unwrap_or(settings.auto_update);

            if settings != before {
                let mut session = Session::new(store, before);
                session.on_preferences_save(settings, &mut config)?;
                print_settings(session.settings());
            } else {
                config.save()?;
                print_settings(&settings);
            }
        }
        Commands::Lookup { query, validate } => {
            if !SystemLookup::accepts(&query) {
                bail!("Type at least 3 characters");
            }
            let lookup = SystemLookup::default();
            if validate {
                let known = lookup.validate(&query)?;
                println!("{}: {}", query.trim(), if known { "known system" } else { "unknown" });
            } else {
                let queue: BackgroundQueue<LookupResult> = BackgroundQueue::new();
                lookup.query_in_background(&query, &queue)?;
                for result in queue.wait(Duration::from_secs(5)) {
                    if result.suggestions.is_empty() {
                        println!("No suggestions for {}", result.query);
                    }
                    for name in result.suggestions {
                        println!("{}", name);
                    }
                }
            }
        }
        Commands::CheckUpdate => {
            let queue: BackgroundQueue<ReleaseStatus> = BackgroundQueue::new();
            ReleaseChecker::default().check_in_background(&queue)?;
            match queue.wait(Duration::from_secs(15)).pop() {
                Some(ReleaseStatus::Available(release)) => {
                    println!("Please upgrade to {} (running v{})", release.tag_name, CURRENT_VERSION);
                    if let Some(url) = release.html_url {
                        println!("{}", url);
                    }
                }
                Some(ReleaseStatus::Ahead) => println!("v{} is newer than the latest release", CURRENT_VERSION),
                Some(ReleaseStatus::UpToDate) => println!("v{} is up to date", CURRENT_VERSION),
                None => println!("Release check timed out"),
            }
        }
    }

    Ok(())
}

fn print_items(tree: &PoiTree, ids: &[NodeId], depth: usize) {
    let indent = "  ".repeat(depth);
    for &id in ids {
        match tree.get(id) {
            Some(Item::Folder(folder)) => {
                let count = tree.census(id).map(|c| c.pois).unwrap_or(0);
                println!("{}#{} {}/ ({} POIs)", indent, id, folder.name, count);
                if let Ok(children) = tree.children(Some(id)) {
                    print_items(tree, children, depth + 1);
                }
            }
            Some(Item::Poi(poi)) => {
                let mark = if poi.active { "x" } else { " " };
                let coords = poi
                    .coords
                    .map(|c| format!(" ({:.4}, {:.4})", c.lat, c.lon))
                    .unwrap_or_default();
                println!(
                    "{}#{} [{}] {} - {}{}",
                    indent,
                    id,
                    mark,
                    poi.label(),
                    poi.full_body_name(),
                    coords
                );
            }
            None => {}
        }
    }
}

fn print_frame(frame: &GuidanceFrame) {
    if frame.rows.is_empty() {
        println!("No active POIs on this body");
        return;
    }
    for row in &frame.rows {
        let mark = if row.is_target { ">" } else { " " };
        println!("{} #{} {}", mark, row.node, row.text);
    }
    if let Some(g) = &frame.guidance {
        println!(
            "guidance: distance={} deviation={:.1} on_course={} arrows={} zone={:?}",
            distance_text(g.distance_m),
            g.deviation_deg,
            g.on_course,
            g.arrow_count,
            g.zone
        );
    }
    if let Some(panel) = &frame.panel {
        println!("panel: {:>4} {} {:<4}", panel.left, panel.center, panel.right);
    }
}

fn print_settings(settings: &Settings) {
    println!("guidance threshold: {}°", settings.guidance_threshold);
    println!("guidance stop distance: {} m", settings.guidance_distance);
    println!("overlay rows: {}", settings.max_overlay_rows);
    println!("overlay left margin: {}", settings.overlay_left_margin);
    println!("distance with altitude: {}", settings.calc_with_altitude);
    println!("heading guidance: {}", settings.heading_guidance);
    println!("panel info: {}", settings.show_gui_info);
    println!("auto update: {}", settings.auto_update);
}
