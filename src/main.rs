#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use mapty::app::{App, FormRequest};
use mapty::cli::{self, AddArgs, Cmd, EditArgs};
use mapty::geo::FixedLocator;
use mapty::storage::SqliteStorage;
use mapty::types::{Kind, WorkoutId};
use mapty::views::{ListModel, MapView, MarkerSet};
use mapty::{Error, gpx, utils};
use std::io;

#[macro_use]
extern crate mapty;

type CliApp = App<SqliteStorage, ListModel, MarkerSet>;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let storage = SqliteStorage::open(&cli.db)
        .with_context(|| format!("opening workout store: {}", cli.db.display()))?;
    let mut app = App::new(storage, ListModel::new(), MarkerSet::new());

    match app.start(&FixedLocator::new(cli.position)) {
        Ok(()) => {}
        Err(Error::Geolocation(notice)) => tracing::info!("map not loaded: {notice}"),
        Err(e) => return Err(e).context("starting workout log"),
    }
    dlog!(
        "db={} workouts={} map_loaded={}",
        cli.db.display(),
        app.store().len(),
        app.map().is_loaded()
    );

    match cli.cmd {
        Some(Cmd::Add(args)) => add(&mut app, args),
        Some(Cmd::Edit(args)) => edit(&mut app, args),
        Some(Cmd::Delete { id, yes }) => {
            if !yes && !ask("Are you sure?")? {
                tracing::info!("delete cancelled");
                return Ok(());
            }
            let removed = app.delete(&WorkoutId::from(id))?;
            println!("deleted {}", removed.description());
            Ok(())
        }
        Some(Cmd::List { sort }) => {
            if let Some(field) = sort {
                app.sort(field);
            }
            print_list(&app);
            Ok(())
        }
        None => {
            print_list(&app);
            Ok(())
        }
        Some(Cmd::Show { id }) => {
            let id = WorkoutId::from(id);
            let at = app.focus(&id)?;
            if let Some(row) = app.list().rows().iter().find(|r| r.id == id) {
                println!("{}", row.text);
            }
            if app.map().is_loaded() {
                println!("map centered at {at}");
            }
            Ok(())
        }
        Some(Cmd::ShowAll) => {
            if !app.map().is_loaded() {
                bail!("The map is not loaded; pass --position LAT,LNG or set MAPTY_POSITION.");
            }
            match app.show_all() {
                Some(bounds) => println!("{bounds}"),
                None => println!("No markers to show."),
            }
            Ok(())
        }
        Some(Cmd::Export { path }) => gpx::export_waypoints(app.store().records(), &path),
        Some(Cmd::Reset { yes }) => {
            if !yes && !ask("All data will be lost, are you sure?")? {
                tracing::info!("reset cancelled");
                return Ok(());
            }
            app.reset()?;
            Ok(())
        }
    }
}

fn add(app: &mut CliApp, args: AddArgs) -> Result<()> {
    let extra = match (args.kind, args.cadence, args.elevation) {
        (Kind::Running, Some(cadence), None) => cadence,
        (Kind::Cycling, None, Some(elevation)) => elevation,
        (Kind::Running, ..) => bail!("running workouts take --cadence"),
        (Kind::Cycling, ..) => bail!("cycling workouts take --elevation"),
    };

    let click = match (args.at, args.from_gpx) {
        (Some(at), _) => at,
        (None, Some(path)) => gpx::first_point(&path)?
            .with_context(|| format!("no usable point in {}", path.display()))?,
        (None, None) => bail!("a location is required (--at or --from-gpx)"),
    };

    let form = FormRequest::create(args.kind, args.distance, args.duration, extra);
    let id = app.submit(&form, Some(click))?;
    print_row(app, &id);
    Ok(())
}

fn edit(app: &mut CliApp, args: EditArgs) -> Result<()> {
    let id = WorkoutId::from(args.id);
    let mut form = app.edit_form(&id)?;

    match (form.kind, args.cadence, args.elevation) {
        (Kind::Running, Some(v), None) | (Kind::Cycling, None, Some(v)) => {
            form.cadence_or_elevation = v;
        }
        (_, None, None) => {}
        (Kind::Running, ..) => bail!("workout {id} is running; use --cadence"),
        (Kind::Cycling, ..) => bail!("workout {id} is cycling; use --elevation"),
    }
    if let Some(distance) = args.distance {
        form.distance = distance;
    }
    if let Some(duration) = args.duration {
        form.duration = duration;
    }

    app.submit(&form, None)?;
    print_row(app, &id);
    Ok(())
}

fn print_row(app: &CliApp, id: &WorkoutId) {
    if let Some(row) = app.list().rows().iter().find(|r| &r.id == id) {
        println!("{}", row.text);
    }
}

fn print_list(app: &CliApp) {
    if app.list().rows().is_empty() {
        println!("No workouts yet.");
        return;
    }
    for row in app.list().rows() {
        println!("{}", row.text);
    }
}

fn ask(prompt: &str) -> Result<bool> {
    utils::confirm(prompt, &mut io::stdin().lock(), &mut io::stdout()).context("reading answer")
}
