use crate::store::SortField;
use crate::types::{Coordinates, Kind};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "mapty.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// SQLite file holding the local workout store.
    #[arg(long, env = "MAPTY_DB", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Current position as LAT,LNG. The map opens here; without it there is no map.
    #[arg(long, env = "MAPTY_POSITION", value_name = "LAT,LNG", global = true)]
    pub position: Option<Coordinates>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a new workout at a location.
    Add(AddArgs),

    /// Change distance, duration, cadence or elevation of a workout.
    Edit(EditArgs),

    /// Delete a workout.
    Delete {
        id: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },

    /// Print all workouts.
    List {
        #[arg(long, value_enum)]
        sort: Option<SortField>,
    },

    /// Print one workout and center the map on it.
    Show { id: String },

    /// Print the map bounds that fit every marker.
    ShowAll,

    /// Write all markers to a GPX file as waypoints.
    Export { path: PathBuf },

    /// Remove every stored workout.
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("location").required(true).args(["at", "from_gpx"])))]
#[command(group(ArgGroup::new("extra").required(true).args(["cadence", "elevation"])))]
pub struct AddArgs {
    #[arg(value_enum)]
    pub kind: Kind,

    /// Kilometers.
    #[arg(long)]
    pub distance: f64,

    /// Minutes.
    #[arg(long)]
    pub duration: f64,

    /// Steps per minute (running).
    #[arg(long)]
    pub cadence: Option<f64>,

    /// Meters climbed (cycling).
    #[arg(long, allow_negative_numbers = true)]
    pub elevation: Option<f64>,

    /// Where the workout happened, LAT,LNG.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Option<Coordinates>,

    /// Use the first point of this GPX file as the location.
    #[arg(long, value_name = "FILE")]
    pub from_gpx: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("extra").args(["cadence", "elevation"])))]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub distance: Option<f64>,

    #[arg(long)]
    pub duration: Option<f64>,

    #[arg(long)]
    pub cadence: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub elevation: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_location() {
        let cli = Cli::try_parse_from([
            "mapty", "add", "running", "--distance", "5", "--duration", "25", "--cadence", "180",
            "--at", "-10.5,20",
        ])
        .unwrap();
        let Some(Cmd::Add(args)) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.kind, Kind::Running);
        assert_eq!(args.at, Some(Coordinates::new(-10.5, 20.0)));
        assert_eq!(args.cadence, Some(180.0));
    }

    #[test]
    fn add_requires_a_location() {
        let res = Cli::try_parse_from([
            "mapty", "add", "cycling", "--distance", "5", "--duration", "25", "--elevation", "10",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn list_is_optional_and_sortable() {
        let cli = Cli::try_parse_from(["mapty", "--db", "x.db", "list", "--sort", "pace"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Some(Cmd::List {
                sort: Some(SortField::Pace)
            })
        ));
        assert_eq!(cli.db, PathBuf::from("x.db"));
        assert!(Cli::try_parse_from(["mapty"]).unwrap().cmd.is_none());
    }

    #[test]
    fn bad_position_is_rejected() {
        assert!(Cli::try_parse_from(["mapty", "--position", "north", "list"]).is_err());
    }
}
