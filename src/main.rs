//! Castpoint CLI
//!
//! Parses destinations, computes bearings and casts points from the command
//! line, driving the same compass state the library exposes to apps.

use castpoint::algorithms::geodesy::{self, normalize_degrees};
use castpoint::api::{cardinal, format_coordinate, format_distance, format_dms};
use castpoint::hardware::{MockOrientationSource, OrientationChannel, OrientationReading};
use castpoint::processing::plus_code;
use castpoint::utils::logging::init_logging;
use castpoint::{
    CompassApi, CompassConfig, ConfigurationManager, Coordinate, DestinationParser,
    DistanceStepTable, JsonFileStore, KeyValueStore, MemoryStore, Position, Swipe, SwipeResult,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "castpoint")]
#[command(about = "Offline compass toward typed or cast destinations", long_about = None)]
struct Args {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a destination in any supported format
    Parse {
        /// Decimal pair, DMS, map link or plus code
        text: String,
    },
    /// Bearing and distance between two places
    Navigate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Current compass heading, for the arrow rotation
        #[arg(long)]
        heading: Option<f64>,
    },
    /// Cast a point from a position along a heading
    Cast {
        #[arg(long)]
        from: String,
        /// Clockwise degrees from north
        #[arg(long)]
        heading: f64,
        /// Snapped to the nearest selectable distance
        #[arg(long)]
        distance: Option<f64>,
        /// Persist the destination in this JSON file
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// List the selectable cast distances
    Steps,
    /// Encode a coordinate as a plus code
    Encode {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, default_value = "10")]
        length: usize,
    },
    /// Write the effective configuration to a file
    InitConfig {
        output: PathBuf,
        /// Override the default cast distance
        #[arg(long)]
        default_distance: Option<f64>,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(if args.verbose { "castpoint=debug" } else { "castpoint=warn" });

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut manager = match &args.config {
        Some(path) => ConfigurationManager::from_file(path)?,
        None => ConfigurationManager::new(),
    };
    let parser = DestinationParser::new();

    match args.command {
        Command::Parse { text } => {
            let parsed = parser.parse(&text)?;
            println!("Format:     {}", parsed.format);
            println!("Decimal:    {}", format_coordinate(&parsed.coordinate()));
            println!("DMS:        {}", format_dms(parsed.lat, parsed.lng));
            if let Some(code) = plus_code::encode(parsed.lat, parsed.lng, 10) {
                println!("Plus code:  {}", code);
            }
        }
        Command::Navigate { from, to, heading } => {
            let origin = parser.parse(&from)?.coordinate();
            let target = parser.parse(&to)?.coordinate();
            print_route(&origin, &target, heading);
        }
        Command::Cast {
            from,
            heading,
            distance,
            store,
        } => {
            let backend: Box<dyn KeyValueStore> = match store {
                Some(path) => Box::new(JsonFileStore::new(path)),
                None => Box::new(MemoryStore::new()),
            };
            cast(manager.config().clone(), backend, &parser, &from, heading, distance)?;
        }
        Command::Steps => {
            let table = DistanceStepTable::new();
            for (index, meters) in table.values().iter().enumerate() {
                println!("{:>3}  {:>8}  {}", index, meters, format_distance(*meters as f64));
            }
        }
        Command::Encode { lat, lng, length } => {
            Coordinate::new(lat, lng)?;
            let code = plus_code::encode(lat, lng, length)
                .ok_or_else(|| format!("Unsupported code length {} (use 10 to 15)", length))?;
            println!("{}", code);
        }
        Command::InitConfig {
            output,
            default_distance,
        } => {
            if let Some(meters) = default_distance {
                let previous = manager.set_default_cast_distance(meters)?;
                println!("Default cast distance: {} -> {}", previous, meters);
            }
            manager.save_to_file(&output)?;
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}

fn print_route(origin: &Coordinate, target: &Coordinate, heading: Option<f64>) {
    if geodesy::is_antipodal(origin, target) {
        println!("Warning: points are antipodal, every bearing is a shortest path");
    }
    let bearing = geodesy::bearing(origin, target);
    println!("Distance:   {}", format_distance(geodesy::distance(origin, target)));
    println!("Bearing:    {:.1}° {}", bearing, cardinal(bearing));
    if let Some(heading) = heading {
        let relative = geodesy::relative_bearing(bearing, heading);
        println!("Arrow:      {:.1}° (turn {:+.1}°)", relative, geodesy::shortest_rotation(heading, bearing));
    }
}

/// Run a full cast session against the compass state: swipe to activate,
/// select the distance, commit along the heading.
fn cast(
    config: CompassConfig,
    backend: Box<dyn KeyValueStore>,
    parser: &DestinationParser,
    from: &str,
    heading: f64,
    distance: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    let origin = parser.parse(from)?.coordinate();
    let mut api = CompassApi::new(config, backend)?;

    // The heading is replayed as an absolute-channel reading
    let mut compass = MockOrientationSource::new(OrientationChannel::Absolute);
    compass.push(OrientationReading::absolute(Some(normalize_degrees(360.0 - heading)), 0));
    api.add_orientation_source(Box::new(compass));
    api.start();
    api.update_position(Position::new(origin.lat, origin.lng, 0.0)?);
    api.process_cycle(0);

    let gesture = api.config().gesture.clone();
    for n in 0..gesture.required_swipes as u64 {
        let result = api.on_swipe(&Swipe::upward(gesture.min_swipe_px, n * 100, 50));
        if let SwipeResult::Refused(reason) = result {
            return Err(reason.into());
        }
    }

    if let Some(meters) = distance {
        let index = api.session().table().nearest_index(meters);
        api.session_mut().set_index(index as i64);
    }

    let destination = api.commit_cast()?;
    let target = destination.coordinate();
    println!("Cast:       {} at {:.1}°", format_distance(destination.initial_distance_meters), heading);
    println!("Decimal:    {}", format_coordinate(&target));
    println!("DMS:        {}", format_dms(target.lat, target.lng));
    if let Some(code) = plus_code::encode(target.lat, target.lng, 10) {
        println!("Plus code:  {}", code);
    }
    Ok(())
}
