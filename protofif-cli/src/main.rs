use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, WrapErr};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use protofif_core::annotations::{self, Extendee};
use protofif_core::sql::{append_sql_literal, parse_rfc3339};
use protofif_core::{install_default_zone, BsonCodec, Duration, Timestamp, Value, Zone};

#[derive(Parser)]
#[command(name = "protofif")]
#[command(about = "Timestamp, duration and dynamic value codecs")]
#[command(version)]
struct Cli {
    /// Zone attached to timestamps decoded without one
    #[arg(long, global = true, env = "PROTOFIF_DEFAULT_ZONE")]
    default_zone: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "PROTOFIF_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a YAML document into a canonical dynamic value
    Normalize {
        /// Input file, stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ValueFormat::Json)]
        to: ValueFormat,
    },
    /// Convert an RFC 3339 timestamp
    Timestamp {
        /// Instant, e.g. 2024-01-15T10:00:00Z
        instant: String,

        /// Display zone, defaults to the offset of the input
        #[arg(short, long)]
        zone: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = TimestampFormat::Fields)]
        to: TimestampFormat,
    },
    /// Convert a duration given in nanoseconds
    Duration {
        /// Nanoseconds
        #[arg(allow_hyphen_values = true)]
        nanos: i64,

        /// Output format
        #[arg(long, value_enum, default_value_t = DurationFormat::Json)]
        to: DurationFormat,
    },
    /// List the schema annotations
    Annotations,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimestampFormat {
    Fields,
    Json,
    Bson,
    Sql,
}

#[derive(Clone, Copy, ValueEnum)]
enum DurationFormat {
    Json,
    Yaml,
    Bson,
    Sql,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    if let Some(name) = &cli.default_zone {
        let zone = Zone::lookup(name)?;
        install_default_zone(zone)?;
        debug!(zone = %zone, "installed default zone");
    }

    match &cli.command {
        Commands::Normalize { input, to } => {
            normalize_document(input.as_ref(), *to)?;
        }
        Commands::Timestamp { instant, zone, to } => {
            convert_timestamp(instant, zone.as_deref(), *to)?;
        }
        Commands::Duration { nanos, to } => {
            convert_duration(Duration::from_nanos(*nanos), *to)?;
        }
        Commands::Annotations => {
            list_annotations();
        }
    }

    Ok(())
}

fn normalize_document(input: Option<&PathBuf>, to: ValueFormat) -> Result<()> {
    let source = match input {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        }
    };

    let value = Value::from_yaml_str(&source)?;
    debug!(kind = value.kind_name(), "normalized document");

    match to {
        ValueFormat::Json => {
            let json = serde_json::Value::from(value);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ValueFormat::Yaml => print!("{}", value.to_yaml_string()?),
    }
    Ok(())
}

fn convert_timestamp(instant: &str, zone: Option<&str>, to: TimestampFormat) -> Result<()> {
    let mut timestamp = parse_rfc3339(instant)?;
    if let Some(name) = zone {
        let zone = Zone::lookup(name)?;
        timestamp = Timestamp::from_instant(&timestamp.to_instant(), zone);
    }

    match to {
        TimestampFormat::Fields => {
            println!("Seconds:  {}", timestamp.seconds);
            println!("Nanos:    {}", timestamp.nanos);
            println!("Location: {}", timestamp.location_name);
            println!("Instant:  {}", timestamp);
        }
        TimestampFormat::Json => println!("{}", serde_json::to_string(&timestamp)?),
        TimestampFormat::Bson => println!("{}", timestamp.to_bson().into_relaxed_extjson()),
        TimestampFormat::Sql => {
            let mut literal = String::new();
            append_sql_literal(&mut literal, Some(&timestamp), true);
            println!("{}", literal);
        }
    }
    Ok(())
}

fn convert_duration(duration: Duration, to: DurationFormat) -> Result<()> {
    match to {
        DurationFormat::Json => println!("{}", serde_json::to_string(&duration)?),
        DurationFormat::Yaml => print!("{}", serde_yaml::to_string(&duration)?),
        DurationFormat::Bson => println!("{}", duration.to_bson().into_relaxed_extjson()),
        // bound as a plain integer column
        DurationFormat::Sql => println!("{}", duration.as_nanos()),
    }
    Ok(())
}

fn list_annotations() {
    for (label, extendee) in [
        ("Message options", Extendee::MessageOptions),
        ("Field options", Extendee::FieldOptions),
    ] {
        println!("{}:", label);
        for annotation in annotations::for_extendee(extendee) {
            println!(
                "  {} = {} ({:?}): {}",
                annotation.name, annotation.number, annotation.value_type, annotation.description
            );
        }
    }
}
