use crate::level::Level;
use crate::logger::{Logger, Options};
use crate::record::{Record, Value};
use crate::{debugf, errorf, infof, warnf};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linelog")]
#[command(about = "Leveled line logger with optional file mirroring", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit one sample line per level, plus a sub-logger line
    Demo {
        #[arg(long, default_value = "demo")]
        module: String,

        /// Minimum level written; omit to disable filtering
        #[arg(long, value_enum)]
        min_level: Option<Level>,

        #[arg(long)]
        color: bool,

        /// Mirror every line to this file as well
        #[arg(long)]
        file: Option<String>,

        /// Suppress the stdout copy of every line
        #[arg(long)]
        quiet: bool,
    },
    /// Emit one structured record line
    Event {
        name: String,

        #[arg(long, value_enum, default_value_t = Level::Info)]
        level: Level,

        #[arg(long, default_value = "")]
        sub_module: String,

        /// Record field as key=value; repeatable
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,

        #[arg(long, default_value = "")]
        module: String,

        #[arg(long)]
        color: bool,

        /// Mirror the line to this file as well
        #[arg(long)]
        file: Option<String>,
    },
}

fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    let value = if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(x) = raw.parse::<f64>() {
        Value::Float(x)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::Bool(b)
    } else {
        Value::Str(raw.to_string())
    };
    Ok((key.to_string(), value))
}

pub fn handle_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Demo {
            module,
            min_level,
            color,
            file,
            quiet,
        } => {
            let logger = Logger::new(Options {
                module,
                min_level,
                color,
                file_path: file.clone().unwrap_or_default(),
                mirror_to_file: file.is_some(),
                suppress_stdout: quiet,
            })?;

            debugf!(logger, "starting up");
            infof!(logger, "listening on {}", "0.0.0.0:8080");
            warnf!(logger, "config file missing, using defaults");
            errorf!(logger, "upstream refused: {}", "connection reset");
            infof!(logger.sub("worker"), "spawned {} workers", 4);
            Ok(())
        }
        Commands::Event {
            name,
            level,
            sub_module,
            fields,
            module,
            color,
            file,
        } => {
            let logger = Logger::new(Options {
                module,
                color,
                file_path: file.clone().unwrap_or_default(),
                mirror_to_file: file.is_some(),
                ..Options::default()
            })?;

            let mut record = Record::new(level, name).with_sub_module(sub_module);
            for (key, value) in fields {
                record = record.field(key, value);
            }
            logger.emit(&record);
            Ok(())
        }
    }
}
