//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use renocost_types::{OutputFormat, RecordKind};

#[derive(Parser)]
#[command(name = "renocost")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Home renovation cost estimation with quote, visit and AMC records")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory override (record store, uploads)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Model artifact directory override
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate a job and save the quote
    Estimate {
        /// Service type (painting, plumbing, tiling, other)
        service: String,

        /// Area in square metres
        #[arg(long, short = 'a')]
        area: Option<f64>,

        /// Plumbing connection points
        #[arg(long, short = 'p')]
        points: Option<u32>,

        /// Extra feature as KEY=VALUE (e.g. material_grade=premium)
        #[arg(long = "feature", short = 'F', value_name = "KEY=VALUE")]
        features: Vec<String>,

        /// Site photo (JPG or PNG); repeatable
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },

    /// Schedule a site visit
    Visit {
        /// Site address
        address: String,

        /// Visit time (RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD", UTC)
        #[arg(long, short = 'w')]
        when: String,

        /// Link the visit to a saved quote
        #[arg(long, short = 'q')]
        quote: Option<String>,

        /// Customer name
        #[arg(long, short = 'c')]
        customer: Option<String>,
    },

    /// Subscribe to an annual maintenance contract (monthly ₹499, yearly ₹4999)
    Amc {
        /// Plan (monthly, yearly)
        plan: String,

        /// Customer name
        #[arg(long, short = 'c')]
        customer: Option<String>,
    },

    /// Record a worker's daily log
    Worklog {
        /// Worker name
        worker: String,

        /// Work completed today
        #[arg(long, default_value = "")]
        done: String,

        /// Work planned for the next day
        #[arg(long, default_value = "")]
        next: String,

        /// Progress photo (JPG or PNG)
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Show stored records, newest first
    History {
        /// Record kind
        #[arg(value_enum, default_value = "quote")]
        kind: RecordKind,

        /// Only quotes for this service
        #[arg(long, short = 's')]
        service: Option<String>,

        /// Only visits or subscriptions in this status
        #[arg(long)]
        status: Option<String>,

        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Export stored records to CSV or Excel
    Export {
        /// Record kind
        #[arg(value_enum, default_value = "quote")]
        kind: RecordKind,

        /// Output file path
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Only quotes for this service
        #[arg(long, short = 's')]
        service: Option<String>,

        /// Only visits or subscriptions in this status
        #[arg(long)]
        status: Option<String>,

        /// Write quotes as an Excel report instead of CSV
        #[arg(long, conflicts_with = "training")]
        excel: bool,

        /// Write quotes as a model training set (service,area,points,image,total)
        #[arg(long)]
        training: bool,
    },

    /// List verified service providers
    Providers {
        /// Only providers offering this service
        service: Option<String>,

        /// Case-insensitive name search
        #[arg(long, short = 'q')]
        search: Option<String>,

        /// Write the built-in catalogue to the providers file
        #[arg(long)]
        init: bool,
    },

    /// List services with a trained model
    Models,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set a value (data_dir, models_dir, providers_file, output_format)
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
