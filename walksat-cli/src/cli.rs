//! Contains structures and functionality for the binary
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use walksat::{
    projection::RelationResults,
    relation::{DataKind, Relation, DEFAULT_DELIMITER},
    search::{
        parameters::{DEFAULT_MAX_TRIES, DEFAULT_NOISE},
        SearchParameters,
    },
};

use crate::error::CliError;

/// Default output directory.
const DEFAULT_OUTPUT_DIRECTORY: &str = "results";

/// Extension of result files.
const RESULT_EXTENSION: &str = "tsv";

/// Possible inference engines.
#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub(crate) enum EngineKind {
    /// Markov logic network solved with MaxWalkSat
    #[default]
    Mln,
    /// Uniformly random truth values
    Random,
}

/// Cli Arguments related to logging
#[derive(clap::Args, Debug)]
pub(crate) struct LoggingArgs {
    /// Increase log verbosity (multiple uses increase verbosity further)
    #[arg(short, long, action = clap::builder::ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Reduce log verbosity to show only errors (equivalent to --log error)
    #[arg(short, long, group = "verbosity")]
    quiet: bool,
    /// Set log verbosity (default is "warn")
    #[arg(long = "log", value_parser=clap::builder::PossibleValuesParser::new(["error", "warn", "info", "debug", "trace"]), group = "verbosity")]
    log_level: Option<String>,
}

impl LoggingArgs {
    /// Initialising Logging
    ///
    /// Sets the logging verbosity to the given log-level in the following order:
    ///  * `Info`, `Debug`, `Trace`; depending on the count of `-v`
    ///  * `Error` when `-q` is used
    ///  * The `WSAT_LOG` environment variable value
    ///  * `Warn` otherwise
    pub(crate) fn initialize_logging(&self) {
        let mut builder = env_logger::Builder::new();

        // Default log level
        builder.filter_level(log::LevelFilter::Warn);

        builder.parse_env("WSAT_LOG");
        if let Some(ref level) = self.log_level {
            builder.parse_filters(level);
        } else if self.quiet {
            builder.filter_level(log::LevelFilter::Error);
        } else if self.verbose > 0 {
            builder.filter_level(match self.verbose {
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            });
        }
        builder.init();
    }
}

/// Cli arguments related to the search
#[derive(Debug, clap::Args)]
pub(crate) struct SearchArgs {
    /// Maximal number of flips per attempt
    /// (default is ten times the number of atoms occurring in ground rules)
    #[arg(long = "max-flips")]
    max_flips: Option<usize>,
    /// Number of search attempts
    #[arg(long = "max-tries", default_value_t = DEFAULT_MAX_TRIES)]
    max_tries: usize,
    /// Probability of flipping a random atom instead of the best one
    #[arg(long = "noise", default_value_t = DEFAULT_NOISE)]
    noise: f64,
    /// Seed of the random number generator (default is a random seed)
    #[arg(long = "seed")]
    seed: Option<u64>,
}

impl SearchArgs {
    /// Collect the search parameters.
    pub(crate) fn parameters(&self) -> SearchParameters {
        SearchParameters {
            max_flips: self.max_flips,
            max_tries: self.max_tries,
            noise: self.noise,
            seed: self.seed,
        }
    }
}

/// Cli arguments related to file output
#[derive(Debug, clap::Args)]
pub(crate) struct OutputArgs {
    /// Directory the inferred values are written to
    #[arg(short='D', long = "output", default_value = DEFAULT_OUTPUT_DIRECTORY)]
    output_directory: PathBuf,
    /// Replace any existing files during export
    #[arg(short, long = "overwrite-results", default_value = "false")]
    overwrite: bool,
}

impl OutputArgs {
    /// Return the path of the result file for the relation called `name`.
    pub(crate) fn result_path(&self, name: &str) -> PathBuf {
        self.output_directory
            .join(format!("{name}.{RESULT_EXTENSION}"))
    }

    /// Fail if any of the result files exists and may not be replaced.
    pub(crate) fn prevent_accidental_overwrite<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), CliError> {
        if self.overwrite {
            return Ok(());
        }

        for name in names {
            let filename = self.result_path(name);
            if filename.exists() {
                return Err(CliError::OutputExists { filename });
            }
        }

        Ok(())
    }

    /// Write the inferred rows of one relation, returning the path of the file.
    pub(crate) fn write_results(&self, results: &RelationResults) -> Result<PathBuf, CliError> {
        std::fs::create_dir_all(&self.output_directory)?;

        let filename = self.result_path(results.name());
        Self::write_records(&filename, results).map_err(|error| CliError::Writing {
            error,
            filename: filename.clone(),
        })?;

        log::info!(
            "wrote {} rows of {} to {}",
            results.rows().len(),
            results.name(),
            filename.display()
        );

        Ok(filename)
    }

    fn write_records(filename: &Path, results: &RelationResults) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(DEFAULT_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .from_writer(File::create(filename)?);

        for row in results.rows() {
            writer.write_record(row.to_record())?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Declaration of a relation on the command line, written as `NAME/ARITY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationDeclaration {
    /// Name of the relation
    pub(crate) name: String,
    /// Number of arguments
    pub(crate) arity: usize,
}

/// Parse a relation declaration.
fn parse_relation(s: &str) -> Result<RelationDeclaration, String> {
    let (name, arity) = s
        .rsplit_once('/')
        .ok_or_else(|| format!("Invalid NAME/ARITY: {s}"))?;
    let arity = arity
        .parse()
        .map_err(|_| format!("Invalid arity in {s}: {arity}"))?;

    Ok(RelationDeclaration {
        name: name.to_string(),
        arity,
    })
}

/// Key-Value pair assigning something to a relation
#[derive(Debug, Clone)]
pub(crate) struct RelationKeyValue<T> {
    /// Name of the relation
    pub(crate) relation: String,
    /// Value
    pub(crate) value: T,
}

/// Parse key value pairs.
fn parse_key_val<T>(s: &str) -> Result<RelationKeyValue<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (relation, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid RELATION=VALUE: {s}"))?;
    let value = value
        .parse()
        .map_err(|error| format!("Invalid value in {s}: {error}"))?;

    Ok(RelationKeyValue {
        relation: relation.to_string(),
        value,
    })
}

/// Walksat CLI
#[derive(clap::Parser, Debug)]
#[command(name = "wsat", author, version, about)]
pub(crate) struct CliApp {
    /// Rule file with one rule per line, optionally prefixed by `WEIGHT:` (`.:` for hard rules)
    #[arg(value_parser)]
    pub(crate) rules: PathBuf,
    /// Declare a relation, e.g. "Friends/2"
    #[arg(short, long = "relation", value_parser = parse_relation, required = true)]
    pub(crate) relations: Vec<RelationDeclaration>,
    /// Tab separated observed rows of a relation, e.g. "Friends=friends_obs.txt";
    /// an additional last column holds the truth value
    #[arg(long = "observed", value_parser = parse_key_val::<PathBuf>)]
    pub(crate) observed: Vec<RelationKeyValue<PathBuf>>,
    /// Tab separated unobserved rows of a relation, e.g. "Smokes=smokes_targets.txt"
    #[arg(long = "unobserved", value_parser = parse_key_val::<PathBuf>)]
    pub(crate) unobserved: Vec<RelationKeyValue<PathBuf>>,
    /// Probability of unobserved rows of a relation to start out true, e.g. "Smokes=0.2"
    #[arg(long = "prior", value_parser = parse_key_val::<f64>)]
    pub(crate) priors: Vec<RelationKeyValue<f64>>,
    /// JSON file with the ground rules computed by an external grounder
    #[arg(short, long = "ground-program")]
    pub(crate) ground_program: Option<PathBuf>,
    /// Inference engine
    #[arg(short, long = "engine", value_enum, default_value_t)]
    pub(crate) engine: EngineKind,
    /// Arguments related to the search
    #[command(flatten)]
    pub(crate) search: SearchArgs,
    /// Arguments related to output
    #[command(flatten)]
    pub(crate) output: OutputArgs,
    /// Arguments related to logging
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

impl CliApp {
    /// Build the declared relations and load their data.
    pub(crate) fn load_relations(&self) -> Result<Vec<Relation>, CliError> {
        let mut relations: Vec<Relation> = Vec::new();

        for declaration in &self.relations {
            if relations
                .iter()
                .any(|relation| relation.name() == declaration.name)
            {
                return Err(CliError::DuplicateRelation {
                    name: declaration.name.clone(),
                });
            }

            relations.push(Relation::new(&declaration.name, declaration.arity)?);
        }

        let position = |name: &str| {
            relations
                .iter()
                .position(|relation| relation.name() == name)
                .ok_or_else(|| CliError::UndeclaredRelation {
                    name: name.to_string(),
                })
        };

        let mut priors = Vec::new();
        for prior in &self.priors {
            priors.push((position(&prior.relation)?, prior.value));
        }

        let mut sources = Vec::new();
        for (kind, files) in [
            (DataKind::Observed, &self.observed),
            (DataKind::Unobserved, &self.unobserved),
        ] {
            for file in files {
                sources.push((position(&file.relation)?, kind, &file.value));
            }
        }

        for (index, prior) in priors {
            let relation = relations.remove(index);
            relations.insert(index, relation.with_negative_prior(prior)?);
        }

        for (index, kind, path) in sources {
            let count = relations[index].load_file(path, kind, DEFAULT_DELIMITER)?;
            log::info!(
                "loaded {count} {kind:?} rows for {} from {}",
                relations[index],
                path.display()
            );
        }

        Ok(relations)
    }
}
