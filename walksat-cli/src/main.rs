/*!
  Binary for the CLI of walksat: wsat
*/

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod cli;
pub mod error;
pub mod rule_file;

use clap::Parser;
use cli::{CliApp, EngineKind};
use colored::Colorize;
use error::CliError;
use rule_file::RuleFile;
use walksat::{
    engine::{InferenceEngine, MlnEngine, RandomEngine},
    grounding::PrecomputedGrounder,
    projection::InferenceResults,
};

fn print_finished_message(results: &InferenceResults, loss: Option<f64>) {
    let rows: usize = results.iter().map(|relation| relation.rows().len()).sum();

    println!(
        "Inference completed. Inferred {} values for {} relations.",
        rows.to_string().green().bold(),
        results.len().to_string().green().bold(),
    );

    if let Some(loss) = loss {
        println!("   {0: <14} {1}", "Best loss:", loss);
    }
}

fn run(cli: CliApp) -> Result<(), CliError> {
    log::info!("Reading rules ...");
    let rule_file = RuleFile::read(&cli.rules)?;
    log::info!("{} rules read", rule_file.rules.len());

    let relations = cli.load_relations()?;
    let parameters = cli.search.parameters();

    cli.output.prevent_accidental_overwrite(
        relations
            .iter()
            .filter(|relation| relation.has_unobserved_rows())
            .map(|relation| relation.name()),
    )?;

    log::info!("Inference ... ");

    let (results, loss) = match cli.engine {
        EngineKind::Mln => {
            let ground_program = cli.ground_program.ok_or(CliError::NoGroundProgram)?;
            let engine = MlnEngine::new(
                relations,
                rule_file.rules,
                rule_file.weights,
                PrecomputedGrounder::new(ground_program),
            );

            let (results, outcome) = engine.solve_with_outcome(&parameters)?;
            (results, Some(outcome.loss))
        }
        EngineKind::Random => (RandomEngine::new(relations).solve(&parameters)?, None),
    };

    log::info!("Inference done");

    for relation in results.iter() {
        cli.output.write_results(relation)?;
    }

    print_finished_message(&results, loss);

    Ok(())
}

fn main() {
    let cli = CliApp::parse();

    cli.logging.initialize_logging();
    log::info!("Version: {}", clap::crate_version!());
    log::debug!("Rule file: {:?}", cli.rules);

    run(cli).unwrap_or_else(|err| {
        log::error!("{} {err}", "error:".red().bold());
        std::process::exit(1)
    })
}
