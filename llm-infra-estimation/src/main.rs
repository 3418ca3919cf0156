use clap::Parser;

use llm_infra_estimation::commands::{CatalogKind, Cli, Commands};
use llm_infra_estimation::config::{save_scenario, Configuration};
use llm_infra_estimation::{report, search, sizing};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Evaluate {
            scenario,
            report: as_report,
            json,
        }) => match scenario.build() {
            Ok(cfg) => {
                let results = sizing::evaluate(&cfg);
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&results)
                            .expect("Failed to serialize results.")
                    );
                } else if as_report {
                    println!("{}", report::technical_report(&cfg, &results));
                } else {
                    if let Some(err) = &results.vram_error {
                        eprintln!("FEASIBILITY ERROR: {}", err.message);
                    }
                    report::results_table(&results).printstd();
                    if !results.rating.explanation.is_empty() {
                        println!("{}", results.rating.explanation);
                    }
                    for warning in &results.warnings {
                        eprintln!("Warning: {warning}");
                    }
                }
            }
            Err(e) => eprintln!("{e}"),
        },

        Some(Commands::Search { scenario, json }) => match scenario.build() {
            Ok(cfg) => {
                let cancel = search::CancelToken::new();
                let outcome = search::search_cheapest_with_progress(
                    &cfg,
                    &cancel,
                    &mut |done, total| log::debug!("search progress: {done}/{total}"),
                );
                match outcome {
                    Some(outcome) => {
                        if json {
                            println!(
                                "{}",
                                serde_json::to_string_pretty(&outcome)
                                    .expect("Failed to serialize search outcome.")
                            );
                        } else {
                            println!("{}", report::search_status_line(&outcome));
                            if !outcome.hits.is_empty() {
                                report::search_table(&outcome).printstd();
                            }
                        }
                    }
                    None => eprintln!("Search was cancelled."),
                }
            }
            Err(e) => eprintln!("{e}"),
        },

        Some(Commands::List { catalog, sort }) => {
            let table = match catalog {
                CatalogKind::Models => report::models_table(sort),
                CatalogKind::Gpus => report::gpus_table(sort),
                CatalogKind::Servers => report::servers_table(sort),
                CatalogKind::Networks => report::networks_table(sort),
                CatalogKind::Storage => report::storage_table(sort),
                CatalogKind::Ram => report::ram_table(sort),
                CatalogKind::Software => report::software_table(sort),
            };
            table.printstd();
        }

        Some(Commands::Init { file }) => {
            save_scenario(&Configuration::recommended(), &file);
            println!("Wrote scenario template to '{}'.", file.display());
        }

        None => {
            eprintln!("No command provided. Use --help for more information.");
        }
    }
}
