//! contagion-engine CLI
//!
//! Run interbank clearing from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Clear a network from a JSON file
//! contagion-engine clear --input network.json
//!
//! # Output as JSON
//! contagion-engine clear --input network.json --format json
//!
//! # Generate a random network for testing
//! contagion-engine generate --banks 100 --probability 0.05
//! ```

use contagion_engine::analysis::contagion::ContagionReport;
use contagion_engine::core::network::FinancialNetwork;
use contagion_engine::simulation::random_network::{generate_random_network, NetworkConfig};
use contagion_engine::solver::clearing::ClearingSolver;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"contagion-engine — greatest clearing vector for interbank default contagion

USAGE:
    contagion-engine <COMMAND> [OPTIONS]

COMMANDS:
    clear       Compute the greatest clearing vector of a network
    generate    Generate a random interbank network (for testing)
    help        Show this message

OPTIONS (clear):
    --input <FILE>      Path to JSON network file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --banks <N>         Number of banks (default: 10)
    --probability <P>   Probability of a liability between two banks (default: 0.05)
    --asset-scale <T>   External assets drawn uniformly from [0, T) (default: 20)
    --alpha <A>         Recovery rate on external assets (default: 0.5)
    --beta <B>          Recovery rate on interbank receivables (default: 0.5)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    contagion-engine clear --input network.json
    contagion-engine clear --input network.json --format json
    contagion-engine generate --banks 100 --probability 0.05 --output test.json"#
    );
}

/// JSON schema for input networks.
#[derive(serde::Deserialize)]
struct NetworkFile {
    alpha: f64,
    beta: f64,
    external_assets: Vec<f64>,
    liabilities: Vec<LiabilityInput>,
}

#[derive(serde::Deserialize)]
struct LiabilityInput {
    from: usize,
    to: usize,
    amount: f64,
}

/// JSON output schema for clearing results.
#[derive(serde::Serialize)]
struct ClearingOutput {
    clearing_vector: Vec<f64>,
    total_obligations: f64,
    total_paid: f64,
    total_shortfall: f64,
    fundamental_defaults: usize,
    contagion_defaults: usize,
    total_defaults: usize,
    rounds: usize,
    insolvency_levels: Vec<usize>,
    insolvent_banks: Vec<usize>,
}

fn load_network(path: &str) -> FinancialNetwork {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: NetworkFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "alpha": 0.5,
  "beta": 0.5,
  "external_assets": [1.0, 1.0],
  "liabilities": [
    {{ "from": 0, "to": 1, "amount": 2.0 }}
  ]
}}"#
        );
        process::exit(1);
    });

    let entries: Vec<(usize, usize, f64)> = file
        .liabilities
        .iter()
        .map(|l| (l.from, l.to, l.amount))
        .collect();

    FinancialNetwork::from_entries(&entries, file.external_assets, file.alpha, file.beta)
        .unwrap_or_else(|e| {
            eprintln!("Invalid network: {}", e);
            process::exit(1);
        })
}

fn cmd_clear(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let network = load_network(&path);
    let outcome = ClearingSolver::solve(&network).unwrap_or_else(|e| {
        eprintln!("Clearing failed: {}", e);
        process::exit(1);
    });
    let report = ContagionReport::from_outcome(&network, &outcome);

    if format == "json" {
        let output = ClearingOutput {
            clearing_vector: outcome.clearing_vector().iter().copied().collect(),
            total_obligations: report.total_obligations,
            total_paid: report.total_paid,
            total_shortfall: report.total_shortfall(),
            fundamental_defaults: report.fundamental_defaults,
            contagion_defaults: report.contagion_defaults,
            total_defaults: report.total_defaults,
            rounds: report.rounds,
            insolvency_levels: report.insolvency_levels.clone(),
            insolvent_banks: outcome.final_insolvency_set().iter().copied().collect(),
        };

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", report);

        println!("--- Clearing vector ---");
        for (bank, paid) in outcome.clearing_vector().iter().enumerate() {
            let nominal = network.total_liabilities()[bank];
            let status = if outcome.is_insolvent(bank) {
                "INSOLVENT"
            } else {
                "solvent"
            };
            println!("  Bank {:>4}: pays {:>12.6} of {:>12.6}  [{}]", bank, paid, nominal, status);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = NetworkConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--banks" => {
                i += 1;
                config.bank_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--banks requires a number");
                    process::exit(1);
                });
            }
            "--probability" => {
                i += 1;
                config.liability_probability =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--probability requires a number in [0, 1]");
                        process::exit(1);
                    });
            }
            "--asset-scale" => {
                i += 1;
                config.asset_scale = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--asset-scale requires a number");
                    process::exit(1);
                });
            }
            "--alpha" => {
                i += 1;
                config.alpha = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--alpha requires a number in [0, 1]");
                    process::exit(1);
                });
            }
            "--beta" => {
                i += 1;
                config.beta = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--beta requires a number in [0, 1]");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let network = generate_random_network(&config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    });

    #[derive(serde::Serialize)]
    struct OutputLiability {
        from: usize,
        to: usize,
        amount: f64,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        alpha: f64,
        beta: f64,
        external_assets: Vec<f64>,
        liabilities: Vec<OutputLiability>,
    }

    let n = network.bank_count();
    let mut liabilities = Vec::new();
    for from in 0..n {
        for to in 0..n {
            let amount = network.liabilities()[(from, to)];
            if amount > 0.0 {
                liabilities.push(OutputLiability { from, to, amount });
            }
        }
    }

    let output = OutputFile {
        alpha: network.alpha(),
        beta: network.beta(),
        external_assets: network.external_assets().iter().copied().collect(),
        liabilities,
    };

    let json = match serde_json::to_string_pretty(&output) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing network: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {}-bank network with {} liabilities → {}",
            n,
            output.liabilities.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "clear" => cmd_clear(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
