use std::io::Read;
use std::process::ExitCode;

use bidlint_core::{AnalyzeOptions, Analyzer, PartnerProfile, Severity};

const USAGE: &str = "\
bidlint - OpenRTB bid request linter

USAGE:
    bidlint [OPTIONS] [FILE]

Reads FILE (or stdin when omitted). Input may be a single request, a JSON
array of requests, concatenated objects, or one request per line.

OPTIONS:
    --ctv              Treat requests as CTV regardless of device type
    --partner <NAME>   Enable a partner profile: prebid, amazon-aps
    --json             Emit the full analysis results as JSON
    -v                 Verbose logging
    -h, --help         Show this help
";

struct Args {
    file: Option<String>,
    options: AnalyzeOptions,
    json: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        file: None,
        options: AnalyzeOptions::default(),
        json: false,
        verbose: false,
    };
    let mut argv = std::env::args().skip(1);
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--ctv" => args.options.force_ctv = true,
            "--partner" => {
                let name = argv
                    .next()
                    .ok_or_else(|| "--partner requires a value".to_string())?;
                let profile: PartnerProfile = name.parse()?;
                args.options.partner = Some(profile);
            }
            "--json" => args.json = true,
            "-v" => args.verbose = true,
            "-h" | "--help" => {
                print!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option '{}'", other));
            }
            other => {
                if args.file.replace(other.to_string()).is_some() {
                    return Err("only one input file is supported".to_string());
                }
            }
        }
    }
    Ok(args)
}

fn read_input(file: Option<&str>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn print_report(index: usize, total: usize, result: &bidlint_core::AnalysisResult) {
    let s = &result.summary;
    if total > 1 {
        println!("--- document {}/{} ---", index + 1, total);
    }
    println!(
        "{} request | platform {} | device {} | geo {} | {} impression(s)",
        s.request_type, s.platform, s.device_type, s.geo, s.impressions
    );
    if let Some(err) = &result.error {
        println!("  parse error: {}", err);
    }
    for issue in &result.issues {
        match &issue.path {
            Some(path) => println!("  {:<7} {:<32} {} ({})", issue.severity, issue.id, issue.message, path),
            None => println!("  {:<7} {:<32} {}", issue.severity, issue.id, issue.message),
        }
    }
    println!(
        "  {} error(s), {} warning(s), {} issue(s) total",
        result.error_count(),
        result.warning_count(),
        result.issues.len()
    );
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("bidlint: {}", err);
            eprint!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(err) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("bidlint: logger init failed: {}", err);
    }

    let text = match read_input(args.file.as_deref()) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("bidlint: failed to read input: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let documents = match bidlint_core::split_documents(&text) {
        Ok(docs) => docs,
        Err(err) => {
            eprintln!("bidlint: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if documents.is_empty() {
        eprintln!("bidlint: no input documents");
        return ExitCode::FAILURE;
    }
    log::debug!("analyzing {} document(s)", documents.len());

    let analyzer = Analyzer::new();
    let results: Vec<_> = documents
        .iter()
        .map(|doc| analyzer.analyze(doc, &args.options))
        .collect();

    if args.json {
        let values: Vec<_> = results.iter().map(|r| r.as_ref()).collect();
        match serde_json::to_string_pretty(&values) {
            Ok(out) => println!("{}", out),
            Err(err) => {
                eprintln!("bidlint: failed to serialize results: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for (i, result) in results.iter().enumerate() {
            print_report(i, results.len(), result);
        }
    }

    let failing = results
        .iter()
        .any(|r| r.issues.iter().any(|i| i.severity == Severity::Error));
    if failing {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
