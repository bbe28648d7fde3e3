// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! fpwatch CLI - Runtime Fingerprinting Detection
//!
//! Prints the instrumentation script, replays recorded page log events, or
//! runs scripts in the emulated page and reports the verdicts.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;

use fpwatch::relay::{self, LogEvent};
use fpwatch::{
    FingerprintScan, FingerprintingExtractor, FingerprintingReport, MemoryResult, PageSandbox, PageSandboxConfig, PageScript, ScanConfig,
};

/// Exit code when any category is flagged
const EXIT_DETECTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fpwatch=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let options = Options::parse(&args[2..]);

    let outcome = match args[1].as_str() {
        "script" => {
            return match FingerprintingExtractor::new(options.scan_config()) {
                Ok(extractor) => {
                    print!("{}", extractor.instrumentation());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(1)
                }
            };
        }
        "replay" => {
            if options.inputs.len() != 1 {
                eprintln!("Usage: fpwatch replay <events.jsonl> [--forensic]");
                return ExitCode::from(1);
            }
            replay(&options).await
        }
        "emulate" => {
            if options.inputs.is_empty() {
                eprintln!("Usage: fpwatch emulate <script.js>... [--forensic]");
                return ExitCode::from(1);
            }
            emulate(&options)
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("fpwatch {}", fpwatch::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match outcome.and_then(|report| output(&report).map(|_| report)) {
        Ok(report) if report.is_fingerprinting() => ExitCode::from(EXIT_DETECTED),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"fpwatch - Runtime Browser Fingerprinting Detection

USAGE:
    fpwatch <COMMAND> [OPTIONS]

COMMANDS:
    script                      Print the instrumentation script
    replay <events.jsonl>       Aggregate recorded log events, one JSON object per line
    emulate <script.js>...      Run scripts in the emulated page
    help                        Show this help message
    version                     Show version information

OPTIONS:
    --forensic                  Keep the first call stack of every category
    --log-function <name>       In-page relay function (default: log)

EXIT STATUS:
    0 no fingerprinting, 2 fingerprinting detected, 1 error

EXAMPLES:
    fpwatch script > instrument.js
    fpwatch replay events.jsonl
    fpwatch emulate vendor.js fp.js --forensic
"#
    );
}

/// Options shared by the commands
#[derive(Debug, Default)]
struct Options {
    inputs: Vec<PathBuf>,
    forensic: bool,
    log_function: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> Self {
        let mut options = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--forensic" => options.forensic = true,
                "--log-function" => options.log_function = iter.next().cloned(),
                other => options.inputs.push(PathBuf::from(other)),
            }
        }
        options
    }

    fn scan_config(&self) -> ScanConfig {
        let mut config = if self.forensic {
            ScanConfig::forensic()
        } else {
            ScanConfig::baseline()
        };
        if let Some(ref name) = self.log_function {
            config = config.log_function(name.clone());
        }
        config
    }
}

/// Feed a recorded event log through the async relay
async fn replay(options: &Options) -> anyhow::Result<FingerprintingReport> {
    let path = &options.inputs[0];
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let config = options.scan_config();
    config.validate()?;
    let (sender, collector) = relay::channel(FingerprintScan::from_config(&config));
    let handle = collector.spawn();

    let mut skipped = 0usize;
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match LogEvent::from_json(line) {
            Ok(event) => sender.send(event)?,
            Err(e) => {
                skipped += 1;
                tracing::warn!(line = line_no + 1, error = %e, "Skipping unreadable event");
            }
        }
    }
    drop(sender);

    let report = handle.await.context("log collector failed")?;
    if skipped > 0 {
        println!("Skipped {} unreadable line(s)", skipped);
    }
    Ok(report)
}

/// Run scripts in the emulated page
fn emulate(options: &Options) -> anyhow::Result<FingerprintingReport> {
    let config = options.scan_config();
    let sandbox_config = PageSandboxConfig::default().log_function(config.log_function.clone());
    let extractor = FingerprintingExtractor::new(config)?;

    let mut page = PageSandbox::new(sandbox_config);
    extractor.attach(&mut page)?;

    let mut scripts = Vec::with_capacity(options.inputs.len());
    for path in &options.inputs {
        let source = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        scripts.push(PageScript::new(path.display().to_string(), source));
    }

    let run = page.run(&scripts)?;
    println!("Ran {} script(s), {} event(s)", scripts.len(), run.events);
    for error in &run.script_errors {
        println!("  ! {}", error);
    }

    Ok(extractor.finalize()?)
}

/// Print the verdicts and the result document
fn output(report: &FingerprintingReport) -> anyhow::Result<()> {
    println!("\n=== Fingerprinting ===");
    for category in fpwatch::Category::ALL {
        let verdict = report.verdict(category);
        println!(
            "  {:<7} {:<3} ({} call(s))",
            category.to_string(),
            if verdict.is_fingerprinting { "YES" } else { "no" },
            verdict.calls.len()
        );
    }

    let hosts = report.originating_hosts();
    if !hosts.is_empty() {
        println!("\n=== Originating hosts ===");
        for host in hosts {
            println!("  - {}", host);
        }
    }

    println!(
        "\nEvents: {} accepted, {} ignored, {} rejected",
        report.stats.accepted, report.stats.ignored, report.stats.rejected
    );

    let mut result = MemoryResult::new();
    report.write_to(&mut result)?;
    for file in result.files() {
        println!(
            "Artifact: {} ({}, {} bytes)",
            file.name,
            file.mime_type.as_deref().unwrap_or("unknown type"),
            file.bytes.len()
        );
    }
    println!("\n{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}
