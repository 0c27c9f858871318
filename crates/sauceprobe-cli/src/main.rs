//! sauceprobe CLI
//!
//! ## Usage
//!
//! ```bash
//! sauceprobe run                       # Run the whole suite
//! sauceprobe run --tags @smoke         # Forward options to Cucumber
//! sauceprobe check-host www.saucedemo.com --port 443
//! sauceprobe config                    # Print the effective configuration
//! ```

use clap::Parser;
use console::style;
use sauceprobe::{ProbeConfig, ReachabilityCache};
use sauceprobe_cli::{
    logging, CheckHostArgs, Cli, CliConfig, CliResult, ColorChoice, Commands, ConfigArgs,
    ConfigFormat, CucumberRunner, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);
    console::set_colors_enabled(config.color.should_color());
    console::set_colors_enabled_stderr(config.color.should_color());

    match run(&cli, &config) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(color)
}

fn run(cli: &Cli, config: &CliConfig) -> CliResult<i32> {
    let probe_config = ProbeConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Commands::Run(args) => run_suite(config, probe_config, args),
        Commands::CheckHost(args) => Ok(run_check_host(config, args)),
        Commands::Config(args) => run_config(&probe_config, args).map(|()| 0),
    }
}

fn run_suite(config: &CliConfig, probe_config: ProbeConfig, args: &RunArgs) -> CliResult<i32> {
    let mut runner = CucumberRunner::new(probe_config);
    if let Some(executable) = &args.cucumber {
        runner = runner.with_executable(executable.clone());
    }
    if args.dry_run {
        println!("{}", runner.command_line(&args.args));
        return Ok(0);
    }
    if config.verbosity.is_verbose() {
        eprintln!("{} {}", style("Running").cyan(), runner.command_line(&args.args));
    }
    runner.run(&args.args)
}

fn run_check_host(config: &CliConfig, args: &CheckHostArgs) -> i32 {
    let reachable = ReachabilityCache::global().check(&args.host, args.port);
    let target = if args.port == 0 {
        args.host.clone()
    } else {
        format!("{}:{}", args.host, args.port)
    };
    if !config.verbosity.is_quiet() {
        if reachable {
            println!("{} {target} is reachable", style("✓").green());
        } else {
            println!("{} {target} is not reachable", style("✗").red());
        }
    }
    i32::from(!reachable)
}

fn run_config(probe_config: &ProbeConfig, args: &ConfigArgs) -> CliResult<()> {
    match args.format {
        ConfigFormat::Yaml => print!("{}", serde_yaml_ng::to_string(probe_config)?),
        ConfigFormat::Text => {
            println!("base_url: {}", probe_config.base_url);
            println!("timeout: {}ms", probe_config.timeout_ms);
            println!("poll_interval: {}ms", probe_config.poll_interval_ms);
            println!("test_data: {}", probe_config.test_data_path.display());
            println!("features: {}", probe_config.feature_dir.display());
            println!("reports: {}", probe_config.report_dir.display());
            println!("cucumber: {}", probe_config.cucumber_executable);
            println!("glue: {}", probe_config.glue.join(", "));
            println!("ui_tags: {}", probe_config.ui_tags.join(", "));
            println!("reduce_screenshot_size: {}", probe_config.reduce_screenshot_size);
        }
    }
    Ok(())
}
