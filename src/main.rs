use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use submerge::generator::{
    apply_group_layout, apply_overrides, generate_individual_yaml_files, update_yaml,
    MergeOptions, TemplateOverrides,
};
use submerge::models::{GroupLayout, Proxy, SpeedTestGroup};
use submerge::parser::{
    convert_links_to_proxies, parse_group_input, parse_subscription, read_subscription_input,
    HttpFetcher,
};
use submerge::settings::update_settings_from_file;
use submerge::utils::file::{file_get, file_write};
use submerge::utils::yaml::{load_template, render_document};
use submerge::{Settings, SubmergeError};

/// Merge proxy subscription links into Clash YAML configurations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML settings file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append the nodes of a subscription to an existing configuration
    Merge {
        /// Subscription file, or the subscription content itself
        subscription: String,

        /// Clash configuration to merge into
        template: PathBuf,

        /// Output file (default: <template>_merged.<ext>)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Add the new nodes to every url-test, fallback and load-balance group
        #[arg(long)]
        speedtest: bool,

        /// Add the new nodes to every select group
        #[arg(long)]
        manual: bool,
    },

    /// Build a configuration with one url-test group per input group
    Build {
        /// Clash configuration used as the base
        template: PathBuf,

        /// Speed-test group as NAME=INPUT, repeatable
        #[arg(short, long = "group", value_name = "NAME=INPUT", value_parser = parse_group_arg)]
        groups: Vec<(String, String)>,

        /// Nodes listed individually in the main group
        #[arg(short, long, value_name = "INPUT")]
        manual: Option<String>,

        /// File whose content replaces the dns section
        #[arg(long, value_name = "FILE")]
        dns: Option<PathBuf>,

        /// File whose content replaces the rules section
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Write one configuration per node
    Split {
        /// Clash configuration used as the base
        template: PathBuf,

        /// Links, subscription URLs or a file holding them
        input: String,

        /// Output directory
        #[arg(short = 'd', long = "dir", value_name = "DIR")]
        output_dir: PathBuf,

        /// File whose content replaces the dns section
        #[arg(long, value_name = "FILE")]
        dns: Option<PathBuf>,

        /// File whose content replaces the rules section
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },
}

fn parse_group_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, input)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), input.to_string()))
        }
        _ => Err(format!("expected NAME=INPUT, got '{}'", arg)),
    }
}

fn read_overrides(dns: Option<&Path>, rules: Option<&Path>) -> anyhow::Result<TemplateOverrides> {
    let read = |path: Option<&Path>| -> anyhow::Result<Option<String>> {
        path.map(|p| file_get(p).with_context(|| format!("reading {}", p.display())))
            .transpose()
    };
    Ok(TemplateOverrides {
        dns: read(dns)?,
        rules: read(rules)?,
    })
}

fn load_nodes(input: &str, fetcher: &HttpFetcher, settings: &Settings) -> anyhow::Result<Vec<Proxy>> {
    let content = read_subscription_input(input)?;
    Ok(parse_group_input(&content, fetcher, settings.skip_failed_links)?)
}

fn run_merge(
    subscription: &str,
    template: &Path,
    output: Option<&Path>,
    options: MergeOptions,
) -> anyhow::Result<()> {
    let content = read_subscription_input(subscription)?;
    let links = parse_subscription(&content);
    if links.is_empty() {
        return Err(SubmergeError::NoLinks.into());
    }
    info!("Found {} links", links.len());

    let mut proxies = convert_links_to_proxies(&links);
    if proxies.is_empty() {
        return Err(SubmergeError::NoProxies.into());
    }

    let path = update_yaml(template, &mut proxies, options, output)?;
    println!("Merged configuration saved to: {}", path.display());
    Ok(())
}

fn run_build(
    template: &Path,
    groups: &[(String, String)],
    manual: Option<&str>,
    overrides: &TemplateOverrides,
    output: &Path,
    settings: &Settings,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::from_settings(settings);
    let mut layout = GroupLayout::default();
    for (name, input) in groups {
        let proxies = load_nodes(input, &fetcher, settings)
            .with_context(|| format!("loading group '{}'", name))?;
        info!("Group '{}' has {} nodes", name, proxies.len());
        layout.groups.push(SpeedTestGroup::new(name.as_str(), proxies));
    }
    if let Some(input) = manual {
        layout.manual = load_nodes(input, &fetcher, settings).context("loading manual nodes")?;
    }
    if layout.node_count() == 0 {
        bail!(SubmergeError::NoProxies);
    }

    let mut doc = load_template(template)?;
    apply_overrides(&mut doc, overrides)?;
    apply_group_layout(&mut doc, &mut layout, settings)?;
    file_write(output, &render_document(&doc)?)?;
    println!("Configuration saved to: {}", output.display());
    Ok(())
}

fn run_split(
    template: &Path,
    input: &str,
    output_dir: &Path,
    overrides: &TemplateOverrides,
    settings: &Settings,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::from_settings(settings);
    let proxies = load_nodes(input, &fetcher, settings)?;
    if proxies.is_empty() {
        bail!(SubmergeError::NoProxies);
    }

    let mut doc = load_template(template)?;
    apply_overrides(&mut doc, overrides)?;
    let paths = generate_individual_yaml_files(&proxies, output_dir, &doc)?;
    println!(
        "Generated {} configuration files in: {}",
        paths.len(),
        output_dir.display()
    );
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    if let Some(config) = &args.config {
        update_settings_from_file(config)
            .with_context(|| format!("loading settings from {}", config.display()))?;
    }
    let settings = Settings::current();

    match args.command {
        Command::Merge {
            subscription,
            template,
            output,
            speedtest,
            manual,
        } => run_merge(
            &subscription,
            &template,
            output.as_deref(),
            MergeOptions {
                add_to_speedtest: speedtest,
                add_to_manual: manual,
            },
        ),
        Command::Build {
            template,
            groups,
            manual,
            dns,
            rules,
            output,
        } => {
            let overrides = read_overrides(dns.as_deref(), rules.as_deref())?;
            run_build(
                &template,
                &groups,
                manual.as_deref(),
                &overrides,
                &output,
                &settings,
            )
        }
        Command::Split {
            template,
            input,
            output_dir,
            dns,
            rules,
        } => {
            let overrides = read_overrides(dns.as_deref(), rules.as_deref())?;
            run_split(&template, &input, &output_dir, &overrides, &settings)
        }
    }
}

fn main() {
    let args = Args::parse();

    // Initialize the logger
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(Env::default().default_filter_or(default_filter));

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
