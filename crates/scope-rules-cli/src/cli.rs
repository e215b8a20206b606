//! Command dispatch for the `scope-rules` entrypoint.

use std::fs;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use scope_rules::{
    Activity, Catalog, Limits, Rule, SelectionMode, SelectionSet, TagSet, evaluate_with_limits,
    extract_tag_keys, kind_distribution, partition_matches, tag_frequency,
    try_explain_with_limits,
};
use serde::de::DeserializeOwned;

use crate::config::{Config, LogLevel};
use crate::error::CliError;
use crate::output::{
    write_distribution, write_explanation, write_filter_report, write_frequency, write_json,
    write_line,
};

/// Evaluate, explain and synthesise work-scope tag rules.
#[derive(Parser, Debug)]
#[command(name = "scope-rules", author, version, about)]
pub(crate) struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    /// Deepest `!`/parenthesis nesting accepted in a rule.
    #[arg(long, global = true)]
    max_depth: Option<NonZeroUsize>,
    /// Longest rule accepted, in bytes.
    #[arg(long, global = true)]
    max_length: Option<NonZeroUsize>,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a rule against a tag set and print `true` or `false`.
    Eval(EvalArgs),
    /// Break a rule's verdict down clause by clause.
    Explain(ExplainArgs),
    /// Synthesise a rule from tag selections.
    Build(BuildArgs),
    /// List the tag keys a rule mentions.
    Keys(ExprArgs),
    /// Validate a rule and print its canonical form.
    Check(ExprArgs),
    /// List the activities a rule matches.
    Filter(FilterArgs),
    /// Summarise tag usage across activities.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct ExprArgs {
    /// Rule expression, e.g. `scope.has("mangrove")`.
    expression: String,
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Rule expression.
    expression: String,
    /// Tag key present on the subject; repeat for several.
    #[arg(long = "tag", value_name = "KEY")]
    tags: Vec<String>,
    /// Fail on malformed rules instead of printing `false`.
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    /// Rule expression.
    expression: String,
    /// Tag key present on the subject; repeat for several.
    #[arg(long = "tag", value_name = "KEY")]
    tags: Vec<String>,
    /// JSON tag catalog used to label keys in text output.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Emit JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Key the subject must carry; repeat for several.
    #[arg(long = "all", value_name = "KEY")]
    all: Vec<String>,
    /// Key of which the subject must carry at least one; repeat for several.
    #[arg(long = "any", value_name = "KEY")]
    any: Vec<String>,
    /// Key the subject must not carry; repeat for several.
    #[arg(long = "exclude", value_name = "KEY")]
    exclude: Vec<String>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Rule expression.
    expression: String,
    /// JSON array of activities.
    #[arg(long, value_name = "FILE")]
    activities: PathBuf,
    /// Emit JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// JSON array of activities.
    #[arg(long, value_name = "FILE")]
    activities: PathBuf,
    /// JSON tag catalog; adds the per-kind distribution.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

impl Cli {
    /// Resolve configuration from the environment and command-line flags.
    pub(crate) fn config(&self) -> Result<Config, CliError> {
        let config = Config::from_env()?;
        Ok(config.apply_overrides(
            self.globals.log_level,
            self.globals.max_depth,
            self.globals.max_length,
        ))
    }
}

pub(crate) fn run(cli: Cli, config: &Config) -> Result<()> {
    let limits = config.limits();
    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Eval(args) => handle_eval(&mut stdout, &args, limits)?,
        Commands::Explain(args) => handle_explain(&mut stdout, &args, limits)?,
        Commands::Build(args) => handle_build(&mut stdout, args)?,
        Commands::Keys(args) => handle_keys(&mut stdout, &args)?,
        Commands::Check(args) => handle_check(&mut stdout, &args, limits)?,
        Commands::Filter(args) => handle_filter(&mut stdout, &args, limits)?,
        Commands::Stats(args) => handle_stats(&mut stdout, &args)?,
    }
    stdout.flush().wrap_err("failed to flush output")
}

fn parse_rule(expression: &str, limits: Limits) -> Result<Rule> {
    Rule::parse_with_limits(expression, limits)
        .wrap_err_with(|| format!("invalid rule `{expression}`"))
}

fn handle_eval(out: &mut dyn Write, args: &EvalArgs, limits: Limits) -> Result<()> {
    let tags = TagSet::from_keys(&args.tags);
    let verdict = if args.strict {
        parse_rule(&args.expression, limits)?.matches(&tags)
    } else {
        evaluate_with_limits(&args.expression, &tags, limits)
    };
    tracing::debug!(verdict, tags = tags.len(), "evaluated rule");
    write_line(out, if verdict { "true" } else { "false" })
}

fn handle_explain(out: &mut dyn Write, args: &ExplainArgs, limits: Limits) -> Result<()> {
    let tags = TagSet::from_keys(&args.tags);
    let explanation = try_explain_with_limits(&args.expression, &tags, limits)
        .wrap_err_with(|| format!("invalid rule `{}`", args.expression))?;
    if args.json {
        return write_json(out, &explanation);
    }
    let catalog = args.catalog.as_deref().map(read_catalog).transpose()?;
    write_explanation(out, &explanation, catalog.as_ref())
}

fn handle_build(out: &mut dyn Write, args: BuildArgs) -> Result<()> {
    let groups = [
        (SelectionMode::MustHaveAll, args.all),
        (SelectionMode::AnyOf, args.any),
        (SelectionMode::Exclude, args.exclude),
    ];
    let mut selections = SelectionSet::new();
    for (mode, keys) in groups {
        for key in keys {
            if let Some(previous) = selections.set(key.as_str(), mode) {
                tracing::warn!(%key, %previous, %mode, "key selected twice; keeping the later mode");
            }
        }
    }
    write_line(out, &selections.to_expression())
}

fn handle_keys(out: &mut dyn Write, args: &ExprArgs) -> Result<()> {
    extract_tag_keys(&args.expression)
        .iter()
        .try_for_each(|key| write_line(out, key))
}

fn handle_check(out: &mut dyn Write, args: &ExprArgs, limits: Limits) -> Result<()> {
    let rule = parse_rule(&args.expression, limits)?;
    write_line(out, &rule.expr().to_string())
}

fn handle_filter(out: &mut dyn Write, args: &FilterArgs, limits: Limits) -> Result<()> {
    let rule = parse_rule(&args.expression, limits)?;
    let activities = read_activities(&args.activities)?;
    let (matched, _rest) = partition_matches(&rule, &activities);
    tracing::debug!(
        matched = matched.len(),
        total = activities.len(),
        "filtered activities"
    );
    write_filter_report(out, &matched, activities.len(), args.json)
}

fn handle_stats(out: &mut dyn Write, args: &StatsArgs) -> Result<()> {
    let activities = read_activities(&args.activities)?;
    let catalog = args.catalog.as_deref().map(read_catalog).transpose()?;
    writeln!(out, "{} activities", activities.len()).wrap_err("failed to write activity count")?;
    write_frequency(out, &tag_frequency(&activities), catalog.as_ref())?;
    if let Some(catalog) = &catalog {
        write_distribution(out, &kind_distribution(catalog, &activities))?;
    }
    Ok(())
}

fn read_activities(path: &Path) -> Result<Vec<Activity>> {
    read_json(path, "activities")
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    read_json(path, "catalog")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&text)
        .wrap_err_with(|| format!("failed to parse {what} file {}", path.display()))
}
