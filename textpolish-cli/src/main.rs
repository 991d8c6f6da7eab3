use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

// Import from textpolish-core
use textpolish_core::{
    validate_configuration, Category, ConfigStore, DocumentProcessor, Rule, Theme,
};

// Import CLI utilities
use textpolish_cli::options::{StyleOverrides, ToggleOverrides};
use textpolish_cli::{format_document, format_rules, AppDirs, OutputFormat};

#[derive(Parser)]
#[command(name = "textpolish")]
#[command(about = "Clean pasted AI chat text and render recognized headings for Word/WPS")]
#[command(version)]
struct Args {
    /// Directory holding the user rule store (default: platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Default configuration used on first run (default: shipped app_config.json)
    #[arg(long, global = true)]
    bundled_config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clean and classify text, then write it in the chosen format
    Process(ProcessArgs),
    /// Inspect or edit the rule/style configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Show or change which categories are recognized by default
    Toggles {
        #[command(subcommand)]
        action: TogglesCommand,
    },
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Input text file ('-' or omitted reads stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Interchange)]
    format: OutputFormat,

    /// Dark palette for preview output
    #[arg(long)]
    dark: bool,

    /// Log per-step timings (needs -v)
    #[arg(long)]
    profile: bool,

    #[command(flatten)]
    toggles: ToggleOverrides,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the configuration, or one category of it
    Show {
        category: Option<Category>,
        /// YAML instead of JSON
        #[arg(long)]
        yaml: bool,
    },
    /// List rules with their indices
    Rules { category: Option<Category> },
    /// Print where the user store lives
    Path,
    /// Restore the compiled-in defaults
    Reset,
    /// Write the configuration to a JSON file
    Export { path: PathBuf },
    /// Replace the categories present in a JSON or YAML file
    Import { path: PathBuf },
    /// Append a rule to a category
    AddRule {
        category: Category,
        /// Regular expression matched from the start of a line
        #[arg(long)]
        pattern: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Add the rule switched off
        #[arg(long)]
        disabled: bool,
    },
    /// Remove the rule at INDEX
    RemoveRule { category: Category, index: usize },
    /// Flip the enabled flag of the rule at INDEX
    ToggleRule { category: Category, index: usize },
    /// Change style attributes of a category
    SetStyle {
        category: Category,
        #[command(flatten)]
        style: StyleOverrides,
    },
    /// Check every rule pattern
    Validate,
}

#[derive(Subcommand)]
enum TogglesCommand {
    Show,
    Set(ToggleOverrides),
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet)?;

    let dirs = AppDirs::resolve(args.config_dir.as_deref())?;
    let mut store = dirs.open_store(args.bundled_config.as_deref());

    match args.command {
        Command::Process(process_args) => run_process(&store, process_args),
        Command::Config { action } => run_config(&mut store, &dirs, action),
        Command::Toggles { action } => run_toggles(&store, action),
    }
}

fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn run_process(store: &ConfigStore, args: ProcessArgs) -> Result<()> {
    let raw = read_input(args.input.as_deref())?;
    let toggles = args.toggles.apply(store.load_ui_settings());
    let processor = DocumentProcessor::new().with_profiling(args.profile);
    let config = store.configuration();

    let document = match processor.process(&raw, &toggles, config) {
        Ok(document) => document,
        Err(e) if e.is_warning() => {
            eprintln!("⚠️  {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let output = format_document(
        &processor,
        &document,
        config,
        args.format,
        Theme::from_dark_flag(args.dark),
    )?;

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("💾 Saved to: {}", path.display());
        }
        None => println!("{output}"),
    }

    eprintln!("✅ {}", document.summary.char_report());
    eprintln!("📋 格式: {}", document.summary.active_formats);
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn run_config(store: &mut ConfigStore, dirs: &AppDirs, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show { category, yaml } => {
            let rendered = match (category, yaml) {
                (Some(c), false) => serde_json::to_string_pretty(&store.get(c))?,
                (Some(c), true) => serde_yaml::to_string(&store.get(c))?,
                (None, false) => serde_json::to_string_pretty(store.configuration())?,
                (None, true) => serde_yaml::to_string(store.configuration())?,
            };
            println!("{rendered}");
        }
        ConfigCommand::Rules { category } => {
            let categories = match category {
                Some(c) => vec![c],
                None => Category::ALL.to_vec(),
            };
            for c in categories {
                print!("{}", format_rules(store.configuration(), c));
            }
        }
        ConfigCommand::Path => {
            let location = store
                .storage_location()
                .unwrap_or_else(|| dirs.config_dir().to_path_buf());
            println!("{}", location.display());
        }
        ConfigCommand::Reset => {
            store.reset();
            println!("✅ 已恢复默认配置");
        }
        ConfigCommand::Export { path } => {
            store.export_to(&path)?;
            println!("💾 配置已导出到: {}", path.display());
        }
        ConfigCommand::Import { path } => {
            let replaced = store.import_from(&path)?;
            let names: Vec<&str> = replaced.iter().map(|c| c.label()).collect();
            println!("✅ 已导入 {} 个类别: {}", replaced.len(), names.join("、"));
        }
        ConfigCommand::AddRule {
            category,
            pattern,
            name,
            description,
            disabled,
        } => {
            let mut rule = Rule::new(&pattern, &name).with_description(&description);
            if disabled {
                rule = rule.disabled();
            }
            if !store.add_rule(category, rule) {
                println!("⚠️  {} 不支持规则", category.label());
                return Ok(());
            }
            println!("✅ 已添加规则到 {}", category.label());
            for issue in validate_configuration(store.configuration()).issues_for(category) {
                if issue.name == name {
                    println!("⚠️  {issue}");
                }
            }
        }
        ConfigCommand::RemoveRule { category, index } => match store.remove_rule(category, index) {
            Some(rule) => println!("🗑️  已删除规则: {}", rule.name),
            None => println!("⚠️  {} 没有序号为 {} 的规则", category.label(), index),
        },
        ConfigCommand::ToggleRule { category, index } => match store.toggle_rule(category, index) {
            Some(enabled) => println!(
                "✅ 规则 {} 已{}",
                index,
                if enabled { "启用" } else { "停用" }
            ),
            None => println!("⚠️  {} 没有序号为 {} 的规则", category.label(), index),
        },
        ConfigCommand::SetStyle { category, style } => {
            if style.is_empty() {
                println!("⚠️  未指定要修改的样式属性");
                return Ok(());
            }
            let updated = style.apply(store.get(category).style);
            store.update_style(category, updated);
            println!("✅ 已更新 {} 样式", category.label());
        }
        ConfigCommand::Validate => {
            let report = validate_configuration(store.configuration());
            if report.is_clean() {
                println!("✅ {} 条规则全部有效", report.rules_checked);
            } else {
                for issue in &report.issues {
                    println!("❌ {issue}");
                }
                println!(
                    "📊 {} 条规则中 {} 条有问题 ({} 条已启用)",
                    report.rules_checked,
                    report.issues.len(),
                    report.active_issue_count()
                );
            }
        }
    }
    Ok(())
}

fn run_toggles(store: &ConfigStore, action: TogglesCommand) -> Result<()> {
    match action {
        TogglesCommand::Show => {
            let toggles = store.load_ui_settings();
            for category in [Category::H1, Category::H2, Category::H3, Category::Special] {
                let marker = if toggles.is_enabled(category) { "✓" } else { "✗" };
                println!("{marker} {:<8} {}", category.as_str(), category.label());
            }
        }
        TogglesCommand::Set(overrides) => {
            if overrides.is_empty() {
                println!("⚠️  未指定要修改的类别");
                return Ok(());
            }
            let toggles = overrides.apply(store.load_ui_settings());
            store.save_ui_settings(&toggles);
            println!("✅ 当前格式: {}", toggles.describe());
        }
    }
    Ok(())
}
