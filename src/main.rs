//! mtqe CLI
//!
//! Builds scoring prompts, runs them through an LLM and correlates the
//! extracted scores with human judgements.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mtqe_eval::{
    config::Config,
    dataset::Dataset,
    evaluate::Evaluation,
    extract::NumberExtractor,
    language::LanguagePair,
    llm::{LlmClient, Runner, generations_file_name, write_generations},
    predictions::PredictionSource,
    prompt::{
        ChatFormat, PromptBuilder, Template, load_previous_outputs, main_file_path, read_prompts,
    },
    report::write_summary,
    score::AlignmentPolicy,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// mtqe - Machine translation quality estimation with LLMs
#[derive(Parser)]
#[command(name = "mtqe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build prompt files for one language pair, or for every pair
    Prompts {
        /// TSV with src, mt, ref and optionally score / error_words columns;
        /// without it, prompts are built for all pairs from --raw-data-dir
        #[arg(long)]
        main_file: Option<PathBuf>,

        /// Directory holding {pair}_overlaps_test.tsv files
        #[arg(long, default_value = "raw_data")]
        raw_data_dir: PathBuf,

        /// Plain text file with one line of error words per row
        #[arg(long)]
        error_file: Option<PathBuf>,

        /// Generations of the first chain-of-thought step (needed for t7p2)
        #[arg(long)]
        previous_output: Option<PathBuf>,

        /// Language pair code; inferred from the main file name if omitted
        #[arg(long)]
        pair: Option<String>,

        /// Chat format name or a custom pattern containing {user_input}
        #[arg(short, long, default_value = "llama")]
        format: String,

        /// Templates to build (t01..t06, t7p1, t7p2, t08) or "all"
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        template: Vec<String>,

        /// Directory for the prompt files
        #[arg(short, long, default_value = "prompts")]
        out_dir: PathBuf,
    },

    /// Run a prompt file through the configured LLM
    Run {
        /// Prompt file with a final_prompt column
        #[arg(short, long)]
        prompts: PathBuf,

        /// Language pair code; inferred from the prompt file name if omitted
        #[arg(long)]
        pair: Option<String>,

        /// Template version used in the output file name
        #[arg(short, long, default_value = "04")]
        template: String,

        /// Directory for the generations file
        #[arg(short, long, default_value = "llm_output_samples")]
        out_dir: PathBuf,
    },

    /// Extract numbers from a predictions file
    Extract {
        /// Predictions file (.tsv, .csv, .jsonl, .json or .txt)
        #[arg(short, long)]
        input: PathBuf,

        /// Column or JSON field holding the model output
        #[arg(short, long, default_value = "vllm_output")]
        key: String,

        /// Which numeric token to take (zero-based)
        #[arg(short, long, default_value_t = 0)]
        position: usize,
    },

    /// Correlate extracted scores with human labels for every pair
    Score {
        /// Template version tag in the generations file names
        #[arg(short, long)]
        template: Option<String>,

        /// Directory holding {PAIR}_outputs_t{template}.tsv files
        #[arg(long)]
        outputs_dir: Option<PathBuf>,

        /// Directory holding {pair}/{pair}_overlaps_test.tsv files
        #[arg(long)]
        raw_data_dir: Option<PathBuf>,

        /// Comma-separated language pairs to score
        #[arg(long, value_delimiter = ',')]
        pairs: Option<Vec<String>>,

        /// Fail instead of warning when predictions and labels cannot be aligned
        #[arg(long)]
        strict: bool,

        /// Summary file (.csv or .tsv); defaults to the outputs directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Prompts {
            main_file,
            raw_data_dir,
            error_file,
            previous_output,
            pair,
            format,
            template,
            out_dir,
        } => cmd_prompts(
            main_file,
            raw_data_dir,
            error_file,
            previous_output,
            pair,
            &format,
            &template,
            out_dir,
        ),
        Commands::Run {
            prompts,
            pair,
            template,
            out_dir,
        } => cmd_run(config, prompts, pair, template, out_dir).await,
        Commands::Extract {
            input,
            key,
            position,
        } => cmd_extract(input, &key, position),
        Commands::Score {
            template,
            outputs_dir,
            raw_data_dir,
            pairs,
            strict,
            output,
        } => cmd_score(
            config,
            template,
            outputs_dir,
            raw_data_dir,
            pairs,
            strict,
            output,
        ),
        Commands::Test => cmd_test(config).await,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_pair(explicit: Option<&str>, file: &Path) -> Result<LanguagePair> {
    match explicit {
        Some(code) => LanguagePair::from_code(code).context("Invalid --pair"),
        None => LanguagePair::from_file_name(file).with_context(|| {
            format!(
                "Cannot infer the language pair from '{}'; pass --pair",
                file.display()
            )
        }),
    }
}

fn parse_templates(names: &[String]) -> Result<Vec<Template>> {
    if names.iter().any(|n| n.eq_ignore_ascii_case("all")) {
        return Ok(Template::DEFAULT_SET.to_vec());
    }
    names
        .iter()
        .map(|n| n.parse::<Template>().map_err(anyhow::Error::from))
        .collect()
}

fn cmd_prompts(
    main_file: Option<PathBuf>,
    raw_data_dir: PathBuf,
    error_file: Option<PathBuf>,
    previous_output: Option<PathBuf>,
    pair: Option<String>,
    format: &str,
    templates: &[String],
    out_dir: PathBuf,
) -> Result<()> {
    let format: ChatFormat = format.parse().context("Invalid --format")?;
    let templates = parse_templates(templates)?;

    let Some(main_file) = main_file else {
        if error_file.is_some() || previous_output.is_some() || pair.is_some() {
            bail!("--error-file, --previous-output and --pair need --main-file");
        }
        for pair in LanguagePair::all() {
            let main_file = main_file_path(&raw_data_dir, &pair);
            let dataset = Dataset::load_tsv(&main_file)
                .with_context(|| format!("Failed to load {}", main_file.display()))?;
            println!("{} ({} rows)", pair.display_name(), dataset.len());
            build_pair_prompts(PromptBuilder::new(pair, dataset, format.clone()), &templates, &out_dir)?;
        }
        return Ok(());
    };

    let pair = resolve_pair(pair.as_deref(), &main_file)?;
    let mut dataset = Dataset::load_tsv(&main_file).context("Failed to load main file")?;
    if let Some(path) = &error_file {
        dataset
            .load_error_words(path)
            .context("Failed to load error file")?;
    }
    println!("{} ({} rows)", pair.display_name(), dataset.len());

    let mut builder = PromptBuilder::new(pair, dataset, format);
    if let Some(path) = &previous_output {
        let outputs = load_previous_outputs(path).context("Failed to load previous outputs")?;
        builder = builder.with_previous_outputs(outputs);
    }

    build_pair_prompts(builder, &templates, &out_dir)
}

fn build_pair_prompts(builder: PromptBuilder, templates: &[Template], out_dir: &Path) -> Result<()> {
    let written = builder
        .write_all(templates, out_dir)
        .context("Failed to build prompts")?;
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

async fn cmd_run(
    config: Config,
    prompts_path: PathBuf,
    pair: Option<String>,
    template: String,
    out_dir: PathBuf,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let pair = resolve_pair(pair.as_deref(), &prompts_path)?;

    let prompts = read_prompts(&prompts_path).context("Failed to read prompts")?;
    if prompts.is_empty() {
        bail!("No prompts found in {}", prompts_path.display());
    }

    println!("Running {} prompts for {}", prompts.len(), pair.display_name());
    println!("Using model: {}", config.llm.model);

    let start = Instant::now();
    let output_name = generations_file_name(&pair, &template, config.llm.model_short_name());
    let runner = Runner::new(LlmClient::new(config.llm));
    let generations = runner.run(&prompts).await.context("Inference failed")?;

    let path = out_dir.join(output_name);
    write_generations(&path, &generations).context("Failed to write generations")?;

    println!("\nGenerations saved to: {}", path.display());
    println!("Time: {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn cmd_extract(input: PathBuf, key: &str, position: usize) -> Result<()> {
    let source = PredictionSource::load(&input, key).context("Failed to load predictions")?;
    let extraction = NumberExtractor::new(position).extract(source.items());

    println!("Source:    {} ({})", source.path().display(), source.kind());
    println!("Items:     {}", extraction.total());
    println!("Extracted: {}", extraction.values.len());
    println!("Dropped:   {}", extraction.dropped.len());
    println!();
    println!("values:  {:?}", extraction.values);
    println!("dropped: {:?}", extraction.dropped);

    Ok(())
}

fn cmd_score(
    mut config: Config,
    template: Option<String>,
    outputs_dir: Option<PathBuf>,
    raw_data_dir: Option<PathBuf>,
    pairs: Option<Vec<String>>,
    strict: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(template) = template {
        config.eval.template = template;
    }
    if let Some(dir) = outputs_dir {
        config.eval.outputs_dir = dir;
    }
    if let Some(dir) = raw_data_dir {
        config.eval.raw_data_dir = dir;
    }
    if let Some(pairs) = pairs {
        config.eval.language_pairs = pairs;
    }
    if strict {
        config.eval.alignment = AlignmentPolicy::Strict;
    }

    let evaluation = Evaluation::new(config.eval);
    let summary = evaluation.run().context("Scoring failed")?;

    println!();
    print!("{}", summary.format());

    let path = output.unwrap_or_else(|| evaluation.summary_path());
    write_summary(&path, &summary).context("Failed to write summary")?;
    println!("\nSummary saved to: {}", path.display());

    Ok(())
}

async fn cmd_test(config: Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    if !config.llm.api_key.is_empty() {
        let prefix: String = config.llm.api_key.chars().take(8).collect();
        println!("  API Key:   {}...", prefix);
    }
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
