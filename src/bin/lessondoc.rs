//! CLI binary for edgequake-lessondoc.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `DocumentRequest` + `GenerationConfig` and writes the `.docx`.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_lessondoc::config::OLLAMA_DEFAULT_HOST;
use edgequake_lessondoc::generate::write_docx;
use edgequake_lessondoc::validation::validate_fields;
use edgequake_lessondoc::{
    generate_document, probe_ollama, render, DocumentKind, DocumentRequest, ExerciseListOptions,
    GenerationConfig, HierarchyMode, KindOptions, LectureNotesOptions, LessonDocError,
    LessonPlanOptions, LlmConfig, Locale, MindMapOptions, ProviderKind,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Lesson plan (OpenAI, key from OPENAI_API_KEY)
  lessondoc -s Biology -g "High School" -t "Photosynthesis" --duration 45

  # Mind map with a local Ollama model
  lessondoc --kind mind-map --provider ollama --model llama3.2 \
            -s History -g "Grade 8" -t "The Roman Republic" --depth 4

  # Lecture notes in Portuguese, printed to stdout as well
  lessondoc --kind "Notas de Aula" --locale pt -s Química -g "Ensino Médio" \
            -t "Ligações covalentes" --print -o notas.docx

  # Convert markdown you already have, no LLM call
  lessondoc --kind lecture-notes -s Physics -g "Grade 10" -t Optics \
            --from-markdown notes.md -o optics.docx

DOCUMENT KINDS:
  lesson-plan     Lesson Plan        (--duration, --objectives, --materials, ...)
  lecture-notes   Lecture Notes      (--detail-level, --format-style, --references)
  exercise-list   Exercise List      (--questions, --difficulty, --question-type)
  mind-map        Lesson Mind Map    (--branches, --depth, --flat)
  assessment      Assessment         (not available yet)

  Localised labels such as "Plano de Aula" or "Mapa Mental" are accepted too.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  OLLAMA_HOST             Ollama server (default http://localhost:11434)
  EDGEQUAKE_LLM_PROVIDER  Provider when --provider is not given
  EDGEQUAKE_MODEL         Model when --model is not given
  LESSONDOC_LOCALE        Message language (en, pt)
"#;

/// Generate lesson documents with an LLM and export them to Word.
#[derive(Parser, Debug)]
#[command(
    name = "lessondoc",
    version,
    about = "Generate lesson plans, lecture notes, exercise lists and mind maps as Word documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    // ── Document ─────────────────────────────────────────────────────────
    /// Document kind: lesson-plan, lecture-notes, exercise-list, mind-map, or a label.
    #[arg(short, long, default_value = "lesson-plan", value_parser = parse_kind)]
    kind: DocumentKind,

    /// Label used in the title and file name (defaults to the kind's name).
    #[arg(long)]
    label: Option<String>,

    /// Subject, e.g. "Biology".
    #[arg(short, long, default_value = "")]
    subject: String,

    /// Grade level, e.g. "High School".
    #[arg(short, long, default_value = "High School")]
    grade: String,

    /// Topic description.
    #[arg(short, long, default_value = "", conflicts_with = "topic_file")]
    topic: String,

    /// Read the topic description from a file.
    #[arg(long)]
    topic_file: Option<PathBuf>,

    // ── Lesson plan ──────────────────────────────────────────────────────
    /// Lesson duration in minutes.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(10..))]
    duration: u32,

    /// Learning objectives.
    #[arg(long)]
    objectives: Option<String>,

    /// Materials and resources.
    #[arg(long)]
    materials: Option<String>,

    /// Teaching methodology.
    #[arg(long)]
    methodology: Option<String>,

    /// Assessment strategy.
    #[arg(long)]
    assessment_strategy: Option<String>,

    /// Lesson flow to follow.
    #[arg(long)]
    lesson_flow: Option<String>,

    /// Do not ask for differentiation/adaptations.
    #[arg(long)]
    no_differentiation: bool,

    // ── Lecture notes ────────────────────────────────────────────────────
    /// Detail level: Basic, Standard, Detailed.
    #[arg(long)]
    detail_level: Option<String>,

    /// Format style: Paragraphs, Bullet Points, Outline.
    #[arg(long)]
    format_style: Option<String>,

    /// Ask for references or further reading.
    #[arg(long)]
    references: bool,

    /// Do not ask for examples (lecture notes, mind maps).
    #[arg(long)]
    no_examples: bool,

    // ── Exercise list ────────────────────────────────────────────────────
    /// Number of questions.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    questions: u32,

    /// Difficulty: Easy, Medium, Hard.
    #[arg(long, default_value = "Medium")]
    difficulty: String,

    /// Question type (repeatable). Default: Multiple Choice, Short Answer.
    #[arg(long = "question-type")]
    question_types: Vec<String>,

    /// Leave out the answer key.
    #[arg(long)]
    no_answer_key: bool,

    // ── Mind map ─────────────────────────────────────────────────────────
    /// Number of main branches.
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(3..))]
    branches: u32,

    /// Depth levels (2–6).
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(2..=6))]
    depth: u32,

    /// Keep the hierarchy minimal and focus on main branches.
    #[arg(long)]
    flat: bool,

    // ── LLM ──────────────────────────────────────────────────────────────
    /// LLM provider: openai, anthropic, gemini, ollama, huggingface.
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER", default_value = "openai")]
    provider: ProviderKind,

    /// Model ID (e.g. gpt-4.1-nano, llama3.2).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Ollama server URL. Must match OLLAMA_HOST, which the client reads.
    #[arg(long, env = "OLLAMA_HOST", default_value = OLLAMA_DEFAULT_HOST)]
    ollama_host: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "LESSONDOC_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "LESSONDOC_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM call timeout in seconds.
    #[arg(long, env = "LESSONDOC_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "LESSONDOC_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    // ── Output ───────────────────────────────────────────────────────────
    /// Write the .docx here (default: "<subject>_<label>.docx").
    #[arg(short, long, env = "LESSONDOC_OUTPUT")]
    output: Option<PathBuf>,

    /// Skip the LLM and convert this markdown file instead.
    #[arg(long)]
    from_markdown: Option<PathBuf>,

    /// Bullet nesting: auto (mind maps only), always, never.
    #[arg(long, env = "LESSONDOC_HIERARCHY", value_enum, default_value = "auto")]
    hierarchy: HierarchyArg,

    /// Convert the model output exactly as received.
    #[arg(long)]
    no_tidy: bool,

    /// Message language: en, pt.
    #[arg(long, env = "LESSONDOC_LOCALE", default_value = "en")]
    locale: Locale,

    /// Also print the generated markdown to stdout.
    #[arg(long)]
    print: bool,

    /// Print a JSON summary to stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LESSONDOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LESSONDOC_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum HierarchyArg {
    Auto,
    Always,
    Never,
}

impl From<HierarchyArg> for HierarchyMode {
    fn from(v: HierarchyArg) -> Self {
        match v {
            HierarchyArg::Auto => HierarchyMode::Auto,
            HierarchyArg::Always => HierarchyMode::Always,
            HierarchyArg::Never => HierarchyMode::Never,
        }
    }
}

/// Accepts canonical keys (`mind_map`, `mind-map`) and display labels.
fn parse_kind(s: &str) -> Result<DocumentKind, String> {
    DocumentKind::from_key(&s.replace('-', "_"))
        .or_else(|| DocumentKind::from_label(s))
        .ok_or_else(|| format!("unknown document kind '{s}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let show_spinner = !cli.quiet && !cli.json && cli.from_markdown.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let request = build_request(&cli).await?;
    let config = build_config(&cli).await?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(request.file_name(config.locale)));

    // ── Generate ─────────────────────────────────────────────────────────
    let start = Instant::now();
    let outcome = if let Some(ref md_path) = cli.from_markdown {
        let content = tokio::fs::read_to_string(md_path)
            .await
            .with_context(|| format!("Failed to read markdown from {:?}", md_path))?;
        convert_existing(&request, &config, content)
    } else {
        let spinner = show_spinner.then(|| spinner(&request, config.locale));
        let result = generate_document(&request, &config)
            .await
            .map(|g| (g.content, g.document.len(), g.docx));
        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }
        result
    };

    let (content, block_count, docx) = match outcome {
        Ok(v) => v,
        Err(LessonDocError::Validation(v)) => {
            eprintln!("{} {}", yellow("⚠"), v);
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("Generation failed"),
    };

    write_docx(&output_path, &docx)
        .await
        .context("Failed to write document")?;
    let elapsed_ms = start.elapsed().as_millis();

    // ── Report ───────────────────────────────────────────────────────────
    if cli.print {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if cli.json {
        let summary = json!({
            "kind": request.kind(),
            "output": output_path.display().to_string(),
            "bytes": docx.len(),
            "blocks": block_count,
            "duration_ms": elapsed_ms,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  {} blocks  {}ms  →  {}",
            green("✔"),
            request.display_label(config.locale),
            block_count,
            elapsed_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!("   {}", dim(&format!("{} bytes", docx.len())));
    }

    Ok(())
}

/// Render markdown that is already on disk, with the same checks as a
/// generated document minus the LLM selection.
fn convert_existing(
    request: &DocumentRequest,
    config: &GenerationConfig,
    content: String,
) -> Result<(String, usize, Vec<u8>), LessonDocError> {
    if !request.kind().is_supported() {
        return Err(LessonDocError::Unsupported {
            kind: request.display_label(config.locale),
        });
    }
    validate_fields(&request.subject, &request.topic, config.locale)?;
    let (document, docx) = render(request, &content, config)?;
    Ok((content, document.len(), docx))
}

fn spinner(request: &DocumentRequest, locale: Locale) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Generating");
    bar.set_message(format!(
        "{} · {}",
        request.display_label(locale),
        request.subject.trim()
    ));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Map CLI args to a `DocumentRequest`.
async fn build_request(cli: &Cli) -> Result<DocumentRequest> {
    let topic = if let Some(ref path) = cli.topic_file {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read topic from {:?}", path))?
    } else {
        cli.topic.clone()
    };

    let options = match cli.kind {
        DocumentKind::LessonPlan => KindOptions::LessonPlan(LessonPlanOptions {
            duration_minutes: Some(cli.duration),
            learning_objectives: cli.objectives.clone(),
            materials: cli.materials.clone(),
            methodology: cli.methodology.clone(),
            assessment_strategy: cli.assessment_strategy.clone(),
            lesson_flow: cli.lesson_flow.clone(),
            include_differentiation: !cli.no_differentiation,
        }),
        DocumentKind::LectureNotes => KindOptions::LectureNotes(LectureNotesOptions {
            detail_level: cli.detail_level.clone(),
            format_style: cli.format_style.clone(),
            include_examples: !cli.no_examples,
            include_references: cli.references,
        }),
        DocumentKind::ExerciseList => {
            let defaults = ExerciseListOptions::default();
            KindOptions::ExerciseList(ExerciseListOptions {
                num_questions: cli.questions,
                difficulty: cli.difficulty.clone(),
                question_types: if cli.question_types.is_empty() {
                    defaults.question_types
                } else {
                    cli.question_types.clone()
                },
                include_answer_key: !cli.no_answer_key,
            })
        }
        DocumentKind::MindMap => KindOptions::MindMap(MindMapOptions {
            main_branches: cli.branches,
            depth_levels: cli.depth,
            include_examples: !cli.no_examples,
            highlight_hierarchy: !cli.flat,
        }),
        DocumentKind::Assessment => KindOptions::Assessment,
    };

    let mut request = DocumentRequest::new(cli.kind, &cli.subject, &cli.grade, topic)
        .with_options(options);
    if let Some(ref label) = cli.label {
        request = request.with_label(label);
    }
    Ok(request)
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli) -> Result<GenerationConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut llm = LlmConfig::new(cli.provider);
    if let Some(ref model) = cli.model {
        llm = llm.with_model(model);
    }
    if let Some(ref key) = cli.api_key {
        llm = llm.with_api_key(key);
    }
    if cli.provider == ProviderKind::Ollama && cli.from_markdown.is_none() {
        let connected = probe_ollama(&cli.ollama_host, 5).await;
        llm = llm.with_host(&cli.ollama_host).with_connected(connected);
    }

    let mut builder = GenerationConfig::builder()
        .llm(llm)
        .locale(cli.locale)
        .hierarchy(cli.hierarchy.clone().into())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .tidy_response(!cli.no_tidy);

    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
