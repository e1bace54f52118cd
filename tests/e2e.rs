//! End-to-end integration tests for edgequake-lessondoc.
//!
//! Most tests drive the full pipeline with a canned [`TextGenerator`], so
//! they need no network. The live-provider tests are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 OPENAI_API_KEY=sk-... cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use edgequake_lessondoc::{
    generate, generate_document, generate_to_file, Block, DocumentKind, DocumentRequest,
    GenerationConfig, KindOptions, LessonDocError, LlmConfig, Locale, MindMapOptions,
    ProviderKind, TextGenerator, ValidationField,
};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Returns a fixed answer and remembers the prompts it was given.
struct CannedGenerator {
    answer: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    fn ok(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            ..Self::ok("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LessonDocError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
            .clone()
            .map_err(|message| LessonDocError::LlmApiError { message })
    }
}

/// Route library logs to the test output. Later calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

fn config() -> GenerationConfig {
    GenerationConfig::builder()
        .llm(LlmConfig::new(ProviderKind::OpenAi).with_api_key("sk-test"))
        .build()
        .unwrap()
}

fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

const MIND_MAP_ANSWER: &str = concat!(
    "```markdown\n",
    "# Photosynthesis\n",
    "## Inputs\n",
    "- **Light** energy\n",
    "  - Absorbed by chlorophyll\n",
    "    - Mostly red and blue\n",
    "## Outputs\n",
    "1. Glucose\n",
    "2. Oxygen\n",
    "```",
);

// ── Pipeline with a canned model ─────────────────────────────────────────────

#[tokio::test]
async fn mind_map_end_to_end() {
    init_tracing();
    let request = DocumentRequest::new(
        DocumentKind::MindMap,
        "Biology",
        "High School",
        "Photosynthesis",
    );
    let generator = CannedGenerator::ok(MIND_MAP_ANSWER);

    let doc = generate(&request, &config(), &generator).await.unwrap();

    assert_eq!(generator.calls(), 1);
    assert!(generator.last_prompt().contains("Photosynthesis"));
    assert!(generator.last_prompt().contains("FORMATTING RULES:"));

    assert_eq!(doc.kind, DocumentKind::MindMap);
    assert_eq!(doc.file_name, "Biology_Lesson_Mind_Map.docx");
    assert_eq!(
        doc.document.blocks()[0],
        Block::Title {
            text: "Biology - Lesson Mind Map".into()
        }
    );

    let indents: Vec<usize> = doc
        .document
        .blocks()
        .iter()
        .filter_map(|b| match b {
            Block::Bullet { indent_level, .. } => Some(*indent_level),
            _ => None,
        })
        .collect();
    assert_eq!(indents, vec![0, 1, 2]);
    assert!(doc
        .document
        .blocks()
        .contains(&Block::Bullet {
            indent_level: 0,
            text: "Light energy".into()
        }));

    let xml = document_xml(&doc.docx);
    assert!(xml.contains("Biology - Lesson Mind Map"));
    assert!(xml.contains("Absorbed by chlorophyll"));
    assert!(!xml.contains("```"));
}

#[tokio::test]
async fn lesson_plan_header_carries_duration() {
    let request = DocumentRequest::new(DocumentKind::LessonPlan, "Math", "Grade 5", "Fractions");
    let generator = CannedGenerator::ok("# Plan\n- Warm-up\n  - Pizza slices");

    let doc = generate(&request, &config(), &generator).await.unwrap();

    assert!(doc.document.blocks().contains(&Block::Paragraph {
        text: "Duration: 50 minutes".into()
    }));
    // Lesson plans are flattened unless the hierarchy mode says otherwise.
    assert!(doc.document.blocks().contains(&Block::Bullet {
        indent_level: 0,
        text: "Pizza slices".into()
    }));
    assert_eq!(doc.file_name, "Math_Lesson_Plan.docx");
}

#[tokio::test]
async fn mind_map_options_reach_the_prompt() {
    let request = DocumentRequest::new(DocumentKind::MindMap, "History", "Grade 8", "Rome")
        .with_options(KindOptions::MindMap(MindMapOptions {
            main_branches: 4,
            depth_levels: 5,
            include_examples: false,
            highlight_hierarchy: false,
        }));
    let generator = CannedGenerator::ok("# Rome");

    generate(&request, &config(), &generator).await.unwrap();

    let prompt = generator.last_prompt();
    assert!(prompt.contains("Main branches: 4"));
    assert!(prompt.contains("Depth levels: 5"));
    assert!(prompt.contains("Keep the hierarchy minimal and focus on main branches."));
}

#[tokio::test]
async fn custom_label_names_the_file() {
    let request = DocumentRequest::new(
        DocumentKind::LectureNotes,
        "Química",
        "Ensino Médio",
        "Ligações covalentes",
    )
    .with_label("Notas de Aula");
    let generator = CannedGenerator::ok("# Ligações\nTexto.");

    let doc = generate(&request, &config(), &generator).await.unwrap();
    assert_eq!(doc.file_name, "Química_Notas_de_Aula.docx");
}

#[tokio::test]
async fn portuguese_run_gets_portuguese_title_and_file_name() {
    let kind = DocumentKind::from_label("Notas de Aula").unwrap();
    let request = DocumentRequest::new(kind, "Química", "Ensino Médio", "Ligações covalentes");
    let config = GenerationConfig::builder()
        .llm(LlmConfig::new(ProviderKind::OpenAi).with_api_key("sk-test"))
        .locale(Locale::Pt)
        .build()
        .unwrap();
    let generator = CannedGenerator::ok("# Ligações\nTexto.");

    let doc = generate(&request, &config, &generator).await.unwrap();

    assert_eq!(
        doc.document.blocks()[0],
        Block::Title {
            text: "Química - Notas de Aula".into()
        }
    );
    assert_eq!(doc.file_name, "Química_Notas_de_Aula.docx");
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn assessment_never_reaches_the_model() {
    let request = DocumentRequest::new(DocumentKind::Assessment, "Math", "Grade 5", "Fractions");
    let generator = CannedGenerator::ok("# Quiz");

    let err = generate(&request, &config(), &generator).await.unwrap_err();

    assert!(matches!(err, LessonDocError::Unsupported { .. }), "got {err:?}");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn missing_topic_is_reported_in_the_configured_language() {
    let request = DocumentRequest::new(DocumentKind::LessonPlan, "Math", "Grade 5", "   ");
    let config = GenerationConfig::builder()
        .llm(LlmConfig::new(ProviderKind::OpenAi).with_api_key("sk-test"))
        .locale(Locale::Pt)
        .build()
        .unwrap();
    let generator = CannedGenerator::ok("# Plan");

    let err = generate(&request, &config, &generator).await.unwrap_err();

    match err {
        LessonDocError::Validation(v) => {
            assert_eq!(v.field, ValidationField::Topic);
            assert_eq!(v.message, "A descrição do tema é obrigatória");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn missing_api_key_stops_before_provider_creation() {
    let request = DocumentRequest::new(DocumentKind::LessonPlan, "Math", "Grade 5", "Fractions");
    let config = GenerationConfig::builder()
        .llm(LlmConfig::new(ProviderKind::OpenAi))
        .build()
        .unwrap();

    let err = generate_document(&request, &config).await.unwrap_err();
    match err {
        LessonDocError::Validation(v) => assert_eq!(v.field, ValidationField::ApiKey),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn model_errors_propagate_unchanged() {
    let request = DocumentRequest::new(DocumentKind::ExerciseList, "Math", "Grade 5", "Fractions");
    let generator = CannedGenerator::failing("rate limited");

    let err = generate(&request, &config(), &generator).await.unwrap_err();

    match err {
        LessonDocError::LlmApiError { message } => assert_eq!(message, "rate limited"),
        other => panic!("expected LLM error, got {other:?}"),
    }
}

// ── File output ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_to_file_writes_a_docx() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out.docx");
    let request = DocumentRequest::new(DocumentKind::LectureNotes, "Physics", "Grade 10", "Optics");
    let generator = CannedGenerator::ok("# Optics\n## Lenses\nConverging and diverging.");

    let doc = generate_to_file(&request, &config(), &generator, &path)
        .await
        .unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written, doc.docx);
    assert!(document_xml(&written).contains("Converging and diverging."));
    assert!(!path.with_extension("docx.tmp").exists());
}

#[test]
fn generated_document_json_omits_bytes() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let request = DocumentRequest::new(DocumentKind::MindMap, "Art", "Grade 2", "Colours");
    let generator = CannedGenerator::ok("# Colours\n- Red");
    let doc = rt
        .block_on(generate(&request, &config(), &generator))
        .unwrap();

    let json = serde_json::to_value(&doc).unwrap();
    assert!(json.get("docx").is_none());
    assert_eq!(json["kind"], "mind_map");
    assert_eq!(json["file_name"], "Art_Lesson_Mind_Map.docx");
}

// ── Live providers (opt-in) ──────────────────────────────────────────────────

/// Requires E2E_ENABLED=1 and OPENAI_API_KEY.
#[tokio::test]
async fn live_openai_mind_map() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 and OPENAI_API_KEY to run");
        return;
    }
    init_tracing();
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        println!("SKIP: OPENAI_API_KEY not set");
        return;
    };

    let request = DocumentRequest::new(
        DocumentKind::MindMap,
        "Biology",
        "High School",
        "Photosynthesis",
    );
    let config = GenerationConfig::builder()
        .llm(LlmConfig::new(ProviderKind::OpenAi).with_api_key(key))
        .build()
        .unwrap();

    let doc = generate_document(&request, &config).await.unwrap();
    println!("{}", doc.content);

    assert!(!doc.content.trim().is_empty());
    assert!(doc.document.len() > 4, "expected a body after the header");
    assert!(doc
        .document
        .blocks()
        .iter()
        .any(|b| matches!(b, Block::Heading { .. } | Block::Bullet { .. })));
}

/// Requires E2E_ENABLED=1 and a running Ollama with OLLAMA_MODEL pulled.
#[tokio::test]
async fn live_ollama_lesson_plan() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    init_tracing();
    let host =
        std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
    let connected = edgequake_lessondoc::probe_ollama(&host, 5).await;
    if !connected {
        println!("SKIP: Ollama not reachable at {host}");
        return;
    }

    let request = DocumentRequest::new(DocumentKind::LessonPlan, "Math", "Grade 5", "Fractions");
    let config = GenerationConfig::builder()
        .llm(
            LlmConfig::new(ProviderKind::Ollama)
                .with_host(host)
                .with_model(model)
                .with_connected(connected),
        )
        .build()
        .unwrap();

    let doc = generate_document(&request, &config).await.unwrap();
    assert!(!doc.docx.is_empty());
}
