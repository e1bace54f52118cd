//! Prompt templates for each document kind.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: changing what the model is asked for (a new
//!    section, a tweaked formatting rule) requires editing exactly one place.
//!
//! 2. **Testability**: unit tests can build and inspect prompts directly
//!    without calling a real LLM, making prompt regressions easy to catch.
//!
//! Every prompt ends in a `FORMATTING RULES` block. The rules keep the model
//! inside the markdown subset that [`crate::markdown::convert`] understands.

use crate::request::{
    DocumentRequest, ExerciseListOptions, KindOptions, LectureNotesOptions, LessonPlanOptions,
    MindMapOptions,
};

/// Placeholder for optional fields the user left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Rule shared by every document kind.
pub const SAME_LANGUAGE_RULE: &str = "Write in the same language as the subject/topic";

/// Optional system message sent ahead of the prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced teacher and instructional designer. \
You write clear, classroom-ready material in Markdown.";

/// Build the user prompt for `request`.
///
/// Returns `None` for kinds that cannot be generated (assessment).
pub fn build_prompt(request: &DocumentRequest) -> Option<String> {
    let body = match &request.options {
        KindOptions::LessonPlan(o) => lesson_plan_prompt(request, o),
        KindOptions::LectureNotes(o) => lecture_notes_prompt(request, o),
        KindOptions::ExerciseList(o) => exercise_list_prompt(request, o),
        KindOptions::MindMap(o) => mind_map_prompt(request, o),
        KindOptions::Assessment => return None,
    };
    Some(body)
}

fn or_not_specified(value: &Option<String>) -> &str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

fn rules(lines: &[&str]) -> String {
    let mut out = String::from("FORMATTING RULES:\n");
    for line in lines {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("- ");
    out.push_str(SAME_LANGUAGE_RULE);
    out.push('\n');
    out
}

fn lesson_plan_prompt(req: &DocumentRequest, o: &LessonPlanOptions) -> String {
    let duration = match req.duration_minutes() {
        Some(m) => format!("{m} minutes"),
        None => NOT_SPECIFIED.to_string(),
    };
    format!(
        "Create a detailed lesson plan for {subject} at {grade} level.

Topic: {topic}
Duration: {duration}
Learning objectives: {objectives}
Materials/Resources: {materials}
Teaching methodology: {methodology}
Assessment strategy: {assessment}
Lesson flow: {flow}
Include differentiation/adaptations: {differentiation}

Structure the lesson plan with:
1. Lesson title and objectives
2. Prior knowledge or prerequisites
3. Step-by-step lesson flow (warm-up, main activity, closure), using the provided flow when specified
4. Materials and resources list
5. Assessment strategy
6. Differentiation/adaptations for diverse learners (if requested)
7. Homework or extension activities (optional)

{rules}",
        subject = req.subject.trim(),
        grade = req.grade_level.trim(),
        topic = req.topic.trim(),
        objectives = or_not_specified(&o.learning_objectives),
        materials = or_not_specified(&o.materials),
        methodology = or_not_specified(&o.methodology),
        assessment = or_not_specified(&o.assessment_strategy),
        flow = or_not_specified(&o.lesson_flow),
        differentiation = o.include_differentiation,
        rules = rules(&[
            "Use Markdown headings (#, ##, ###) for sections",
            "Use bullet points for lists and activities",
            "Keep headings consistent and avoid horizontal rules",
        ]),
    )
}

fn lecture_notes_prompt(req: &DocumentRequest, o: &LectureNotesOptions) -> String {
    format!(
        "Create lecture notes for {subject} at {grade} level.

Topic: {topic}
Detail level: {detail}
Format style: {style}
Include examples: {examples}
Include references: {references}

Structure the notes with:
1. Brief introduction and learning goals
2. Key concepts and definitions
3. Explanations with examples (if requested)
4. Key takeaways or summary
5. References or further reading (if requested)

{rules}",
        subject = req.subject.trim(),
        grade = req.grade_level.trim(),
        topic = req.topic.trim(),
        detail = or_default(&o.detail_level, "Standard"),
        style = or_default(&o.format_style, "Paragraphs"),
        examples = o.include_examples,
        references = o.include_references,
        rules = rules(&[
            "Use Markdown headings (#, ##, ###) for sections",
            "Use bullet points when the format style is \"Bullet Points\" or \"Outline\"",
            "Keep the content clear and classroom-ready",
        ]),
    )
}

fn exercise_list_prompt(req: &DocumentRequest, o: &ExerciseListOptions) -> String {
    let question_types = if o.question_types.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        o.question_types.join(", ")
    };
    let answer_key = if o.include_answer_key {
        "5. Answer key with brief explanations in a final section"
    } else {
        "5. Do not include answers"
    };
    format!(
        "Create an exercise list for {subject} at {grade} level.

Topic: {topic}
Number of questions: {count}
Difficulty: {difficulty}
Question types: {question_types}
Include answer key: {include_key}

Structure the exercise list with:
1. Title and short instructions for students
2. Questions grouped by type
3. Numbered questions (1. 2. 3.) with options as bullet points for multiple choice
4. Questions that match the requested difficulty
{answer_key}

{rules}",
        subject = req.subject.trim(),
        grade = req.grade_level.trim(),
        topic = req.topic.trim(),
        count = o.num_questions.max(1),
        difficulty = o.difficulty.trim(),
        include_key = o.include_answer_key,
        rules = rules(&[
            "Use Markdown headings (#, ##) for sections",
            "Use numbered lists for questions and bullet points for answer options",
            "Avoid tables and horizontal rules",
        ]),
    )
}

fn mind_map_prompt(req: &DocumentRequest, o: &MindMapOptions) -> String {
    let hierarchy_instruction = if o.highlight_hierarchy {
        "Emphasize hierarchical relationships between concepts."
    } else {
        "Keep the hierarchy minimal and focus on main branches."
    };
    format!(
        "Create a lesson mind map for {subject} at {grade} level.

Topic: {topic}
Main branches: {branches}
Depth levels: {depth}
Include examples/applications: {examples}
Hierarchy emphasis: {highlight}

{rules}",
        subject = req.subject.trim(),
        grade = req.grade_level.trim(),
        topic = req.topic.trim(),
        branches = o.effective_branches(),
        depth = o.effective_depth(),
        examples = o.include_examples,
        highlight = o.highlight_hierarchy,
        rules = rules(&[
            "Use Markdown only",
            "Start with a single H1 title (#) for the central topic",
            "Use H2 headings (##) for each main branch",
            "Use nested bullet points for sub-branches with 2 spaces per level",
            "Keep each node short (max 8-10 words)",
            "Avoid paragraphs and horizontal rules",
            hierarchy_instruction,
        ]),
    )
}
