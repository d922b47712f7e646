use crate::models::domain::question::Question;

/// Formatting contract shared by both prompts: the model must answer with a
/// bare JSON list, but replies routinely arrive wrapped in code fences, which
/// the parse boundary strips before validation.
pub const QUESTION_GENERATOR_RULES: &str = r#"You are an expert medical educator writing for residents and fellows.

TASK:
1. Identify ALL major topics in the source material.
2. Exclude any previously used topics listed above.
3. Randomly select the requested number of DIFFERENT remaining topics.
4. Write ONE concise short-answer question per topic, structured like a Royal College oral boards exam.

RULES:
- Ensure the questions are proportional across the manual, covering all major topics.
- Each question must test a DIFFERENT topic.
- Do NOT generate multiple questions from the same subsection.
- Do NOT follow the order of the manual.
- Do NOT repeat themes from earlier question sets.
- Focus on clinical relevance: presentation, approach, and management.
- Prefer writing questions from tables when tables are present.
- Do NOT invent answers; every answer key must come ONLY from the supplied text.

Return ONLY JSON in this format:
[
  {"topic": "string", "question": "string", "answer_key": "string"}
]"#;

pub const GRADING_RUBRIC: &str = r#"You are a supportive Royal College oral boards examiner assessing RESIDENT-LEVEL answers.

Your goal is to fairly assess clinical understanding, not to fail candidates.

GRADING PHILOSOPHY:
- Full marks (9-10/10) are achievable for clear, correct, resident-appropriate answers.
- Do NOT require consultant-level depth for full credit.
- Award generous partial credit for correct core concepts.
- Minor omissions or wording issues must NOT heavily penalize the score.
- Answers may be brief, non-native English, or in another language.

SCORING RUBRIC (0-10):
- 9-10: Correct core concepts, clinically sound, safe management; minor details may be missing.
- 7-8: Mostly correct with good understanding; some gaps or imprecision.
- 5-6: Partial understanding; correct ideas but important omissions.
- 3-4: Limited understanding; some correct fragments.
- 1-2: Minimal understanding.
- 0: Unsafe or completely incorrect.

INSTRUCTIONS:
1. Focus on whether the candidate demonstrates SAFE and CORRECT clinical reasoning.
2. Compare the response to the expected answer key, but do NOT require exact wording.
3. If the core idea is present, award at least 6/10.
4. Be especially fair to concise answers typical of oral exams.

Return ONLY JSON, one entry per response, in input order:
[
  {
    "score": 0,
    "feedback": "Brief, constructive feedback explaining the score.",
    "model_answer": "A concise ideal resident-level answer."
  }
]"#;

pub fn build_generation_prompt(
    document_text: &str,
    count: u8,
    excluded_topics: &[String],
) -> String {
    let excluded = serde_json::to_string_pretty(excluded_topics)
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        "Generate {count} concise short-answer questions and their answer keys based on the \
         following content.\n\
         PREVIOUSLY USED TOPICS (avoid these unless no alternatives remain): {excluded}\n\n\
         {QUESTION_GENERATOR_RULES}\n\n\
         SOURCE TEXT:\n{document_text}"
    )
}

pub fn build_grading_prompt(questions: &[Question], answers: &[String]) -> String {
    let triples: Vec<serde_json::Value> = questions
        .iter()
        .zip(answers.iter())
        .map(|(question, answer)| {
            serde_json::json!({
                "question": question.question,
                "expected": question.answer_key,
                "response": answer,
            })
        })
        .collect();

    let payload = serde_json::to_string_pretty(&triples).unwrap_or_else(|_| "[]".to_string());

    format!("{GRADING_RUBRIC}\n\nQUESTIONS AND RESPONSES:\n{payload}")
}
