use crate::models::Difficulty;

/// Everything a single tier prompt needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPrompt<'a> {
    pub count: usize,
    pub difficulty: Difficulty,
    pub grade: u8,
    pub topic: &'a str,
}

impl TierPrompt<'_> {
    pub fn render(&self) -> String {
        let difficulty = self.difficulty.as_str();
        let label = self.difficulty.label();
        let per_letter = self.count.div_ceil(4);

        format!(
            r#"Generate {count} [{difficulty}] level math questions for Grade {grade} on topic '{topic}' following the Vietnamese curriculum.

CRITICAL FORMATTING RULES (STRICTLY NO LATEX):
1. DO NOT use LaTeX syntax. NO '$', NO '\frac', NO '\sqrt', NO '\cdot', NO '\Rightarrow'.
2. USE UNICODE characters for all math symbols so the text is readable as plain text:
   - Powers/Indices: superscripts/subscripts such as x², x³, aⁿ, x₁, x₂ (NOT x^2, x_1)
   - Fractions: slash or Unicode fractions such as 1/2, 3/4, ½, ⅓, (a+b)/c (NOT \frac{{a}}{{b}})
   - Roots: √x, ∛x (NOT \sqrt{{x}})
   - Multiplication: '×' or '·' (NOT *)
   - Arrows: '⇒' for implication, '⇔' for equivalence, '→' for arrow
   - Geometry: ∠A, ΔABC, ⊥, ||, π, °
   - Sets/Logic: ∈, ⊂, ∪, ∩, ∅, ∀, ∃
   - Comparison: ≠, ≤, ≥, ≈

3. CONTENT STRUCTURE:
   - Questions must be in Vietnamese.
   - Exactly 4 options, labeled "A. ", "B. ", "C. ", "D. ".
   - The explanation must be step-by-step using "- Step:" lines and end with "=>" and the conclusion.
   - CORRECT ANSWER: must be exactly one of A, B, C, D.

4. ANSWER DISTRIBUTION (IMPORTANT):
   - Spread the correct answers evenly over A, B, C and D.
   - Avoid making 'A' the correct answer too often.
   - For {count} questions, aim for approximately {per_letter} of each option.

Difficulty definition for {label} ({difficulty}):
- Nhận biết (Recognition): direct recall, simple calculation (1 step).
- Thông hiểu (Understanding): multi-step problem, apply a formula (2-3 steps).
- Vận dụng (Application): complex scenario integrating several concepts (3+ steps).

Output JSON format:
[
  {{
    "text": "Unicode question text...",
    "options": ["A. ...", "B. ...", "C. ...", "D. ..."],
    "correctAnswer": "A",
    "explanation": "- Step 1: ...\n- Step 2: ...\n=> Conclusion...",
    "difficulty": "{difficulty}"
  }}
]"#,
            count = self.count,
            difficulty = difficulty,
            grade = self.grade,
            topic = self.topic,
            label = label,
            per_letter = per_letter,
        )
    }
}

/// Fixed persona and formatting rules for the chat tutor
pub const TUTOR_SYSTEM_INSTRUCTION: &str = r#"ROLE:
- You are "Thầy Toán AI", a friendly, patient and knowledgeable math tutor.
- Task: help students understand lessons, solve problems from photos (OCR) and guide their reasoning.
- Audience: students from grade 1 to grade 12. Reply in Vietnamese.

MATH FORMATTING (UNICODE ONLY, NO LATEX):
- Do NOT use LaTeX syntax ($, \frac, \sqrt...).
- Use Unicode characters: 1/2, x², √x, ⇒, ΔABC, ∠A, π, °...

TEACHING RULES:
1. Understand the question and confirm it.
2. Socratic method: prompt the student to think for themselves.
3. Explain step by step.
4. Check understanding with a similar exercise.
5. Stay positive and use emoji (👋😊💡🎯).

IMAGE WORKFLOW (OCR):
1. Extract the text and formulas.
2. If the image is blurry, ask for a new photo.
3. If it is readable, answer with this structure:
   ## 📷 Recognized problem: ...
   ## ❓ Confirmation: ...
   ## 📖 Solution guide: ...
   ## 💡 Notes: ..."#;

/// Text sent when the learner attaches only an image
pub const DEFAULT_CHAT_PROMPT: &str = "Hãy giải bài này giúp em.";
