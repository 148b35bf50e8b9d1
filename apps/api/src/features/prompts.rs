// All LLM prompt constants for the feature orchestrators.
// Templates use `{placeholder}` replacement; the orchestration core treats
// the finished prompt as an opaque string.

/// Shared JSON-only instruction appended to every structured prompt.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Respond with valid JSON only. Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. Do NOT include explanations or apologies.";

/// Quiz generation template. Replace `{industry}` and `{skills}` before sending.
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"Generate 10 technical interview questions for a {industry} professional with expertise in: {skills}.

Return a JSON object with this EXACT schema (no extra fields):
{
  "questions": [
    {
      "question": "string",
      "options": ["string", "string", "string", "string"],
      "correctAnswer": "string",
      "explanation": "string"
    }
  ]
}

Each question must be multiple choice with exactly 4 options, and correctAnswer must be one of the options verbatim.
"#;

/// ATS analysis template. Replace `{job_description}` and `{resume_text}`.
pub const ATS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume against the job description as an ATS (Applicant Tracking System) would.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "atsScore": 75,
  "matchPercentage": 68,
  "strengths": ["string"],
  "weaknesses": ["string"],
  "missingKeywords": ["string"],
  "matchedSkills": ["string"],
  "recommendations": [
    {"category": "string", "priority": "High", "action": "string", "impact": "string"}
  ],
  "summary": "string"
}

Scoring rules:
- atsScore reflects keyword coverage, formatting, and section completeness (0-100).
- matchPercentage reflects how well the candidate's experience matches the role (0-100).
- matchedSkills must list hard technical skills only, never soft skills.
- If the resume has 5 or more significant weaknesses, atsScore must be below 65.
"#;

/// Cover letter template. Replace `{job_title}`, `{company_name}`,
/// `{job_description}`, `{candidate_name}`, `{background}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter for {candidate_name} applying to the {job_title} role at {company_name}.

JOB DESCRIPTION:
{job_description}

CANDIDATE BACKGROUND:
{background}

The letter should be 3-4 paragraphs, specific to the role, and written in markdown.

Return a JSON object with this EXACT schema (no extra fields):
{
  "content": "the full cover letter in markdown"
}
"#;

/// Industry insights template. Replace `{industry}`.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Provide a current market analysis of the {industry} industry for job seekers.

Return a JSON object with this EXACT schema (no extra fields):
{
  "salaryRanges": [
    {"role": "string", "min": 0, "median": 0, "max": 0, "location": "string"}
  ],
  "growthRate": 12,
  "demandLevel": "High",
  "topSkills": ["string"],
  "marketOutlook": "Positive",
  "keyTrends": ["string"],
  "recommendedSkills": ["string"]
}

Rules:
- growthRate is an annual percentage between 0 and 100.
- demandLevel is exactly one of: "High", "Medium", "Low".
- marketOutlook is exactly one of: "Positive", "Neutral", "Negative".
- Include at least 5 roles in salaryRanges with amounts in USD.
"#;

/// Career roadmap template. Replace `{current_role}`, `{target_role}`, `{industry}`.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a step-by-step career roadmap for moving from {current_role} to {target_role} in the {industry} industry.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "string",
  "steps": [
    {
      "title": "string",
      "description": "string",
      "duration": "string",
      "skills": ["string"],
      "resources": ["string"]
    }
  ]
}

Include 5-8 concrete steps ordered from first to last, each with a realistic duration.
"#;

pub fn quiz_prompt(industry: &str, skills: &[String]) -> String {
    format!(
        "{}\n{}",
        QUIZ_PROMPT_TEMPLATE
            .replace("{industry}", industry)
            .replace("{skills}", &skills.join(", ")),
        JSON_ONLY_INSTRUCTION
    )
}

pub fn ats_prompt(job_description: &str, resume_text: &str) -> String {
    format!(
        "{}\n{}",
        ATS_PROMPT_TEMPLATE
            .replace("{job_description}", job_description)
            .replace("{resume_text}", resume_text),
        JSON_ONLY_INSTRUCTION
    )
}

pub fn cover_letter_prompt(
    candidate_name: &str,
    job_title: &str,
    company_name: &str,
    job_description: &str,
    background: &str,
) -> String {
    format!(
        "{}\n{}",
        COVER_LETTER_PROMPT_TEMPLATE
            .replace("{candidate_name}", candidate_name)
            .replace("{job_title}", job_title)
            .replace("{company_name}", company_name)
            .replace("{job_description}", job_description)
            .replace("{background}", background),
        JSON_ONLY_INSTRUCTION
    )
}

pub fn insights_prompt(industry: &str) -> String {
    format!(
        "{}\n{}",
        INSIGHTS_PROMPT_TEMPLATE.replace("{industry}", industry),
        JSON_ONLY_INSTRUCTION
    )
}

pub fn roadmap_prompt(current_role: &str, target_role: &str, industry: &str) -> String {
    format!(
        "{}\n{}",
        ROADMAP_PROMPT_TEMPLATE
            .replace("{current_role}", current_role)
            .replace("{target_role}", target_role)
            .replace("{industry}", industry),
        JSON_ONLY_INSTRUCTION
    )
}
