use crate::models::{AssessmentSubmission, KnowledgeChunk};

const SYSTEM_ROLE_PROMPT: &str = "\
You are NEXUS, a highly capable talent-development strategist, an executive \
career counselor, and a curriculum designer for an engineering department. \
You think systematically, ground every claim in data and aim for measurable \
outcomes. Your task is to produce a hyper-personalized, strategic and \
actionable Individual Development Plan (IDP).";

/// Substituted for the context section when retrieval produced nothing, so
/// the model is told explicitly to fall back instead of seeing an empty
/// section.
pub const GENERAL_KNOWLEDGE_FALLBACK: &str = "No specific context was found. \
Use general knowledge about engineering student development instead.";

/// Renders the full generation prompt. Pure and deterministic: same
/// submission and chunks, same string. Chunks are rendered one per line in
/// retriever order.
pub fn build_assessment_prompt(
    submission: &AssessmentSubmission,
    chunks: &[KnowledgeChunk],
) -> String {
    let formatted_context = if chunks.is_empty() {
        GENERAL_KNOWLEDGE_FALLBACK.to_string()
    } else {
        chunks
            .iter()
            .map(|chunk| format!("- {}", chunk.content_text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    // serializing a plain scores/text struct is infallible
    let user_profile = serde_json::to_string_pretty(submission).unwrap_or_default();

    format!(
        r#"{SYSTEM_ROLE_PROMPT}

# USER INPUT DATA (ACTUAL PROFILE)
{user_profile}

# RELEVANT INTERNAL CONTEXT FROM THE KNOWLEDGE BASE (single source of truth)
Use ONLY the information below when recommending specific programs, courses or development activities.
---
{formatted_context}
---

# YOUR TASKS
Perform the following three tasks in order:

1. **Research and gap analysis:** From the user's stated career aspirations, define the "ideal professional profile". Compare it with the ACTUAL profile above and write a thorough gap analysis.

2. **Build an 8-semester development roadmap:** Based on the gap analysis, produce an eight-semester action plan.
   - Rule 1: the plan must be progressive, moving from foundations to specialization.
   - Rule 2: every recommendation (program, course, mentor) MUST reference an item present in the INTERNAL CONTEXT above whenever one is relevant; never invent curriculum items that are not in the context.
   - Rule 3: every recommendation MUST carry KPIs that satisfy the SMART criteria (Specific, Measurable, Achievable, Relevant, Time-bound).
   - Rule 4: connect non-academic recommendations to relevant courses from the INTERNAL CONTEXT.

3. **Write a professional summary:** Synthesize the user's greatest strengths and aspirations into one strong, future-oriented narrative paragraph suitable for LinkedIn.

# OUTPUT FORMAT
The final answer MUST be valid JSON with no additional text and no markdown formatting. Use this exact structure:
{{
  "linkedin_summary": "string",
  "potential_analysis": "string",
  "career_goals_analysis": "string",
  "roadmap": [
    {{
      "semester": 1,
      "theme": "string",
      "academic": {{ "focus": "string", "courses": ["string"], "knowledge": "string", "skills": "string", "attitude": "string", "kpis": ["string"] }},
      "non_academic": {{ "focus": "string", "development_programs": ["string"], "clubs": ["string"], "mentors": ["string"], "knowledge": "string", "skills": "string", "attitude": "string", "kpis": ["string"] }}
    }}
  ]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PwbScores, RiasecScores};
    use uuid::Uuid;

    fn submission() -> AssessmentSubmission {
        AssessmentSubmission {
            riasec_scores: RiasecScores {
                realistic: 5,
                investigative: 4,
                artistic: 1,
                social: 2,
                enterprising: 3,
                conventional: 2,
            },
            pwb_scores: PwbScores {
                self_acceptance: 4,
                positive_relations: 3,
                autonomy: 5,
                environmental_mastery: 3,
                purpose_in_life: 4,
                personal_growth: 5,
            },
            portfolio_text: "Built a CNC router from scrap parts and wrote the motion firmware, then documented the build for the campus makerspace wiki.".to_string(),
            aspirations: "I want to design industrial automation systems".to_string(),
        }
    }

    fn chunk(text: &str) -> KnowledgeChunk {
        KnowledgeChunk {
            id: Uuid::new_v4(),
            content_text: text.to_string(),
            source_document: "curriculum.pdf".to_string(),
            metadata: serde_json::Value::Null,
            similarity: 0.8,
        }
    }

    #[test]
    fn is_deterministic() {
        let chunks = vec![chunk("Control Systems Lab"), chunk("Mechatronics Track")];
        assert_eq!(
            build_assessment_prompt(&submission(), &chunks),
            build_assessment_prompt(&submission(), &chunks)
        );
    }

    #[test]
    fn renders_chunks_as_bullets_in_retriever_order() {
        let chunks = vec![chunk("First chunk"), chunk("Second chunk")];
        let prompt = build_assessment_prompt(&submission(), &chunks);

        let first = prompt.find("- First chunk").unwrap();
        let second = prompt.find("- Second chunk").unwrap();
        assert!(first < second);
        assert!(!prompt.contains(GENERAL_KNOWLEDGE_FALLBACK));
    }

    #[test]
    fn empty_context_gets_the_general_knowledge_fallback() {
        let prompt = build_assessment_prompt(&submission(), &[]);
        assert!(prompt.contains(GENERAL_KNOWLEDGE_FALLBACK));
    }

    #[test]
    fn submission_scores_appear_verbatim() {
        let prompt = build_assessment_prompt(&submission(), &[]);
        assert!(prompt.contains("\"realistic\": 5"));
        assert!(prompt.contains("\"personal_growth\": 5"));
        assert!(prompt.contains("I want to design industrial automation systems"));
    }

    #[test]
    fn prompt_ends_with_the_json_output_contract() {
        let prompt = build_assessment_prompt(&submission(), &[]);
        assert!(prompt.contains("MUST be valid JSON"));
        assert!(prompt.contains("\"linkedin_summary\""));
        assert!(prompt.contains("\"roadmap\""));
        assert!(prompt.trim_end().ends_with("}"));
    }
}
