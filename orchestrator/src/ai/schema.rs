use tracing::error;

use crate::error::ApiError;
use crate::models::GeneratedIdp;

/// Pulls the JSON object out of a raw model response. Accepts bare JSON,
/// markdown-fenced JSON and JSON embedded in surrounding prose; models wrap
/// their output often enough that this is an expected variant, not an error.
pub fn extract_json(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.rfind("```") {
            let inner = rest[..end].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    Some(trimmed[start..=end].trim())
}

/// Parses an untrusted model response into a validated `GeneratedIdp`.
/// Nothing downstream may touch the payload before this succeeds. The raw
/// response goes to the server log on failure, never to the caller.
pub fn parse_generated_idp(raw: &str) -> Result<GeneratedIdp, ApiError> {
    let json_text = extract_json(raw).ok_or_else(|| {
        error!(raw_response = %raw, "model response contained no JSON object");
        ApiError::SchemaValidation("response contained no JSON object".to_string())
    })?;

    let idp: GeneratedIdp = serde_json::from_str(json_text).map_err(|err| {
        error!(%err, raw_response = %raw, "model response failed to parse against the IDP schema");
        ApiError::SchemaValidation(format!("response did not match the IDP schema: {err}"))
    })?;

    validate_idp(&idp)?;
    Ok(idp)
}

/// Structural invariants serde cannot express: semesters strictly ascending,
/// every development area carrying at least one KPI. Missing fields are not
/// coerced or guessed.
pub fn validate_idp(idp: &GeneratedIdp) -> Result<(), ApiError> {
    let mut last_semester = 0u32;
    for entry in &idp.roadmap {
        if entry.semester <= last_semester {
            return Err(ApiError::SchemaValidation(format!(
                "roadmap is not ordered by ascending semester at entry {}",
                entry.semester
            )));
        }
        last_semester = entry.semester;

        if entry.academic.kpis.is_empty() || entry.non_academic.kpis.is_empty() {
            return Err(ApiError::SchemaValidation(format!(
                "semester {} has a development area without KPIs",
                entry.semester
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_idp_json() -> String {
        serde_json::json!({
            "linkedin_summary": "A hands-on builder.",
            "potential_analysis": "Strong realistic profile.",
            "career_goals_analysis": "Aiming for automation engineering.",
            "roadmap": [
                {
                    "semester": 1,
                    "theme": "Foundations",
                    "academic": {
                        "focus": "Programming basics",
                        "courses": ["CS101"],
                        "kpis": ["Finish CS101 with a B or better"]
                    },
                    "non_academic": {
                        "focus": "Community",
                        "development_programs": ["Robotics bootcamp"],
                        "clubs": ["Robotics club"],
                        "kpis": ["Attend 10 club sessions"]
                    }
                },
                {
                    "semester": 2,
                    "theme": "Deepening",
                    "academic": {
                        "focus": "Control theory",
                        "courses": ["CTRL201"],
                        "kpis": ["Complete the lab series"]
                    },
                    "non_academic": {
                        "focus": "Mentorship",
                        "mentors": ["Senior automation engineer"],
                        "kpis": ["Hold monthly mentor sessions"]
                    }
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn accepts_bare_json() {
        let idp = parse_generated_idp(&sample_idp_json()).unwrap();
        assert_eq!(idp.roadmap.len(), 2);
        assert_eq!(idp.roadmap[0].academic.courses, vec!["CS101"]);
    }

    #[test]
    fn accepts_markdown_fenced_json() {
        let raw = format!("```json\n{}\n```", sample_idp_json());
        let idp = parse_generated_idp(&raw).unwrap();
        assert_eq!(idp.linkedin_summary, "A hands-on builder.");

        let raw = format!("```\n{}\n```", sample_idp_json());
        assert!(parse_generated_idp(&raw).is_ok());
    }

    #[test]
    fn accepts_json_wrapped_in_prose() {
        let raw = format!(
            "Sure! Here is the development plan you asked for:\n{}\nLet me know if you need changes.",
            sample_idp_json()
        );
        assert!(parse_generated_idp(&raw).is_ok());
    }

    #[test]
    fn rejects_responses_without_json() {
        let err = parse_generated_idp("I could not produce a plan.").unwrap_err();
        assert!(matches!(err, ApiError::SchemaValidation(_)));
    }

    #[test]
    fn rejects_missing_roadmap() {
        let raw = serde_json::json!({
            "linkedin_summary": "x",
            "potential_analysis": "y",
            "career_goals_analysis": "z"
        })
        .to_string();
        let err = parse_generated_idp(&raw).unwrap_err();
        assert!(matches!(err, ApiError::SchemaValidation(_)));
    }

    #[test]
    fn rejects_non_array_roadmap() {
        let raw = serde_json::json!({
            "linkedin_summary": "x",
            "potential_analysis": "y",
            "career_goals_analysis": "z",
            "roadmap": "not-a-sequence"
        })
        .to_string();
        let err = parse_generated_idp(&raw).unwrap_err();
        assert!(matches!(err, ApiError::SchemaValidation(_)));
    }

    #[test]
    fn rejects_out_of_order_semesters() {
        let mut value: serde_json::Value = serde_json::from_str(&sample_idp_json()).unwrap();
        value["roadmap"][1]["semester"] = serde_json::json!(1);
        let err = parse_generated_idp(&value.to_string()).unwrap_err();
        assert!(matches!(err, ApiError::SchemaValidation(_)));
    }

    #[test]
    fn rejects_empty_kpis() {
        let mut value: serde_json::Value = serde_json::from_str(&sample_idp_json()).unwrap();
        value["roadmap"][0]["academic"]["kpis"] = serde_json::json!([]);
        let err = parse_generated_idp(&value.to_string()).unwrap_err();
        assert!(matches!(err, ApiError::SchemaValidation(_)));
    }

    #[test]
    fn serialized_idp_round_trips_through_validation() {
        let idp = parse_generated_idp(&sample_idp_json()).unwrap();
        let reserialized = serde_json::to_string(&idp).unwrap();
        let reparsed = parse_generated_idp(&reserialized).unwrap();
        assert_eq!(reparsed.roadmap.len(), idp.roadmap.len());
    }
}
