use crate::models::{DevelopmentArea, GeneratedIdp};

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_list(items: &[String]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        escape_html(&items.join(", "))
    }
}

fn render_kpis(kpis: &[String]) -> String {
    kpis.iter()
        .map(|kpi| format!("<li>{}</li>", escape_html(kpi)))
        .collect()
}

fn render_area(heading: &str, items_label: &str, items: &[String], area: &DevelopmentArea) -> String {
    format!(
        r#"<div class="development-area">
  <h4>{heading}</h4>
  <p><strong>Focus:</strong> {}</p>
  <p><strong>{items_label}:</strong> {}</p>
  <p><strong>KPIs:</strong></p>
  <ul>{}</ul>
</div>"#,
        escape_html(&area.focus),
        render_list(items),
        render_kpis(&area.kpis),
    )
}

/// Renders a validated IDP into the fixed HTML template used for display and
/// downstream PDF export.
pub fn format_idp(idp: &GeneratedIdp) -> String {
    let mut roadmap_html = String::new();
    if idp.roadmap.is_empty() {
        roadmap_html.push_str("<p>No development roadmap is available yet.</p>");
    } else {
        for semester in &idp.roadmap {
            roadmap_html.push_str(&format!(
                r#"<div class="semester-block">
  <h3>Semester {}: {}</h3>
  {}
  {}
</div>"#,
                semester.semester,
                escape_html(&semester.theme),
                render_area("Academic", "Relevant courses", &semester.academic.courses, &semester.academic),
                render_area(
                    "Non-academic",
                    "Development programs",
                    &semester.non_academic.development_programs,
                    &semester.non_academic
                ),
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Individual Development Plan</title>
  <style>
    body {{ font-family: 'Segoe UI', sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 800px; margin: auto; padding: 20px; }}
    h1, h2, h3, h4 {{ color: #004b87; }}
    h1 {{ text-align: center; border-bottom: 2px solid #004b87; padding-bottom: 10px; }}
    .section {{ margin-bottom: 2rem; padding: 1rem; border: 1px solid #e2e8f0; border-radius: 8px; background: #f8fafc; }}
    .semester-block {{ margin-bottom: 1.5rem; padding-left: 1rem; border-left: 3px solid #4299e1; }}
    .development-area {{ margin-top: 1rem; }}
    ul {{ padding-left: 20px; }}
    li {{ margin-bottom: 0.5rem; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>Individual Development Plan</h1>

    <div class="section">
      <h2>Professional Summary (LinkedIn)</h2>
      <p>{}</p>
    </div>

    <div class="section">
      <h2>Potential Analysis</h2>
      <p>{}</p>
    </div>

    <div class="section">
      <h2>Career Goals Analysis</h2>
      <p>{}</p>
    </div>

    <div class="section">
      <h2>8-Semester Development Roadmap</h2>
      {roadmap_html}
    </div>
  </div>
</body>
</html>"#,
        escape_html(&idp.linkedin_summary),
        escape_html(&idp.potential_analysis),
        escape_html(&idp.career_goals_analysis),
    )
}
