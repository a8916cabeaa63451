use crate::domain::{CouncilResult, PersonaId, ScenarioType};

/// Wrap user text in a run of double quotes, at least three long and longer
/// than any run inside the text, so the text goes in unchanged and cannot
/// close the block early.
pub fn quote_user_text(text: &str) -> String {
    let longest = text.split(|c: char| c != '"').map(str::len).max().unwrap_or(0);
    let fence = "\"".repeat(longest.max(2) + 1);
    format!("{fence}\n{text}\n{fence}")
}

fn persona_roster() -> String {
    PersonaId::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}.  **{}**: Focuses on {}. ID: \"{}\".",
                i + 1,
                p.title(),
                p.focus(),
                p.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn council_system_instruction() -> String {
    format!(r#"You are the facilitator of the "Sustainability Council", a panel of expert personas designed to analyze complex sustainability decisions. Your role is to receive a user's scenario, guide the council's debate, and structure their collective insights into a comprehensive CSR (Corporate Social Responsibility) assessment.

THE COUNCIL PERSONAS:
{roster}

YOUR TASK:
Given the user's scenario, you must moderate a simulated debate among these personas and then synthesize the outcome into a single, valid JSON object that strictly adheres to the provided schema. Each persona must provide a statement reflecting their unique perspective. Use only the persona IDs listed above. The "recommended_option" must repeat the "option_name" of one of the listed options exactly. The final output must be a JSON object and nothing else."#,
        roster = persona_roster()
    )
}

pub fn coach_system_instruction() -> String {
    let focuses = PersonaId::ALL
        .iter()
        .map(|p| format!("  - {}: {}", p.title(), p.short_description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(r#"You are a helpful "CSR Coach" chatbot for the "Sustainability Council" application. Your purpose is to help users understand the app and general sustainability concepts.

Your knowledge base includes:
- How to write a good scenario: Advise users to be specific about location, scale, timeframe, budget, and affected communities.
- What ESG/CSR means: Explain Environmental (impact on planet), Social (impact on people), and Governance/Economic (how it's managed, financial viability).
- Persona focuses:
{focuses}
- General tasks: You can help summarize results into bullet points for presentations or explain concepts.

Guidelines:
- Be friendly, concise, and encouraging.
- Do NOT answer questions outside of sustainability, CSR, or how to use this application.
- Do NOT invent new council results or run a new debate. You are a coach, not the council itself.
- Keep answers short and to the point."#)
}

pub fn build_debate_prompt(
    scenario: &str,
    scenario_type: ScenarioType,
    image_description: Option<&str>,
) -> String {
    let mut out = format!(
        "User Scenario Type: {}\nUser Scenario Description:\n{}\n",
        quote_user_text(scenario_type.label()),
        quote_user_text(scenario),
    );
    if let Some(desc) = image_description.filter(|d| !d.trim().is_empty()) {
        out.push_str(&format!("\nImage Context:\n{}\n", quote_user_text(desc)));
    }
    out.push_str("\nPlease analyze this scenario and provide the full CSR assessment as a JSON object.");
    out
}

pub fn build_coach_prompt(scenario: &str) -> String {
    format!(r#"A user is writing a sustainability scenario. Here is their draft:
{draft}

Your task is to act as a "Scenario Coach". In 1-2 short sentences, suggest one or two key pieces of information they could add to make the scenario more specific and easier for an expert panel to analyze. Focus on common omissions like timeframe, budget, scale, or specific location. Be encouraging and concise."#,
        draft = quote_user_text(scenario)
    )
}

pub fn build_image_prompt() -> &'static str {
    "Briefly describe this image in the context of a sustainability project site. What are the key environmental or man-made features visible?"
}

fn assessment_json(result: &CouncilResult) -> String {
    // Plain structs with string keys only, so this cannot fail.
    serde_json::to_string(result).unwrap_or_default()
}

pub fn build_improve_prompt(result: &CouncilResult) -> String {
    format!(r#"Based on the following sustainability council assessment, generate concrete suggestions to improve the original plan.

Assessment Data: {data}

Your task is to return a JSON object with two keys:
1. "suggested_changes": An array of strings, where each string is a specific, actionable change to the project to improve its CSR profile.
2. "impact_shift_comment": A short string commenting on how these changes might positively shift the Environmental, Social, and Governance ratings.

Example output: {{ "suggested_changes": ["Incorporate permeable paving...", "Establish a community benefit fund..."], "impact_shift_comment": "These changes would likely improve the Social rating to 'High' and mitigate some Environmental concerns." }}"#,
        data = assessment_json(result)
    )
}

pub fn build_explain_prompt(result: &CouncilResult) -> String {
    format!(r#"Translate the following complex CSR assessment into simple, plain language.

Assessment Data: {data}

Your task is to return a JSON object with two keys:
1. "summary_paragraphs": An array of 3-4 strings, where each string is a paragraph summarizing the key findings in an easy-to-understand way.
2. "guidance": A short paragraph starting with "If you are a..." that gives tailored advice for a key stakeholder (e.g., a mayor, CEO, or citizen).

Example output: {{ "summary_paragraphs": ["In simple terms, the project is good for...", "However, the experts are concerned about..."], "guidance": "If you are the mayor, your main takeaway should be to focus on community engagement before proceeding." }}"#,
        data = assessment_json(result)
    )
}

pub fn build_report_prompt(result: &CouncilResult) -> String {
    format!(r#"Based on the provided CSR assessment data in JSON format, generate a plain text report. The report must follow the exact section titles, order, and content guidelines below. Output only the plain text of the report, with no extra formatting like Markdown or JSON.

Assessment Data: {data}

---

Report Generation Instructions:

Title Line: Start with "Sustainability Council Report: " followed by a short, descriptive title derived from the scenario_summary.

Section 1: Use the exact title "1. Scenario overview". Write 3-5 sentences summarizing the project, using information from 'scenario_summary' and 'assumptions'.

Section 2: Use the exact title "2. Key perspectives from the council". Write 3-6 one-sentence lines. Each line must start with the persona's 'title' and a colon (e.g., "Climate Scientist: ..."), summarizing their 'statement'.

Section 3: Use the exact title "3. CSR assessment (Environmental, Social, Governance/Economic)". Write a short paragraph summarizing the 'rating' and 'key_points' from the 'csr_assessment' object for all three categories.

Section 4: Use the exact title "4. Options considered". For each option in 'options_and_recommendation.option_summaries', write 2-3 sentences describing it.

Section 5: Use the exact title "5. Recommended option and next steps". Write 3-5 sentences identifying the 'recommended_option', explaining the choice, and suggesting clear next steps."#,
        data = assessment_json(result)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::council_result;

    #[test]
    fn debate_prompt_embeds_inputs_verbatim() {
        let scenario = "Build a 40 MW solar farm on former farmland near Valencia, budget €30M.";
        let p = build_debate_prompt(
            scenario,
            ScenarioType::EnergyRenewables,
            Some("Flat dry fields, a river to the east."),
        );
        assert!(p.contains(scenario));
        assert!(p.contains("Energy & Renewables"));
        assert!(p.contains("Flat dry fields, a river to the east."));
    }

    #[test]
    fn debate_prompt_omits_image_section_without_description() {
        let p = build_debate_prompt("A wind farm", ScenarioType::Other, None);
        assert!(!p.contains("Image Context"));
        let p = build_debate_prompt("A wind farm", ScenarioType::Other, Some("   "));
        assert!(!p.contains("Image Context"));
    }

    #[test]
    fn user_text_cannot_close_the_quote_block() {
        let q = quote_user_text("before \"\"\" after");
        assert!(q.starts_with("\"\"\"\"\n"));
        assert!(q.ends_with("\n\"\"\"\""));
        assert!(q.contains("before \"\"\" after"));
        assert_eq!(quote_user_text("plain"), "\"\"\"\nplain\n\"\"\"");
    }

    #[test]
    fn debate_prompt_keeps_quote_heavy_inputs_verbatim() {
        let inputs = [
            r#"Rename the park to """Green Heart""" and plant trees."#,
            r#"Four quotes """" in a row"#,
            r#"Ends with a quote""#,
            "Line one\nLine \"two\"\n\n\"\"\"",
        ];
        for text in inputs {
            let p = build_debate_prompt(text, ScenarioType::Other, Some(text));
            assert_eq!(p.matches(text).count(), 2, "{text:?} not kept in {p}");
            assert!(build_coach_prompt(text).contains(text));
        }
        let p = build_debate_prompt(inputs[0], ScenarioType::WasteMaterials, Some(inputs[1]));
        assert!(p.contains(inputs[0]));
        assert!(p.contains(inputs[1]));
        assert!(p.contains(ScenarioType::WasteMaterials.label()));
    }

    #[test]
    fn system_instruction_lists_all_personas() {
        let s = council_system_instruction();
        for p in PersonaId::ALL {
            assert!(s.contains(p.as_str()), "missing {p}");
            assert!(s.contains(p.title()));
        }
    }

    #[test]
    fn tool_prompts_carry_the_full_assessment() {
        let r = council_result();
        let json = serde_json::to_string(&r).unwrap();
        assert!(build_improve_prompt(&r).contains(&json));
        assert!(build_explain_prompt(&r).contains(&json));
        assert!(build_report_prompt(&r).contains(&json));
    }

    #[test]
    fn coach_prompt_quotes_draft() {
        let p = build_coach_prompt("Plant trees downtown");
        assert!(p.contains("\"\"\"\nPlant trees downtown\n\"\"\""));
    }
}
