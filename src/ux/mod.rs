use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::presets::PRESETS;
use crate::domain::{
    ChatMessage, CouncilResult, ImprovementSuggestion, OptionsAndRecommendation, Persona, Sender,
    SimpleExplanation,
};
use crate::radar::Radar;

const BAR_WIDTH: usize = 20;

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// Read one line from stdin; `None` on EOF.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(&['\r', '\n'][..]).to_string()),
    }
}

fn heading(title: &str) {
    println!("\n{}", format!("=== {} ===", title).bold());
}

fn render_persona(p: &Persona) -> String {
    let tags = p
        .primary_concerns
        .iter()
        .map(|c| format!("[{}]", c))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\n  {}\n  {}", p.title.green().bold(), tags.dimmed(), p.statement)
}

fn bar(radius: f64) -> String {
    let filled = ((radius / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)))
}

pub fn render_radar(radar: &Radar) -> String {
    [
        ("E", radar.environmental),
        ("S", radar.social),
        ("G", radar.governance_economic),
    ]
    .iter()
    .map(|(label, r)| format!("  {} |{}| {:>3.0}", label.bold(), bar(*r).green(), r))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Option list plus the recommendation. A recommendation that names no
/// listed option is shown as-is with a note.
pub fn render_recommendation(opts: &OptionsAndRecommendation) -> String {
    let mut out = String::new();
    for o in &opts.option_summaries {
        out.push_str(&format!(
            "{}\n  {}\n  {} {}\n",
            o.option_name.bold(),
            o.description,
            "CSR implications:".dimmed(),
            o.csr_implications
        ));
    }
    let badge = "RECOMMENDED".black().on_green().bold();
    match opts.recommended() {
        Some(rec) => out.push_str(&format!(
            "\n{} {}\n  {}",
            badge,
            rec.option_name.bold(),
            rec.description
        )),
        None => out.push_str(&format!(
            "\n{} {}\n  {}",
            badge,
            opts.recommended_option.bold(),
            "(not among the options listed above)".yellow()
        )),
    }
    out
}

pub fn render_session_banner(user: &str, session: Uuid, image: Option<&str>) -> String {
    let mut out = format!(
        "{} {}  {}",
        "Council session for".bold(),
        user.green(),
        session.to_string().dimmed()
    );
    if let Some(name) = image {
        out.push_str(&format!("\n  {} {}", "Site image:".dimmed(), name));
    }
    out
}

pub fn show_session_banner(user: &str, session: Uuid, image: Option<&str>) {
    println!("{}", render_session_banner(user, session, image));
}

pub fn show_result(result: &CouncilResult) {
    heading("Scenario Summary");
    println!("{}", result.scenario_summary);
    if !result.assumptions.is_empty() {
        println!("\n{}", "Key Assumptions Made by the Council:".bold());
        for a in &result.assumptions {
            println!("  - {}", a.yellow());
        }
    }

    heading("Council Perspectives");
    for p in &result.personas {
        println!("{}\n", render_persona(p));
    }

    heading("CSR Assessment");
    for (name, item) in result.csr_assessment.dimensions() {
        println!("{}  {}", name.bold(), format!("{} Impact", item.rating).green());
        for point in &item.key_points {
            println!("  - {}", point);
        }
    }

    heading("Impact Radar");
    println!("{}", render_radar(&Radar::from_assessment(&result.csr_assessment)));

    heading("Options & Recommendation");
    println!("{}", render_recommendation(&result.options_and_recommendation));
    println!();
}

pub fn show_improvement(s: &ImprovementSuggestion) {
    heading("Improvement Suggestions");
    for c in &s.suggested_changes {
        println!("  - {}", c);
    }
    println!("\n{}", s.impact_shift_comment.italic());
}

pub fn show_explanation(e: &SimpleExplanation) {
    heading("Simple Explanation");
    for p in &e.summary_paragraphs {
        println!("{}\n", p);
    }
    println!("{}", e.guidance.cyan());
}

pub fn show_report(report: &str) {
    heading("One-Page Report");
    println!("{}", report);
}

pub fn show_error(msg: &str) {
    println!("\n{}\n{}", "An Error Occurred".red().bold(), msg.red());
}

pub fn show_finish_overlay() {
    println!(
        "\n{}\n{}",
        "Session complete".green().bold(),
        "Thanks for consulting the Sustainability Council. Start a new session any time."
    );
}

pub fn show_presets() {
    heading("Preset Scenarios");
    for p in PRESETS.iter() {
        let demo = if p.is_demo {
            " (recommended demo)".yellow().to_string()
        } else {
            String::new()
        };
        println!("{}{}  {}", p.name.bold(), demo, p.scenario_type.to_string().dimmed());
    }
}

pub fn show_chat_message(m: &ChatMessage) {
    match m.sender {
        Sender::User => println!("{} {}", "you>".blue().bold(), m.text),
        Sender::Assistant => println!("{} {}", "coach>".green().bold(), m.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::council_result;

    #[test]
    fn recommendation_references_matching_option_description() {
        colored::control::set_override(false);
        let result = council_result();
        let rendered = render_recommendation(&result.options_and_recommendation);
        let tail = rendered.split("RECOMMENDED").nth(1).unwrap();
        assert!(tail.contains("Option A"));
        assert!(tail.contains("Full redevelopment in one phase."));
        assert!(!tail.contains("not among"));
    }

    #[test]
    fn unmatched_recommendation_is_flagged() {
        colored::control::set_override(false);
        let mut result = council_result();
        result.options_and_recommendation.recommended_option = "Option Z".into();
        let rendered = render_recommendation(&result.options_and_recommendation);
        let tail = rendered.split("RECOMMENDED").nth(1).unwrap();
        assert!(tail.contains("Option Z"));
        assert!(tail.contains("not among the options listed above"));
    }

    #[test]
    fn session_banner_names_user_and_image() {
        colored::control::set_override(false);
        let id = Uuid::new_v4();
        let banner = render_session_banner("Ada", id, Some("site.png"));
        assert!(banner.contains("Ada"));
        assert!(banner.contains(&id.to_string()));
        assert!(banner.contains("Site image: site.png"));
        assert!(!render_session_banner("Ada", id, None).contains("Site image"));
    }

    #[test]
    fn radar_bars_scale_with_rating() {
        assert_eq!(bar(25.0), format!("{}{}", "#".repeat(5), ".".repeat(15)));
        assert_eq!(bar(100.0), "#".repeat(BAR_WIDTH));
    }
}
