use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod presets;

/// ========================================
/// Scenario input
/// ========================================

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioType {
    #[value(name = "energy")]
    #[serde(rename = "Energy & Renewables")]
    EnergyRenewables,
    #[value(name = "water")]
    #[serde(rename = "Water & Drought")]
    WaterDrought,
    #[default]
    #[value(name = "cities")]
    #[serde(rename = "Cities & Transport")]
    CitiesTransport,
    #[value(name = "buildings")]
    #[serde(rename = "Buildings & Cooling")]
    BuildingsCooling,
    #[value(name = "waste")]
    #[serde(rename = "Waste & Materials")]
    WasteMaterials,
    #[value(name = "other")]
    #[serde(rename = "Other")]
    Other,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 6] = [
        ScenarioType::EnergyRenewables,
        ScenarioType::WaterDrought,
        ScenarioType::CitiesTransport,
        ScenarioType::BuildingsCooling,
        ScenarioType::WasteMaterials,
        ScenarioType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioType::EnergyRenewables => "Energy & Renewables",
            ScenarioType::WaterDrought => "Water & Drought",
            ScenarioType::CitiesTransport => "Cities & Transport",
            ScenarioType::BuildingsCooling => "Buildings & Cooling",
            ScenarioType::WasteMaterials => "Waste & Materials",
            ScenarioType::Other => "Other",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw image bytes attached to a scenario. Sent inline to the model, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ImageAttachment {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self { bytes, mime_type: mime_type.into(), file_name: None }
    }

    /// Guess the MIME type from a file extension; falls back to octet-stream.
    pub fn mime_for_path(path: &str) -> &'static str {
        let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "heic" => "image/heic",
            _ => "application/octet-stream",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioInput {
    pub text: String,
    pub scenario_type: ScenarioType,
    pub image: Option<ImageAttachment>,
}

impl ScenarioInput {
    pub fn new(text: impl Into<String>, scenario_type: ScenarioType) -> Self {
        Self { text: text.into(), scenario_type, image: None }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// ========================================
/// Council result
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    ClimateScientist,
    CarbonFootprintAnalyst,
    BiodiversityEcologist,
    CommunityRepresentative,
    UrbanPlanner,
    BusinessStrategyLead,
    PublicFinanceMinister,
}

impl PersonaId {
    pub const ALL: [PersonaId; 7] = [
        PersonaId::ClimateScientist,
        PersonaId::CarbonFootprintAnalyst,
        PersonaId::BiodiversityEcologist,
        PersonaId::CommunityRepresentative,
        PersonaId::UrbanPlanner,
        PersonaId::BusinessStrategyLead,
        PersonaId::PublicFinanceMinister,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaId::ClimateScientist => "climate_scientist",
            PersonaId::CarbonFootprintAnalyst => "carbon_footprint_analyst",
            PersonaId::BiodiversityEcologist => "biodiversity_ecologist",
            PersonaId::CommunityRepresentative => "community_representative",
            PersonaId::UrbanPlanner => "urban_planner",
            PersonaId::BusinessStrategyLead => "business_strategy_lead",
            PersonaId::PublicFinanceMinister => "public_finance_minister",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PersonaId::ClimateScientist => "Climate Scientist",
            PersonaId::CarbonFootprintAnalyst => "Carbon Footprint Analyst",
            PersonaId::BiodiversityEcologist => "Biodiversity Ecologist",
            PersonaId::CommunityRepresentative => "Community Representative",
            PersonaId::UrbanPlanner => "Urban Planner / Infrastructure Engineer",
            PersonaId::BusinessStrategyLead => "Business Strategy / CSR Lead",
            PersonaId::PublicFinanceMinister => "Public Finance Minister / Budget Officer",
        }
    }

    /// What the persona argues about during the debate.
    pub fn focus(&self) -> &'static str {
        match self {
            PersonaId::ClimateScientist => "greenhouse gas emissions, climate change risks, alignment with carbon budgets, and long-term climate resilience",
            PersonaId::CarbonFootprintAnalyst => "quantifying impact in tonnes of CO2 equivalent (tCO2e), identifying primary emission drivers, and suggesting specific reduction levers",
            PersonaId::BiodiversityEcologist => "impacts on local ecosystems, habitats, and species; nature-based solutions and biodiversity net gain",
            PersonaId::CommunityRepresentative => "social equity, public health, cultural heritage, livelihoods, and just transitions for affected communities",
            PersonaId::UrbanPlanner => "technical feasibility, integration with existing systems, safety, regulatory compliance, and long-term operational viability",
            PersonaId::BusinessStrategyLead => "brand reputation, ESG ratings, stakeholder relations, and long-term value creation",
            PersonaId::PublicFinanceMinister => "public budgets, funding mechanisms, return on investment, and fiscal risks or liabilities",
        }
    }

    /// One-line description used by the chatbot and the presets listing.
    pub fn short_description(&self) -> &'static str {
        match self {
            PersonaId::ClimateScientist => "Cares about emissions, climate risk, carbon budgets.",
            PersonaId::CarbonFootprintAnalyst => {
                "Cares about tonnes CO2e, emission drivers, reduction levers."
            }
            PersonaId::BiodiversityEcologist => {
                "Cares about habitats, species, nature-based solutions."
            }
            PersonaId::CommunityRepresentative => {
                "Cares about livelihoods, equity, culture, health."
            }
            PersonaId::UrbanPlanner => "Cares about feasibility, safety, integration.",
            PersonaId::BusinessStrategyLead => "Cares about brand, ESG, long-term value.",
            PersonaId::PublicFinanceMinister => "Cares about public budgets and fiscal risk.",
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub title: String,
    pub primary_concerns: Vec<String>,
    pub statement: String,
}

/// Ordered impact scale used by every CSR dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Low, Rating::Medium, Rating::High, Rating::VeryHigh];
    pub const MAX_VALUE: u8 = 4;

    pub fn value(&self) -> u8 {
        match self {
            Rating::Low => 1,
            Rating::Medium => 2,
            Rating::High => 3,
            Rating::VeryHigh => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Low => "Low",
            Rating::Medium => "Medium",
            Rating::High => "High",
            Rating::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrAssessmentItem {
    pub rating: Rating,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrAssessment {
    pub environmental: CsrAssessmentItem,
    pub social: CsrAssessmentItem,
    pub governance_economic: CsrAssessmentItem,
}

impl CsrAssessment {
    /// Dimensions in display order with their headings.
    pub fn dimensions(&self) -> [(&'static str, &CsrAssessmentItem); 3] {
        [
            ("Environmental", &self.environmental),
            ("Social", &self.social),
            ("Governance / Economic", &self.governance_economic),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSummary {
    pub option_name: String,
    pub description: String,
    pub csr_implications: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsAndRecommendation {
    pub option_summaries: Vec<OptionSummary>,
    pub recommended_option: String,
}

impl OptionsAndRecommendation {
    /// The option named by `recommended_option`. Exact match first, then a
    /// trimmed case-insensitive match. `None` when the model named an option
    /// it never listed.
    pub fn recommended(&self) -> Option<&OptionSummary> {
        let wanted = self.recommended_option.as_str();
        self.option_summaries
            .iter()
            .find(|o| o.option_name == wanted)
            .or_else(|| {
                let wanted = wanted.trim();
                self.option_summaries
                    .iter()
                    .find(|o| o.option_name.trim().eq_ignore_ascii_case(wanted))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilResult {
    pub scenario_summary: String,
    pub assumptions: Vec<String>,
    pub personas: Vec<Persona>,
    pub csr_assessment: CsrAssessment,
    pub options_and_recommendation: OptionsAndRecommendation,
}

/// ========================================
/// Derived artifacts
/// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub suggested_changes: Vec<String>,
    pub impact_shift_comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleExplanation {
    pub summary_paragraphs: Vec<String>,
    pub guidance: String,
}

/// ========================================
/// Chat
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into(), sent_at: Utc::now() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { sender: Sender::Assistant, text: text.into(), sent_at: Utc::now() }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn council_result_round_trips_field_for_field() {
        let original: Value = serde_json::from_str(fixtures::COUNCIL_JSON).unwrap();
        let parsed: CouncilResult = serde_json::from_value(original.clone()).unwrap();
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(original, back);
    }

    #[test]
    fn unknown_persona_id_is_rejected() {
        let raw = fixtures::COUNCIL_JSON.replace("climate_scientist", "astrologer");
        assert!(serde_json::from_str::<CouncilResult>(&raw).is_err());
    }

    #[test]
    fn rating_scale_is_ordered() {
        assert!(Rating::Low < Rating::Medium);
        assert!(Rating::High < Rating::VeryHigh);
        assert_eq!(serde_json::to_string(&Rating::VeryHigh).unwrap(), "\"Very High\"");
    }

    #[test]
    fn recommended_matches_exact_then_loose() {
        let mut result = fixtures::council_result();
        let opts = &result.options_and_recommendation;
        assert_eq!(opts.recommended().unwrap().description, "Full redevelopment in one phase.");

        result.options_and_recommendation.recommended_option = "  option b ".into();
        let rec = result.options_and_recommendation.recommended().unwrap();
        assert_eq!(rec.option_name, "Option B");

        result.options_and_recommendation.recommended_option = "Option C".into();
        assert!(result.options_and_recommendation.recommended().is_none());
    }

    #[test]
    fn scenario_type_labels_and_default() {
        assert_eq!(ScenarioType::default(), ScenarioType::CitiesTransport);
        assert_eq!(ScenarioType::WaterDrought.to_string(), "Water & Drought");
        assert_eq!(ScenarioType::ALL.len(), 6);
    }

    #[test]
    fn blank_input_detection() {
        assert!(ScenarioInput::new("   \n\t", ScenarioType::Other).is_blank());
        assert!(!ScenarioInput::new("solar farm", ScenarioType::Other).is_blank());
    }

    #[test]
    fn mime_guess_from_extension() {
        assert_eq!(ImageAttachment::mime_for_path("site.JPG"), "image/jpeg");
        assert_eq!(ImageAttachment::mime_for_path("site.png"), "image/png");
        assert_eq!(ImageAttachment::mime_for_path("notes"), "application/octet-stream");
    }
}
