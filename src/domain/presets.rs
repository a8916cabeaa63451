use super::{ScenarioInput, ScenarioType};

pub struct Preset {
    pub name: &'static str,
    pub scenario_type: ScenarioType,
    pub scenario: &'static str,
    pub is_demo: bool,
}

impl Preset {
    pub fn to_input(&self) -> ScenarioInput {
        ScenarioInput::new(self.scenario, self.scenario_type)
    }
}

pub const PRESETS: [Preset; 3] = [
    Preset {
        name: "Urban Cooling District",
        scenario_type: ScenarioType::CitiesTransport,
        scenario: "We are planning to redevelop a 5-block, car-centric downtown district into a 'cool island'. The plan involves replacing asphalt with permeable green paving, planting over 200 mature trees, installing green roofs on municipal buildings, and creating a new public park with a water feature. The goal is to reduce the urban heat island effect, improve air quality, and create a more pedestrian-friendly environment. The project is estimated to cost $25 million and will be completed over 3 years.",
        is_demo: true,
    },
    Preset {
        name: "Coastal Wind Farm",
        scenario_type: ScenarioType::EnergyRenewables,
        scenario: "Proposal to construct a 50-turbine offshore wind farm 10 miles off the coast of a major port city. The project aims to generate 200 MW of clean energy, enough to power 150,000 homes. Concerns have been raised about the impact on marine ecosystems, fishing routes, and the visual impact from the shoreline.",
        is_demo: false,
    },
    Preset {
        name: "Factory Water Recycling",
        scenario_type: ScenarioType::WaterDrought,
        scenario: "A large manufacturing plant in a water-scarce region plans to invest in a closed-loop water recycling system. The system would reduce its freshwater intake from the local river by 90%, but it is energy-intensive to operate and produces a concentrated brine waste product that needs disposal.",
        is_demo: false,
    },
];

/// Case-insensitive lookup by preset name.
pub fn find(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
