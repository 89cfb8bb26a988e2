// Species registry shared by the reward engine and the tank simulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Rarity tier of a species. Drives both draw odds and point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl Rarity {
    /// All tiers from most to least frequent.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythical,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythical => "mythical",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable definition of a collectible creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub rarity: Rarity,
    pub description: String,
    pub habitat: String,
    pub diet: String,
    pub points: u32,
    pub color: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog contains no species")]
    Empty,
    #[error("duplicate species id `{0}`")]
    DuplicateId(String),
    #[error("species at position {0} has a blank id or name")]
    BlankField(usize),
    #[error("species `{0}` must award a positive number of points")]
    ZeroPoints(String),
    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

/// Read-only registry of species, indexed by id and by tier.
#[derive(Debug)]
pub struct SpeciesCatalog {
    species: Vec<SpeciesDefinition>,
    by_id: HashMap<String, usize>,
    by_tier: [Vec<usize>; 5],
}

impl SpeciesCatalog {
    pub fn new(species: Vec<SpeciesDefinition>) -> Result<Self, CatalogError> {
        if species.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(species.len());
        let mut by_tier: [Vec<usize>; 5] = Default::default();

        for (index, definition) in species.iter().enumerate() {
            if definition.id.trim().is_empty() || definition.name.trim().is_empty() {
                return Err(CatalogError::BlankField(index));
            }
            if definition.points == 0 {
                return Err(CatalogError::ZeroPoints(definition.id.clone()));
            }
            if by_id.insert(definition.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(definition.id.clone()));
            }
            by_tier[definition.rarity.index()].push(index);
        }

        Ok(Self {
            species,
            by_id,
            by_tier,
        })
    }

    /// Parses a JSON array of species definitions.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let species: Vec<SpeciesDefinition> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(species)
    }

    /// The catalog shipped with the server.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_species())
    }

    pub fn get(&self, id: &str) -> Option<&SpeciesDefinition> {
        self.by_id.get(id).map(|&index| &self.species[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn all(&self) -> &[SpeciesDefinition] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn tier_len(&self, rarity: Rarity) -> usize {
        self.by_tier[rarity.index()].len()
    }

    pub fn tier(&self, rarity: Rarity) -> impl Iterator<Item = &SpeciesDefinition> {
        self.by_tier[rarity.index()]
            .iter()
            .map(|&index| &self.species[index])
    }

    /// Picks uniformly within `rarity` using `unit` in [0, 1).
    pub fn pick_in_tier(&self, rarity: Rarity, unit: f64) -> Option<&SpeciesDefinition> {
        let members = &self.by_tier[rarity.index()];
        if members.is_empty() {
            return None;
        }

        let slot = (unit.clamp(0.0, 1.0) * members.len() as f64) as usize;
        let index = members[slot.min(members.len() - 1)];
        Some(&self.species[index])
    }
}

#[allow(clippy::too_many_arguments)]
fn species(
    id: &str,
    name: &str,
    scientific_name: &str,
    rarity: Rarity,
    points: u32,
    color: &str,
    description: &str,
    habitat: &str,
    diet: &str,
) -> SpeciesDefinition {
    SpeciesDefinition {
        id: id.to_string(),
        name: name.to_string(),
        scientific_name: scientific_name.to_string(),
        rarity,
        description: description.to_string(),
        habitat: habitat.to_string(),
        diet: diet.to_string(),
        points,
        color: color.to_string(),
    }
}

fn builtin_species() -> Vec<SpeciesDefinition> {
    use Rarity::*;

    vec![
        species(
            "1",
            "Clownfish",
            "Amphiprioninae",
            Common,
            10,
            "#FF8C42",
            "Bright orange fish with white bands, known for living among sea anemones.",
            "Pacific coral reefs",
            "Algae, plankton, small crustaceans",
        ),
        species(
            "2",
            "Blue Tang",
            "Paracanthurus hepatus",
            Common,
            10,
            "#4A90E2",
            "Blue fish with a black pattern and a yellow tail. Active and friendly.",
            "Indo-Pacific",
            "Plankton and algae",
        ),
        species(
            "3",
            "Yellow Tang",
            "Zebrasoma flavescens",
            Common,
            10,
            "#FFD700",
            "Bright yellow fish with a flat body. A tank favourite.",
            "Hawaiian islands",
            "Algae",
        ),
        species(
            "4",
            "Royal Gramma",
            "Gramma loreto",
            Common,
            10,
            "#9B59B6",
            "Purple and yellow fish that likes to hide in caves.",
            "Caribbean Sea",
            "Small crustaceans and plankton",
        ),
        species(
            "5",
            "Mandarinfish",
            "Synchiropus splendidus",
            Rare,
            25,
            "#00CED1",
            "One of the most colourful fish, patterned in blue, orange and green.",
            "Pacific coral reefs",
            "Copepods and small invertebrates",
        ),
        species(
            "6",
            "Flame Angelfish",
            "Centropyge loricula",
            Rare,
            25,
            "#E74C3C",
            "Bright red with black vertical bars. Territorial.",
            "Hawaii and the Marshall Islands",
            "Algae and detritus",
        ),
        species(
            "7",
            "Neon Tetra",
            "Paracheirodon innesi",
            Rare,
            25,
            "#00BFFF",
            "Small fish with a neon blue stripe along its body.",
            "Amazon rivers",
            "Small insects and plankton",
        ),
        species(
            "8",
            "Discus",
            "Symphysodon",
            Rare,
            25,
            "#FF6B9D",
            "Round, flat fish with vivid patterns. Called the king of the aquarium.",
            "Amazon basin",
            "Worms, crustaceans, plants",
        ),
        species(
            "9",
            "Emperor Angelfish",
            "Pomacanthus imperator",
            Epic,
            50,
            "#3498DB",
            "Majestic fish with blue and yellow horizontal stripes.",
            "Indo-Pacific reefs",
            "Sponges, tunicates, algae",
        ),
        species(
            "10",
            "Moorish Idol",
            "Zanclus cornutus",
            Epic,
            50,
            "#F4D03F",
            "Elegant fish with a long dorsal fin and black, yellow and white bands.",
            "Indo-Pacific",
            "Sponges and small invertebrates",
        ),
        species(
            "11",
            "Lemonpeel Angelfish",
            "Centropyge flavissima",
            Epic,
            50,
            "#FF4500",
            "Saturated red-orange colouring with black markings.",
            "Hawaiian and Mariana islands",
            "Algae and detritus",
        ),
        species(
            "12",
            "Foxface Rabbitfish",
            "Siganus vulpinus",
            Epic,
            50,
            "#FFD700",
            "Yellow fish with an unusual elongated snout.",
            "Western Pacific",
            "Algae",
        ),
        species(
            "13",
            "Humphead Wrasse",
            "Cheilinus undulatus",
            Legendary,
            100,
            "#2ECC71",
            "Massive fish with a prominent forehead. Can live for 30 years.",
            "Indo-Pacific coral reefs",
            "Molluscs, fish, sea urchins",
        ),
        species(
            "14",
            "Bluespine Unicornfish",
            "Naso unicornis",
            Legendary,
            100,
            "#5DADE2",
            "Large fish with a distinctive horn on its forehead.",
            "Indo-Pacific waters",
            "Brown algae",
        ),
        species(
            "15",
            "Spotted Eagle Ray",
            "Aetobatus narinari",
            Legendary,
            100,
            "#8E44AD",
            "Graceful spotted ray that flies through the water.",
            "Tropical waters worldwide",
            "Molluscs and crustaceans",
        ),
        species(
            "16",
            "Stonefish",
            "Synanceia verrucosa",
            Mythical,
            250,
            "#7D3C98",
            "The most venomous fish in the world. A master of camouflage.",
            "Indo-Pacific coral reefs",
            "Small fish and crustaceans",
        ),
        species(
            "17",
            "Dragon Moray",
            "Enchelycore pardalis",
            Mythical,
            250,
            "#C0392B",
            "Rare moray with a unique spotted pattern and elongated jaws.",
            "Deep Pacific reefs",
            "Fish and octopus",
        ),
        species(
            "18",
            "Opah",
            "Lampris guttatus",
            Mythical,
            250,
            "#E74C3C",
            "Warm-blooded round fish with iridescent colouring. Extremely rare.",
            "Open ocean, deep water",
            "Squid and small fish",
        ),
    ]
}
