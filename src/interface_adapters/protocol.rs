// Wire protocol DTOs and conversions for the public aquarium API.
// Shared by the HTTP handlers and the reqwest client so both sides agree on shape.

use crate::domain::catalog::{Rarity, SpeciesDefinition};
use crate::domain::ledger::CollectionEntry;
use crate::domain::quota::QuotaState;
use crate::domain::tank::{EntitySnapshot, TankBounds};
use crate::use_cases::{CollectionView, DrawResult, TankUpdate};
use serde::{Deserialize, Serialize};

/// Species definition as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDto {
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

impl From<&SpeciesDefinition> for SpeciesDto {
    fn from(species: &SpeciesDefinition) -> Self {
        Self {
            id: species.id.clone(),
            name: species.name.clone(),
            scientific_name: species.scientific_name.clone(),
            rarity: species.rarity,
            description: species.description.clone(),
            habitat: species.habitat.clone(),
            diet: species.diet.clone(),
            points: species.points,
            color: species.color.clone(),
        }
    }
}

// Response payload for a quota lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaResponse {
    pub remaining: u32,
    pub next_reset_at: u64,
}

impl From<QuotaState> for QuotaResponse {
    fn from(state: QuotaState) -> Self {
        Self {
            remaining: state.remaining,
            next_reset_at: state.next_reset_at,
        }
    }
}

// Response payload for a committed draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResponse {
    pub draw_id: String,
    pub species: SpeciesDto,
    pub is_new: bool,
    pub total_points: u64,
    pub remaining: u32,
}

impl From<DrawResult> for DrawResponse {
    fn from(result: DrawResult) -> Self {
        Self {
            draw_id: result.draw_id,
            species: SpeciesDto::from(&result.species),
            is_new: result.is_new,
            total_points: result.total_points,
            remaining: result.remaining,
        }
    }
}

// Response payload for a user's collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub user_id: String,
    pub species_ids: Vec<String>,
    pub entries: Vec<CollectionEntry>,
    pub total_points: u64,
    pub total_species: usize,
}

impl From<CollectionView> for CollectionResponse {
    fn from(view: CollectionView) -> Self {
        Self {
            species_ids: view.species_ids(),
            total_species: view.total_species(),
            user_id: view.user_id,
            entries: view.entries,
            total_points: view.total_points,
        }
    }
}

// Request payload for resizing the tank. Omitting depth gives a flat tank.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResizeRequest {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub depth: Option<f32>,
}

// Request payload for repopulating the tank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PopulateRequest {
    // Stock from this user's collection; default sample when absent.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Messages the server sends to tank viewers over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum TankMessage {
    TankUpdate(TankUpdateDto),
}

/// Tank snapshot for one tick, used by both the WebSocket stream and `GET /tank`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankUpdateDto {
    pub tick: u64,
    pub bounds: BoundsDto,
    pub entities: Vec<EntityStateDto>,
}

impl From<&TankUpdate> for TankUpdateDto {
    fn from(update: &TankUpdate) -> Self {
        Self {
            tick: update.tick,
            bounds: BoundsDto::from(update.bounds),
            entities: update.entities.iter().map(EntityStateDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsDto {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl From<TankBounds> for BoundsDto {
    fn from(bounds: TankBounds) -> Self {
        Self {
            min: bounds.min.to_array(),
            max: bounds.max.to_array(),
        }
    }
}

/// Flattened entity transform for wire transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStateDto {
    pub id: u64,
    pub species_id: String,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub heading: f32,
    pub animation_phase: f32,
    pub size: f32,
}

impl From<&EntitySnapshot> for EntityStateDto {
    fn from(entity: &EntitySnapshot) -> Self {
        Self {
            id: entity.id,
            species_id: entity.species_id.clone(),
            position: entity.position.to_array(),
            velocity: entity.velocity.to_array(),
            heading: entity.heading,
            animation_phase: entity.animation_phase,
            size: entity.size,
        }
    }
}

// Simple error envelope for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    // Present on quota rejections so clients can show a countdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_reset_at: Option<u64>,
}
