use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::CityId;

/// Top-level administrative region (FBiH, RS, Brčko Distrikt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// Intermediate subdivision that exists inside a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canton {
    pub id: String,
    pub entity_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub entity_id: String,
    pub canton_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("duplicate location identifier '{0}'")]
    Duplicate(String),
    #[error("{kind} '{id}' references unknown entity '{entity_id}'")]
    UnknownEntity {
        kind: &'static str,
        id: String,
        entity_id: String,
    },
    #[error("city '{city_id}' references unknown canton '{canton_id}'")]
    UnknownCanton { city_id: String, canton_id: String },
    #[error("city '{city_id}' sits in canton '{canton_id}' of another entity")]
    CantonOutsideEntity { city_id: String, canton_id: String },
}

/// Validated Entity → Canton → City tree.
#[derive(Debug, Clone, Default)]
pub struct LocationHierarchy {
    entities: Vec<Entity>,
    cantons: BTreeMap<String, Canton>,
    cities: BTreeMap<CityId, City>,
}

impl LocationHierarchy {
    pub fn new(
        entities: Vec<Entity>,
        cantons: Vec<Canton>,
        cities: Vec<City>,
    ) -> Result<Self, LocationError> {
        let mut entity_ids = BTreeSet::new();
        for entity in &entities {
            if !entity_ids.insert(entity.id.clone()) {
                return Err(LocationError::Duplicate(entity.id.clone()));
            }
        }

        let mut canton_map = BTreeMap::new();
        for canton in cantons {
            if !entity_ids.contains(&canton.entity_id) {
                return Err(LocationError::UnknownEntity {
                    kind: "canton",
                    id: canton.id,
                    entity_id: canton.entity_id,
                });
            }
            if canton_map.contains_key(&canton.id) {
                return Err(LocationError::Duplicate(canton.id));
            }
            canton_map.insert(canton.id.clone(), canton);
        }

        let mut city_map = BTreeMap::new();
        for city in cities {
            if !entity_ids.contains(&city.entity_id) {
                return Err(LocationError::UnknownEntity {
                    kind: "city",
                    id: city.id.0,
                    entity_id: city.entity_id,
                });
            }
            if let Some(canton_id) = &city.canton_id {
                let canton =
                    canton_map
                        .get(canton_id)
                        .ok_or_else(|| LocationError::UnknownCanton {
                            city_id: city.id.0.clone(),
                            canton_id: canton_id.clone(),
                        })?;
                if canton.entity_id != city.entity_id {
                    return Err(LocationError::CantonOutsideEntity {
                        city_id: city.id.0.clone(),
                        canton_id: canton_id.clone(),
                    });
                }
            }
            if city_map.contains_key(&city.id) {
                return Err(LocationError::Duplicate(city.id.0));
            }
            city_map.insert(city.id.clone(), city);
        }

        Ok(Self {
            entities,
            cantons: canton_map,
            cities: city_map,
        })
    }

    pub fn entity_by_code(&self, code: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.code.eq_ignore_ascii_case(code.trim()))
    }

    /// City identifiers inside the entity with the given code; `None` when the code is unknown.
    pub fn cities_for_entity(&self, code: &str) -> Option<BTreeSet<CityId>> {
        let entity = self.entity_by_code(code)?;
        Some(
            self.cities
                .values()
                .filter(|city| city.entity_id == entity.id)
                .map(|city| city.id.clone())
                .collect(),
        )
    }

    pub fn city(&self, id: &CityId) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn contains_city(&self, id: &CityId) -> bool {
        self.cities.contains_key(id)
    }

    pub fn entity_of_city(&self, id: &CityId) -> Option<&Entity> {
        let city = self.cities.get(id)?;
        self.entities
            .iter()
            .find(|entity| entity.id == city.entity_id)
    }

    /// Nested view used to populate location pickers.
    pub fn tree(&self) -> Vec<EntityView> {
        self.entities
            .iter()
            .map(|entity| {
                let cantons = self
                    .cantons
                    .values()
                    .filter(|canton| canton.entity_id == entity.id)
                    .map(|canton| CantonView {
                        id: canton.id.clone(),
                        name: canton.name.clone(),
                        cities: self.city_views(|city| {
                            city.canton_id.as_deref() == Some(canton.id.as_str())
                        }),
                    })
                    .collect();
                EntityView {
                    id: entity.id.clone(),
                    code: entity.code.clone(),
                    name: entity.name.clone(),
                    cantons,
                    cities: self.city_views(|city| {
                        city.entity_id == entity.id && city.canton_id.is_none()
                    }),
                }
            })
            .collect()
    }

    fn city_views(&self, include: impl Fn(&City) -> bool) -> Vec<CityView> {
        let mut views: Vec<CityView> = self
            .cities
            .values()
            .filter(|city| include(city))
            .map(|city| CityView {
                id: city.id.clone(),
                name: city.name.clone(),
            })
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));
        views
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: String,
    pub code: String,
    pub name: String,
    pub cantons: Vec<CantonView>,
    /// Cities not assigned to any canton.
    pub cities: Vec<CityView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CantonView {
    pub id: String,
    pub name: String,
    pub cities: Vec<CityView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityView {
    pub id: CityId,
    pub name: String,
}
