use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::CategoryId;

/// Flat taxonomy row as stored in the `service_categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainCategory {
    pub id: CategoryId,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcategory {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryTreeError {
    #[error("duplicate category id '{0}'")]
    Duplicate(CategoryId),
    #[error("category '{id}' references unknown parent '{parent_id}'")]
    UnknownParent { id: CategoryId, parent_id: CategoryId },
    #[error("category '{id}' nests under subcategory '{parent_id}'; only one level is allowed")]
    TooDeep { id: CategoryId, parent_id: CategoryId },
}

/// Two-level service taxonomy: main categories owning their subcategories.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CategoryTree {
    mains: Vec<MainCategory>,
}

impl CategoryTree {
    pub fn from_flat(rows: Vec<ServiceCategory>) -> Result<Self, CategoryTreeError> {
        let mut by_id: BTreeMap<CategoryId, &ServiceCategory> = BTreeMap::new();
        for row in &rows {
            if by_id.insert(row.id.clone(), row).is_some() {
                return Err(CategoryTreeError::Duplicate(row.id.clone()));
            }
        }

        let mut mains: Vec<MainCategory> = rows
            .iter()
            .filter(|row| row.parent_id.is_none())
            .map(|row| MainCategory {
                id: row.id.clone(),
                name: row.name.clone(),
                subcategories: Vec::new(),
            })
            .collect();

        for row in &rows {
            let Some(parent_id) = &row.parent_id else {
                continue;
            };
            let parent = by_id
                .get(parent_id)
                .ok_or_else(|| CategoryTreeError::UnknownParent {
                    id: row.id.clone(),
                    parent_id: parent_id.clone(),
                })?;
            if parent.parent_id.is_some() {
                return Err(CategoryTreeError::TooDeep {
                    id: row.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
            if let Some(main) = mains.iter_mut().find(|main| &main.id == parent_id) {
                main.subcategories.push(Subcategory {
                    id: row.id.clone(),
                    name: row.name.clone(),
                });
            }
        }

        mains.sort_by(|a, b| a.name.cmp(&b.name));
        for main in &mut mains {
            main.subcategories.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(Self { mains })
    }

    /// Main categories ordered by name, optionally truncated.
    pub fn main_categories(&self, limit: Option<usize>) -> &[MainCategory] {
        let end = limit.map_or(self.mains.len(), |limit| limit.min(self.mains.len()));
        &self.mains[..end]
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.name_of(id).is_some()
    }

    pub fn name_of(&self, id: &CategoryId) -> Option<&str> {
        self.mains.iter().find_map(|main| {
            if &main.id == id {
                return Some(main.name.as_str());
            }
            main.subcategories
                .iter()
                .find(|sub| &sub.id == id)
                .map(|sub| sub.name.as_str())
        })
    }

    /// Splits a selection into ids present in the taxonomy and ids that are not.
    pub fn partition_known(
        &self,
        selected: &BTreeSet<CategoryId>,
    ) -> (BTreeSet<CategoryId>, BTreeSet<CategoryId>) {
        selected.iter().cloned().partition(|id| self.contains(id))
    }
}
