//! Saved taste profile repository.
//!
//! Customers keep a small library of named blends. Saving a blend that
//! matches an already-saved one (every taste value, the roast level and
//! the grind) is a no-op; once the library is full the oldest entry is
//! evicted to make room.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use roastline_core::{TasteProfile, TasteProfileId, UserId};

use super::RepositoryError;

/// Maximum number of saved profiles per customer.
pub const MAX_SAVED_PROFILES: usize = 20;

/// A named blend saved to a customer's library.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTasteProfile {
    pub id: TasteProfileId,
    pub name: String,
    pub profile: TasteProfile,
    pub created_at: DateTime<Utc>,
}

/// Database row for `shop.taste_profile`.
#[derive(Debug, sqlx::FromRow)]
struct SavedTasteProfileRow {
    id: i32,
    name: String,
    profile: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SavedTasteProfileRow> for SavedTasteProfile {
    type Error = RepositoryError;

    fn try_from(row: SavedTasteProfileRow) -> Result<Self, Self::Error> {
        let profile = serde_json::from_str(&row.profile).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid saved blend in database: {e}"))
        })?;

        Ok(Self {
            id: TasteProfileId::new(row.id),
            name: row.name,
            profile,
            created_at: row.created_at,
        })
    }
}

/// What a save would do, given the profiles already in the library.
///
/// Computed from data loaded inside the save transaction so the decision
/// and the writes see the same rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    /// An identical blend is already saved; nothing to write.
    Duplicate(TasteProfileId),
    /// Insert, then delete the listed oldest entries to stay at the cap.
    Insert { evict: Vec<TasteProfileId> },
}

/// Decide whether a save is a duplicate and which entries (if any) must
/// be evicted. `existing` must be ordered oldest first.
#[must_use]
pub fn plan_save(existing: &[SavedTasteProfile], candidate: &TasteProfile) -> SavePlan {
    if let Some(found) = existing.iter().find(|saved| saved.profile == *candidate) {
        return SavePlan::Duplicate(found.id);
    }

    let excess = (existing.len() + 1).saturating_sub(MAX_SAVED_PROFILES);
    let evict = existing.iter().take(excess).map(|saved| saved.id).collect();

    SavePlan::Insert { evict }
}

/// Repository for saved taste profile operations.
pub struct TasteProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TasteProfileRepository<'a> {
    /// Create a new taste profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's saved profiles, oldest first.
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SavedTasteProfile>, RepositoryError> {
        let rows: Vec<SavedTasteProfileRow> = sqlx::query_as(
            r"
            SELECT id, name, profile, created_at
            FROM shop.taste_profile
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SavedTasteProfile::try_from).collect()
    }

    /// Save a blend to the user's library.
    ///
    /// Returns the existing entry unchanged when an identical blend is
    /// already saved. Otherwise inserts and, if the library would exceed
    /// [`MAX_SAVED_PROFILES`], evicts the oldest entries in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails, or
    /// `RepositoryError::DataCorruption` if a stored blend can't be read.
    #[instrument(skip(self, profile), fields(user_id = %user_id, name = %name))]
    pub async fn save(
        &self,
        user_id: UserId,
        name: &str,
        profile: &TasteProfile,
    ) -> Result<SavedTasteProfile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<SavedTasteProfileRow> = sqlx::query_as(
            r"
            SELECT id, name, profile, created_at
            FROM shop.taste_profile
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            FOR UPDATE
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        let existing = rows
            .into_iter()
            .map(SavedTasteProfile::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        match plan_save(&existing, profile) {
            SavePlan::Duplicate(id) => {
                tx.commit().await?;
                existing
                    .into_iter()
                    .find(|saved| saved.id == id)
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(
                            "duplicate plan referenced a missing saved blend".to_string(),
                        )
                    })
            }
            SavePlan::Insert { evict } => {
                let snapshot = serde_json::to_string(profile).map_err(|e| {
                    RepositoryError::DataCorruption(format!("failed to serialize blend: {e}"))
                })?;

                let row: SavedTasteProfileRow = sqlx::query_as(
                    r"
                    INSERT INTO shop.taste_profile (user_id, name, profile)
                    VALUES ($1, $2, $3)
                    RETURNING id, name, profile, created_at
                    ",
                )
                .bind(user_id.as_i32())
                .bind(name)
                .bind(&snapshot)
                .fetch_one(&mut *tx)
                .await?;

                for id in evict {
                    sqlx::query::<sqlx::Postgres>(
                        r"DELETE FROM shop.taste_profile WHERE id = $1 AND user_id = $2",
                    )
                    .bind(id.as_i32())
                    .bind(user_id.as_i32())
                    .execute(&mut *tx)
                    .await?;
                }

                tx.commit().await?;

                SavedTasteProfile::try_from(row)
            }
        }
    }

    /// Delete one of the user's saved profiles.
    ///
    /// Returns `false` when no row matched (unknown id or another user's
    /// entry).
    ///
    /// # Errors
    ///
    /// Surfaces query failures as `RepositoryError::Database`.
    pub async fn delete(
        &self,
        id: TasteProfileId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query::<sqlx::Postgres>(
            r"DELETE FROM shop.taste_profile WHERE id = $1 AND user_id = $2",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use roastline_core::{GrindType, RoastLevel, TasteScore};

    use super::*;

    fn blend(bitterness: u8, flavour: &str) -> TasteProfile {
        TasteProfile {
            bitterness: TasteScore::try_from(bitterness).unwrap(),
            acidity: TasteScore::try_from(2u8).unwrap(),
            body: TasteScore::try_from(3u8).unwrap(),
            flavour: flavour.to_string(),
            roast_level: RoastLevel::Medium,
            grind_type: GrindType::WholeBean,
        }
    }

    fn saved(id: i32, profile: TasteProfile) -> SavedTasteProfile {
        SavedTasteProfile {
            id: TasteProfileId::new(id),
            name: format!("blend-{id}"),
            profile,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, id as u32).unwrap(),
        }
    }

    #[test]
    fn test_plan_save_detects_duplicate() {
        let existing = vec![saved(1, blend(1, "chocolate")), saved(2, blend(4, "citrus"))];

        let plan = plan_save(&existing, &blend(4, "citrus"));

        assert_eq!(plan, SavePlan::Duplicate(TasteProfileId::new(2)));
    }

    #[test]
    fn test_plan_save_any_field_difference_is_not_a_duplicate() {
        let mut candidate = blend(4, "citrus");
        candidate.grind_type = GrindType::Espresso;
        let existing = vec![saved(1, blend(4, "citrus"))];

        let plan = plan_save(&existing, &candidate);

        assert_eq!(plan, SavePlan::Insert { evict: Vec::new() });
    }

    #[test]
    fn test_plan_save_under_cap_evicts_nothing() {
        let existing: Vec<_> = (1..=5).map(|i| saved(i, blend(1, &format!("f{i}")))).collect();

        let plan = plan_save(&existing, &blend(5, "new"));

        assert_eq!(plan, SavePlan::Insert { evict: Vec::new() });
    }

    #[test]
    fn test_plan_save_at_cap_evicts_exactly_the_oldest() {
        let existing: Vec<_> = (1..=MAX_SAVED_PROFILES as i32)
            .map(|i| saved(i, blend(1, &format!("f{i}"))))
            .collect();

        let plan = plan_save(&existing, &blend(5, "the 21st"));

        assert_eq!(
            plan,
            SavePlan::Insert {
                evict: vec![TasteProfileId::new(1)],
            }
        );
    }

    #[test]
    fn test_plan_save_duplicate_at_cap_evicts_nothing() {
        let existing: Vec<_> = (1..=MAX_SAVED_PROFILES as i32)
            .map(|i| saved(i, blend(1, &format!("f{i}"))))
            .collect();

        let plan = plan_save(&existing, &blend(1, "f7"));

        assert_eq!(plan, SavePlan::Duplicate(TasteProfileId::new(7)));
    }
}
