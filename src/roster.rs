//! Roster fetch pipeline: category lookup, prefix slice, concurrent detail
//! lookups, ordered reassembly into [`DisplayRecord`]s.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::{artwork_url, trim_base, ApiError, MemberRef, PokeSource, PokemonPayload};
use crate::state::{Category, DisplayRecord, Quantity};

/// Position of the attack stat in PokeAPI's fixed six-entry stat list.
pub const ATTACK_STAT_INDEX: usize = 4;
/// Position of the defense stat in the same list.
pub const DEFENSE_STAT_INDEX: usize = 3;
pub const DEFAULT_CONCURRENCY: usize = 16;

pub struct RosterPipeline<S> {
    source: Arc<S>,
    sprite_base: String,
    concurrency: usize,
}

impl<S: PokeSource + 'static> RosterPipeline<S> {
    pub fn new(source: S, sprite_base: &str, concurrency: usize) -> Self {
        Self {
            source: Arc::new(source),
            sprite_base: trim_base(sprite_base),
            concurrency: concurrency.max(1),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one fetch cycle. Any failure aborts the cycle and cancels the
    /// detail lookups still in flight.
    pub async fn fetch(
        &self,
        category: Category,
        quantity: Quantity,
    ) -> Result<Vec<DisplayRecord>, ApiError> {
        let members = self.source.type_members(category).await?;
        let total = members.len();
        let members = quantity.truncate(members);
        tracing::debug!(
            %category,
            %quantity,
            total,
            kept = members.len(),
            "category lookup done"
        );
        self.fetch_details(members).await
    }

    async fn fetch_details(&self, members: Vec<MemberRef>) -> Result<Vec<DisplayRecord>, ApiError> {
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        for (index, member) in members.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let sprite_base = self.sprite_base.clone();
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ApiError::Task("detail semaphore closed".to_string()))?;
                let payload = source.pokemon(&member).await?;
                build_record(payload, &sprite_base).map(|record| (index, record))
            });
        }

        let mut slots: Vec<Option<DisplayRecord>> = vec![None; join_set.len()];
        while let Some(joined) = join_set.join_next().await {
            let (index, record) = match joined {
                Ok(Ok(done)) => done,
                Ok(Err(error)) => {
                    join_set.abort_all();
                    return Err(error);
                }
                Err(error) => {
                    join_set.abort_all();
                    return Err(ApiError::Task(error.to_string()));
                }
            };
            slots[index] = Some(record);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Flattens a detail payload. Attack and defense are read by position.
pub fn build_record(payload: PokemonPayload, sprite_base: &str) -> Result<DisplayRecord, ApiError> {
    let required = ATTACK_STAT_INDEX.max(DEFENSE_STAT_INDEX) + 1;
    if payload.stats.len() < required {
        return Err(ApiError::MissingStat {
            name: payload.name,
            found: payload.stats.len(),
            required,
        });
    }
    check_stat_name(&payload, ATTACK_STAT_INDEX, "attack");
    check_stat_name(&payload, DEFENSE_STAT_INDEX, "defense");

    Ok(DisplayRecord {
        id: payload.id,
        image: artwork_url(sprite_base, payload.id),
        attack: payload.stats[ATTACK_STAT_INDEX].base_stat,
        defense: payload.stats[DEFENSE_STAT_INDEX].base_stat,
        types: payload
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        name: payload.name,
    })
}

fn check_stat_name(payload: &PokemonPayload, index: usize, expected: &str) {
    let Some(named) = payload.stats[index].stat.as_ref() else {
        return;
    };
    if named.name != expected {
        tracing::warn!(
            pokemon = %payload.name,
            index,
            expected,
            found = %named.name,
            "stat order differs from the positional contract"
        );
    }
}
