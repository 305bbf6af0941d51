use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::swipes::{InsertMatchEntity, InsertSwipeEntity, MatchEntity, SwipeEntity};

#[automock]
#[async_trait]
pub trait SwipeRepository {
    /// Re-swiping the same target overwrites the previous swipe.
    async fn upsert_swipe(&self, insert_swipe_entity: InsertSwipeEntity) -> Result<()>;

    /// True when `from_user_id` liked or super-liked `to_user_id`.
    async fn has_liked(&self, from_user_id: Uuid, to_user_id: Uuid) -> Result<bool>;

    async fn find_match_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<MatchEntity>>;

    /// Returns the new match id, or `None` when the pair already matched.
    async fn create_match_if_absent(&self, insert_match_entity: InsertMatchEntity)
    -> Result<Option<Uuid>>;

    async fn find_latest_swipe(&self, from_user_id: Uuid) -> Result<Option<SwipeEntity>>;

    async fn delete_swipe(&self, from_user_id: Uuid, to_user_id: Uuid) -> Result<()>;
}
