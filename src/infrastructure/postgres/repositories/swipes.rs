use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, dsl::exists, insert_into, prelude::*, select};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::swipes::{InsertMatchEntity, InsertSwipeEntity, MatchEntity, SwipeEntity},
        repositories::swipes::SwipeRepository,
        value_objects::enums::swipe_kinds::SwipeKind,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{matches, swipes},
    },
};

pub struct SwipePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SwipePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SwipeRepository for SwipePostgres {
    async fn upsert_swipe(&self, insert_swipe_entity: InsertSwipeEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(swipes::table)
            .values(&insert_swipe_entity)
            .on_conflict((swipes::from_user_id, swipes::to_user_id))
            .do_update()
            .set((
                swipes::kind.eq(&insert_swipe_entity.kind),
                swipes::created_at.eq(insert_swipe_entity.created_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn has_liked(&self, from_user_id: Uuid, to_user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let liked = select(exists(
            swipes::table
                .filter(swipes::from_user_id.eq(from_user_id))
                .filter(swipes::to_user_id.eq(to_user_id))
                .filter(swipes::kind.eq_any([
                    SwipeKind::Like.as_str(),
                    SwipeKind::SuperLike.as_str(),
                ])),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(liked)
    }

    async fn find_match_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Option<MatchEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = matches::table
            .filter(
                matches::user1_id
                    .eq(user_a)
                    .and(matches::user2_id.eq(user_b))
                    .or(matches::user1_id.eq(user_b).and(matches::user2_id.eq(user_a))),
            )
            .select(MatchEntity::as_select())
            .first::<MatchEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create_match_if_absent(
        &self,
        insert_match_entity: InsertMatchEntity,
    ) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let match_id = insert_into(matches::table)
            .values(&insert_match_entity)
            .on_conflict((matches::user1_id, matches::user2_id))
            .do_nothing()
            .returning(matches::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(match_id)
    }

    async fn find_latest_swipe(&self, from_user_id: Uuid) -> Result<Option<SwipeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = swipes::table
            .filter(swipes::from_user_id.eq(from_user_id))
            .order(swipes::created_at.desc())
            .select(SwipeEntity::as_select())
            .first::<SwipeEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete_swipe(&self, from_user_id: Uuid, to_user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(
            swipes::table
                .filter(swipes::from_user_id.eq(from_user_id))
                .filter(swipes::to_user_id.eq(to_user_id)),
        )
        .execute(&mut conn)?;

        Ok(())
    }
}
