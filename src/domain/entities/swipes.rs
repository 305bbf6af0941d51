use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::{matches, swipes};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = swipes, primary_key(from_user_id, to_user_id))]
pub struct SwipeEntity {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = swipes)]
pub struct InsertSwipeEntity {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = matches)]
pub struct MatchEntity {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = matches)]
pub struct InsertMatchEntity {
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub status: String,
}

impl InsertMatchEntity {
    /// Pairs are stored ordered so the unique index covers both directions.
    pub fn accepted(a: Uuid, b: Uuid) -> Self {
        let (user1_id, user2_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            user1_id,
            user2_id,
            status: "accepted".to_string(),
        }
    }
}
