use bson::{doc, Document as BsonDocument};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{from_bson_time, to_bson_time, MongoMessage};
use crate::error::Result;
use crate::models::MessageFilter;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("conversation_messages");
        Self { collection }
    }

    pub async fn insert(&self, message: MongoMessage) -> Result<()> {
        self.collection.insert_one(&message).await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<MongoMessage>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Messages of one conversation, oldest first
    pub async fn list(&self, filter: &MessageFilter) -> Result<Vec<MongoMessage>> {
        let mut query = doc! { "conversation_id": &filter.conversation_id };
        if filter.active_only {
            query.insert("active", true);
        }

        let messages = self
            .collection
            .find(query)
            .sort(doc! { "created": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    /// Single update_many over the cutoff range
    pub async fn deactivate_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> Result<u64> {
        let op = if inclusive { "$gte" } else { "$gt" };
        let mut range = BsonDocument::new();
        range.insert(op, to_bson_time(cutoff));
        let filter = doc! {
            "conversation_id": conversation_id,
            "active": true,
            "created": range,
        };
        let result = self
            .collection
            .update_many(filter, doc! { "$set": { "active": false } })
            .await?;
        Ok(result.modified_count)
    }

    pub async fn latest_created(&self, conversation_id: &str) -> Result<Option<DateTime<Utc>>> {
        let latest = self
            .collection
            .find_one(doc! { "conversation_id": conversation_id })
            .sort(doc! { "created": -1 })
            .await?;
        Ok(latest.map(|m| from_bson_time(m.created)))
    }
}
