use bson::{doc, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{to_bson_time, MongoConversation};
use crate::error::Result;
use crate::models::{ConversationFilter, ConversationUpdate};

#[derive(Clone)]
pub struct MongoConversationRepository {
    collection: Collection<MongoConversation>,
}

impl MongoConversationRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("conversations");
        Self { collection }
    }

    pub async fn insert(&self, conversation: MongoConversation) -> Result<()> {
        self.collection.insert_one(&conversation).await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<MongoConversation>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn list(&self, filter: &ConversationFilter) -> Result<Vec<MongoConversation>> {
        let mut query = doc! { "user_id": &filter.user_id };
        if filter.active_only {
            query.insert("active", true);
        }
        if let Some(kind) = filter.kind {
            query.insert("type", kind.as_str());
        }

        let conversations = self
            .collection
            .find(query)
            .sort(doc! { "created": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(conversations)
    }

    /// Applies the update; false when the id matched nothing
    pub async fn update(&self, id: &str, update: ConversationUpdate) -> Result<bool> {
        let mut set = BsonDocument::new();
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(active) = update.active {
            set.insert("active", active);
        }
        if let Some(totals) = update.totals {
            set.insert("total_requests", totals.total_requests as i64);
            set.insert("input_tokens", totals.input_tokens as i64);
            set.insert("output_tokens", totals.output_tokens as i64);
            set.insert("reasoning_tokens", totals.reasoning_tokens as i64);
            set.insert("cost_micros", totals.cost.micros());
        }
        if let Some(updated) = update.updated {
            set.insert("updated", to_bson_time(updated));
        }

        if set.is_empty() {
            return Ok(self.find(id).await?.is_some());
        }
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }
}
