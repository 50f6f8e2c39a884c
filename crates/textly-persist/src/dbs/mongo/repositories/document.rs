use bson::{doc, Bson, Document as BsonDocument};
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{to_bson_time, MongoDocument};
use crate::error::Result;
use crate::models::DocumentUpdate;

#[derive(Clone)]
pub struct MongoDocumentRepository {
    collection: Collection<MongoDocument>,
}

impl MongoDocumentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("documents");
        Self { collection }
    }

    pub async fn insert(&self, document: MongoDocument) -> Result<()> {
        self.collection.insert_one(&document).await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<MongoDocument>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn update(&self, id: &str, update: DocumentUpdate) -> Result<bool> {
        let mut set = BsonDocument::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(parent) = update.parent {
            set.insert("parent", parent.map(Bson::String).unwrap_or(Bson::Null));
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
