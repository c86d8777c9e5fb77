//! Document entity for SeaORM.
//!
//! Every document of every collection lives in one JSONB table keyed by its
//! full path.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use pixgram_core::document::{Document, Fields};
use pixgram_core::error::StoreError;
use pixgram_core::paths::DocumentPath;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub path: String,
    #[sea_orm(indexed)]
    pub collection: String,
    pub doc_id: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to a store Document.
impl TryFrom<Model> for Document {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let path = DocumentPath::parse(&model.path)?;
        match model.data {
            Json::Object(fields) => Ok(Document::new(path, fields)),
            other => Err(StoreError::malformed(
                model.path,
                format!("expected an object, got {other}"),
            )),
        }
    }
}

/// A fresh row for `path`.
pub fn active_model(path: &DocumentPath, fields: Fields) -> ActiveModel {
    let now = chrono::Utc::now();
    ActiveModel {
        path: Set(path.to_string()),
        collection: Set(path.parent().to_string()),
        doc_id: Set(path.id().to_string()),
        data: Set(Json::Object(fields)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}
