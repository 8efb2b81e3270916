//! DynamoDB repositories.
//!
//! Three tables:
//! - Trainings: PK `TrainingId`
//! - UserTrainingStatus: PK `Email`, SK `TrainingId`
//! - Reviews: PK `TrainingId`, SK `Email`
//!
//! Status transitions are conditional updates, so the state machine's
//! one-way transitions hold even if a workflow execution is duplicated.

use crate::domain::training::{
    Review, TrainingRecord, TrainingStatus, TrainingSummary, UserTrainingStatus,
};
use crate::domain::transcode::SourceLocation;
use crate::ports::repository::{ReviewRepository, TrainingRepository, UserStatusRepository};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use std::error::Error;

/// DynamoAdapter implements the repositories on AWS DynamoDB.
#[derive(Clone)]
pub struct DynamoAdapter {
    client: Client,
    trainings_table: String,
    user_status_table: String,
    reviews_table: String,
}

impl DynamoAdapter {
    pub fn new(
        client: Client,
        trainings_table: String,
        user_status_table: String,
        reviews_table: String,
    ) -> Self {
        Self {
            client,
            trainings_table,
            user_status_table,
            reviews_table,
        }
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .unwrap_or_default()
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> TrainingRecord {
    let status = string_attr(item, "TrainingStatus")
        .parse()
        .unwrap_or(TrainingStatus::Pending);
    TrainingRecord {
        training_id: string_attr(item, "TrainingId"),
        title: string_attr(item, "Title"),
        description: string_attr(item, "Description"),
        source: SourceLocation::new(
            string_attr(item, "SourceBucket"),
            string_attr(item, "SourceKey"),
        ),
        video_asset_key: item
            .get("VideoKey")
            .and_then(|v| v.as_s().ok())
            .cloned(),
        status,
    }
}

#[async_trait]
impl TrainingRepository for DynamoAdapter {
    async fn put_training(
        &self,
        record: &TrainingRecord,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .put_item()
            .table_name(&self.trainings_table)
            .item("TrainingId", AttributeValue::S(record.training_id.clone()))
            .item("Title", AttributeValue::S(record.title.clone()))
            .item("Description", AttributeValue::S(record.description.clone()))
            .item(
                "SourceBucket",
                AttributeValue::S(record.source.bucket.clone()),
            )
            .item("SourceKey", AttributeValue::S(record.source.key.clone()))
            .item(
                "TrainingStatus",
                AttributeValue::S(record.status.as_str().to_string()),
            )
            // VideoKey is written by complete_training once the rendition exists
            .condition_expression("attribute_not_exists(TrainingId)")
            .send()
            .await?;
        Ok(())
    }

    async fn get_training(
        &self,
        training_id: &str,
    ) -> Result<Option<TrainingRecord>, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.trainings_table)
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .send()
            .await?;

        Ok(resp.item.as_ref().map(record_from_item))
    }

    async fn list_ready(&self) -> Result<Vec<TrainingSummary>, Box<dyn Error + Send + Sync>> {
        // A scan capped at 100 items is plenty for this catalog; revisit
        // with a paginator if it ever grows past that.
        let resp = self
            .client
            .scan()
            .table_name(&self.trainings_table)
            .projection_expression("TrainingId, Title, Description")
            .filter_expression("TrainingStatus = :ready")
            .expression_attribute_values(
                ":ready",
                AttributeValue::S(TrainingStatus::Ready.as_str().to_string()),
            )
            .limit(100)
            .send()
            .await?;

        let summaries = resp
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| TrainingSummary {
                training_id: string_attr(item, "TrainingId"),
                title: string_attr(item, "Title"),
                description: string_attr(item, "Description"),
            })
            .collect();
        Ok(summaries)
    }

    async fn begin_converting(
        &self,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .update_item()
            .table_name(&self.trainings_table)
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .update_expression("SET TrainingStatus = :converting")
            .condition_expression("TrainingStatus = :pending")
            .expression_attribute_values(
                ":converting",
                AttributeValue::S(TrainingStatus::Converting.as_str().to_string()),
            )
            .expression_attribute_values(
                ":pending",
                AttributeValue::S(TrainingStatus::Pending.as_str().to_string()),
            )
            .send()
            .await?;
        Ok(())
    }

    async fn complete_training(
        &self,
        training_id: &str,
        video_asset_key: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .update_item()
            .table_name(&self.trainings_table)
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .update_expression("SET VideoKey = :videoKey, TrainingStatus = :ready")
            .condition_expression(
                "attribute_not_exists(VideoKey) AND TrainingStatus = :converting",
            )
            .expression_attribute_values(
                ":videoKey",
                AttributeValue::S(video_asset_key.to_string()),
            )
            .expression_attribute_values(
                ":ready",
                AttributeValue::S(TrainingStatus::Ready.as_str().to_string()),
            )
            .expression_attribute_values(
                ":converting",
                AttributeValue::S(TrainingStatus::Converting.as_str().to_string()),
            )
            .send()
            .await?;
        Ok(())
    }

    async fn fail_training(&self, training_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .update_item()
            .table_name(&self.trainings_table)
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .update_expression("SET TrainingStatus = :failed")
            .condition_expression("TrainingStatus <> :ready AND TrainingStatus <> :failed")
            .expression_attribute_values(
                ":failed",
                AttributeValue::S(TrainingStatus::Failed.as_str().to_string()),
            )
            .expression_attribute_values(
                ":ready",
                AttributeValue::S(TrainingStatus::Ready.as_str().to_string()),
            )
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStatusRepository for DynamoAdapter {
    async fn get_status(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<Option<UserTrainingStatus>, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.user_status_table)
            .key("Email", AttributeValue::S(email.to_string()))
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .send()
            .await?;

        Ok(resp.item.map(|item| UserTrainingStatus {
            email: string_attr(&item, "Email"),
            training_id: string_attr(&item, "TrainingId"),
            completed: item
                .get("IsCompleted")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
        }))
    }

    async fn mark_complete(
        &self,
        email: &str,
        training_id: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        // Creates the row on first call; rewriting true is a no-op
        self.client
            .update_item()
            .table_name(&self.user_status_table)
            .key("Email", AttributeValue::S(email.to_string()))
            .key("TrainingId", AttributeValue::S(training_id.to_string()))
            .update_expression("SET IsCompleted = :isCompleted")
            .expression_attribute_values(":isCompleted", AttributeValue::Bool(true))
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for DynamoAdapter {
    async fn put_review(&self, review: &Review) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.client
            .put_item()
            .table_name(&self.reviews_table)
            .item("TrainingId", AttributeValue::S(review.training_id.clone()))
            .item("Email", AttributeValue::S(review.email.clone()))
            .item("Rating", AttributeValue::N(review.rating.to_string()))
            .item("Comment", AttributeValue::S(review.comment.clone()))
            .item("CreatedAt", AttributeValue::S(review.created_at.clone()))
            .send()
            .await?;
        Ok(())
    }

    async fn list_reviews(
        &self,
        training_id: &str,
    ) -> Result<Vec<Review>, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .query()
            .table_name(&self.reviews_table)
            .key_condition_expression("TrainingId = :trainingId")
            .expression_attribute_values(
                ":trainingId",
                AttributeValue::S(training_id.to_string()),
            )
            .send()
            .await?;

        let reviews = resp
            .items
            .unwrap_or_default()
            .iter()
            .map(|item| Review {
                training_id: string_attr(item, "TrainingId"),
                email: string_attr(item, "Email"),
                rating: item
                    .get("Rating")
                    .and_then(|v| v.as_n().ok())
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0),
                comment: string_attr(item, "Comment"),
                created_at: string_attr(item, "CreatedAt"),
            })
            .collect();
        Ok(reviews)
    }
}
