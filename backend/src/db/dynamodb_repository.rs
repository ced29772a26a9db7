use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::models::{ScanRecord, User};
use shared::Verdict;

#[derive(Clone)]
pub struct DynamoDbRepository {
    client: Client,
    users_table: String,
    scans_table: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Item not found")]
    NotFound,
    #[error("El usuario ya existe")]
    UserExists,
    #[error("Invalid data format: {0}")]
    InvalidData(String),
}

impl DynamoDbRepository {
    pub fn new(client: Client, users_table: String, scans_table: String) -> Self {
        Self {
            client,
            users_table,
            scans_table,
        }
    }

    /// Create a user, refusing duplicates by username.
    pub async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        log::info!(
            "Creating user in DynamoDB table '{}': {}",
            self.users_table,
            user.username
        );

        match self.get_user_by_username(&user.username).await {
            Ok(_) => return Err(RepositoryError::UserExists),
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e),
        }

        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(user.id.to_string()));
        item.insert(
            "username".to_string(),
            AttributeValue::S(user.username.clone()),
        );
        item.insert(
            "password_hash".to_string(),
            AttributeValue::S(user.password_hash.clone()),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(user.created_at.to_rfc3339()),
        );

        match self
            .client
            .put_item()
            .table_name(&self.users_table)
            .set_item(Some(item))
            .send()
            .await
        {
            Ok(_) => {
                log::info!("Successfully created user: {}", user.username);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "DynamoDB put_item failed for user {}: {:?}",
                    user.username,
                    e
                );
                Err(RepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut key = HashMap::new();
        key.insert("id".to_string(), AttributeValue::S(user_id.to_string()));

        let result = self
            .client
            .get_item()
            .table_name(&self.users_table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            Ok(Some(self.parse_user_from_item(item)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.users_table)
            .filter_expression("username = :username")
            .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        if let Some(items) = result.items {
            if let Some(item) = items.into_iter().next() {
                return self.parse_user_from_item(item);
            }
        }
        Err(RepositoryError::NotFound)
    }

    /// Persist one scan outcome.
    pub async fn record_scan(&self, record: &ScanRecord) -> Result<(), RepositoryError> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(record.id.to_string()));
        item.insert(
            "user_id".to_string(),
            AttributeValue::S(record.user_id.to_string()),
        );
        item.insert(
            "username".to_string(),
            AttributeValue::S(record.username.clone()),
        );
        if let Some(image_key) = &record.image_key {
            item.insert(
                "image_key".to_string(),
                AttributeValue::S(image_key.clone()),
            );
        }
        item.insert(
            "verdict".to_string(),
            AttributeValue::S(record.verdict.to_string()),
        );
        item.insert(
            "confidence".to_string(),
            AttributeValue::N(record.confidence.to_string()),
        );
        item.insert(
            "scanned_at".to_string(),
            AttributeValue::S(record.scanned_at.to_rfc3339()),
        );

        self.client
            .put_item()
            .table_name(&self.scans_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    /// All scans for one user, newest first.
    pub async fn scans_for_user(&self, user_id: Uuid) -> Result<Vec<ScanRecord>, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.scans_table)
            .filter_expression("user_id = :user_id")
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        let mut records = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                records.push(self.parse_scan_from_item(item)?);
            }
        }
        records.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
        Ok(records)
    }

    fn parse_user_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<User, RepositoryError> {
        let id = item
            .get("id")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid user id".to_string()))?;

        let username = item
            .get("username")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid username".to_string()))?
            .clone();

        let password_hash = item
            .get("password_hash")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid password_hash".to_string()))?
            .clone();

        let created_at = item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| RepositoryError::InvalidData("Invalid created_at".to_string()))?;

        Ok(User {
            id,
            username,
            password_hash,
            created_at,
        })
    }

    fn parse_scan_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<ScanRecord, RepositoryError> {
        let id = item
            .get("id")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid scan id".to_string()))?;

        let user_id = item
            .get("user_id")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid user_id".to_string()))?;

        let username = item
            .get("username")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid username".to_string()))?
            .clone();

        let image_key = item.get("image_key").and_then(|v| v.as_s().ok()).cloned();

        let verdict = item
            .get("verdict")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| s.parse::<Verdict>().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid verdict".to_string()))?;

        let confidence = item
            .get("confidence")
            .and_then(|v| v.as_n().ok())
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid confidence".to_string()))?;

        let scanned_at = item
            .get("scanned_at")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| RepositoryError::InvalidData("Invalid scanned_at".to_string()))?;

        Ok(ScanRecord {
            id,
            user_id,
            username,
            image_key,
            verdict,
            confidence,
            scanned_at,
        })
    }
}
