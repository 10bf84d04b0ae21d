use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::financial_log::{self, LogType};
use crate::errors::ServiceError;

/// Appends a ledger entry. Shared by the admin CRUD surface, appointment
/// confirmation (revenue), and inventory restocking (expense).
pub async fn append<C: ConnectionTrait>(
    db: &C,
    log_type: LogType,
    source: Option<&str>,
    reference_id: Option<i64>,
    description: Option<String>,
    amount: Decimal,
) -> Result<financial_log::Model, ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "amount must be non-negative".to_string(),
        ));
    }

    Ok(financial_log::ActiveModel {
        log_type: Set(log_type.to_string()),
        source: Set(source.map(str::to_string)),
        reference_id: Set(reference_id),
        description: Set(description),
        amount: Set(amount),
        logged_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FinancialLogRequest {
    /// Required; "revenue" or "expense".
    pub log_type: Option<LogType>,
    /// Nullable by design; manual entries need no source.
    pub source: Option<String>,
    pub reference_id: Option<i64>,
    pub description: Option<String>,
    /// Required; must be non-negative.
    pub amount: Option<Decimal>,
}

impl FinancialLogRequest {
    fn checked(&self) -> Result<(LogType, Decimal), ServiceError> {
        let log_type = self
            .log_type
            .ok_or_else(|| ServiceError::ValidationError("log_type is required".to_string()))?;
        let amount = self
            .amount
            .ok_or_else(|| ServiceError::ValidationError("amount is required".to_string()))?;
        if amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must be non-negative".to_string(),
            ));
        }
        Ok((log_type, amount))
    }
}

#[derive(Clone)]
pub struct FinancialLogService {
    db: Arc<DbPool>,
}

impl FinancialLogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_logs(&self) -> Result<Vec<financial_log::Model>, ServiceError> {
        Ok(financial_log::Entity::find()
            .order_by_asc(financial_log::Column::LogId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_log(&self, log_id: i64) -> Result<financial_log::Model, ServiceError> {
        financial_log::Entity::find_by_id(log_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Financial log with id {log_id} not found"))
            })
    }

    /// Validation failures persist nothing.
    #[instrument(skip(self, request))]
    pub async fn create_log(
        &self,
        request: FinancialLogRequest,
    ) -> Result<financial_log::Model, ServiceError> {
        let (log_type, amount) = request.checked()?;
        append(
            &*self.db,
            log_type,
            request.source.as_deref(),
            request.reference_id,
            request.description,
            amount,
        )
        .await
    }

    /// Replaces a log's fields, preserving its id. Unknown id is 404,
    /// invalid payload is 400 with nothing written.
    #[instrument(skip(self, request), fields(log_id = %log_id))]
    pub async fn update_log(
        &self,
        log_id: i64,
        request: FinancialLogRequest,
    ) -> Result<financial_log::Model, ServiceError> {
        let (log_type, amount) = request.checked()?;

        let existing = self.get_log(log_id).await?;

        let mut active: financial_log::ActiveModel = existing.into();
        active.log_type = Set(log_type.to_string());
        active.source = Set(request.source);
        active.reference_id = Set(request.reference_id);
        active.description = Set(request.description);
        active.amount = Set(amount);
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_log(&self, log_id: i64) -> Result<(), ServiceError> {
        let result = financial_log::Entity::delete_by_id(log_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Financial log with id {log_id} not found"
            )));
        }
        Ok(())
    }
}

/// Parses the stored string form back into the enum; corrupt rows surface as
/// internal errors rather than panics.
pub fn parse_log_type(raw: &str) -> Result<LogType, ServiceError> {
    LogType::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("unknown financial log type: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn checked_rejects_missing_type() {
        let request = FinancialLogRequest {
            log_type: None,
            source: Some("manual".to_string()),
            reference_id: None,
            description: None,
            amount: Some(dec!(10)),
        };
        assert!(matches!(
            request.checked(),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn checked_rejects_negative_amount() {
        let request = FinancialLogRequest {
            log_type: Some(LogType::Expense),
            source: Some("test".to_string()),
            reference_id: None,
            description: Some("Invalid".to_string()),
            amount: Some(dec!(-10)),
        };
        assert!(matches!(
            request.checked(),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn checked_accepts_null_source() {
        let request = FinancialLogRequest {
            log_type: Some(LogType::Revenue),
            source: None,
            reference_id: None,
            description: None,
            amount: Some(dec!(30)),
        };
        let (log_type, amount) = request.checked().unwrap();
        assert_eq!(log_type, LogType::Revenue);
        assert_eq!(amount, dec!(30));
    }

    #[test]
    fn log_type_storage_form_is_lowercase() {
        assert_eq!(LogType::Revenue.to_string(), "revenue");
        assert_eq!(parse_log_type("expense").unwrap(), LogType::Expense);
        assert!(parse_log_type("bogus").is_err());
    }
}
