//! Serde models for the dashboard API resources.
//!
//! These mirror the backend response shapes; request payload types are kept
//! separate so create/update calls serialize exactly the fields the backend
//! accepts.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ApiError, ErrorDetail};

/// Decode an unwrapped `data` payload into a typed model.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  serde_json::from_value(value).map_err(|e| ApiError::Server {
    status: 200,
    detail: ErrorDetail::new("DECODE_ERROR", format!("failed to decode response payload: {}", e)),
  })
}

/// Encode a typed request payload.
pub(crate) fn encode<T: Serialize>(payload: &T) -> Result<Value, ApiError> {
  serde_json::to_value(payload)
    .map_err(|e| ApiError::Network(format!("failed to encode request body: {}", e)))
}

// ============================================================================
// Auth & users
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
  pub access_token: String,
  #[serde(default)]
  pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub id: i64,
  pub email: String,
  pub full_name: Option<String>,
  #[serde(default)]
  pub is_active: bool,
  #[serde(default)]
  pub email_verified: bool,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
  pub email: String,
  pub password: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_name: Option<String>,
}

// ============================================================================
// AI agents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
  Active,
  Inactive,
  Suspended,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  pub status: AgentStatus,
  pub daily_spend_limit: Option<f64>,
  pub monthly_spend_limit: Option<f64>,
  #[serde(default)]
  pub current_daily_spend: f64,
  #[serde(default)]
  pub current_monthly_spend: f64,
  #[serde(default)]
  pub allowed_merchant_categories: Vec<String>,
  #[serde(default)]
  pub blocked_merchant_categories: Vec<String>,
  #[serde(default)]
  pub allowed_merchants: Vec<String>,
  #[serde(default)]
  pub blocked_merchants: Vec<String>,
  pub max_transaction_amount: Option<f64>,
  pub require_approval_above: Option<f64>,
  #[serde(default)]
  pub total_spend: f64,
  #[serde(default)]
  pub total_transactions: i64,
  pub last_transaction_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewAgent {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub daily_spend_limit: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub monthly_spend_limit: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_merchant_categories: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blocked_merchant_categories: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_transaction_amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub require_approval_above: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<AgentStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub daily_spend_limit: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub monthly_spend_limit: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_transaction_amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub require_approval_above: Option<f64>,
}

// ============================================================================
// Virtual cards
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
  Active,
  Frozen,
  Cancelled,
  Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingLimitPeriod {
  Daily,
  Weekly,
  Monthly,
  Yearly,
  Total,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingLimit {
  pub period: SpendingLimitPeriod,
  pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantControls {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_categories: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blocked_categories: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_merchants: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blocked_merchants: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualCard {
  pub id: i64,
  pub user_id: i64,
  pub cardholder_name: String,
  pub currency: String,
  /// Masked except for the final four digits.
  pub card_number: String,
  pub expiry_month: u32,
  pub expiry_year: i32,
  pub balance: f64,
  pub status: CardStatus,
  #[serde(default)]
  pub spending_limits: HashMap<String, f64>,
  #[serde(default)]
  pub current_spend: HashMap<String, f64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVirtualCard {
  pub user_id: i64,
  pub cardholder_name: String,
  pub currency: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub spending_limits: Option<Vec<SpendingLimit>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merchant_controls: Option<MerchantControls>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualCardUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cardholder_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<CardStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub spending_limits: Option<Vec<SpendingLimit>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merchant_controls: Option<MerchantControls>,
}

// ============================================================================
// Funding sources (payment methods)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
  pub id: i64,
  pub user_id: i64,
  #[serde(rename = "type")]
  pub kind: String,
  pub provider: String,
  pub last_four: Option<String>,
  #[serde(default)]
  pub is_default: bool,
  #[serde(default)]
  pub is_active: bool,
  pub provider_payment_id: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentMethod {
  pub user_id: i64,
  #[serde(rename = "type")]
  pub kind: String,
  pub provider: String,
  pub provider_payment_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_four: Option<String>,
  pub is_default: bool,
}

// ============================================================================
// Card templates
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CardTemplate {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
  #[serde(default)]
  pub spending_limits: HashMap<String, f64>,
  #[serde(default)]
  pub category_spending_limits: HashMap<String, f64>,
  #[serde(default)]
  pub allowed_merchant_categories: Vec<String>,
  #[serde(default)]
  pub blocked_merchant_categories: Vec<String>,
  #[serde(default)]
  pub allowed_merchants: Vec<String>,
  #[serde(default)]
  pub blocked_merchants: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCardTemplate {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub spending_limits: Option<HashMap<String, f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category_spending_limits: Option<HashMap<String, f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_merchant_categories: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blocked_merchant_categories: Option<Vec<String>>,
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
  Funding,
  Purchase,
  Refund,
  Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
  Refunded,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
  pub id: i64,
  pub user_id: i64,
  pub virtual_card_id: Option<i64>,
  pub payment_method_id: Option<i64>,
  pub amount: f64,
  pub currency: String,
  #[serde(rename = "type")]
  pub kind: TransactionType,
  pub status: TransactionStatus,
  pub description: Option<String>,
  pub merchant_name: Option<String>,
  pub merchant_category: Option<String>,
  #[serde(default)]
  pub is_online: bool,
  #[serde(default)]
  pub is_international: bool,
  pub decline_reason: Option<String>,
  pub created_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}
