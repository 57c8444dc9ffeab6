//! Typed façade over the request pipeline.
//!
//! One method per dashboard endpoint, shaped like the backend routers:
//! auth, agents, virtual cards, funding sources, card templates and
//! transactions. Every method is a thin wrapper: shape arguments, issue the
//! request, decode `data`. List reads carry explicit dedup keys; the
//! volatile families (auth, transactions, virtual cards) are kept out of the
//! response cache by the pipeline's denylist.

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::http::{HttpClient, RequestDescriptor};
use crate::session::SessionSink;

use super::types::*;

#[derive(Clone)]
pub struct PaydeckClient {
  http: HttpClient,
}

impl PaydeckClient {
  pub fn new(
    config: &ClientConfig,
    credentials: Arc<CredentialStore>,
    sink: Arc<dyn SessionSink>,
  ) -> Result<Self, ConfigError> {
    Ok(Self {
      http: HttpClient::new(config, credentials, sink)?,
    })
  }

  /// Façade over an already-constructed pipeline (tests, custom transports).
  pub fn with_http(http: HttpClient) -> Self {
    Self { http }
  }

  pub fn http(&self) -> &HttpClient {
    &self.http
  }

  // ==========================================================================
  // Auth
  // ==========================================================================

  /// Log in and store the returned bearer token for subsequent requests.
  pub async fn login(&self, email: &str, password: &str) -> Result<Token, ApiError> {
    let body = encode(&LoginRequest {
      email: email.to_string(),
      password: password.to_string(),
    })?;
    let data = self.http.post("/auth/login", body).await?;
    let token: Token = decode(data)?;
    self.http.credentials().set(&token.access_token);
    Ok(token)
  }

  pub async fn register(&self, new_user: &NewUser) -> Result<User, ApiError> {
    let data = self.http.post("/auth/register", encode(new_user)?).await?;
    decode(data)
  }

  /// Drop the stored credential. Purely client-side.
  pub fn logout(&self) {
    self.http.credentials().clear();
  }

  pub async fn current_user(&self) -> Result<User, ApiError> {
    let data = self.http.get("/users/me").await?;
    decode(data)
  }

  // ==========================================================================
  // AI agents
  // ==========================================================================

  pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
    let data = self
      .http
      .request(RequestDescriptor::get("/agents").dedup_key("agents:list"))
      .await?;
    decode(data)
  }

  pub async fn get_agent(&self, id: i64) -> Result<Agent, ApiError> {
    let data = self.http.get(&format!("/agents/{}", id)).await?;
    decode(data)
  }

  pub async fn create_agent(&self, new_agent: &NewAgent) -> Result<Agent, ApiError> {
    let data = self.http.post("/agents", encode(new_agent)?).await?;
    decode(data)
  }

  pub async fn update_agent(&self, id: i64, update: &AgentUpdate) -> Result<Agent, ApiError> {
    let data = self
      .http
      .put(&format!("/agents/{}", id), encode(update)?)
      .await?;
    decode(data)
  }

  pub async fn delete_agent(&self, id: i64) -> Result<(), ApiError> {
    self.http.delete(&format!("/agents/{}", id)).await?;
    Ok(())
  }

  // ==========================================================================
  // Virtual cards
  // ==========================================================================

  pub async fn list_cards(&self) -> Result<Vec<VirtualCard>, ApiError> {
    let data = self
      .http
      .request(RequestDescriptor::get("/virtual-cards").dedup_key("virtual-cards:list"))
      .await?;
    decode(data)
  }

  pub async fn get_card(&self, id: i64) -> Result<VirtualCard, ApiError> {
    let data = self.http.get(&format!("/virtual-cards/{}", id)).await?;
    decode(data)
  }

  pub async fn create_card(&self, new_card: &NewVirtualCard) -> Result<VirtualCard, ApiError> {
    let data = self.http.post("/virtual-cards", encode(new_card)?).await?;
    decode(data)
  }

  pub async fn update_card(
    &self,
    id: i64,
    update: &VirtualCardUpdate,
  ) -> Result<VirtualCard, ApiError> {
    let data = self
      .http
      .put(&format!("/virtual-cards/{}", id), encode(update)?)
      .await?;
    decode(data)
  }

  pub async fn freeze_card(&self, id: i64, reason: Option<&str>) -> Result<VirtualCard, ApiError> {
    let data = self
      .http
      .post(
        &format!("/virtual-cards/{}/freeze", id),
        serde_json::json!({ "reason": reason }),
      )
      .await?;
    decode(data)
  }

  pub async fn unfreeze_card(&self, id: i64) -> Result<VirtualCard, ApiError> {
    let data = self
      .http
      .post(
        &format!("/virtual-cards/{}/unfreeze", id),
        serde_json::json!({}),
      )
      .await?;
    decode(data)
  }

  pub async fn delete_card(&self, id: i64) -> Result<(), ApiError> {
    self.http.delete(&format!("/virtual-cards/{}", id)).await?;
    Ok(())
  }

  // ==========================================================================
  // Funding sources
  // ==========================================================================

  pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, ApiError> {
    let data = self
      .http
      .request(RequestDescriptor::get("/payment-methods").dedup_key("payment-methods:list"))
      .await?;
    decode(data)
  }

  pub async fn get_payment_method(&self, id: i64) -> Result<PaymentMethod, ApiError> {
    let data = self.http.get(&format!("/payment-methods/{}", id)).await?;
    decode(data)
  }

  pub async fn create_payment_method(
    &self,
    new_method: &NewPaymentMethod,
  ) -> Result<PaymentMethod, ApiError> {
    let data = self.http.post("/payment-methods", encode(new_method)?).await?;
    decode(data)
  }

  pub async fn delete_payment_method(&self, id: i64) -> Result<(), ApiError> {
    self
      .http
      .delete(&format!("/payment-methods/{}", id))
      .await?;
    Ok(())
  }

  // ==========================================================================
  // Card templates
  // ==========================================================================

  pub async fn list_templates(&self) -> Result<Vec<CardTemplate>, ApiError> {
    let data = self
      .http
      .request(RequestDescriptor::get("/templates").dedup_key("templates:list"))
      .await?;
    decode(data)
  }

  pub async fn get_template(&self, id: i64) -> Result<CardTemplate, ApiError> {
    let data = self.http.get(&format!("/templates/{}", id)).await?;
    decode(data)
  }

  pub async fn create_template(&self, new_template: &NewCardTemplate) -> Result<CardTemplate, ApiError> {
    let data = self.http.post("/templates", encode(new_template)?).await?;
    decode(data)
  }

  pub async fn update_template(
    &self,
    id: i64,
    update: &NewCardTemplate,
  ) -> Result<CardTemplate, ApiError> {
    let data = self
      .http
      .put(&format!("/templates/{}", id), encode(update)?)
      .await?;
    decode(data)
  }

  pub async fn delete_template(&self, id: i64) -> Result<(), ApiError> {
    self.http.delete(&format!("/templates/{}", id)).await?;
    Ok(())
  }

  // ==========================================================================
  // Transactions
  // ==========================================================================

  /// Transactions, optionally filtered to one card. Never cached.
  pub async fn list_transactions(&self, card_id: Option<i64>) -> Result<Vec<Transaction>, ApiError> {
    let mut descriptor = RequestDescriptor::get("/transactions");
    if let Some(card_id) = card_id {
      descriptor = descriptor.query("virtual_card_id", card_id.to_string());
    }
    let data = self.http.request(descriptor).await?;
    decode(data)
  }

  pub async fn get_transaction(&self, id: i64) -> Result<Transaction, ApiError> {
    let data = self.http.get(&format!("/transactions/{}", id)).await?;
    decode(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::{OutboundRequest, RawResponse, Transport, TransportError};
  use async_trait::async_trait;
  use serde_json::{json, Value};
  use std::collections::VecDeque;
  use std::sync::Mutex;

  /// Wraps scripted `data` payloads in the success envelope and records the
  /// requests it sees.
  #[derive(Clone, Default)]
  struct StubTransport {
    seen: Arc<Mutex<Vec<OutboundRequest>>>,
    replies: Arc<Mutex<VecDeque<Value>>>,
  }

  impl StubTransport {
    fn reply(&self, data: Value) {
      self.replies.lock().unwrap().push_back(data);
    }

    fn last_request(&self) -> OutboundRequest {
      self.seen.lock().unwrap().last().unwrap().clone()
    }
  }

  #[async_trait]
  impl Transport for StubTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
      self.seen.lock().unwrap().push(request);
      let data = self
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Value::Null);
      Ok(RawResponse {
        status: 200,
        retry_after: None,
        body: Some(json!({"success": true, "data": data})),
      })
    }
  }

  fn facade() -> (PaydeckClient, StubTransport, Arc<CredentialStore>) {
    let transport = StubTransport::default();
    let credentials = Arc::new(CredentialStore::in_memory());
    let sink: Arc<dyn SessionSink> = Arc::new(|| {});
    let http = HttpClient::with_transport(
      &ClientConfig::new("https://api.paydeck.dev/api/v1"),
      Arc::clone(&credentials),
      sink,
      Box::new(transport.clone()),
    )
    .unwrap();
    (PaydeckClient::with_http(http), transport, credentials)
  }

  #[tokio::test]
  async fn test_login_stores_bearer_token() {
    let (client, transport, credentials) = facade();
    transport.reply(json!({"access_token": "tok-123", "token_type": "bearer"}));

    let token = client.login("dev@paydeck.dev", "hunter22").await.unwrap();

    assert_eq!(token.access_token, "tok-123");
    assert_eq!(credentials.get(), Some("tok-123".to_string()));
    assert!(transport.last_request().url.path().ends_with("/auth/login"));
  }

  #[tokio::test]
  async fn test_logout_clears_the_store() {
    let (client, _, credentials) = facade();
    credentials.set("tok-123");
    client.logout();
    assert_eq!(credentials.get(), None);
  }

  #[tokio::test]
  async fn test_list_agents_decodes_models() {
    let (client, transport, _) = facade();
    transport.reply(json!([{
      "id": 1,
      "name": "travel-bot",
      "description": null,
      "status": "active",
      "daily_spend_limit": 50.0,
      "monthly_spend_limit": null,
      "max_transaction_amount": null,
      "require_approval_above": null,
      "last_transaction_at": null,
      "created_at": "2026-03-01T08:00:00Z",
      "updated_at": "2026-03-01T08:00:00Z"
    }]));

    let agents = client.list_agents().await.unwrap();

    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "travel-bot");
    assert!(transport.last_request().url.path().ends_with("/agents"));
  }

  #[tokio::test]
  async fn test_freeze_card_posts_reason() {
    let (client, transport, _) = facade();
    transport.reply(json!({
      "id": 3,
      "user_id": 1,
      "cardholder_name": "Travel Bot",
      "currency": "USD",
      "card_number": "**** **** **** 4242",
      "expiry_month": 4,
      "expiry_year": 2028,
      "balance": 0.0,
      "status": "frozen",
      "created_at": "2026-02-01T00:00:00Z",
      "updated_at": "2026-02-01T00:00:00Z"
    }));

    let card = client.freeze_card(3, Some("suspicious activity")).await.unwrap();

    assert_eq!(card.status, CardStatus::Frozen);
    let request = transport.last_request();
    assert!(request.url.path().ends_with("/virtual-cards/3/freeze"));
    assert_eq!(request.body.unwrap()["reason"], "suspicious activity");
  }

  #[tokio::test]
  async fn test_transactions_filter_by_card() {
    let (client, transport, _) = facade();
    transport.reply(json!([]));

    let transactions = client.list_transactions(Some(7)).await.unwrap();

    assert!(transactions.is_empty());
    let url = transport.last_request().url;
    assert_eq!(url.query(), Some("virtual_card_id=7"));
  }

  #[tokio::test]
  async fn test_delete_agent_accepts_empty_body() {
    let (client, transport, _) = facade();
    // Envelope with null data stands in for a 204
    client.delete_agent(9).await.unwrap();
    assert!(transport.last_request().url.path().ends_with("/agents/9"));
  }
}
