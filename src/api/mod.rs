//! Typed REST façade for the dashboard resources.

mod client;
mod types;

pub use client::PaydeckClient;
pub use types::{
  Agent, AgentStatus, AgentUpdate, CardStatus, CardTemplate, LoginRequest, MerchantControls,
  NewAgent, NewCardTemplate, NewPaymentMethod, NewUser, NewVirtualCard, PaymentMethod,
  SpendingLimit, SpendingLimitPeriod, Token, Transaction, TransactionStatus, TransactionType,
  User, VirtualCard, VirtualCardUpdate,
};
