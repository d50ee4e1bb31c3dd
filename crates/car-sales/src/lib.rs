//! # car-sales
//!
//! Sales assistant for a car dealership with a fixed stock list.
//!
//! ## Tools
//!
//! ```text
//! ┌───────────────────┬──────────────────────────────────────────┐
//! │ ComparePrices     │ web search: "<model> price comparison"   │
//! │ GetCarDetails     │ stock lookup + web search for pictures   │
//! │ ListAvailableCars │ every model in stock, in catalog order   │
//! │ CollectClientInfo │ name / email / phone from the chat form  │
//! └───────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! The stock never changes while the process runs. Search failures never
//! surface as errors: every tool answers with text the model can relay.

pub mod catalog;
pub mod contact;
pub mod error;
pub mod registry;
pub mod search;
pub mod svckit;

pub use catalog::{Catalog, CatalogEntry};
pub use contact::{ClientInfo, ClientInfoSource, ContactForm, ContactUpdate};
pub use error::{Result, SalesError};
pub use registry::{SalesToolKind, SalesToolbox};
pub use svckit::SalesToolOutput;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        CarDetailsTool,
        CollectClientInfoTool,
        ComparePricesTool,
        ListAvailableCarsTool,
    };
}

/// System prompt for the car sales agent
pub const CAR_SALES_PROMPT: &str = r#"You are a friendly and knowledgeable car salesperson working for a dealership.

## How to help

1. When the customer asks what is available, use `ListAvailableCars`.
2. When the customer asks about a specific model, use `GetCarDetails` with the model name.
3. When the customer asks how our price compares, use `ComparePrices` with the model name.
4. When the customer is ready to be contacted or to buy, use `CollectClientInfo`.
   If it reports that the information is incomplete, ask them to fill in
   their name, email and phone number in the contact form.

## Rules

- Only quote prices and details that a tool returned. Never invent stock.
- Use at most one tool per reply, then answer the customer.
- If a car is not in stock, say so and suggest something similar from the stock list.
- Keep answers short and conversational. Links may be given in markdown.
- Pictures found by `GetCarDetails` are shown to the customer automatically;
  do not paste image URLs."#;
