//! Service Kit - Agent Tools
//!
//! Each tool has a typed entry point returning [`SalesToolOutput`] and an
//! `agent_core::Tool` impl that turns the output into an observation.

mod car_details;
mod client_info;
mod compare_prices;
mod list_cars;

pub use car_details::CarDetailsTool;
pub use client_info::CollectClientInfoTool;
pub use compare_prices::ComparePricesTool;
pub use list_cars::ListAvailableCarsTool;

use agent_core::ToolResult;

use crate::registry::SalesToolKind;

/// Argument name for tools that take a car model
pub const CAR_MODEL_PARAM: &str = "car_model";

/// Observation handed back to the model when the contact form is not filled in
pub const INCOMPLETE_CONTACT_MESSAGE: &str = "The client's contact information is incomplete. \
Ask them to fill in their name, email and phone number in the contact form.";

/// What a sales tool produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SalesToolOutput {
    Text(String),
    TextWithImages { details: String, images: Vec<String> },
    /// Contact form has at least one empty field
    Incomplete,
}

impl SalesToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Text shown to the model
    pub fn message(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::TextWithImages { details, .. } => details,
            Self::Incomplete => INCOMPLETE_CONTACT_MESSAGE,
        }
    }

    pub fn images(&self) -> &[String] {
        match self {
            Self::TextWithImages { images, .. } => images,
            _ => &[],
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete)
    }

    /// Convert into an agent observation
    pub fn into_tool_result(self, kind: SalesToolKind) -> ToolResult {
        let result = ToolResult::success(kind.name(), self.message());
        match self {
            Self::TextWithImages { images, .. } => result.with_images(images),
            Self::Incomplete => result.with_data(serde_json::json!({ "complete": false })),
            Self::Text(_) => result,
        }
    }
}
