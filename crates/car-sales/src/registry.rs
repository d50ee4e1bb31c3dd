//! Sales Tool Registry
//!
//! The four tools are a closed set. [`SalesToolbox::dispatch`] matches on the
//! kind directly; [`SalesToolbox::into_registry`] exposes the same tools to the
//! agent loop, which picks them by name.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use agent_core::{ParameterSchema, ToolRegistry, ToolSchema};

use crate::catalog::Catalog;
use crate::contact::ClientInfoSource;
use crate::error::SalesError;
use crate::search::SearchClient;
use crate::svckit::{
    CarDetailsTool, CollectClientInfoTool, ComparePricesTool, ListAvailableCarsTool, SalesToolOutput,
    CAR_MODEL_PARAM,
};

/// The tools a sales agent can call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SalesToolKind {
    ComparePrices,
    GetCarDetails,
    ListAvailableCars,
    CollectClientInfo,
}

impl SalesToolKind {
    /// Registration order
    pub const ALL: [Self; 4] = [
        Self::ComparePrices,
        Self::GetCarDetails,
        Self::ListAvailableCars,
        Self::CollectClientInfo,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::ComparePrices => "ComparePrices",
            Self::GetCarDetails => "GetCarDetails",
            Self::ListAvailableCars => "ListAvailableCars",
            Self::CollectClientInfo => "CollectClientInfo",
        }
    }

    /// Hint for the model when choosing a tool
    pub const fn description(self) -> &'static str {
        match self {
            Self::ComparePrices => "Compares car prices with other dealers and provides links.",
            Self::GetCarDetails => "Retrieves car details and images.",
            Self::ListAvailableCars => "Lists all available cars in stock.",
            Self::CollectClientInfo => "Collects client information for sales purposes.",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub const fn takes_car_model(self) -> bool {
        matches!(self, Self::ComparePrices | Self::GetCarDetails)
    }

    pub fn schema(self) -> ToolSchema {
        let parameters = if self.takes_car_model() {
            vec![ParameterSchema::required_string(CAR_MODEL_PARAM, "Car model name, e.g. 'Toyota Corolla'")]
        } else {
            Vec::new()
        };

        ToolSchema {
            name: self.name().into(),
            description: self.description().into(),
            parameters,
            category: Some("sales".into()),
            has_side_effects: matches!(self, Self::CollectClientInfo),
        }
    }
}

impl fmt::Display for SalesToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SalesToolKind {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| SalesError::UnknownTool(s.to_string()))
    }
}

/// The four sales tools wired to shared collaborators
pub struct SalesToolbox {
    compare_prices: Arc<ComparePricesTool>,
    car_details: Arc<CarDetailsTool>,
    list_cars: Arc<ListAvailableCarsTool>,
    client_info: Arc<CollectClientInfoTool>,
}

impl SalesToolbox {
    pub fn new(
        catalog: Arc<Catalog>,
        search: Arc<dyn SearchClient>,
        client_info: Arc<dyn ClientInfoSource>,
    ) -> Self {
        Self {
            compare_prices: Arc::new(ComparePricesTool::new(Arc::clone(&search))),
            car_details: Arc::new(CarDetailsTool::new(Arc::clone(&catalog), search)),
            list_cars: Arc::new(ListAvailableCarsTool::new(catalog)),
            client_info: Arc::new(CollectClientInfoTool::new(client_info)),
        }
    }

    /// Run one tool with its single text argument
    pub async fn dispatch(&self, kind: SalesToolKind, argument: &str) -> SalesToolOutput {
        tracing::debug!(tool = %kind, argument, "dispatching sales tool");
        match kind {
            SalesToolKind::ComparePrices => self.compare_prices.compare(argument).await,
            SalesToolKind::GetCarDetails => self.car_details.details(argument).await,
            SalesToolKind::ListAvailableCars => self.list_cars.list(),
            SalesToolKind::CollectClientInfo => self.client_info.collect(),
        }
    }

    /// Tool registry for the agent loop, in [`SalesToolKind::ALL`] order
    pub fn into_registry(self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_boxed(self.compare_prices);
        registry.register_boxed(self.car_details);
        registry.register_boxed(self.list_cars);
        registry.register_boxed(self.client_info);
        registry
    }
}
