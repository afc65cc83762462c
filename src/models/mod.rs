//! Data models for catalog lookups, pricing, orders and the account pages

mod account;
mod order;
mod part;
mod pricing;
mod search;
mod vehicle;

pub use account::{
    AccountActivityResult, DateRange, OrderHistoryFilter, OrderHistoryItem, OrderHistoryResult,
    SavedAddress, SavedAddressesResult, SavedVehicle, SavedVehiclesResult,
};
pub use order::{
    BillingInfo, ExternalOrderRequest, OrderErrorKind, OrderItem, OrderListMethod,
    OrderListRequest, OrderLookupRequest, OrderNumber, OrderStatus, OrderStatusError,
    OrderStatusResult, ShippingInfo, validate_contact,
};
pub use part::{
    PartInfo, ToolCategories, ToolCategory, ToolInfo, ToolsResult, UNKNOWN_PART_NUMBER,
};
pub use pricing::{
    DEFAULT_RECENT_MINUTES, PartWithPricing, PriceInfo, PriceStockSnapshot, PriceTrend,
    ToolWithPricing, parse_price,
};
pub use search::{
    PartSearchFilters, PartSearchOption, PartSearchResult, SearchDropdown, SearchOptions,
    WhatIsPartCalledResult, WhatIsPartCalledResults,
};
pub use vehicle::{
    Engine, PartCategory, VehicleEngines, VehicleMakes, VehicleModels, VehiclePartCategories,
    VehiclePartsResult, VehicleYears,
};
