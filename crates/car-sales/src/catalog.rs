//! Stock Catalog
//!
//! The cars the dealership has on the lot. Built once at startup and read-only
//! afterwards. Keys are lowercase model names; lookups ignore case but
//! otherwise require an exact match.

use serde::{Deserialize, Serialize};

/// A car in stock
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Normalized (lowercase) model name, e.g. "toyota corolla"
    pub model: String,

    /// Asking price in whole dollars
    pub price: u64,

    /// Condition and equipment
    pub details: String,

    /// Selling points
    pub benefits: String,
}

impl CatalogEntry {
    pub fn new(
        model: impl AsRef<str>,
        price: u64,
        details: impl Into<String>,
        benefits: impl Into<String>,
    ) -> Self {
        Self {
            model: normalize_model(model.as_ref()),
            price,
            details: details.into(),
            benefits: benefits.into(),
        }
    }
}

/// Ordered, immutable set of cars in stock
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Catalog with no cars
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries, keeping their order.
    ///
    /// A repeated model replaces the earlier entry in place.
    pub fn with_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::empty();
        for entry in entries {
            match catalog.entries.iter_mut().find(|e| e.model == entry.model) {
                Some(existing) => *existing = entry,
                None => catalog.entries.push(entry),
            }
        }
        catalog
    }

    /// The dealership's stock list
    pub fn default_stock() -> Self {
        Self::with_entries(
            DEFAULT_STOCK
                .iter()
                .map(|&(model, price, details, benefits)| CatalogEntry::new(model, price, details, benefits)),
        )
    }

    /// Case-insensitive exact lookup
    pub fn lookup(&self, model: &str) -> Option<&CatalogEntry> {
        let key = normalize_model(model);
        self.entries.iter().find(|e| e.model == key)
    }

    /// Model names in catalog order
    pub fn list_all(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.model.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercase, with surrounding whitespace removed
pub fn normalize_model(model: &str) -> String {
    model.trim().to_lowercase()
}

/// Upper-case the first character and lower-case the rest ("bmw 3 series" → "Bmw 3 series")
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Dollar amount with thousands separators ("$23,000")
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${}", grouped)
}

const DEFAULT_STOCK: &[(&str, u64, &str, &str)] = &[
    ("toyota corolla", 23_000, "2023 Toyota Corolla, excellent condition, low mileage, sunroof.", "Reliable, fuel-efficient, perfect for commutes."),
    ("honda vezel", 26_000, "2022 Honda Vezel, hybrid, well-maintained, navigation system.", "Eco-friendly, spacious, advanced features."),
    ("ford mustang", 35_000, "2021 Ford Mustang, sports edition, powerful engine, leather interior.", "Performance-driven, stylish, thrilling to drive."),
    ("nissan rogue", 28_000, "2023 Nissan Rogue, AWD, family-friendly, spacious cargo.", "Safe, comfortable, ideal for road trips."),
    ("chevrolet silverado", 40_000, "2020 Chevrolet Silverado, truck, heavy duty, tow package.", "Powerful, durable, perfect for work or play."),
    ("mercedes-benz c-class", 45_000, "2022 Mercedes-Benz C-Class, luxury sedan, premium sound, advanced safety.", "Luxurious, refined, top-tier performance."),
    ("bmw 3 series", 42_000, "2023 BMW 3 Series, sports sedan, dynamic handling, tech-packed.", "Sporty, agile, cutting-edge technology."),
    ("audi a4", 43_000, "2022 Audi A4, premium sedan, quattro AWD, virtual cockpit.", "Elegant, all-weather capable, sophisticated design."),
    ("volkswagen golf", 25_000, "2023 Volkswagen Golf, hatchback, sporty, fuel-efficient.", "Practical, fun to drive, economical."),
    ("hyundai tucson", 27_000, "2023 Hyundai Tucson, SUV, modern design, smart features.", "Stylish, spacious, feature-rich."),
    ("kia sportage", 26_500, "2022 Kia Sportage, SUV, reliable, comfortable ride.", "Dependable, comfortable, value-packed."),
    ("subaru outback", 30_000, "2023 Subaru Outback, AWD, adventure-ready, spacious interior.", "Rugged, safe, perfect for outdoor enthusiasts."),
    ("lexus rx", 50_000, "2022 Lexus RX, smooth ride, premium features.", "Luxurious, comfortable, exceptional reliability."),
    ("tesla model 3", 48_000, "2023 Tesla Model 3, electric sedan, autopilot, long range.", "Electric, high-tech, environmentally friendly."),
    ("porsche 911", 120_000, "2021 Porsche 911, sports car, high performance, iconic design.", "High-performance, iconic, luxury sports car."),
    ("jeep wrangler", 38_000, "2023 Jeep Wrangler, off-road, rugged, convertible.", "Off-road capable, adventurous, iconic design."),
    ("ram 1500", 42_000, "2022 Ram 1500, pickup truck, powerful, comfortable interior.", "Powerful, versatile, comfortable for work or play."),
    ("mini cooper", 24_000, "2023 Mini Cooper, compact, stylish, fun to drive.", "Stylish, compact, fun and agile."),
    ("land rover defender", 60_000, "2022 Land Rover Defender, off-road SUV, luxurious, robust.", "Luxurious, off-road capable, robust and reliable."),
    ("volvo xc90", 55_000, "2023 Volvo XC90, safest features, spacious.", "Safe, spacious, luxurious and dependable."),
];
