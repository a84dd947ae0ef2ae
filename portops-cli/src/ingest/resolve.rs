//! Get-or-create entity resolution for validated rows
//!
//! Resolution order is country, shipping line, cargo type, ship; a ship row
//! needs the other three resolved first. Every creation is log-visible. A
//! persistence failure is caught by the caller and only abandons that row.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::distr::{Alphanumeric, SampleString};
use sqlx::SqlitePool;

use super::extract::RawOperation;
use crate::model::{CargoCategory, CargoType, Country, LineCategory, Ship, ShippingLine};
use crate::storage::repository::{cargo_types, countries, operations, shipping_lines, ships};

/// Known spelling pairs normalized to one canonical matching form
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("HONGKONG", "HONG KONG"),
    ("SINGAPORE", "SINGAPURA"),
];

/// Display names for countries commonly seen in the sheets; anything else is
/// title-cased.
const CANONICAL_COUNTRY_NAMES: &[(&str, &str)] = &[
    ("INDONESIA", "Indonesia"),
    ("PANAMA", "Panama"),
    ("LIBERIA", "Liberia"),
    ("VIETNAM", "Vietnam"),
    ("SINGAPURA", "Singapore"),
    ("SINGAPORE", "Singapore"),
    ("HONGKONG", "Hong Kong"),
    ("HONG KONG", "Hong Kong"),
];

/// Best-effort ISO 3166 alpha-2 codes; fallback is the name's first two
/// letters plus collision avoidance.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("INDONESIA", "ID"),
    ("SINGAPORE", "SG"),
    ("SINGAPURA", "SG"),
    ("MALAYSIA", "MY"),
    ("THAILAND", "TH"),
    ("PHILIPPINES", "PH"),
    ("VIETNAM", "VN"),
    ("CHINA", "CN"),
    ("JAPAN", "JP"),
    ("KOREA", "KR"),
    ("HONG KONG", "HK"),
    ("HONGKONG", "HK"),
    ("PANAMA", "PA"),
    ("LIBERIA", "LR"),
    ("MARSHALL ISLANDS", "MH"),
    ("BAHAMAS", "BS"),
    ("MALTA", "MT"),
    ("NORWAY", "NO"),
    ("NORWEGIAN", "NO"),
    ("UNITED STATES", "US"),
    ("UNITED KINGDOM", "GB"),
    ("NETHERLANDS", "NL"),
    ("GERMANY", "DE"),
    ("FRANCE", "FR"),
    ("ITALY", "IT"),
    ("SPAIN", "ES"),
    ("GREECE", "GR"),
    ("TURKEY", "TR"),
    ("INDIA", "IN"),
    ("AUSTRALIA", "AU"),
    ("NEW ZEALAND", "NZ"),
    ("CANADA", "CA"),
    ("BRAZIL", "BR"),
    ("ARGENTINA", "AR"),
    ("CHILE", "CL"),
    ("MEXICO", "MX"),
    ("SOUTH AFRICA", "ZA"),
    ("EGYPT", "EG"),
    ("RUSSIA", "RU"),
    ("UKRAINE", "UA"),
    ("POLAND", "PL"),
    ("SWEDEN", "SE"),
    ("DENMARK", "DK"),
    ("FINLAND", "FI"),
    ("BELGIUM", "BE"),
    ("PORTUGAL", "PT"),
    ("IRELAND", "IE"),
    ("AUSTRIA", "AT"),
    ("SWITZERLAND", "CH"),
    ("CZECH REPUBLIC", "CZ"),
    ("HUNGARY", "HU"),
    ("ROMANIA", "RO"),
    ("BULGARIA", "BG"),
    ("CROATIA", "HR"),
    ("SERBIA", "RS"),
    ("SLOVENIA", "SI"),
    ("SLOVAKIA", "SK"),
    ("ESTONIA", "EE"),
    ("LATVIA", "LV"),
    ("LITHUANIA", "LT"),
    ("ANTIGUA AND BARBUDA", "AG"),
    ("ANTIGUA & BARBUDA", "AG"),
];

const PLACEHOLDER_FLAG: &str = "\u{1F3F3}\u{FE0F}";

/// Resolve all referenced entities and persist one operation record.
pub async fn create_operation(
    pool: &SqlitePool,
    user_id: i64,
    op: &RawOperation,
) -> Result<i64> {
    let country = get_or_create_country(pool, &op.country_name).await?;
    let line = get_or_create_shipping_line(pool, &op.line_name).await?;
    let cargo = get_or_create_cargo_type(pool, &op.cargo_name, op.category).await?;
    let ship = get_or_create_ship(pool, &op.ship_name, country.id, line.id).await?;

    let operation_date = NaiveDate::from_ymd_opt(op.year, op.month, 1)
        .with_context(|| format!("Invalid operation month: {}/{}", op.month, op.year))?;
    let remarks = format!("Imported from Excel - {}", op.category.as_str());

    operations::insert(
        pool,
        user_id,
        ship.id,
        cargo.id,
        operation_date,
        op.unloading,
        op.loading,
        &remarks,
    )
    .await
}

/// Canonical matching form: uppercased, whitespace collapsed, `&` spelled
/// out, known alias pairs folded together.
pub fn normalize_for_matching(name: &str) -> String {
    let mut normalized = name
        .trim()
        .to_uppercase()
        .replace('&', "AND")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for (variant, canonical) in COUNTRY_ALIASES {
        normalized = normalized.replace(variant, canonical);
    }
    normalized.trim().to_string()
}

/// Display form used when creating a new country
fn canonical_country_name(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    for (key, display) in CANONICAL_COUNTRY_NAMES {
        if upper == *key {
            return (*display).to_string();
        }
    }
    title_case(name.trim())
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn get_or_create_country(pool: &SqlitePool, name: &str) -> Result<Country> {
    let trimmed = name.trim();
    let name = if trimmed.is_empty() { "Unknown" } else { trimmed };
    let canonical = canonical_country_name(name);

    if let Some(country) = find_existing_country(pool, &canonical).await? {
        return Ok(country);
    }

    let code = generate_country_code(pool, &canonical).await?;
    let alpha3 = generate_alpha3_code(pool, &canonical).await?;
    let country = countries::insert(pool, &canonical, &code, &alpha3, PLACEHOLDER_FLAG).await?;
    log::info!("Created new country: {}", canonical);
    Ok(country)
}

/// Exact case-insensitive match first, then a full-table scan under the
/// normalization function.
async fn find_existing_country(pool: &SqlitePool, name: &str) -> Result<Option<Country>> {
    if let Some(country) = countries::find_by_name_ci(pool, name).await? {
        log::debug!("Found exact match for country: {}", name);
        return Ok(Some(country));
    }

    let normalized_input = normalize_for_matching(name);
    for country in countries::all(pool).await? {
        if normalize_for_matching(&country.name) == normalized_input {
            log::info!("Country '{}' matched existing '{}'", name, country.name);
            return Ok(Some(country));
        }
    }
    Ok(None)
}

fn first_letters(name: &str, count: usize) -> String {
    name.chars().take(count).collect::<String>().to_uppercase()
}

async fn generate_country_code(pool: &SqlitePool, name: &str) -> Result<String> {
    let upper = name.to_uppercase();
    let base = COUNTRY_CODES
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| first_letters(name, 2));

    if !countries::code_exists(pool, &base).await? {
        return Ok(base);
    }
    for counter in 1..=99u32 {
        let candidate = format!("{}{}", base, counter);
        if !countries::code_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Ok(Alphanumeric.sample_string(&mut rand::rng(), 2).to_uppercase())
}

async fn generate_alpha3_code(pool: &SqlitePool, name: &str) -> Result<String> {
    let base = first_letters(name, 3);
    if !countries::alpha3_exists(pool, &base).await? {
        return Ok(base);
    }
    let stem = first_letters(name, 2);
    for counter in 1..=99u32 {
        let candidate = format!("{}{}", stem, counter);
        if !countries::alpha3_exists(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Ok(Alphanumeric.sample_string(&mut rand::rng(), 3).to_uppercase())
}

pub async fn get_or_create_shipping_line(pool: &SqlitePool, name: &str) -> Result<ShippingLine> {
    let trimmed = name.trim();
    let name = if trimmed.is_empty() { "Unknown" } else { trimmed };

    if let Some(line) = shipping_lines::find_by_name(pool, name).await? {
        return Ok(line);
    }

    let category = LineCategory::from_line_name(name);
    let line = shipping_lines::insert(pool, name, category).await?;
    log::info!("Created new shipping line: {} ({})", name, category.as_str());
    Ok(line)
}

pub async fn get_or_create_cargo_type(
    pool: &SqlitePool,
    name: &str,
    category: CargoCategory,
) -> Result<CargoType> {
    let trimmed = name.trim();
    let name = if trimmed.is_empty() { "Unknown" } else { trimmed };

    if let Some(cargo) = cargo_types::find_by_name(pool, name).await? {
        return Ok(cargo);
    }

    let cargo = cargo_types::insert(pool, name, category).await?;
    log::info!("Created new cargo type: {}", name);
    Ok(cargo)
}

pub async fn get_or_create_ship(
    pool: &SqlitePool,
    name: &str,
    country_id: i64,
    shipping_line_id: i64,
) -> Result<Ship> {
    let name = name.trim();

    if let Some(ship) = ships::find_by_name(pool, name).await? {
        return Ok(ship);
    }

    let ship = ships::insert(pool, name, country_id, shipping_line_id).await?;
    log::info!("Created new ship: {}", name);
    Ok(ship)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    #[test]
    fn normalization_folds_aliases() {
        assert_eq!(normalize_for_matching("Hongkong"), "HONG KONG");
        assert_eq!(normalize_for_matching("Hong  Kong"), "HONG KONG");
        assert_eq!(normalize_for_matching("Singapore"), "SINGAPURA");
        assert_eq!(normalize_for_matching("singapura"), "SINGAPURA");
        assert_eq!(
            normalize_for_matching("Antigua & Barbuda"),
            "ANTIGUA AND BARBUDA"
        );
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_country_name("INDONESIA"), "Indonesia");
        assert_eq!(canonical_country_name("SINGAPURA"), "Singapore");
        assert_eq!(canonical_country_name("marshall islands"), "Marshall Islands");
    }

    #[tokio::test]
    async fn country_resolution_is_idempotent() {
        let pool = storage::open_in_memory().await.unwrap();

        let first = get_or_create_country(&pool, "Indonesia").await.unwrap();
        let second = get_or_create_country(&pool, "INDONESIA").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.code, "ID");
        assert_eq!(countries::all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn alias_spellings_resolve_to_one_country() {
        let pool = storage::open_in_memory().await.unwrap();

        let first = get_or_create_country(&pool, "Singapura").await.unwrap();
        let second = get_or_create_country(&pool, "Singapore").await.unwrap();
        assert_eq!(first.id, second.id);

        let hk = get_or_create_country(&pool, "Hongkong").await.unwrap();
        let hk2 = get_or_create_country(&pool, "Hong Kong").await.unwrap();
        assert_eq!(hk.id, hk2.id);
        assert_eq!(countries::all(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn country_code_collisions_get_suffixes() {
        let pool = storage::open_in_memory().await.unwrap();

        // Neither name is in the static code table; both start with "IC"
        let first = get_or_create_country(&pool, "Iceland").await.unwrap();
        let second = get_or_create_country(&pool, "Icaria").await.unwrap();
        assert_eq!(first.code, "IC");
        assert_eq!(second.code, "IC1");
        assert_ne!(first.alpha3, second.alpha3);
    }

    #[tokio::test]
    async fn blank_country_becomes_unknown() {
        let pool = storage::open_in_memory().await.unwrap();
        let country = get_or_create_country(&pool, "   ").await.unwrap();
        assert_eq!(country.name, "Unknown");
        assert_eq!(country.flag_emoji, PLACEHOLDER_FLAG);
    }

    #[tokio::test]
    async fn shipping_line_category_inference() {
        let pool = storage::open_in_memory().await.unwrap();

        let ocean = get_or_create_shipping_line(&pool, "Ocean Going").await.unwrap();
        assert_eq!(ocean.category, LineCategory::OceanGoing);

        let other = get_or_create_shipping_line(&pool, "Meratus").await.unwrap();
        assert_eq!(other.category, LineCategory::InterIsland);

        let again = get_or_create_shipping_line(&pool, "Meratus").await.unwrap();
        assert_eq!(other.id, again.id);
    }

    #[tokio::test]
    async fn ship_resolution_links_country_and_line() {
        let pool = storage::open_in_memory().await.unwrap();

        let country = get_or_create_country(&pool, "Panama").await.unwrap();
        let line = get_or_create_shipping_line(&pool, "Line A").await.unwrap();

        let ship = get_or_create_ship(&pool, "MV Test", country.id, line.id)
            .await
            .unwrap();
        assert_eq!(ship.country_id, country.id);
        assert_eq!(ship.shipping_line_id, line.id);

        let again = get_or_create_ship(&pool, "MV Test", country.id, line.id)
            .await
            .unwrap();
        assert_eq!(ship.id, again.id);
    }
}
