// src/domain/normalize.rs

use crate::domain::listing::NormalizedListing;
use crate::scraper::{ListingField, RawListing};
use thiserror::Error;

// Site labels, pt-BR.
const ID_MARKER: &str = "-id-";
const LOCATION_SEPARATOR: &str = " em ";
const SIZE_LABEL: &str = "Tamanho do imóvel";
const SIZE_UNIT: &str = "m²";
const BEDROOMS_LABEL: &str = "Quantidade de quartos";
const BATHROOMS_LABEL: &str = "Quantidade de banheiros";
const PARKING_LABEL: &str = "Quantidade de vagas de garagem";
const CURRENCY: &str = "R$";
const RENT_SUFFIX: &str = "/mês";
const CONDO_MARKER: &str = "Cond. R$ ";
const IPTU_MARKER: &str = "IPTU R$ ";
const PRICE_SEPARATOR: char = '•';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("No listing id in link {link:?}")]
    MissingId { link: String },
    #[error("Listing {link} has no {field}")]
    MissingField { field: &'static str, link: String },
    #[error("Location {raw:?} lacks the \" em \" separator")]
    LocationFormat { raw: String },
    #[error("{field} {raw:?} is not a whole number")]
    NotANumber { field: &'static str, raw: String },
    #[error("{field} {raw:?} lacks its label")]
    LabelMissing { field: &'static str, raw: String },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PriceParts {
    pub price: Option<String>,
    pub condominium: Option<String>,
    pub iptu: Option<String>,
}

/// Normalizes every listing, stopping at the first malformed one.
pub fn normalize(raw: &[RawListing]) -> Result<Vec<NormalizedListing>, ParseError> {
    raw.iter().map(normalize_listing).collect()
}

pub fn normalize_listing(raw: &RawListing) -> Result<NormalizedListing, ParseError> {
    let location = required(raw, ListingField::Location)?;
    let size = required(raw, ListingField::Size)?;

    let (listing_description, region) = split_location(location)?;
    let prices = split_price(raw.get(ListingField::Price));

    Ok(NormalizedListing {
        id: parse_id(&raw.link)?,
        listing_description,
        region,
        size_m2: parse_size(size)?,
        bedrooms: parse_bedrooms(raw.get(ListingField::Bedrooms))?,
        bathrooms: parse_bathrooms(raw.get(ListingField::Bathrooms))?,
        parking_spaces: parse_parking_spaces(raw.get(ListingField::ParkingSpaces))?,
        price: prices.price,
        condominium: prices.condominium,
        iptu: prices.iptu,
        link: raw.link.clone(),
    })
}

fn required(raw: &RawListing, field: ListingField) -> Result<&str, ParseError> {
    raw.get(field).ok_or_else(|| ParseError::MissingField {
        field: field.name(),
        link: raw.link.clone(),
    })
}

/// Collapses whitespace runs (including NBSP) to single spaces.
fn clean(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// ".../apartamento-2-quartos-meireles-id-2657193155/" -> "2657193155"
pub fn parse_id(link: &str) -> Result<String, ParseError> {
    let missing = || ParseError::MissingId {
        link: link.to_string(),
    };

    let tail = link.split(ID_MARKER).nth(1).ok_or_else(missing)?;
    let id = tail.split('/').next().unwrap_or_default();
    if id.is_empty() {
        return Err(missing());
    }
    Ok(id.to_string())
}

/// "Apartamento para alugar em Meireles, Fortaleza" ->
/// ("Apartamento para alugar", "Meireles")
///
/// The region follows the last " em ", so a description that itself
/// contains " em " ("Casa em condomínio") stays whole.
pub fn split_location(raw: &str) -> Result<(String, String), ParseError> {
    let text = clean(raw);
    let (description, rest) =
        text.rsplit_once(LOCATION_SEPARATOR)
            .ok_or_else(|| ParseError::LocationFormat {
                raw: raw.to_string(),
            })?;
    let region = rest.split(',').next().unwrap_or_default();

    Ok((description.trim().to_string(), region.trim().to_string()))
}

/// "Tamanho do imóvel 80 m²" -> 80
pub fn parse_size(raw: &str) -> Result<u32, ParseError> {
    let text = clean(raw);
    let value = strip_label("size", &text, SIZE_LABEL, raw)?;
    let value = value
        .strip_suffix(SIZE_UNIT)
        .ok_or_else(|| label_missing("size", raw))?;
    parse_number("size", value, raw)
}

pub fn parse_bedrooms(raw: Option<&str>) -> Result<u32, ParseError> {
    parse_count("bedrooms", BEDROOMS_LABEL, raw)
}

pub fn parse_bathrooms(raw: Option<&str>) -> Result<u32, ParseError> {
    parse_count("bathrooms", BATHROOMS_LABEL, raw)
}

pub fn parse_parking_spaces(raw: Option<&str>) -> Result<u32, ParseError> {
    parse_count("parking_spaces", PARKING_LABEL, raw)
}

// A card without the element has none of the thing.
fn parse_count(field: &'static str, label: &str, raw: Option<&str>) -> Result<u32, ParseError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let text = clean(raw);
    parse_number(field, strip_label(field, &text, label, raw)?, raw)
}

/// A present value must carry its label; a bare number means the card
/// layout changed under us.
fn strip_label<'a>(
    field: &'static str,
    text: &'a str,
    label: &str,
    raw: &str,
) -> Result<&'a str, ParseError> {
    text.strip_prefix(label)
        .map(str::trim)
        .ok_or_else(|| label_missing(field, raw))
}

fn label_missing(field: &'static str, raw: &str) -> ParseError {
    ParseError::LabelMissing {
        field,
        raw: raw.to_string(),
    }
}

fn parse_number(field: &'static str, value: &str, raw: &str) -> Result<u32, ParseError> {
    value.trim().parse().map_err(|_| ParseError::NotANumber {
        field,
        raw: raw.to_string(),
    })
}

/// Splits "R$ 1.500/mês • Cond. R$ 300 • IPTU R$ 50" into its three amounts.
/// Each part is looked up on its own and is `None` when its marker is absent.
pub fn split_price(raw: Option<&str>) -> PriceParts {
    let Some(raw) = raw else {
        return PriceParts::default();
    };
    let text = clean(raw);

    PriceParts {
        price: rent_value(&text),
        condominium: marked_value(&text, CONDO_MARKER),
        iptu: marked_value(&text, IPTU_MARKER),
    }
}

// Only "R$ ... /mês" is a rent; a bare "R$ ..." (sale cards) is not.
fn rent_value(text: &str) -> Option<String> {
    let head = &text[..text.find(RENT_SUFFIX)?];
    let start = head.rfind(CURRENCY)?;
    non_empty(&head[start + CURRENCY.len()..])
}

fn marked_value(text: &str, marker: &str) -> Option<String> {
    let (_, rest) = text.split_once(marker)?;
    let value = rest.split(PRICE_SEPARATOR).next().unwrap_or_default();
    non_empty(value)
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
