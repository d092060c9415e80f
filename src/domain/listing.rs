use serde::Serialize;

/// A listing card after normalization, one per `RawListing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedListing {
    pub id: String,
    pub listing_description: String,
    pub region: String,
    pub size_m2: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parking_spaces: u32,

    // Amounts as shown on the card ("1.500"), without currency or "/mês".
    pub price: Option<String>,
    pub condominium: Option<String>,
    pub iptu: Option<String>,

    pub link: String,
}
