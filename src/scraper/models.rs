use serde::Serialize;

// li[data-cy="rp-property-cd"]
//  ├── a[href]                      -> link
//  ├── h2  location-txt             -> "Apartamento ... em Meireles, Fortaleza"
//  ├── p   street-txt               -> location_detail
//  ├── li  propertyArea-txt         -> "Tamanho do imóvel 80 m²"
//  ├── li  bedroomQuantity-txt      -> "Quantidade de quartos 2"
//  ├── li  bathroomQuantity-txt     -> "Quantidade de banheiros 1"
//  ├── li  parkingSpacesQuantity-txt
//  └── div price-txt                -> "R$ 1.500/mês • Cond. R$ 300 • IPTU R$ 50"

/// The optional text fields of a listing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    Location,
    LocationDetail,
    Size,
    Bedrooms,
    Bathrooms,
    ParkingSpaces,
    Price,
}

impl ListingField {
    pub fn name(self) -> &'static str {
        match self {
            ListingField::Location => "location",
            ListingField::LocationDetail => "location_detail",
            ListingField::Size => "size",
            ListingField::Bedrooms => "bedrooms",
            ListingField::Bathrooms => "bathrooms",
            ListingField::ParkingSpaces => "parking_spaces",
            ListingField::Price => "price",
        }
    }
}

/// One listing card as found on a results page: verbatim text, `None` where
/// the card had no element for the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawListing {
    pub link: String,
    pub location: Option<String>,
    pub location_detail: Option<String>,
    pub size: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub parking_spaces: Option<String>,
    pub price: Option<String>,
}

impl RawListing {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: ListingField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: ListingField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: ListingField) -> &Option<String> {
        match field {
            ListingField::Location => &self.location,
            ListingField::LocationDetail => &self.location_detail,
            ListingField::Size => &self.size,
            ListingField::Bedrooms => &self.bedrooms,
            ListingField::Bathrooms => &self.bathrooms,
            ListingField::ParkingSpaces => &self.parking_spaces,
            ListingField::Price => &self.price,
        }
    }

    fn slot_mut(&mut self, field: ListingField) -> &mut Option<String> {
        match field {
            ListingField::Location => &mut self.location,
            ListingField::LocationDetail => &mut self.location_detail,
            ListingField::Size => &mut self.size,
            ListingField::Bedrooms => &mut self.bedrooms,
            ListingField::Bathrooms => &mut self.bathrooms,
            ListingField::ParkingSpaces => &mut self.parking_spaces,
            ListingField::Price => &mut self.price,
        }
    }
}
