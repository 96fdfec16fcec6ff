use serde::{Deserialize, Deserializer};

/// Typed subset of the upstream seat-map response.
///
/// Only the fields this system actually consumes are modeled; everything
/// optional defaults, so upstream schema drift degrades to the skip
/// semantics of the parser instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapResponse {
    #[serde(rename = "retrieveISMResponse", default)]
    pub retrieve_ism_response: Option<IsmResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsmResponse {
    #[serde(default)]
    pub passengers: Vec<IsmPassenger>,
    #[serde(rename = "seatMapDO", default)]
    pub seat_map_do: Option<SeatMapDo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsmPassenger {
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub segment_number: Option<String>,
    #[serde(default)]
    pub seat_number: Option<String>,
    /// Departure timestamp of the matched flight leg, upstream local time.
    #[serde(default)]
    pub flight_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapDo {
    #[serde(default)]
    pub seat_cabins: Vec<SeatCabin>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatCabin {
    #[serde(default)]
    pub cabin_type: String,
    /// Seat-layout pattern, e.g. "AB-CD-EF"; groups separated by aisles.
    #[serde(default)]
    pub seat_layout: String,
    #[serde(default)]
    pub seat_rows: Vec<SeatRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRow {
    #[serde(default)]
    pub seat_columns: Vec<SeatCell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatCell {
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub occupied: Option<bool>,
    #[serde(default)]
    pub seat_offer: Vec<SeatOffer>,
}

impl SeatCell {
    /// An absent occupancy flag never invents a free seat.
    pub fn is_occupied(&self) -> bool {
        self.occupied.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatOffer {
    #[serde(default, deserialize_with = "de_opt_flexible_f64")]
    pub amount: Option<f64>,
}

/// Typed subset of the upstream offer-search response (bulk sweep).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSearchResponse {
    #[serde(default)]
    pub offers_sets: Vec<OffersSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersSet {
    #[serde(default)]
    pub offers: Vec<Offer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub offer_items: Vec<OfferItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    #[serde(default)]
    pub offer_item_pricing: Vec<OfferItemPricing>,
    #[serde(default)]
    pub retail_items: Vec<RetailItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItemPricing {
    #[serde(default)]
    pub reprice_quote_amt: Option<RepriceQuoteAmt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepriceQuoteAmt {
    #[serde(default)]
    pub additional_collection_amt: Option<AdditionalCollectionAmt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCollectionAmt {
    #[serde(default)]
    pub currency_equivalent_price: Option<CurrencyEquivalentPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyEquivalentPrice {
    #[serde(default, deserialize_with = "de_opt_flexible_f64")]
    pub rounded_numeric_part: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailItem {
    #[serde(default)]
    pub retail_item_meta_data: Option<RetailItemMetaData>,
    #[serde(default)]
    pub flight_segment_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailItemMetaData {
    #[serde(default)]
    pub fare_information: Vec<FareInformation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareInformation {
    #[serde(default)]
    pub brand_by_flight_legs: Vec<BrandByFlightLeg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandByFlightLeg {
    #[serde(default)]
    pub brand_name: String,
}

/// Upstream serializes numeric fields inconsistently (string or number).
fn de_opt_flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Segment numbers arrive as either a JSON string or a number.
fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
