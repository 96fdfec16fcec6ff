use crate::models::domain::PriceSample;
use crate::models::upstream::{OfferItem, OfferSearchResponse};
use chrono::NaiveDate;

/// Fixed classification table mapping raw fare-brand labels to the four
/// canonical fare classes.
const FARE_CLASSES: &[(&str, &str)] = &[
    ("Main", "Main"),
    ("Economy", "Main"),
    ("Refundable Main", "Main"),
    ("Comfort+", "Comfort+"),
    ("Refundable Delta Comfort+", "Comfort+"),
    ("Premium Select", "Premium Select"),
    ("Premium Economy", "Premium Select"),
    ("Premium Comfort", "Premium Select"),
    ("Delta One", "Delta One"),
    ("First", "Delta One"),
    ("Delta One Suites", "Delta One"),
    ("Business", "Delta One"),
    ("La Premiere", "Delta One"),
];

/// Normalize a raw fare-brand label through the classification table.
///
/// Unknown labels are tagged rather than dropped, so gaps in the table stay
/// visible in the output.
pub fn classify_fare_brand(label: &str) -> String {
    FARE_CLASSES
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, class)| (*class).to_string())
        .unwrap_or_else(|| format!("{label} (NOT_FOUND)"))
}

/// Flatten one day's offer-search response into price samples.
///
/// One sample per pricing block carrying a currency-equivalent reprice
/// amount; offers whose retail item is missing the brand or segment data are
/// skipped individually.
pub fn extract_prices(response: &OfferSearchResponse, date: NaiveDate) -> Vec<PriceSample> {
    response
        .offers_sets
        .iter()
        .flat_map(|set| set.offers.iter())
        .flat_map(|offer| offer.offer_items.iter())
        .flat_map(|item| item_samples(item, date))
        .collect()
}

fn item_samples(item: &OfferItem, date: NaiveDate) -> Vec<PriceSample> {
    let Some(retail) = item.retail_items.first() else {
        return Vec::new();
    };
    let Some(brand) = retail
        .retail_item_meta_data
        .as_ref()
        .and_then(|meta| meta.fare_information.first())
        .and_then(|fare| fare.brand_by_flight_legs.first())
        .map(|leg| leg.brand_name.replace("&#174;", ""))
    else {
        return Vec::new();
    };
    let stop_count = retail.flight_segment_ids.len().saturating_sub(1) as u32;
    let fare_class = classify_fare_brand(&brand);

    item.offer_item_pricing
        .iter()
        .filter_map(|pricing| {
            let price = pricing
                .reprice_quote_amt
                .as_ref()?
                .additional_collection_amt
                .as_ref()?
                .currency_equivalent_price
                .as_ref()?
                .rounded_numeric_part?;
            Some(PriceSample {
                date,
                fare_class: fare_class.clone(),
                price: price as i64,
                stop_count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
    }

    fn offer_item(brand: &str, price: f64, segments: usize) -> serde_json::Value {
        json!({
            "offerItemPricing": [{
                "repriceQuoteAmt": {
                    "additionalCollectionAmt": {
                        "currencyEquivalentPrice": {"roundedNumericPart": price}
                    }
                }
            }],
            "retailItems": [{
                "retailItemMetaData": {
                    "fareInformation": [{
                        "brandByFlightLegs": [{"brandName": brand}]
                    }]
                },
                "flightSegmentIds": vec!["seg"; segments],
            }]
        })
    }

    fn response(items: Vec<serde_json::Value>) -> OfferSearchResponse {
        serde_json::from_value(json!({
            "offersSets": [{"offers": [{"offerItems": items}]}]
        }))
        .unwrap()
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify_fare_brand("Economy"), "Main");
        assert_eq!(classify_fare_brand("First"), "Delta One");
        assert_eq!(classify_fare_brand("Premium Comfort"), "Premium Select");
    }

    #[test]
    fn test_unknown_label_is_tagged_not_dropped() {
        assert_eq!(
            classify_fare_brand("Basic Economy"),
            "Basic Economy (NOT_FOUND)"
        );
        let samples = extract_prices(&response(vec![offer_item("Basic Economy", 99.0, 1)]), day());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].fare_class, "Basic Economy (NOT_FOUND)");
    }

    #[test]
    fn test_stop_count_is_segments_minus_one() {
        let samples = extract_prices(&response(vec![offer_item("Main", 120.0, 3)]), day());
        assert_eq!(samples[0].stop_count, 2);

        let samples = extract_prices(&response(vec![offer_item("Main", 120.0, 1)]), day());
        assert_eq!(samples[0].stop_count, 0);
    }

    #[test]
    fn test_html_entity_stripped_from_brand() {
        let samples = extract_prices(&response(vec![offer_item("Comfort+&#174;", 80.0, 1)]), day());
        assert_eq!(samples[0].fare_class, "Comfort+");
    }

    #[test]
    fn test_pricing_without_reprice_amount_skipped() {
        let item = json!({
            "offerItemPricing": [{"totalAmt": {"amount": 10}}],
            "retailItems": [{
                "retailItemMetaData": {
                    "fareInformation": [{"brandByFlightLegs": [{"brandName": "Main"}]}]
                },
                "flightSegmentIds": ["a"],
            }]
        });
        assert!(extract_prices(&response(vec![item]), day()).is_empty());
    }

    #[test]
    fn test_missing_retail_item_skips_offer_only() {
        let bare = json!({
            "offerItemPricing": [{
                "repriceQuoteAmt": {
                    "additionalCollectionAmt": {
                        "currencyEquivalentPrice": {"roundedNumericPart": 50.0}
                    }
                }
            }],
            "retailItems": [],
        });
        let samples = extract_prices(&response(vec![bare, offer_item("Main", 120.0, 1)]), day());
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].price, 120);
    }
}
