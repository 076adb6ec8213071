// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Default Listings

use crate::types::Listing;

// (name, symbol, company, description); ids follow table order.
const DEFAULT_LISTINGS: [(&str, &str, &str, &str); 16] = [
    ("Cereals", "CRL", "Old Mills Cereal Co.", "Grain for the farms."),
    ("Chocolate", "CHC", "Cocoa Ridge Mining", "Dug out of the chocolate mines."),
    ("Butter", "BTR", "Creamery Industrial", "Churned in bulk by the factories."),
    ("Sugar", "SUG", "Sweetwater Bank", "Backed by the bank's sugar reserves."),
    ("Nuts", "NUT", "Temple Nut Trust", "Gathered at the temples."),
    ("Salt", "SLT", "Towerworks Salt", "Refined in the wizard towers."),
    ("Vanilla", "VNL", "Far Shipment Lines", "Shipped in from distant planets."),
    ("Eggs", "EGG", "Alchemy Eggworks", "Transmuted fresh every morning."),
    ("Cinnamon", "CNM", "Portal Spice Exchange", "Imported through the portals."),
    ("Cream", "CRM", "Chronos Dairy", "Whipped in the time machines."),
    ("Jam", "JAM", "Antimatter Preserves", "Condensed from stray antimatter."),
    ("White chocolate", "WCH", "Prism Confectioners", "Refracted out of pure light."),
    ("Honey", "HNY", "Lucky Hive Holdings", "Harvested when chance allows."),
    ("Cookies", "CKI", "Fractal Bakeries", "Baked inside an infinite recursion."),
    ("Recipes", "RCP", "Console Recipe Lab", "Compiled from the source."),
    ("Subsidiaries", "SBD", "Idleverse Holdings", "Shares in neighbouring universes."),
];

/// The game's standard listings, in id order.
pub fn default_listings() -> Vec<Listing> {
    DEFAULT_LISTINGS
        .iter()
        .map(|(name, symbol, company, desc)| Listing::new(name, symbol, company, desc))
        .collect()
}

pub fn find_by_symbol<'a>(listings: &'a [Listing], symbol: &str) -> Option<(u32, &'a Listing)> {
    listings
        .iter()
        .enumerate()
        .find(|(_, l)| l.symbol.eq_ignore_ascii_case(symbol))
        .map(|(i, l)| (i as u32, l))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_symbols_unique() {
        let listings = default_listings();
        let symbols: HashSet<&str> = listings.iter().map(|l| l.symbol.as_str()).collect();
        assert_eq!(symbols.len(), listings.len());
    }

    #[test]
    fn test_find_by_symbol() {
        let listings = default_listings();
        let (id, listing) = find_by_symbol(&listings, "btr").unwrap();
        assert_eq!(id, 2);
        assert_eq!(listing.name, "Butter");
        assert!(find_by_symbol(&listings, "XYZ").is_none());
    }
}
