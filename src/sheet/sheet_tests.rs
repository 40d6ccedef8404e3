//! Unit tests for sheet parsing: grid, header detection, normalization, identity.

#[cfg(test)]
mod sheet_tests {
    use crate::data::types::Side;
    use crate::sheet::grid::*;
    use crate::sheet::header::*;
    use crate::sheet::identity::*;
    use crate::sheet::normalize::*;
    use crate::sheet::source::export_url;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn required() -> Vec<String> {
        vec!["asset".into(), "type".into(), "price at trade".into()]
    }

    // ============= Grid Tests =============

    #[test]
    fn test_parse_grid_trims_cells() {
        let grid = parse_grid("a , b,   \n  c,d\n").unwrap();
        assert_eq!(grid, vec![row(&["a", "b", ""]), row(&["c", "d"])]);
    }

    #[test]
    fn test_parse_grid_quoted_fields() {
        let raw = "Asset,Notes\n\"BTC\",\"line one\nline two, with comma\"\nETH,\"say \"\"hi\"\"\"\n";
        let grid = parse_grid(raw).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1][1], "line one\nline two, with comma");
        assert_eq!(grid[2][1], "say \"hi\"");
    }

    #[test]
    fn test_parse_grid_does_not_pad_short_rows() {
        let grid = parse_grid("a,b,c\nd\n").unwrap();
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[1].len(), 1);
    }

    #[test]
    fn test_parse_grid_strips_bom() {
        let grid = parse_grid("\u{feff}Asset,Type\n").unwrap();
        assert_eq!(grid[0][0], "Asset");
    }

    #[test]
    fn test_parse_grid_empty_input() {
        assert!(parse_grid("").unwrap().is_empty());
    }

    #[test]
    fn test_is_blank_row() {
        assert!(is_blank_row(&row(&["", "", ""])));
        assert!(is_blank_row(&[]));
        assert!(!is_blank_row(&row(&["", "x"])));
    }

    // ============= Header Locator Tests =============

    #[test]
    fn test_locate_header_skips_decorative_rows() {
        let grid = vec![
            row(&["My Trading Sheet", "", ""]),
            row(&["", "Updated weekly", ""]),
            row(&["Trade No.", "Asset", "Type", "Price at Trade"]),
            row(&["1", "BTC", "Buy", "100"]),
        ];
        assert_eq!(locate_header(&grid, &required()), Some(2));
    }

    #[test]
    fn test_locate_header_is_case_insensitive() {
        let grid = vec![row(&["ASSET", "type", "PRICE AT TRADE"])];
        assert_eq!(locate_header(&grid, &required()), Some(0));
    }

    #[test]
    fn test_locate_header_takes_first_match() {
        let grid = vec![
            row(&["Asset", "Type", "Price at Trade"]),
            row(&["Asset", "Type", "Price at Trade"]),
        ];
        assert_eq!(locate_header(&grid, &required()), Some(0));
    }

    #[test]
    fn test_locate_header_requires_every_label() {
        let grid = vec![row(&["Asset", "Type", "Entry"]), row(&["BTC", "Buy", "1"])];
        assert_eq!(locate_header(&grid, &required()), None);
    }

    #[test]
    fn test_locate_header_whole_cell_match_only() {
        let grid = vec![row(&["Asset name", "Type", "Price at Trade"])];
        assert_eq!(locate_header(&grid, &required()), None);
    }

    // ============= Label / Alias Tests =============

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Price at Trade"), "price_at_trade");
        assert_eq!(normalize_label("Stop Loss / Strike"), "stop_loss_/_strike");
        assert_eq!(normalize_label("Trade  No."), "trade_no.");
        assert_eq!(normalize_label("EXIT $"), "exit_$");
    }

    #[test]
    fn test_alias_priority_first_non_empty_wins() {
        let header = row(&["Ticker", "Coin", "Asset"]);
        let labeled = LabeledRow::new(&header, &row(&["T", "C", ""]));
        assert_eq!(labeled.resolve(CanonicalField::Asset), "C");

        let labeled = LabeledRow::new(&header, &row(&["T", "C", "A"]));
        assert_eq!(labeled.resolve(CanonicalField::Asset), "A");
    }

    #[test]
    fn test_labeled_row_missing_cells_are_empty() {
        let header = row(&["Asset", "Type", "Notes"]);
        let labeled = LabeledRow::new(&header, &row(&["BTC"]));
        assert_eq!(labeled.resolve(CanonicalField::Asset), "BTC");
        assert_eq!(labeled.resolve(CanonicalField::Notes), "");
    }

    #[test]
    fn test_every_field_has_aliases() {
        for field in CanonicalField::ALL {
            assert!(!field.aliases().is_empty(), "{:?} has no aliases", field);
        }
    }

    // ============= Side Tests =============

    #[test]
    fn test_derive_side() {
        assert_eq!(derive_side("Sell"), Side::Sell);
        assert_eq!(derive_side("SELL CALL"), Side::Sell);
        assert_eq!(derive_side("Long"), Side::Buy);
        assert_eq!(derive_side("buy"), Side::Buy);
        assert_eq!(derive_side("Short"), Side::Buy);
        assert_eq!(derive_side(""), Side::Buy);
    }

    // ============= Numeric Sanitization Tests =============

    #[test]
    fn test_sanitize_number_currency() {
        assert_eq!(sanitize_number("$1,234.50"), Some(dec!(1234.5)));
        assert_eq!(sanitize_number("\" 42 \""), Some(dec!(42)));
        assert_eq!(sanitize_number("€ 3.5"), Some(dec!(3.5)));
    }

    #[test]
    fn test_sanitize_number_absent() {
        assert_eq!(sanitize_number(""), None);
        assert_eq!(sanitize_number("   "), None);
        assert_eq!(sanitize_number("abc"), None);
        assert_eq!(sanitize_number("12%"), None);
    }

    #[test]
    fn test_sanitize_number_zero_is_present() {
        assert_eq!(sanitize_number("0"), Some(dec!(0)));
    }

    #[test]
    fn test_sanitize_number_rejects_negative() {
        assert_eq!(sanitize_number("-5"), None);
    }

    #[test]
    fn test_sanitize_number_scientific() {
        assert_eq!(sanitize_number("1e3"), Some(dec!(1000)));
    }

    // ============= Trade Date Tests =============

    #[test]
    fn test_parse_trade_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_trade_date("2025-03-14"), expected);
        assert_eq!(parse_trade_date("03/14/2025"), expected);
        assert_eq!(parse_trade_date("14/03/2025"), expected);
        assert_eq!(parse_trade_date("14.03.2025"), expected);
        assert_eq!(parse_trade_date("14 Mar 2025"), expected);
        assert_eq!(parse_trade_date("2025-03-14T09:30:00Z"), expected);
    }

    #[test]
    fn test_parse_trade_date_garbage() {
        assert_eq!(parse_trade_date(""), None);
        assert_eq!(parse_trade_date("soon"), None);
    }

    // ============= Identity Tests =============

    #[test]
    fn test_identity_from_trade_number() {
        let id = resolve_identity("12", "BTC", "Buy", Some(dec!(100)), "2025-01-01");
        assert_eq!(id, "trade#12:BTC");
        assert!(!is_fallback_identity(&id));
    }

    #[test]
    fn test_identity_from_trade_number_ignores_other_fields() {
        let a = resolve_identity("12", "BTC", "Buy", Some(dec!(100)), "2025-01-01");
        let b = resolve_identity("12", "BTC", "Sell", Some(dec!(999)), "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_identity_is_deterministic() {
        let a = resolve_identity("", "ETH", "long", Some(dec!(3000.0)), "2025-01-01");
        let b = resolve_identity("", "ETH", "long", Some(dec!(3000)), "2025-01-01");
        assert_eq!(a, b);
        assert!(is_fallback_identity(&a));
        assert!(a.contains("\"LONG\""));
    }

    #[test]
    fn test_fallback_identity_changes_with_entry() {
        let a = resolve_identity("", "ETH", "long", Some(dec!(3000)), "2025-01-01");
        let b = resolve_identity("", "ETH", "long", Some(dec!(3100)), "2025-01-01");
        assert_ne!(a, b);
    }

    // ============= Row Normalizer Tests =============

    fn sheet_header() -> Vec<String> {
        row(&[
            "Trade No.",
            "Date",
            "Asset",
            "Type",
            "Price at Trade",
            "Target",
            "Stop Loss",
            "Trade Size",
            "Status",
            "Notes",
        ])
    }

    #[test]
    fn test_normalize_row_full() {
        let draft = normalize_row(
            &sheet_header(),
            &row(&[
                "1",
                "2025-01-02",
                "BTC",
                "Long",
                "$100",
                "120",
                "90",
                "5%",
                "Open",
                "first entry",
            ]),
        )
        .unwrap();

        assert_eq!(draft.identity, "trade#1:BTC");
        assert_eq!(draft.trade_date, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert_eq!(draft.asset, "BTC");
        assert_eq!(draft.side, Side::Buy);
        assert_eq!(draft.entry_price, Some(dec!(100)));
        assert_eq!(draft.target_price, Some(dec!(120)));
        assert_eq!(draft.stop_price, Some(dec!(90)));
        assert_eq!(draft.weight, None);
        assert_eq!(draft.status, "Open");
        assert_eq!(draft.notes, "first entry");
    }

    #[test]
    fn test_normalize_row_without_asset_is_discarded() {
        let draft = normalize_row(&sheet_header(), &row(&["", "", "", "Total", "1,000"]));
        assert!(draft.is_none());
    }

    #[test]
    fn test_normalize_row_same_input_same_identity() {
        let cells = row(&["7", "", "SOL", "Sell", "150"]);
        let a = normalize_row(&sheet_header(), &cells).unwrap();
        let b = normalize_row(&sheet_header(), &cells).unwrap();
        assert_eq!(a.identity, b.identity);
        assert_eq!(a.side, Side::Sell);
    }

    #[test]
    fn test_normalize_row_alias_headers() {
        let header = row(&["Coin", "Type", "Entry", "Exit $", "SL", "Allocation", "State"]);
        let draft = normalize_row(&header, &row(&["ADA", "Buy", "0.5", "0.8", "0.4", "10", "Closed"])).unwrap();
        assert_eq!(draft.asset, "ADA");
        assert_eq!(draft.entry_price, Some(dec!(0.5)));
        assert_eq!(draft.target_price, Some(dec!(0.8)));
        assert_eq!(draft.stop_price, Some(dec!(0.4)));
        assert_eq!(draft.weight, Some(dec!(10)));
        assert_eq!(draft.status, "Closed");
        assert!(is_fallback_identity(&draft.identity));
    }

    // ============= Export URL Tests =============

    #[test]
    fn test_export_url_from_edit_link() {
        let url = export_url("https://docs.google.com/spreadsheets/d/abc-DEF_123/edit#gid=456");
        assert_eq!(
            url,
            "https://docs.google.com/spreadsheets/d/abc-DEF_123/export?format=csv&gid=456"
        );
    }

    #[test]
    fn test_export_url_query_gid() {
        let url = export_url("https://docs.google.com/spreadsheets/d/xyz/edit?usp=sharing&gid=7");
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/xyz/export?format=csv&gid=7");
    }

    #[test]
    fn test_export_url_without_gid() {
        let url = export_url("https://docs.google.com/spreadsheets/d/xyz/edit");
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/xyz/export?format=csv");
    }

    #[test]
    fn test_export_url_fallback_rewrite() {
        assert_eq!(
            export_url("https://sheets.example.com/book/edit"),
            "https://sheets.example.com/book/export?format=csv"
        );
        assert_eq!(
            export_url("https://sheets.example.com/book/edit?tab=1"),
            "https://sheets.example.com/book/export?tab=1&format=csv"
        );
    }

    #[test]
    fn test_export_url_already_export() {
        let url = "https://sheets.example.com/book/export?format=csv";
        assert_eq!(export_url(url), url);
    }
}
