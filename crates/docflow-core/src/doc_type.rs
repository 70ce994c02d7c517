//! SAP sales-document category codes (VBTYP).
//!
//! Maps the single-character category code stored in `VBTYP_N` / `VBTYP_V`
//! to its descriptive label. Unknown codes pass through unchanged, so
//! [`label`] never fails.

/// The code SAP leaves unassigned but which still shows up in extracts.
pub const RESERVED_CODE: &str = "l";

/// Return the descriptive label for a document-category code.
///
/// Falls back to `code` itself when the code is not in the table.
pub fn label(code: &str) -> &str {
    known_label(code).unwrap_or(code)
}

/// Look up a code without falling back.
pub fn known_label(code: &str) -> Option<&'static str> {
    let label = match code {
        "A" => "Inquiry",
        "B" => "Quotation",
        "C" => "Order",
        "D" => "Item proposal",
        "E" => "Scheduling agreement",
        "F" => "Scheduling agreement with external service agent",
        "G" => "Contract",
        "H" => "Returns",
        "I" => "Order w/o charge",
        "J" => "Delivery",
        "K" => "Credit memo request",
        "L" => "Debit memo request",
        "M" => "Invoice",
        "N" => "Invoice cancellation",
        "O" => "Credit memo",
        "P" => "Debit memo",
        "Q" => "WMS transfer order",
        "R" => "Goods movement",
        "S" => "Credit memo cancellation",
        "T" => "Returns delivery for order",
        "U" => "Pro forma invoice",
        "V" => "Purchase Order",
        "W" => "Independent reqts plan",
        "X" => "Handling unit",
        "0" => "Master contract",
        "1" => "Sales activities (CAS)",
        "2" => "External transaction",
        "3" => "Invoice list",
        "4" => "Credit memo list",
        "5" => "Intercompany invoice",
        "6" => "Intercompany credit memo",
        "7" => "Delivery/shipping notification",
        "8" => "Shipment",
        "a" => "Shipment costs",
        "b" => "CRMO pportunity",
        "c" => "Unverified delivery",
        "d" => "Trading Contract",
        "e" => "Allocation table",
        "f" => "Additional Billing Documents",
        "g" => "Rough Goods Receipt (onlyIS-Retail)",
        "h" => "Cancel Goods Issue",
        "i" => "Goods receipt",
        "j" => "JIT call",
        "k" => "Agency Document",
        "n" | "o" | "q" | "^" | "|" => "Reserved",
        "p" => "GoodsMovement(Documentation)",
        "r" => "TD Transport (onlyIS-Oil)",
        "s" => "Load Confirmation, Reposting (OnlyIS-Oil)",
        "t" => "Gain / Loss (OnlyIS-Oil)",
        "u" => "Reentry into Storage (OnlyIS-Oil)",
        "v" => "Data Collation (onlyIS-Oil)",
        "w" => "Reservation (OnlyIS-Oil)",
        "x" => "Load Confirmation, Goods Receipt (OnlyIS-Oil)",
        "$" => "(AFS)",
        "+" | "-" => "Accounting Document (Temporary)",
        "#" => "Revenue Recognition (Temporary)",
        "~" => "Revenue Cancellation (Temporary)",
        // Extracts written through a Latin-1 round trip carry U+FFFD here.
        "\u{FFFD}" => "Revenue Recognition / New View (Temporary)",
        "NULL" => "Revenue Cancellation / NewView (Temporary)",
        ":" => "Service Order",
        "." => "Service Notification",
        "&" => "Warehouse Document",
        "*" => "Pick Order",
        "," => "Shipment Document",
        _ => return None,
    };
    Some(label)
}

/// Why a code deserves a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeDiagnostic {
    /// The resolved label is a single blank.
    BlankLabel,
    /// The code is [`RESERVED_CODE`].
    ReservedCode,
}

/// Flag codes that resolve to a blank label or equal the reserved code.
///
/// This is diagnostic only; callers log and keep the row.
pub fn diagnose(code: &str) -> Option<CodeDiagnostic> {
    let resolved = label(code);
    if resolved == " " {
        Some(CodeDiagnostic::BlankLabel)
    } else if code == RESERVED_CODE || resolved == RESERVED_CODE {
        Some(CodeDiagnostic::ReservedCode)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(label("C"), "Order");
        assert_eq!(label("J"), "Delivery");
        assert_eq!(label("M"), "Invoice");
        assert_eq!(label("k"), "Agency Document");
        assert_eq!(label("NULL"), "Revenue Cancellation / NewView (Temporary)");
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        assert_eq!(label("c"), "Unverified delivery");
        assert_ne!(label("c"), label("C"));
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(label("Z"), "Z");
        assert_eq!(label("l"), "l");
        assert_eq!(label(""), "");
        assert_eq!(label("not a code"), "not a code");
        assert!(known_label("Z").is_none());
    }

    #[test]
    fn test_label_is_total() {
        for c in (0u32..0x250).filter_map(char::from_u32) {
            let code = c.to_string();
            let _ = label(&code);
        }
    }

    #[test]
    fn test_diagnose() {
        assert_eq!(diagnose(" "), Some(CodeDiagnostic::BlankLabel));
        assert_eq!(diagnose("l"), Some(CodeDiagnostic::ReservedCode));
        assert_eq!(diagnose("C"), None);
        assert_eq!(diagnose("Z"), None);
    }
}
