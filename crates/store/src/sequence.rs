//! Per-shop sequence counters behind human-readable document numbers.
//!
//! Counters are bumped through [`crate::Tx::next_sequence`], so a minted
//! number only becomes durable when its transaction commits. An aborted bill
//! never burns a number.

/// What a counter numbers. Bills and invoices bucket by calendar year
/// (numbering restarts each January); product and kit codes are shop-lifetime
/// sequences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Bill,
    Invoice,
    Product,
    Kit,
}

impl SequenceKind {
    pub fn prefix(self) -> &'static str {
        match self {
            SequenceKind::Bill => "BILL",
            SequenceKind::Invoice => "INV",
            SequenceKind::Product => "PRD",
            SequenceKind::Kit => "KIT",
        }
    }
}

/// Render a minted sequence number: `BILL-2025-0042`, `PRD-0001`.
///
/// Padding is four digits; sequences past 9999 simply widen.
pub fn format_number(kind: SequenceKind, year: Option<i32>, seq: u64) -> String {
    match year {
        Some(year) => format!("{}-{year}-{seq:04}", kind.prefix()),
        None => format!("{}-{seq:04}", kind.prefix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_bucketed_numbers_carry_the_year() {
        assert_eq!(
            format_number(SequenceKind::Bill, Some(2025), 42),
            "BILL-2025-0042"
        );
        assert_eq!(
            format_number(SequenceKind::Invoice, Some(2025), 7),
            "INV-2025-0007"
        );
    }

    #[test]
    fn lifetime_sequences_have_no_year_segment() {
        assert_eq!(format_number(SequenceKind::Product, None, 1), "PRD-0001");
        assert_eq!(format_number(SequenceKind::Kit, None, 12), "KIT-0012");
    }

    #[test]
    fn padding_widens_past_four_digits() {
        assert_eq!(
            format_number(SequenceKind::Bill, Some(2025), 10_000),
            "BILL-2025-10000"
        );
    }
}
