//! Declarative table schemas for the portal's pages.
//!
//! Each schema states where a table lives, which elements are its rows,
//! and where each field sits inside a row. Traversal lives in
//! [`super::rows`]; when the portal changes its layout only the tables in
//! this file should need editing.

/// A field a schema can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Quantity,
    AcquisitionPrice,
    CurrentPrice,
    AssessedValue,
    Broker,
    Amount,
}

impl Field {
    /// Name used in warnings and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Quantity => "quantity",
            Field::AcquisitionPrice => "acquisition_price",
            Field::CurrentPrice => "current_price",
            Field::AssessedValue => "assessed_value",
            Field::Broker => "broker",
            Field::Amount => "amount",
        }
    }
}

/// How a field's text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Copied as trimmed text.
    Text,
    /// Parsed as a plain number (thousands separators allowed).
    Quantity,
    /// Parsed into a [`crate::model::MonetaryAmount`].
    Money,
}

/// Where a field's element is found inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// The n-th element matched by the schema's cell selector.
    Cell(usize),
    /// The first descendant of the row matching this selector.
    Find(&'static str),
}

/// One field of a table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub locator: Locator,
    pub kind: FieldKind,
    /// A missing required element makes the row malformed; a missing
    /// optional one leaves the field empty.
    pub required: bool,
}

impl FieldSpec {
    pub const fn cell(field: Field, index: usize, kind: FieldKind) -> Self {
        Self {
            field,
            locator: Locator::Cell(index),
            kind,
            required: true,
        }
    }

    pub const fn find(field: Field, selector: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            locator: Locator::Find(selector),
            kind,
            required: true,
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }
}

/// Where a table lives and how its rows map onto fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Short name used in errors, warnings and logs.
    pub name: &'static str,
    /// Page-level element that holds the table.
    pub container: &'static str,
    /// Row elements, relative to the container. The first step is a
    /// direct child of the container, so nested lists and tables further
    /// down do not contribute rows.
    pub rows: &'static str,
    /// Data cells, matched inside each row. `None` when every field is
    /// located with [`Locator::Find`].
    pub cells: Option<&'static str>,
    pub fields: &'static [FieldSpec],
}

impl TableSchema {
    /// Row selector anchored at the container.
    pub fn row_selector(&self) -> String {
        format!("{} > {}", self.container, self.rows)
    }

    /// Number of cells a row must have for every `Cell` locator to resolve.
    pub fn min_cells(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| match f.locator {
                Locator::Cell(i) if f.required => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// ---- Portal tables ----------------------------------------------------------

/// Registered accounts on the dashboard (`/`).
pub const DASHBOARD_ACCOUNTS: TableSchema = TableSchema {
    name: "accounts",
    container: "#registered-accounts",
    rows: "ul > li.account",
    cells: None,
    fields: &[
        FieldSpec::find(Field::Name, "a:nth-child(1)", FieldKind::Text),
        FieldSpec::find(Field::Amount, ".number", FieldKind::Money).optional(),
    ],
};

/// Domestic and foreign equities on `/bs/portfolio`.
pub const PORTFOLIO_EQUITIES: TableSchema = TableSchema {
    name: "equities",
    container: "#portfolio_det_eq",
    rows: "table tbody tr",
    cells: Some("td"),
    fields: &[
        FieldSpec::cell(Field::Name, 0, FieldKind::Text),
        FieldSpec::cell(Field::Quantity, 2, FieldKind::Quantity),
        FieldSpec::cell(Field::AcquisitionPrice, 3, FieldKind::Money),
        FieldSpec::cell(Field::CurrentPrice, 4, FieldKind::Money),
        FieldSpec::cell(Field::AssessedValue, 5, FieldKind::Money),
        FieldSpec::cell(Field::Broker, 9, FieldKind::Text),
    ],
};

/// Investment trusts on `/bs/portfolio`.
pub const PORTFOLIO_FUNDS: TableSchema = TableSchema {
    name: "funds",
    container: "#portfolio_det_mf",
    rows: "table tbody tr",
    cells: Some("td"),
    fields: &[
        FieldSpec::cell(Field::Name, 0, FieldKind::Text),
        FieldSpec::cell(Field::Quantity, 1, FieldKind::Quantity),
        FieldSpec::cell(Field::AcquisitionPrice, 2, FieldKind::Money),
        FieldSpec::cell(Field::CurrentPrice, 3, FieldKind::Money),
        FieldSpec::cell(Field::AssessedValue, 4, FieldKind::Money),
        FieldSpec::cell(Field::Broker, 8, FieldKind::Text),
    ],
};

/// Loans and card balances on `/bs/liability`.
pub const LIABILITIES: TableSchema = TableSchema {
    name: "liabilities",
    container: "#liability_det",
    rows: "section > section > table tbody tr",
    cells: Some("td"),
    fields: &[
        FieldSpec::cell(Field::Name, 3, FieldKind::Text),
        FieldSpec::find(Field::Amount, ".number", FieldKind::Money).optional(),
    ],
};
